use std::path::Path;

/// Derives the opaque `project` string from a repository's absolute path
///: the leading separator is dropped and remaining separators become
/// `-`. Two paths with the same basename but different ancestors therefore
/// produce different names, because the whole path (not just the basename)
/// feeds the substitution.
pub fn project_name_from_path(root: &Path) -> String {
    let raw = root.to_string_lossy().replace('\\', "/");
    let trimmed = raw.strip_prefix('/').unwrap_or(&raw);
    trimmed.replace('/', "-")
}

/// Builds the `relpath_segments` portion of a qualified name: OS
/// separators become `.` and the language-specific extension is stripped.
pub fn module_segments(repo_relative_path: &Path) -> String {
    let without_ext = repo_relative_path.with_extension("");
    without_ext
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join(".")
}

/// `QN = project_name "." relpath_segments "." symbol_name`.
pub fn qualified_name(project: &str, repo_relative_path: &Path, symbol_name: &str) -> String {
    let module = module_segments(repo_relative_path);
    if module.is_empty() {
        format!("{project}.{symbol_name}")
    } else {
        format!("{project}.{module}.{symbol_name}")
    }
}

/// The module-level QN alone (used as the `Module` node's own `qualified_name`,
/// and as the prefix for same-module lookups in the registry).
pub fn module_qualified_name(project: &str, repo_relative_path: &Path) -> String {
    let module = module_segments(repo_relative_path);
    if module.is_empty() {
        project.to_string()
    } else {
        format!("{project}.{module}")
    }
}

/// Nested classes produce nested QNs by the same rule: `class_QN + "." + name`.
pub fn nested_qualified_name(parent_qn: &str, symbol_name: &str) -> String {
    format!("{parent_qn}.{symbol_name}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn project_name_replaces_separators_and_drops_leading_slash() {
        assert_eq!(
            project_name_from_path(Path::new("/home/alice/myapp")),
            "home-alice-myapp"
        );
        assert_eq!(
            project_name_from_path(Path::new("/home/bob/myapp")),
            "home-bob-myapp"
        );
    }

    #[test]
    fn same_basename_different_ancestors_differ() {
        let a = project_name_from_path(Path::new("/srv/teams/a/widget"));
        let b = project_name_from_path(Path::new("/srv/teams/b/widget"));
        assert_ne!(a, b);
    }

    #[test]
    fn qualified_name_strips_extension_and_joins_with_dots() {
        let qn = qualified_name("proj", Path::new("svc/handler.go"), "ProcessOrder");
        assert_eq!(qn, "proj.svc.handler.ProcessOrder");
    }

    #[test]
    fn nested_class_qn_extends_parent() {
        let outer = qualified_name("proj", Path::new("a/b.py"), "Outer");
        let inner = nested_qualified_name(&outer, "Inner");
        assert_eq!(inner, "proj.a.b.Outer.Inner");
    }
}
