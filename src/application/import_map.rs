//! Per-module import map construction: `local_alias ->
//! module_QN`, built from each file's raw import statements once every
//! module in the project has been registered (pass 1 must finish and the
//! registry must include `Module` entries before this runs).

use std::collections::HashMap;

use crate::application::ports::{RawImport, SymbolRegistryView};
use crate::domain::NodeLabel;

/// Normalizes a raw import path into dot-separated segments: strips
/// surrounding quotes/angle-brackets (already done by the extractor in the
/// common case, but import literals may still carry them), strips a leading
/// `./`, and turns `/` into `.` so `"example.com/myapp/svc"` and
/// `"com.example.Foo"` both become dotted paths we can suffix-match against
/// registered module QNs.
fn normalize_path(path: &str) -> String {
    let trimmed = path.trim().trim_matches(|c| c == '"' || c == '\'' || c == '<' || c == '>');
    let trimmed = trimmed.strip_prefix("./").unwrap_or(trimmed);
    trimmed.replace('/', ".")
}

fn last_segment(normalized: &str) -> &str {
    normalized.rsplit('.').next().unwrap_or(normalized)
}

/// Builds the import map for one module. `registry` must already contain
/// every `Module` node in the project (true once pass 1 has finished for
/// all files, per the driver's ordering in).
pub fn build_import_map(
    raw_imports: &[RawImport],
    registry: &dyn SymbolRegistryView,
) -> HashMap<String, String> {
    let mut map = HashMap::new();
    for import in raw_imports {
        let normalized = normalize_path(&import.path);
        let alias = import
            .alias
            .clone()
            .unwrap_or_else(|| last_segment(&normalized).to_string());

        let resolved = resolve_module_path(&normalized, registry).unwrap_or(normalized);
        map.insert(alias, resolved);
    }
    map
}

/// Tries to match `normalized` against a registered module QN by
/// progressively shorter dotted suffixes (`a.b.c`, then `b.c`, then `c`).
/// Two matching strategies are tried at each suffix, since an import path
/// names a package, and a package is sometimes a single file whose own QN
/// ends in the suffix (`import "processor"` matching Module `proj.processor`)
/// and sometimes a directory of files whose stems don't otherwise appear in
/// the import path at all (`import "example.com/myapp/svc"` matching Module
/// `myapp.svc.handler`, where the file is `handler.go`). Best-effort: a path
/// with no corresponding module in this project yields `None`, which is
/// expected for third-party/stdlib imports.
fn resolve_module_path(normalized: &str, registry: &dyn SymbolRegistryView) -> Option<String> {
    let segments: Vec<&str> = normalized.split('.').filter(|s| !s.is_empty()).collect();
    if segments.is_empty() {
        return None;
    }
    for start in 0..segments.len() {
        let suffix = segments[start..].join(".");

        let full_qn_hits: Vec<_> = registry
            .find_ending_with(&suffix)
            .into_iter()
            .filter(|(_, label)| *label == NodeLabel::Module)
            .collect();
        if full_qn_hits.len() == 1 {
            return Some(full_qn_hits[0].0.clone());
        }

        let dir_hits = registry.find_modules_by_directory_suffix(&suffix);
        if dir_hits.len() == 1 {
            return Some(dir_hits[0].clone());
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::registry::SymbolRegistryBuilder;
    use crate::application::ports::RawImport;

    #[test]
    fn go_style_import_resolves_to_registered_module() {
        let mut b = SymbolRegistryBuilder::new();
        b.register("svc.handler", "proj.svc.handler", NodeLabel::Module);
        let reg = b.seal();

        let imports = vec![RawImport {
                path: "\"example.com/myapp/svc/handler\"".to_string(),
                alias: None,
        }];
        let map = build_import_map(&imports, &reg);
        assert_eq!(map.get("handler"), Some(&"proj.svc.handler".to_string()));
    }

    #[test]
    fn go_import_resolves_when_file_stem_differs_from_package_name() {
        let mut b = SymbolRegistryBuilder::new();
        b.register("handler", "myapp.svc.handler", NodeLabel::Module);
        let reg = b.seal();

        let imports = vec![RawImport {
                path: "\"example.com/myapp/svc\"".to_string(),
                alias: None,
        }];
        let map = build_import_map(&imports, &reg);
        assert_eq!(map.get("svc"), Some(&"myapp.svc.handler".to_string()));
    }

    #[test]
    fn python_style_import_with_explicit_alias() {
        let mut b = SymbolRegistryBuilder::new();
        b.register("processor", "proj.processor", NodeLabel::Module);
        let reg = b.seal();

        let imports = vec![RawImport {
                path: "processor".to_string(),
                alias: Some("proc".to_string()),
        }];
        let map = build_import_map(&imports, &reg);
        assert_eq!(map.get("proc"), Some(&"proj.processor".to_string()));
    }

    #[test]
    fn unresolvable_import_falls_back_to_normalized_path() {
        let b = SymbolRegistryBuilder::new();
        let reg = b.seal();

        let imports = vec![RawImport {
                path: "fmt".to_string(),
                alias: None,
        }];
        let map = build_import_map(&imports, &reg);
        assert_eq!(map.get("fmt"), Some(&"fmt".to_string()));
    }
}
