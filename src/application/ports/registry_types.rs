use crate::domain::NodeLabel;

/// Read-only view of the symbol registry as seen by a per-file
/// resolver. The registry itself is built and sealed by the driver after
/// pass 1; resolvers only ever read through this trait, never mutate it,
/// which is what lets passes 3+ run across a work-stealing pool without
/// locking per lookup.
pub trait SymbolRegistryView: Send + Sync {
    /// All registrations of the simple (unqualified) name.
    fn find_by_name(&self, name: &str) -> Vec<(String, NodeLabel)>;

    /// Registrations whose QN ends with `.{suffix}` (used for
    /// `ClassName.methodName`-style method lookups).
    fn find_ending_with(&self, suffix: &str) -> Vec<(String, NodeLabel)>;

    /// Exact QN -> label, for same-module and import-qualified lookups.
    fn find_exact(&self, qn: &str) -> Option<NodeLabel>;

    /// `Module` QNs whose *directory portion* (the QN with its trailing
    /// file-stem segment dropped) ends with `.{suffix}` or equals `suffix`.
    /// An import path names a package/directory, not a specific file, so a
    /// plain suffix match against the full per-file Module QN misses every
    /// case where the importing file's stem differs from the package name
    /// (Go: `import "example.com/myapp/svc"` names the directory `svc`, not
    /// one particular file under it). Used by import-map construction
    /// alongside `find_ending_with`.
    fn find_modules_by_directory_suffix(&self, suffix: &str) -> Vec<String>;

    /// General-purpose resolver. `ref_text` is the
    /// literal reference text as it appears in source (`a.b.c`, `Foo`,...).
    fn resolve(&self, ref_text: &str, module_qn: &str, import_map: &dyn ImportMapView) -> Option<String>;

    /// `resolve`, additionally filtered to class-like labels
    /// ({Class, Type, Interface, Enum}).
    fn resolve_as_class(
        &self,
        ref_text: &str,
        module_qn: &str,
        import_map: &dyn ImportMapView,
    ) -> Option<String> {
        match self.resolve(ref_text, module_qn, import_map) {
            Some(qn) => match self.find_exact(&qn) {
                Some(label) if label.is_class_like() => Some(qn),
                _ => None,
            },
            None => None,
        }
    }
}

/// Read-only view of one module's import map:
/// `local_alias -> module_QN`.
pub trait ImportMapView: Send + Sync {
    fn get(&self, alias: &str) -> Option<&str>;
}

impl ImportMapView for std::collections::HashMap<String, String> {
    fn get(&self, alias: &str) -> Option<&str> {
        std::collections::HashMap::get(self, alias).map(|s| s.as_str())
    }
}
