use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use crate::domain::{FileError, Language, Node, ResolvedEdge};

use super::registry_types::{ImportMapView, SymbolRegistryView};

/// A declaration site discovered by pass 1, before it has been upserted to
/// the store and before its container edge has been resolved to a store id.
/// `container_qn` is the QN of the enclosing Module or Class.
#[derive(Debug, Clone)]
pub struct Declaration {
    pub node: Node,
    pub container_qn: String,
}

/// A raw, unresolved import statement, before it has been
/// turned into a `local_alias -> module_QN` entry by the import map
/// builder. `path` is whatever literal the source used (`"fmt"`,
/// `"example.com/myapp/svc"`, `./sibling`, `com.example.Foo`,...).
#[derive(Debug, Clone)]
pub struct RawImport {
    pub path: String,
    pub alias: Option<String>,
}

/// Everything pass 1 plus the module constant resolver
/// produce for one file.
#[derive(Debug, Clone, Default)]
pub struct ExtractedFile {
    pub module_node: Option<Node>,
    pub declarations: Vec<Declaration>,
    pub imports: Vec<RawImport>,
    /// `NAME -> resolved string value`, in first-seen order (used for the
    /// Module node's `constants` property and the CONFIGURES env index).
    pub constants: Vec<(String, String)>,
}

/// Per-module output of pass 2: local variable name -> class QN.
pub type TypeMap = HashMap<String, String>;

/// Everything a per-file resolver needs that isn't in the file
/// itself: the frozen registry, this module's import map, the pass-2 type
/// map, and (for CONFIGURES) the project-wide env-key index.
pub struct ResolveCtx<'a> {
    pub project: &'a str,
    pub file_path: &'a Path,
    pub module_qn: &'a str,
    pub registry: &'a dyn SymbolRegistryView,
    pub import_map: &'a dyn ImportMapView,
    pub type_map: &'a TypeMap,
    /// Go receiver-variable -> class QN, scoped to one method body at a
    /// time; the backend is expected to re-derive this per method from the
    /// enclosing method's `receiver` property rather than needing it handed
    /// in, so this is normally empty and reserved for future extension.
    pub receiver_map: &'a TypeMap,
    pub env_index: &'a HashMap<String, String>,
}

/// The single port the application layer depends on for every
/// AST-dependent operation. One implementation
/// (`connector::treesitter::TreeSitterBackend`) fans out internally to the
/// declarative catalogue for most languages and to
/// `connector::custom_extractors` for the rest.
pub trait PipelineBackend: Send + Sync {
    fn language_of(&self, file_path: &Path) -> Language;

    /// Parses `source` (after BOM-stripping) and retains the tree for
    /// the lifetime of the run, keyed by `file_path`. Oversize or fatally
    /// unparseable files return `Err` and are skipped by the caller; a
    /// partial tree (syntax errors in subtrees) is still cached and used.
    fn load(&self, file_path: &Path, source: Vec<u8>) -> Result<(), FileError>;

    /// Pass 1 + the module constant resolver, for an already-`load`ed file.
    fn extract(&self, file_path: &Path, project: &str) -> Result<ExtractedFile, FileError>;

    /// Pass 2. Returns an empty map for languages/files with no
    /// inference rule; that is a valid, silent outcome, not an error.
    fn infer_types(&self, file_path: &Path, module_qn: &str) -> TypeMap;

    /// Passes 3-5 bundled: one tree walk producing CALLS,
    /// USAGE, USES_TYPE, THROWS/RAISES and CONFIGURES edges together, since
    /// none of them mutate shared state and all read the same frozen
    /// registry/import map/type map.
    fn resolve(&self, ctx: &ResolveCtx) -> Vec<ResolvedEdge>;
}

/// Bundles a project's constants (already discovered by pass 1) into the
/// `env_key -> module_QN` index consumed by `resolve`'s CONFIGURES half
///. Pure string logic; lives here so both the backend and
/// the driver can share the exact same "looks like an env var name" rule.
pub fn looks_like_env_key(key: &str) -> bool {
    if key.len() < 2 {
        return false;
    }
    let mut has_upper = false;
    for c in key.chars() {
        if c.is_ascii_lowercase() {
            return false;
        }
        if c.is_ascii_uppercase() {
            has_upper = true;
        } else if !c.is_ascii_digit() && c != '_' {
            return false;
        }
    }
    has_upper
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_key_heuristic() {
        assert!(looks_like_env_key("DB_URL"));
        assert!(looks_like_env_key("API_KEY2"));
        assert!(!looks_like_env_key("x"));
        assert!(!looks_like_env_key("dbUrl"));
        assert!(!looks_like_env_key("123"));
    }
}
