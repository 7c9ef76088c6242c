//! The symbol registry: a thread-safe index built once during pass 1
//! and sealed (read-only) for every pass after it. Builders push
//! registrations via [`SymbolRegistryBuilder`]; [`SymbolRegistry::seal`]
//! freezes the result behind the [`SymbolRegistryView`] port so resolvers
//! never see a mutable handle.

use std::collections::HashMap;

use crate::application::ports::{ImportMapView, SymbolRegistryView};
use crate::domain::NodeLabel;

/// Accumulates `(QN, Label)` registrations during pass 1. Not `Sync`; one
/// instance per driver, filled in from each file's extracted declarations
/// before being sealed.
#[derive(Debug, Default)]
pub struct SymbolRegistryBuilder {
    by_name: HashMap<String, Vec<(String, NodeLabel)>>,
    by_qn: HashMap<String, NodeLabel>,
}

impl SymbolRegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a declaration's simple name and qualified name. Safe to
    /// call more than once for the same QN (soft-merge re-registration);
    /// duplicate `(name, qn)` pairs in `by_name` are harmless since
    /// `find_by_name` consumers dedupe downstream, but we dedupe here too
    /// to keep `find_by_name` output clean.
    pub fn register(&mut self, name: &str, qn: &str, label: NodeLabel) {
        self.by_qn.insert(qn.to_string(), label);
        let bucket = self.by_name.entry(name.to_string()).or_default();
        if !bucket.iter().any(|(existing_qn, _)| existing_qn == qn) {
            bucket.push((qn.to_string(), label));
        }
    }

    pub fn seal(self) -> SymbolRegistry {
        SymbolRegistry {
            by_name: self.by_name,
            by_qn: self.by_qn,
        }
    }
}

/// The sealed, read-only registry. Built
/// once per run; cheap to share via `Arc` across the work-stealing pool.
#[derive(Debug, Default)]
pub struct SymbolRegistry {
    by_name: HashMap<String, Vec<(String, NodeLabel)>>,
    by_qn: HashMap<String, NodeLabel>,
}

impl SymbolRegistry {
    /// Splits `a.b.c` into `(prefix, last) = ("a.b", "c")`, or `None` when
    /// `ref_text` has no dot.
    fn split_last(ref_text: &str) -> Option<(&str, &str)> {
        ref_text.rsplit_once('.')
    }

    /// Splits `a.b.c` into `(first, rest) = ("a", "b.c")`.
    fn split_first(ref_text: &str) -> Option<(&str, &str)> {
        ref_text.split_once('.')
    }
}

impl SymbolRegistryView for SymbolRegistry {
    fn find_by_name(&self, name: &str) -> Vec<(String, NodeLabel)> {
        self.by_name.get(name).cloned().unwrap_or_default()
    }

    fn find_ending_with(&self, suffix: &str) -> Vec<(String, NodeLabel)> {
        let needle = format!(".{suffix}");
        self.by_qn
            .iter()
            .filter(|(qn, _)| qn.ends_with(&needle) || qn.as_str() == suffix)
            .map(|(qn, label)| (qn.clone(), *label))
            .collect()
    }

    fn find_exact(&self, qn: &str) -> Option<NodeLabel> {
        self.by_qn.get(qn).copied()
    }

    fn find_modules_by_directory_suffix(&self, suffix: &str) -> Vec<String> {
        let needle = format!(".{suffix}");
        self.by_qn
            .iter()
            .filter(|(_, label)| **label == NodeLabel::Module)
            .filter_map(|(qn, _)| {
                let dir = Self::split_last(qn).map(|(dir, _)| dir).unwrap_or(qn.as_str());
                if dir.ends_with(&needle) || dir == suffix {
                    Some(qn.clone())
                } else {
                    None
                }
            })
            .collect()
    }

    fn resolve(&self, ref_text: &str, module_qn: &str, import_map: &dyn ImportMapView) -> Option<String> {
        // Step 1: dotted reference via import alias.
        if let Some((prefix, last)) = Self::split_last(ref_text) {
            if let Some(module) = import_map.get(prefix) {
                let candidate = format!("{module}.{last}");
                if self.find_exact(&candidate).is_some() {
                    return Some(candidate);
                }
            }
            if let Some((first, rest)) = Self::split_first(ref_text) {
                if let Some(alias_qn) = import_map.get(first) {
                    let candidate = format!("{alias_qn}.{rest}");
                    if self.find_exact(&candidate).is_some() {
                        return Some(candidate);
                    }
                }
            }
            let suffix = format!("{prefix}.{last}");
            let hits = self.find_ending_with(&suffix);
            if hits.len() == 1 {
                return Some(hits[0].0.clone());
            }
        }

        // Step 2: same-module.
        let same_module = format!("{module_qn}.{ref_text}");
        if self.find_exact(&same_module).is_some() {
            return Some(same_module);
        }

        // Step 3: unique simple-name.
        let hits = self.find_by_name(ref_text);
        if hits.len() == 1 {
            return Some(hits[0].0.clone());
        }

        // Step 4: unresolved (expected-silent, kind 3).
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn import_map(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn same_module_lookup_wins_without_a_dot() {
        let mut b = SymbolRegistryBuilder::new();
        b.register("ProcessOrder", "proj.svc.handler.ProcessOrder", NodeLabel::Function);
        let reg = b.seal();
        let im = import_map(&[]);
        assert_eq!(
            reg.resolve("ProcessOrder", "proj.svc.handler", &im),
            Some("proj.svc.handler.ProcessOrder".to_string())
        );
    }

    #[test]
    fn dotted_reference_resolves_through_import_alias() {
        let mut b = SymbolRegistryBuilder::new();
        b.register("ProcessOrder", "proj.svc.handler.ProcessOrder", NodeLabel::Function);
        let reg = b.seal();
        let im = import_map(&[("svc", "proj.svc.handler")]);
        assert_eq!(
            reg.resolve("svc.ProcessOrder", "proj.main", &im),
            Some("proj.svc.handler.ProcessOrder".to_string())
        );
    }

    #[test]
    fn unique_simple_name_resolves_as_last_resort() {
        let mut b = SymbolRegistryBuilder::new();
        b.register("transform", "proj.processor.DataProcessor.transform", NodeLabel::Method);
        let reg = b.seal();
        let im = import_map(&[]);
        assert_eq!(
            reg.resolve("transform", "proj.main", &im),
            Some("proj.processor.DataProcessor.transform".to_string())
        );
    }

    #[test]
    fn ambiguous_simple_name_is_unresolved() {
        let mut b = SymbolRegistryBuilder::new();
        b.register("run", "proj.a.run", NodeLabel::Function);
        b.register("run", "proj.b.run", NodeLabel::Function);
        let reg = b.seal();
        let im = import_map(&[]);
        assert_eq!(reg.resolve("run", "proj.main", &im), None);
    }

    #[test]
    fn directory_suffix_matches_package_even_when_file_stem_differs() {
        let mut b = SymbolRegistryBuilder::new();
        b.register("handler", "myapp.svc.handler", NodeLabel::Module);
        let reg = b.seal();
        assert_eq!(
            reg.find_modules_by_directory_suffix("svc"),
            vec!["myapp.svc.handler".to_string()]
        );
        assert!(reg.find_modules_by_directory_suffix("handler").is_empty());
    }

    #[test]
    fn resolve_as_class_filters_by_label() {
        let mut b = SymbolRegistryBuilder::new();
        b.register("DataProcessor", "proj.processor.DataProcessor", NodeLabel::Class);
        b.register("run", "proj.main.run", NodeLabel::Function);
        let reg = b.seal();
        let im = import_map(&[]);
        assert_eq!(
            reg.resolve_as_class("DataProcessor", "proj.main", &im),
            Some("proj.processor.DataProcessor".to_string())
        );
        assert_eq!(reg.resolve_as_class("run", "proj.main", &im), None);
    }
}
