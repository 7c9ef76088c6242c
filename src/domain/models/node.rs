use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Node label. Store-assigned identity lives outside this type; a
/// `Node` only carries the semantic attributes the pipeline itself owns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeLabel {
    File,
    Module,
    Class,
    Interface,
    Enum,
    Type,
    Function,
    Method,
    Variable,
    Macro,
    Field,
}

impl NodeLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeLabel::File => "File",
            NodeLabel::Module => "Module",
            NodeLabel::Class => "Class",
            NodeLabel::Interface => "Interface",
            NodeLabel::Enum => "Enum",
            NodeLabel::Type => "Type",
            NodeLabel::Function => "Function",
            NodeLabel::Method => "Method",
            NodeLabel::Variable => "Variable",
            NodeLabel::Macro => "Macro",
            NodeLabel::Field => "Field",
        }
    }

    /// Labels in the invariant of (every such node has exactly one
    /// DEFINES/DEFINES_METHOD edge). `File` and `Module` are containers,
    /// not declarations, and carry no such edge themselves.
    pub fn is_declaration(&self) -> bool {
        !matches!(self, NodeLabel::File | NodeLabel::Module)
    }

    /// Labels `resolve_as_class` restricts to.
    pub fn is_class_like(&self) -> bool {
        matches!(
            self,
            NodeLabel::Class | NodeLabel::Type | NodeLabel::Interface | NodeLabel::Enum
        )
    }

    /// Prefix used by file symbol summaries.
    pub fn symbol_prefix(&self) -> &'static str {
        match self {
            NodeLabel::Function => "func",
            NodeLabel::Method => "method",
            NodeLabel::Class => "class",
            NodeLabel::Interface => "interface",
            NodeLabel::Type => "type",
            NodeLabel::Enum => "enum",
            NodeLabel::Variable => "var",
            NodeLabel::Macro => "macro",
            NodeLabel::Field => "field",
            NodeLabel::Module | NodeLabel::File => "module",
        }
    }
}

/// A node as produced by the pipeline, ready to hand to
/// [`GraphStore::upsert_node`](crate::application::ports::GraphStore::upsert_node).
///
/// `(project, qualified_name)` is the upsert key; the store assigns
/// the integer identity. `id` is `None` for a freshly-constructed node that
/// hasn't been upserted yet, and `Some` once it round-trips through the
/// store (upsert, or any `find_*` lookup) — consumers that need the store
/// identity (to build an [`Edge`]) always go through a store call first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    #[serde(default)]
    pub id: Option<i64>,
    pub project: String,
    pub label: NodeLabel,
    pub name: String,
    pub qualified_name: String,
    pub file_path: String,
    pub start_row: u32,
    pub end_row: u32,
    pub properties: BTreeMap<String, Value>,
}

impl Node {
    pub fn new(
        project: impl Into<String>,
        label: NodeLabel,
        name: impl Into<String>,
        qualified_name: impl Into<String>,
        file_path: impl Into<String>,
        start_row: u32,
        end_row: u32,
    ) -> Self {
        Self {
            id: None,
            project: project.into(),
            label,
            name: name.into(),
            qualified_name: qualified_name.into(),
            file_path: file_path.into(),
            start_row,
            end_row,
            properties: BTreeMap::new(),
        }
    }

    pub fn id(&self) -> Option<i64> {
        self.id
    }

    pub fn with_id(mut self, id: i64) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    pub fn property_str(&self, key: &str) -> Option<&str> {
        self.properties.get(key).and_then(|v| v.as_str())
    }

    pub fn property_str_list(&self, key: &str) -> Vec<String> {
        self.properties
            .get(key)
            .and_then(|v| v.as_array())
            .map(|arr| {
                arr.iter()
                    .filter_map(|v| v.as_str().map(str::to_string))
                    .collect()
        })
            .unwrap_or_default()
    }

    /// Soft-merge another encounter of the same `(project, qualified_name)`
    /// into this node: scalar properties are overwritten by the
    /// later value, list-valued properties are left untouched (not merged).
    pub fn merge_from(&mut self, other: Node) {
        self.start_row = other.start_row;
        self.end_row = other.end_row;
        for (key, value) in other.properties {
            match value {
                Value::Array(_) => {
                    self.properties.entry(key).or_insert(value);
                }
                _ => {
                    self.properties.insert(key, value);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_keeps_first_list_value_but_overwrites_scalars() {
        let mut a = Node::new("p", NodeLabel::Function, "f", "p.a.f", "a.py", 0, 2)
            .with_property("complexity", 1)
            .with_property("decorators", serde_json::json!(["first"]));
        let b = Node::new("p", NodeLabel::Function, "f", "p.a.f", "a.py", 0, 5)
            .with_property("complexity", 3)
            .with_property("decorators", serde_json::json!(["second"]));

        a.merge_from(b);

        assert_eq!(a.end_row, 5);
        assert_eq!(a.properties.get("complexity"), Some(&serde_json::json!(3)));
        assert_eq!(
            a.properties.get("decorators"),
            Some(&serde_json::json!(["first"]))
        );
    }
}
