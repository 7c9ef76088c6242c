use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Edge type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EdgeType {
    Defines,
    DefinesMethod,
    Calls,
    Usage,
    Inherits,
    Implements,
    Override,
    Raises,
    Throws,
    UsesType,
    Configures,
    FileChangesWith,
}

impl EdgeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EdgeType::Defines => "DEFINES",
            EdgeType::DefinesMethod => "DEFINES_METHOD",
            EdgeType::Calls => "CALLS",
            EdgeType::Usage => "USAGE",
            EdgeType::Inherits => "INHERITS",
            EdgeType::Implements => "IMPLEMENTS",
            EdgeType::Override => "OVERRIDE",
            EdgeType::Raises => "RAISES",
            EdgeType::Throws => "THROWS",
            EdgeType::UsesType => "USES_TYPE",
            EdgeType::Configures => "CONFIGURES",
            EdgeType::FileChangesWith => "FILE_CHANGES_WITH",
        }
    }

    /// CONFIGURES is the one edge type deduplicated at the producer;
    /// everything else is set-valued-but-not-deduplicated at insertion.
    pub fn is_deduplicated_at_producer(&self) -> bool {
        matches!(self, EdgeType::Configures)
    }
}

impl std::fmt::Display for EdgeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A store-ready edge: `(project, source_id, target_id, type, properties)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Edge {
    pub project: String,
    pub source_id: i64,
    pub target_id: i64,
    pub edge_type: EdgeType,
    pub properties: BTreeMap<String, Value>,
}

impl Edge {
    pub fn new(project: impl Into<String>, source_id: i64, target_id: i64, edge_type: EdgeType) -> Self {
        Self {
            project: project.into(),
            source_id,
            target_id,
            edge_type,
            properties: BTreeMap::new(),
        }
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }
}

/// An edge produced by a parallel per-file resolver, keyed by qualified
/// name rather than store identity. The
/// single-writer flush stage dereferences both QNs via the store and turns
/// this into a real [`Edge`].
#[derive(Debug, Clone)]
pub struct ResolvedEdge {
    pub caller_qn: String,
    pub target_qn: String,
    pub edge_type: EdgeType,
    pub properties: BTreeMap<String, Value>,
}

impl ResolvedEdge {
    pub fn new(caller_qn: impl Into<String>, target_qn: impl Into<String>, edge_type: EdgeType) -> Self {
        Self {
            caller_qn: caller_qn.into(),
            target_qn: target_qn.into(),
            edge_type,
            properties: BTreeMap::new(),
        }
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }
}
