use async_trait::async_trait;

use crate::domain::{Edge, EdgeType, Node, NodeLabel, PipelineError};

/// The store port. Treated as an opaque node/edge store; the pipeline
/// never assumes a particular backing engine. A reference in-memory
/// implementation lives at `connector::store::InMemoryGraphStore` and is
/// what the pipeline's own tests run against.
#[async_trait]
pub trait GraphStore: Send + Sync {
    async fn upsert_project(&self, project: &str, root_path: &str) -> Result<(), PipelineError>;

    /// Unique by `(project, qualified_name)`. A second upsert of the same
    /// key soft-merges and returns the same id.
    async fn upsert_node(&self, node: Node) -> Result<i64, PipelineError>;

    async fn insert_edge(&self, edge: Edge) -> Result<i64, PipelineError>;

    async fn find_node_by_qn(&self, project: &str, qn: &str) -> Result<Option<Node>, PipelineError>;

    async fn find_node_by_id(&self, id: i64) -> Result<Option<Node>, PipelineError>;

    async fn find_nodes_by_label(&self, project: &str, label: NodeLabel) -> Result<Vec<Node>, PipelineError>;

    async fn find_nodes_by_name(&self, project: &str, name: &str) -> Result<Vec<Node>, PipelineError>;

    async fn find_nodes_by_file(&self, project: &str, rel_path: &str) -> Result<Vec<Node>, PipelineError>;

    async fn find_edges_by_source_and_type(&self, source_id: i64, edge_type: EdgeType) -> Result<Vec<Edge>, PipelineError>;

    async fn find_edges_by_target_and_type(&self, target_id: i64, edge_type: EdgeType) -> Result<Vec<Edge>, PipelineError>;

    async fn find_edges_by_type(&self, project: &str, edge_type: EdgeType) -> Result<Vec<Edge>, PipelineError>;

    async fn count_nodes(&self, project: &str) -> Result<usize, PipelineError>;

    async fn count_edges(&self, project: &str) -> Result<usize, PipelineError>;

    /// Incremental re-indexing: drop a file's nodes and the edges that
    /// touch them before the affected passes re-run.
    async fn delete_file_nodes(&self, project: &str, rel_path: &str) -> Result<(), PipelineError>;
}
