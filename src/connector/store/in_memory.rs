//! In-memory reference implementation of the store port. Backs the
//! pipeline's own tests and is a reasonable default for small repositories;
//! a persistent backend (SQLite, a graph database) can implement the same
//! port without the application layer noticing.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::application::ports::GraphStore;
use crate::domain::{Edge, EdgeType, Node, NodeLabel, PipelineError};

#[derive(Debug, Default)]
struct Inner {
    next_node_id: i64,
    next_edge_id: i64,
    projects: HashMap<String, String>,
    nodes_by_id: HashMap<i64, Node>,
    node_id_by_qn: HashMap<(String, String), i64>,
    edges_by_id: HashMap<i64, Edge>,
    edges_by_source: HashMap<i64, Vec<i64>>,
    edges_by_target: HashMap<i64, Vec<i64>>,
}

/// Thread-safe, process-local graph store. A single `tokio::Mutex`
/// guards everything; the pipeline's own concurrency comes from the
/// single-writer flush stage, not from fine-grained locking here.
#[derive(Debug, Default)]
pub struct InMemoryGraphStore {
    inner: Arc<Mutex<Inner>>,
}

impl InMemoryGraphStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl GraphStore for InMemoryGraphStore {
    async fn upsert_project(&self, project: &str, root_path: &str) -> Result<(), PipelineError> {
        let mut inner = self.inner.lock().await;
        inner.projects.insert(project.to_string(), root_path.to_string());
        Ok(())
    }

    async fn upsert_node(&self, node: Node) -> Result<i64, PipelineError> {
        let mut inner = self.inner.lock().await;
        let key = (node.project.clone(), node.qualified_name.clone());
        if let Some(&id) = inner.node_id_by_qn.get(&key) {
            let existing = inner.nodes_by_id.get_mut(&id).expect("node id must exist");
            existing.merge_from(node);
            return Ok(id);
        }
        inner.next_node_id += 1;
        let id = inner.next_node_id;
        let node = node.with_id(id);
        inner.node_id_by_qn.insert(key, id);
        inner.nodes_by_id.insert(id, node);
        Ok(id)
    }

    async fn insert_edge(&self, edge: Edge) -> Result<i64, PipelineError> {
        let mut inner = self.inner.lock().await;
        inner.next_edge_id += 1;
        let id = inner.next_edge_id;
        inner.edges_by_source.entry(edge.source_id).or_default().push(id);
        inner.edges_by_target.entry(edge.target_id).or_default().push(id);
        inner.edges_by_id.insert(id, edge);
        Ok(id)
    }

    async fn find_node_by_qn(&self, project: &str, qn: &str) -> Result<Option<Node>, PipelineError> {
        let inner = self.inner.lock().await;
        let key = (project.to_string(), qn.to_string());
        Ok(inner.node_id_by_qn.get(&key).and_then(|id| inner.nodes_by_id.get(id)).cloned())
    }

    async fn find_node_by_id(&self, id: i64) -> Result<Option<Node>, PipelineError> {
        let inner = self.inner.lock().await;
        Ok(inner.nodes_by_id.get(&id).cloned())
    }

    async fn find_nodes_by_label(&self, project: &str, label: NodeLabel) -> Result<Vec<Node>, PipelineError> {
        let inner = self.inner.lock().await;
        Ok(inner
                .nodes_by_id
                .values()
                .filter(|n| n.project == project && n.label == label)
                .cloned()
                .collect())
    }

    async fn find_nodes_by_name(&self, project: &str, name: &str) -> Result<Vec<Node>, PipelineError> {
        let inner = self.inner.lock().await;
        Ok(inner
                .nodes_by_id
                .values()
                .filter(|n| n.project == project && n.name == name)
                .cloned()
                .collect())
    }

    async fn find_nodes_by_file(&self, project: &str, rel_path: &str) -> Result<Vec<Node>, PipelineError> {
        let inner = self.inner.lock().await;
        Ok(inner
                .nodes_by_id
                .values()
                .filter(|n| n.project == project && n.file_path == rel_path)
                .cloned()
                .collect())
    }

    async fn find_edges_by_source_and_type(&self, source_id: i64, edge_type: EdgeType) -> Result<Vec<Edge>, PipelineError> {
        let inner = self.inner.lock().await;
        let ids = inner.edges_by_source.get(&source_id).cloned().unwrap_or_default();
        Ok(ids
                .into_iter()
                .filter_map(|id| inner.edges_by_id.get(&id))
                .filter(|e| e.edge_type == edge_type)
                .cloned()
                .collect())
    }

    async fn find_edges_by_target_and_type(&self, target_id: i64, edge_type: EdgeType) -> Result<Vec<Edge>, PipelineError> {
        let inner = self.inner.lock().await;
        let ids = inner.edges_by_target.get(&target_id).cloned().unwrap_or_default();
        Ok(ids
                .into_iter()
                .filter_map(|id| inner.edges_by_id.get(&id))
                .filter(|e| e.edge_type == edge_type)
                .cloned()
                .collect())
    }

    async fn find_edges_by_type(&self, project: &str, edge_type: EdgeType) -> Result<Vec<Edge>, PipelineError> {
        let inner = self.inner.lock().await;
        Ok(inner
                .edges_by_id
                .values()
                .filter(|e| e.project == project && e.edge_type == edge_type)
                .cloned()
                .collect())
    }

    async fn count_nodes(&self, project: &str) -> Result<usize, PipelineError> {
        let inner = self.inner.lock().await;
        Ok(inner.nodes_by_id.values().filter(|n| n.project == project).count())
    }

    async fn count_edges(&self, project: &str) -> Result<usize, PipelineError> {
        let inner = self.inner.lock().await;
        Ok(inner.edges_by_id.values().filter(|e| e.project == project).count())
    }

    async fn delete_file_nodes(&self, project: &str, rel_path: &str) -> Result<(), PipelineError> {
        let mut inner = self.inner.lock().await;
        let doomed: Vec<i64> = inner
            .nodes_by_id
            .values()
            .filter(|n| n.project == project && n.file_path == rel_path)
            .filter_map(|n| n.id())
            .collect();
        for id in &doomed {
            if let Some(node) = inner.nodes_by_id.remove(id) {
                inner.node_id_by_qn.remove(&(node.project, node.qualified_name));
            }
            for edge_id in inner.edges_by_source.remove(id).unwrap_or_default() {
                inner.edges_by_id.remove(&edge_id);
            }
            for edge_id in inner.edges_by_target.remove(id).unwrap_or_default() {
                inner.edges_by_id.remove(&edge_id);
            }
        }
        inner
            .edges_by_id
            .retain(|_, e| !doomed.contains(&e.source_id) && !doomed.contains(&e.target_id));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(project: &str, qn: &str) -> Node {
        Node::new(project, NodeLabel::Function, qn, qn, "a.py", 0, 1)
    }

    #[tokio::test]
    async fn upsert_is_idempotent_by_qualified_name() {
        let store = InMemoryGraphStore::new();
        let id1 = store.upsert_node(node("p", "p.a.f")).await.unwrap();
        let id2 = store.upsert_node(node("p", "p.a.f")).await.unwrap();
        assert_eq!(id1, id2);
        assert_eq!(store.count_nodes("p").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn delete_file_nodes_also_drops_incident_edges() {
        let store = InMemoryGraphStore::new();
        let a = store.upsert_node(node("p", "p.a.f")).await.unwrap();
        let b = store.upsert_node(node("p", "p.b.g")).await.unwrap();
        store.insert_edge(Edge::new("p", a, b, EdgeType::Calls)).await.unwrap();

        store.delete_file_nodes("p", "a.py").await.unwrap();

        assert!(store.find_node_by_qn("p", "p.a.f").await.unwrap().is_none());
        assert!(store.find_edges_by_type("p", EdgeType::Calls).await.unwrap().is_empty());
    }
}
