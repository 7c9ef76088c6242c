//! # codegraph-pipeline
//!
//! The multi-pass graph construction pipeline that turns a polyglot repo's
//! syntax trees into a resolved, cross-referenced code knowledge graph:
//! typed declaration nodes, CALLS/USAGE/INHERITS/IMPLEMENTS/... edges, and
//! git-history change coupling.
//!
//! ## Architecture
//!
//! The crate follows the same hexagonal layering its teacher does:
//!
//! - `domain`: node/edge models, the language-spec catalogue, error types —
//! nothing here depends on tree-sitter, the store, or the filesystem.
//! - `application`: the pipeline driver, the symbol registry, import-map
//! construction, and the ports (`PipelineBackend`, `GraphStore`,
//! `HistoryAnalyser`) the connector layer implements.
//! - `connector`: tree-sitter-backed extraction, per-language custom
//! extractors, the in-memory reference store, git history/diff, and the
//! env-URL scanner.
//!
//! File discovery, ignore-list handling, and the storage back-end's
//! concrete persistence are treated as external collaborators — callers
//! supply a discovered-file list and a [`application::ports::GraphStore`]
//! implementation; [`connector::InMemoryGraphStore`] is the reference one.

pub mod application;
pub mod connector;
pub mod domain;

// Re-export commonly used types
pub use application::*;
pub use connector::*;
pub use domain::*;
