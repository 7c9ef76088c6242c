//! Connector layer (hexagonal "driven" side): adapters that implement the
//! application-layer ports against real external systems — tree-sitter
//! grammars, an in-memory graph store, and `git` shelled out for history and
//! diff surfaces. Nothing in `domain` or `application` depends on this
//! module; it only depends on them.

pub mod custom_extractors;
pub mod env_scanner;
pub mod git;
pub mod store;
pub mod treesitter;

pub use env_scanner::EnvUrlBinding;
pub use git::GitHistoryAnalyser;
pub use store::InMemoryGraphStore;
pub use treesitter::TreeSitterBackend;
