//! Application layer: the pipeline driver, the symbol registry,
//! the import-map builder, and the ports the connector layer implements.
//! Nothing here depends on tree-sitter or any other connector-layer crate.

pub mod config;
pub mod import_map;
pub mod pipeline;
pub mod ports;
pub mod registry;

pub use config::PipelineConfig;
pub use pipeline::{PipelineDriver, RunOutcome};
pub use registry::{SymbolRegistry, SymbolRegistryBuilder};
