//! # Domain layer
//!
//! Pure data types and the declarative language catalogue. Nothing here
//! depends on tree-sitter, the store, or the filesystem.

pub mod error;
pub mod language_spec;
pub mod models;

pub use error::*;
pub use models::*;
