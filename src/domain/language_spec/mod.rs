//! Declarative per-language AST shape catalogue.
//!
//! Most of the pipeline stays language-agnostic by dispatching on these
//! tables instead of growing a class per language. Languages whose idioms
//! the table can't express (`Language::is_custom_extracted`) are instead
//! handled by a dedicated extractor function in
//! `connector::custom_extractors`, keyed by language through a plain
//! `match` rather than virtual dispatch.

mod catalogue;

pub use catalogue::*;
