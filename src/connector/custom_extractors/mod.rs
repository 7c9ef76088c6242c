//! Per-language custom extractors for grammars the declarative
//! catalogue cannot express: Lua's anonymous-function-assignment idiom and
//! Elixir's `defmodule`/`def` macro-call shape. Both still produce the same
//! `ExtractedFile`/`ResolvedEdge` records the generic path does, so the
//! pipeline driver never needs to know which path a file took.

mod elixir;
mod lua;

use std::path::Path;

use tree_sitter::Tree;

use crate::application::ports::{ExtractedFile, ResolveCtx};
use crate::domain::{FileError, Language, ResolvedEdge};

pub fn extract(
    language: Language,
    file_path: &Path,
    project: &str,
    source: &[u8],
    tree: &Tree,
) -> Result<ExtractedFile, FileError> {
    match language {
        Language::Lua => Ok(lua::extract(file_path, project, source, tree)),
        Language::Elixir => Ok(elixir::extract(file_path, project, source, tree)),
        _ => Err(FileError::NoGrammar(language)),
    }
}

pub fn resolve(language: Language, ctx: &ResolveCtx, source: &[u8], tree: &Tree) -> Vec<ResolvedEdge> {
    match language {
        Language::Lua => lua::resolve(ctx, source, tree),
        Language::Elixir => elixir::resolve(ctx, source, tree),
        _ => Vec::new(),
    }
}
