//! Tree-sitter backed implementation of [`PipelineBackend`]: the
//! declarative catalogue drives a generic tree walk for the 13 languages it
//! covers; Lua and Elixir go through [`crate::connector::custom_extractors`]
//! instead.

mod constants;
mod extract;
mod infer;
mod resolve;
pub(crate) mod walk;

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use tree_sitter::{Parser, Tree};

use crate::application::ports::{ExtractedFile, PipelineBackend, ResolveCtx, TypeMap};
use crate::connector::custom_extractors;
use crate::domain::language_spec::language_spec;
use crate::domain::{FileError, Language, ResolvedEdge};

struct CachedFile {
    language: Language,
    source: Vec<u8>,
    tree: Tree,
}

/// One backend instance per pipeline run: the AST cache lives for the
/// run's duration and is read-only after the load stage completes.
pub struct TreeSitterBackend {
    files: RwLock<HashMap<PathBuf, CachedFile>>,
}

impl TreeSitterBackend {
    pub fn new() -> Self {
        Self {
            files: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for TreeSitterBackend {
    fn default() -> Self {
        Self::new()
    }
}

fn ts_language_for(language: Language) -> Option<tree_sitter::Language> {
    match language {
        Language::Rust => Some(tree_sitter_rust::LANGUAGE.into()),
        Language::Python => Some(tree_sitter_python::LANGUAGE.into()),
        Language::JavaScript => Some(tree_sitter_javascript::LANGUAGE.into()),
        Language::TypeScript => Some(tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into()),
        Language::Go => Some(tree_sitter_go::LANGUAGE.into()),
        Language::Java => Some(tree_sitter_java::LANGUAGE.into()),
        Language::Php => Some(tree_sitter_php::LANGUAGE_PHP.into()),
        Language::Cpp => Some(tree_sitter_cpp::LANGUAGE.into()),
        Language::Swift => Some(tree_sitter_swift::LANGUAGE.into()),
        Language::Kotlin => Some(tree_sitter_kotlin_ng::LANGUAGE.into()),
        Language::CSharp => Some(tree_sitter_c_sharp::LANGUAGE.into()),
        Language::Ruby => Some(tree_sitter_ruby::LANGUAGE.into()),
        Language::Scala => Some(tree_sitter_scala::LANGUAGE.into()),
        Language::Lua => Some(tree_sitter_lua::LANGUAGE.into()),
        Language::Elixir => Some(tree_sitter_elixir::LANGUAGE.into()),
        Language::Unknown => None,
    }
}

impl PipelineBackend for TreeSitterBackend {
    fn language_of(&self, file_path: &Path) -> Language {
        Language::from_path(file_path)
    }

    fn load(&self, file_path: &Path, source: Vec<u8>) -> Result<(), FileError> {
        let language = Language::from_path(file_path);
        let ts_lang = ts_language_for(language).ok_or(FileError::NoGrammar(language))?;

        let mut parser = Parser::new();
        parser
            .set_language(&ts_lang)
            .map_err(|e| FileError::Other(format!("failed to set grammar: {e}")))?;

        let tree = parser
            .parse(&source, None)
            .ok_or_else(|| FileError::ParseFailed("parser returned no tree".to_string()))?;

        self.files.write().unwrap().insert(
            file_path.to_path_buf(),
            CachedFile {
                language,
                source,
                tree,
            },
        );
        Ok(())
    }

    fn extract(&self, file_path: &Path, project: &str) -> Result<ExtractedFile, FileError> {
        let files = self.files.read().unwrap();
        let cached = files
            .get(file_path)
            .ok_or_else(|| FileError::Other(format!("{} was not loaded", file_path.display())))?;

        if cached.language.is_custom_extracted() {
            return custom_extractors::extract(
                cached.language,
                file_path,
                project,
                &cached.source,
                &cached.tree,
            );
        }

        let spec = language_spec(cached.language).ok_or(FileError::NoGrammar(cached.language))?;
        let mut extracted = extract::extract_generic(spec, file_path, project, &cached.source, &cached.tree);
        extracted.constants = constants::resolve_module_constants(spec, &cached.source, &cached.tree);
        Ok(extracted)
    }

    fn infer_types(&self, file_path: &Path, module_qn: &str) -> TypeMap {
        let files = self.files.read().unwrap();
        let Some(cached) = files.get(file_path) else {
            return TypeMap::new();
        };
        if cached.language.is_custom_extracted() {
            return TypeMap::new();
        }
        let Some(spec) = language_spec(cached.language) else {
            return TypeMap::new();
        };
        infer::infer_types(spec, module_qn, &cached.source, &cached.tree)
    }

    fn resolve(&self, ctx: &ResolveCtx) -> Vec<ResolvedEdge> {
        let files = self.files.read().unwrap();
        let Some(cached) = files.get(ctx.file_path) else {
            return Vec::new();
        };
        if cached.language.is_custom_extracted() {
            return custom_extractors::resolve(cached.language, ctx, &cached.source, &cached.tree);
        }
        let Some(spec) = language_spec(cached.language) else {
            return Vec::new();
        };
        resolve::resolve_generic(spec, ctx, &cached.source, &cached.tree)
    }
}
