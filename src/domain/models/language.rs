use serde::{Deserialize, Serialize};
use std::path::Path;

/// Languages the pipeline can ingest.
///
/// Each variant either has a declarative [`LanguageSpec`](crate::domain::language_spec::LanguageSpec)
/// entry in the catalogue, or is wired through a
/// [`CustomExtractor`](crate::domain::language_spec::CustomExtractor) for idioms the
/// catalogue cannot express (see).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Rust,
    Python,
    JavaScript,
    TypeScript,
    Go,
    Java,
    Php,
    Cpp,
    Swift,
    Kotlin,
    CSharp,
    Ruby,
    Scala,
    /// Custom-extractor language: `local f = function(...)` / `function f(...) end`.
    Lua,
    /// Custom-extractor language: `defmodule`/`def`.
    Elixir,
    Unknown,
}

impl Language {
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_lowercase().as_str() {
            "rs" => Language::Rust,
            "py" | "pyi" => Language::Python,
            "js" | "jsx" | "mjs" | "cjs" => Language::JavaScript,
            "ts" | "tsx" => Language::TypeScript,
            "go" => Language::Go,
            "java" => Language::Java,
            "php" => Language::Php,
            "c" | "h" | "cc" | "cpp" | "cxx" | "hpp" | "hxx" => Language::Cpp,
            "swift" => Language::Swift,
            "kt" | "kts" => Language::Kotlin,
            "cs" => Language::CSharp,
            "rb" => Language::Ruby,
            "scala" | "sc" => Language::Scala,
            "lua" => Language::Lua,
            "ex" | "exs" => Language::Elixir,
            _ => Language::Unknown,
        }
    }

    pub fn from_path(path: &Path) -> Self {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(Self::from_extension)
            .unwrap_or(Language::Unknown)
    }

    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "rust" => Language::Rust,
            "python" => Language::Python,
            "javascript" => Language::JavaScript,
            "typescript" => Language::TypeScript,
            "go" => Language::Go,
            "java" => Language::Java,
            "php" => Language::Php,
            "cpp" | "c++" | "c" => Language::Cpp,
            "swift" => Language::Swift,
            "kotlin" => Language::Kotlin,
            "csharp" | "c#" => Language::CSharp,
            "ruby" => Language::Ruby,
            "scala" => Language::Scala,
            "lua" => Language::Lua,
            "elixir" => Language::Elixir,
            _ => Language::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Rust => "rust",
            Language::Python => "python",
            Language::JavaScript => "javascript",
            Language::TypeScript => "typescript",
            Language::Go => "go",
            Language::Java => "java",
            Language::Php => "php",
            Language::Cpp => "cpp",
            Language::Swift => "swift",
            Language::Kotlin => "kotlin",
            Language::CSharp => "csharp",
            Language::Ruby => "ruby",
            Language::Scala => "scala",
            Language::Lua => "lua",
            Language::Elixir => "elixir",
            Language::Unknown => "unknown",
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Language::Unknown)
    }

    /// Languages handled by a [`CustomExtractor`](crate::domain::language_spec::CustomExtractor)
    /// rather than the generic, catalogue-driven walk.
    pub fn is_custom_extracted(&self) -> bool {
        matches!(self, Language::Lua | Language::Elixir)
    }

    pub fn all_supported() -> Vec<Language> {
        vec![
            Language::Rust,
            Language::Python,
            Language::JavaScript,
            Language::TypeScript,
            Language::Go,
            Language::Java,
            Language::Php,
            Language::Cpp,
            Language::Swift,
            Language::Kotlin,
            Language::CSharp,
            Language::Ruby,
            Language::Scala,
            Language::Lua,
            Language::Elixir,
        ]
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_extension_covers_common_cases() {
        assert_eq!(Language::from_extension("rs"), Language::Rust);
        assert_eq!(Language::from_extension("py"), Language::Python);
        assert_eq!(Language::from_extension("tsx"), Language::TypeScript);
        assert_eq!(Language::from_extension("go"), Language::Go);
        assert_eq!(Language::from_extension("kt"), Language::Kotlin);
        assert_eq!(Language::from_extension("txt"), Language::Unknown);
    }

    #[test]
    fn from_path_uses_extension() {
        assert_eq!(Language::from_path(Path::new("a/b/main.rs")), Language::Rust);
    }

    #[test]
    fn custom_extracted_languages() {
        assert!(Language::Lua.is_custom_extracted());
        assert!(Language::Elixir.is_custom_extracted());
        assert!(!Language::Rust.is_custom_extracted());
    }
}
