//! `pipeline.toml` (ambient configuration): run-level tunables the spec
//! leaves as "configured" without prescribing a surface. Every field has a
//! default matching the value the rest of the pipeline previously hardcoded,
//! so an absent or partial file behaves exactly like no config at all.

use std::path::Path;

use serde::Deserialize;

use crate::domain::PipelineError;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// oversize cutoff.
    pub file_size_cap_bytes: u64,
    /// `git log --since`.
    pub git_history_since: String,
    /// subprocess timeout.
    pub git_history_timeout_secs: u64,
    /// minimum co-change count for a pair to be scored.
    pub coupling_min_co_change: u32,
    /// minimum coupling score for a pair to survive.
    pub coupling_min_score: f64,
    /// result cap.
    pub coupling_top_n: usize,
    /// minimum project-wide token frequency for a decorator tag.
    pub decorator_tag_min_frequency: usize,
    /// commits touching more files than this are excluded.
    pub max_commit_files: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            file_size_cap_bytes: 2 * 1024 * 1024,
            git_history_since: "6 months ago".to_string(),
            git_history_timeout_secs: 30,
            coupling_min_co_change: 3,
            coupling_min_score: 0.3,
            coupling_top_n: 100,
            decorator_tag_min_frequency: 2,
            max_commit_files: 20,
        }
    }
}

impl PipelineConfig {
    /// Loads `path`, or falls back to defaults if the file doesn't exist.
    /// An existing file that fails to parse is a hard error, not a silent
    /// fallback — a typo'd config should be visible, not ignored.
    pub fn load(path: &Path) -> Result<Self, PipelineError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path)?;
        toml::from_str(&text).map_err(|e| PipelineError::internal(format!("{}: {e}", path.display())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let config = PipelineConfig::load(Path::new("/nonexistent/pipeline.toml")).unwrap();
        assert_eq!(config.file_size_cap_bytes, 2 * 1024 * 1024);
        assert_eq!(config.coupling_top_n, 100);
    }

    #[test]
    fn partial_toml_fills_remaining_fields_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pipeline.toml");
        std::fs::write(&path, "coupling_min_co_change = 5\n").unwrap();
        let config = PipelineConfig::load(&path).unwrap();
        assert_eq!(config.coupling_min_co_change, 5);
        assert_eq!(config.coupling_top_n, 100);
    }
}
