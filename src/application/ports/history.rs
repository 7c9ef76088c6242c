use std::path::Path;

use crate::application::PipelineConfig;
use crate::domain::{CoupledPair, PipelineError};

/// The git-history coupling port. One
/// implementation, `connector::git::history::GitHistoryAnalyser`, shells out
/// to `git log`; the pipeline driver only ever sees scored pairs.
pub trait HistoryAnalyser: Send + Sync {
    fn analyse(&self, repo_root: &Path, config: &PipelineConfig) -> Result<Vec<CoupledPair>, PipelineError>;
}
