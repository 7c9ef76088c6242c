use thiserror::Error;

/// Errors surfaced by the pipeline.
///
/// Per callers should treat [`PipelineError::Cancelled`] and
/// [`PipelineError::StoreWrite`] as fatal (abort `run()`); everything else
/// that happens per-file is logged and the offending file is skipped, never
/// surfaced here.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("pipeline was cancelled")]
    Cancelled,

    #[error("store write failed: {0}")]
    StoreWrite(String),

    #[error("store read failed: {0}")]
    StoreRead(String),

    #[error("invalid project root: {0}")]
    InvalidRoot(String),

    #[error("git history analysis failed: {0}")]
    GitHistory(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Internal(String),
}

impl PipelineError {
    pub fn store_write(msg: impl Into<String>) -> Self {
        Self::StoreWrite(msg.into())
    }

    pub fn store_read(msg: impl Into<String>) -> Self {
        Self::StoreRead(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Cancelled | Self::StoreWrite(_))
    }
}

/// Per-file recoverable condition. Never propagated as an
/// `Err` from a pass; always logged at `warn` and the file is dropped for
/// that pass only.
#[derive(Debug, Error)]
pub enum FileError {
    #[error("parse failed: {0}")]
    ParseFailed(String),

    #[error("no grammar registered for language {0:?}")]
    NoGrammar(crate::domain::models::Language),

    #[error("file exceeds size cap ({size} bytes > {cap} bytes)")]
    Oversize { size: u64, cap: u64 },

    #[error("custom extractor panicked: {0}")]
    ExtractorPanic(String),

    #[error("{0}")]
    Other(String),
}
