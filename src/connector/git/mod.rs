//! Git-backed connectors: history coupling and the incremental
//! diff surface. Both shell out to `git` rather than binding
//! libgit2 — the pipeline only ever needs `git`'s own text output.

pub mod diff;
pub mod history;

pub use diff::{diff_scope, ChangedFile, ChangeStatus, DiffScope, Hunk};
pub use history::{analyse, GitHistoryAnalyser};
