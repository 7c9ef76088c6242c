use serde::{Deserialize, Serialize};

/// One scored, co-changing file pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoupledPair {
    pub file_a: String,
    pub file_b: String,
    pub co_change_count: u32,
    pub total_changes_a: u32,
    pub total_changes_b: u32,
    pub coupling_score: f64,
}
