// summary.rs - What an update run did, for display and JSON output.

use df_ledger::PatchCandidate;
use serde::{Deserialize, Serialize};

/// A pending patch, as reported before (or instead of) applying it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannedPatch {
    pub order_index: u64,
    /// Comment number the file was posted with.
    pub comment_number: u64,
    pub file_id: u64,
    pub filename: String,
}

impl From<&PatchCandidate> for PlannedPatch {
    fn from(candidate: &PatchCandidate) -> Self {
        Self {
            order_index: candidate.order_index,
            comment_number: candidate.comment_number,
            file_id: candidate.file_id,
            filename: candidate.filename.clone(),
        }
    }
}

/// A patch that applied and was committed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppliedPatch {
    pub order_index: u64,
    pub comment_number: u64,
    pub file_id: u64,
    pub filename: String,
    pub sha: String,
}

/// A patch that did not apply. Nothing was committed for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailedPatch {
    pub order_index: u64,
    pub comment_number: u64,
    pub file_id: u64,
    pub filename: String,
    pub reason: String,
}

/// Result of one `update` run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateSummary {
    pub issue: u64,
    pub feature_branch: String,
    pub base_branch: String,
    /// High-water mark found in history before this run.
    pub high_water_index: u64,
    /// Patches the plan selected, in apply order.
    pub pending: Vec<PlannedPatch>,
    pub applied: Vec<AppliedPatch>,
    /// Displayable patches at or below the mark, never attempted.
    pub skipped: usize,
    pub failed: Vec<FailedPatch>,
    pub dry_run: bool,
}

impl UpdateSummary {
    /// True iff no patch failed to apply.
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn is_up_to_date(&self) -> bool {
        self.pending.is_empty()
    }
}
