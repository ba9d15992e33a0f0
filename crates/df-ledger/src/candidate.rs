// candidate.rs - Patch attachments as currently listed on the issue.

use serde::{Deserialize, Serialize};

/// File suffix that marks an attachment as a patch.
pub const DEFAULT_PATCH_SUFFIX: &str = ".patch";

/// One attachment on the issue, snapshotted for the current run.
///
/// Candidates are rebuilt from the tracker on every invocation and have no
/// identity beyond `file_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatchCandidate {
    /// Position in the issue's file listing. Strictly increasing across a
    /// candidate list, even for files posted with the same comment; hidden
    /// files keep their slot.
    pub order_index: u64,
    pub file_id: u64,
    pub comment_id: u64,
    /// Number of the comment the file came with as shown on the issue
    /// (`#12`), 0 for the issue body. Several files can share one.
    pub comment_number: u64,
    pub filename: String,
    /// Where the file body can be downloaded from.
    pub file_url: String,
    /// Link to the comment the file was posted with, recorded in commits.
    pub comment_url: Option<String>,
    /// Tracker-side visibility flag, taken verbatim.
    pub is_displayable: bool,
    pub is_recognized_patch: bool,
}

impl PatchCandidate {
    /// Whether this candidate may be applied at all (ignoring history).
    pub fn is_actionable(&self) -> bool {
        self.is_displayable && self.is_recognized_patch
    }
}

/// Whether `filename` names a patch: it must end with `suffix`, with
/// nothing after it and something before it. `fix.patch.txt` is rejected.
pub fn is_recognized_patch(filename: &str, suffix: &str) -> bool {
    filename.len() > suffix.len() && filename.ends_with(suffix)
}
