//! Core IssueTracker trait and attachment type

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// A file attached to an issue, as reported by the tracker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub file_id: u64,
    /// Comment the file was posted with (0 for the issue body).
    pub comment_id: u64,
    /// Position in the issue's file listing, starting at 1.
    pub order_index: u64,
    /// Comment number as shown on the issue, 0 for the body. Files posted
    /// together share it.
    pub comment_number: u64,
    pub filename: String,
    pub file_url: String,
    pub comment_url: Option<String>,
    /// Tracker-side visibility flag.
    pub displayable: bool,
}

/// Read-only access to one issue tracker.
///
/// Calls block until the tracker answers; transport failures are fatal to
/// the run and surface as [`crate::TrackerError`].
pub trait IssueTracker: Send + Sync {
    /// Title of the issue, used to name new feature branches.
    fn issue_title(&self, issue: u64) -> Result<String>;

    /// Every file on the issue, in posting order, hidden ones included.
    fn list_patch_attachments(&self, issue: u64) -> Result<Vec<Attachment>>;

    /// Number of comments currently on the issue.
    fn comment_count(&self, issue: u64) -> Result<u64>;

    /// Download a file body.
    fn download(&self, file_url: &str) -> Result<Vec<u8>>;

    /// Tracker display name (for logs).
    fn name(&self) -> &str;
}
