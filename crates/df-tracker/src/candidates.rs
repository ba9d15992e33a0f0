// candidates.rs - Turn the tracker's file listing into patch candidates.

use df_ledger::{is_recognized_patch, PatchCandidate};

use crate::client::{Attachment, IssueTracker};
use crate::error::{Result, TrackerError};

/// Builds the ordered candidate list for one issue.
///
/// Every attachment becomes a candidate, hidden and non-patch files
/// included: they keep their position so indices are never renumbered, and
/// the reconciliation engine filters them out itself.
pub struct CandidateListBuilder<'a> {
    tracker: &'a dyn IssueTracker,
    patch_suffix: String,
}

impl<'a> CandidateListBuilder<'a> {
    pub fn new(tracker: &'a dyn IssueTracker, patch_suffix: impl Into<String>) -> Self {
        Self {
            tracker,
            patch_suffix: patch_suffix.into(),
        }
    }

    /// Fetch the issue's files and map them to candidates, ascending by
    /// position. Fails if two files share a position.
    pub fn build(&self, issue: u64) -> Result<Vec<PatchCandidate>> {
        let attachments = self.tracker.list_patch_attachments(issue)?;
        let candidates = self.from_attachments(issue, attachments)?;

        tracing::debug!(
            issue,
            total = candidates.len(),
            actionable = candidates.iter().filter(|c| c.is_actionable()).count(),
            "built patch candidate list"
        );
        Ok(candidates)
    }

    fn from_attachments(
        &self,
        issue: u64,
        mut attachments: Vec<Attachment>,
    ) -> Result<Vec<PatchCandidate>> {
        attachments.sort_by_key(|a| a.order_index);

        if let Some(pair) = attachments
            .windows(2)
            .find(|pair| pair[0].order_index == pair[1].order_index)
        {
            return Err(TrackerError::InvalidListing {
                issue,
                order_index: pair[0].order_index,
            });
        }

        Ok(attachments
            .into_iter()
            .map(|a| PatchCandidate {
                order_index: a.order_index,
                file_id: a.file_id,
                comment_id: a.comment_id,
                comment_number: a.comment_number,
                is_recognized_patch: is_recognized_patch(&a.filename, &self.patch_suffix),
                filename: a.filename,
                file_url: a.file_url,
                comment_url: a.comment_url,
                is_displayable: a.displayable,
            })
            .collect())
    }
}
