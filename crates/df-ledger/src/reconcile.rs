// reconcile.rs - Decide which issue patches still need applying.
//
// Three steps, all pure:
//
//   1. Pair tagged commits with candidates. An applied tag pairs with the
//      candidate carrying the same file id. A provisional (posted) tag pairs
//      by filename, since the file id did not exist when the commit was
//      made. When several candidates qualify, one posted with the tag's
//      comment wins, otherwise the lowest index. Each commit and each
//      candidate pairs at most once; commits are scanned oldest first.
//   2. The high-water mark is the largest index among paired candidates.
//   3. Everything displayable, recognised and above the mark is pending.
//
// Later patches on an issue supersede earlier ones, so anything at or below
// the mark is never attempted again, whether it was applied or not.

use serde::{Deserialize, Serialize};

use crate::candidate::PatchCandidate;
use crate::commit::PatchLedger;
use crate::tag::ProvenanceTag;

/// A tagged commit paired with the candidate it records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatchMatch {
    pub sha: String,
    pub order_index: u64,
    pub file_id: u64,
    pub filename: String,
}

/// Output of [`reconcile`]: consumed immediately by the apply loop.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconciliationPlan {
    /// Highest `order_index` among matched candidates, 0 if none matched.
    pub high_water_index: u64,
    /// Candidates to apply, ascending by `order_index`.
    pub pending: Vec<PatchCandidate>,
    /// Pairings found in step 1, oldest commit first.
    pub matched: Vec<PatchMatch>,
    /// Displayable, recognised candidates at or below the mark.
    pub skipped: usize,
}

impl ReconciliationPlan {
    pub fn is_up_to_date(&self) -> bool {
        self.pending.is_empty()
    }
}

/// Merge the branch history with the issue's current candidates.
pub fn reconcile(ledger: &PatchLedger, candidates: &[PatchCandidate]) -> ReconciliationPlan {
    let mut ordered: Vec<&PatchCandidate> = candidates.iter().collect();
    ordered.sort_by_key(|candidate| candidate.order_index);

    let mut claimed = vec![false; ordered.len()];
    let mut matched = Vec::new();

    for (record, tag) in ledger.tagged() {
        let open: Vec<usize> = (0..ordered.len())
            .filter(|&i| !claimed[i] && ordered[i].is_displayable && tag_matches(tag, ordered[i]))
            .collect();
        let hit = open
            .iter()
            .copied()
            .find(|&i| same_comment(tag, ordered[i]))
            .or_else(|| open.first().copied());

        if let Some(i) = hit {
            claimed[i] = true;
            let candidate = ordered[i];
            tracing::debug!(
                sha = %record.sha,
                order_index = candidate.order_index,
                filename = %candidate.filename,
                "commit matches issue file"
            );
            matched.push(PatchMatch {
                sha: record.sha.clone(),
                order_index: candidate.order_index,
                file_id: candidate.file_id,
                filename: candidate.filename.clone(),
            });
        }
    }

    let high_water_index = matched
        .iter()
        .map(|m| m.order_index)
        .max()
        .unwrap_or(0);

    let (pending, done): (Vec<&PatchCandidate>, Vec<&PatchCandidate>) = ordered
        .into_iter()
        .filter(|candidate| candidate.is_actionable())
        .partition(|candidate| candidate.order_index > high_water_index);

    ReconciliationPlan {
        high_water_index,
        pending: pending.into_iter().cloned().collect(),
        matched,
        skipped: done.len(),
    }
}

fn tag_matches(tag: &ProvenanceTag, candidate: &PatchCandidate) -> bool {
    match tag {
        ProvenanceTag::AppliedFromIssue { file_id, .. } => *file_id == candidate.file_id,
        ProvenanceTag::PostedToIssue { filename, .. } => *filename == candidate.filename,
    }
}

// Older histories may carry the raw comment id instead of the number.
fn same_comment(tag: &ProvenanceTag, candidate: &PatchCandidate) -> bool {
    let comment = tag.comment_id();
    comment == candidate.comment_number || comment == candidate.comment_id
}
