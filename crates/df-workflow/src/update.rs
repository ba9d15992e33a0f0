// update.rs - Bring the feature branch up to date with the issue.
//
// One run: check preconditions, read the branch history, list the issue's
// files, reconcile the two, then apply and commit each pending patch in
// order. The apply loop is the only place that mutates the repository, and
// it only commits after a patch applied.

use std::fs;
use std::path::{Path, PathBuf};

use df_git::{ApplyOutcome, VcsExecutor};
use df_ledger::{reconcile, CommitRecord, PatchCandidate, PatchLedger, ProvenanceTag};
use df_tracker::{CandidateListBuilder, IssueTracker};

use crate::config::WorkflowConfig;
use crate::context::{locate, BranchContext};
use crate::error::Result;
use crate::summary::{AppliedPatch, FailedPatch, PlannedPatch, UpdateSummary};

/// Options for one `update` run.
#[derive(Debug, Clone, Default)]
pub struct UpdateOptions {
    /// Issue to update; deduced from the current branch when `None`.
    pub issue: Option<u64>,
    /// Stop after reconciling: nothing is downloaded, applied or committed.
    pub dry_run: bool,
}

/// Runs `update` against one repository and one tracker.
pub struct UpdateRunner<'a> {
    vcs: &'a dyn VcsExecutor,
    tracker: &'a dyn IssueTracker,
    config: &'a WorkflowConfig,
}

impl<'a> UpdateRunner<'a> {
    pub fn new(
        vcs: &'a dyn VcsExecutor,
        tracker: &'a dyn IssueTracker,
        config: &'a WorkflowConfig,
    ) -> Self {
        Self {
            vcs,
            tracker,
            config,
        }
    }

    pub fn run(&self, options: &UpdateOptions) -> Result<UpdateSummary> {
        let BranchContext {
            issue,
            feature,
            base,
            mut ledger,
        } = locate(self.vcs, &self.config.git, options.issue)?;

        tracing::info!("listing files on issue {} from {}", issue, self.tracker.name());
        let candidates = CandidateListBuilder::new(self.tracker, &self.config.tracker.patch_suffix)
            .build(issue)?;
        let plan = reconcile(&ledger, &candidates);

        tracing::info!(
            "high-water mark {}; {} patch(es) pending, {} already handled",
            plan.high_water_index,
            plan.pending.len(),
            plan.skipped
        );

        let mut summary = UpdateSummary {
            issue,
            feature_branch: feature.name,
            base_branch: base.name,
            high_water_index: plan.high_water_index,
            pending: plan.pending.iter().map(PlannedPatch::from).collect(),
            applied: Vec::new(),
            skipped: plan.skipped,
            failed: Vec::new(),
            dry_run: options.dry_run,
        };

        if options.dry_run || plan.is_up_to_date() {
            return Ok(summary);
        }

        let download_dir = tempfile::Builder::new().prefix("dorgflow-").tempdir()?;
        for candidate in &plan.pending {
            self.apply_one(candidate, download_dir.path(), &mut ledger, &mut summary)?;
        }

        Ok(summary)
    }

    /// Download, apply and commit one patch. Patches that do not apply are
    /// recorded in the summary; only transport failures return an error.
    fn apply_one(
        &self,
        candidate: &PatchCandidate,
        download_dir: &Path,
        ledger: &mut PatchLedger,
        summary: &mut UpdateSummary,
    ) -> Result<()> {
        let failed = |reason: String| FailedPatch {
            order_index: candidate.order_index,
            comment_number: candidate.comment_number,
            file_id: candidate.file_id,
            filename: candidate.filename.clone(),
            reason,
        };

        // Build the tag first so nothing is applied that could not be recorded.
        let tag = match ProvenanceTag::applied(
            candidate.comment_number,
            candidate.file_id,
            &candidate.filename,
            candidate.comment_url.clone(),
        ) {
            Ok(tag) => tag,
            Err(error) => {
                tracing::warn!("skipping {}: {}", candidate.filename, error);
                summary.failed.push(failed(error.to_string()));
                return Ok(());
            }
        };

        let body = self.tracker.download(&candidate.file_url)?;
        let path = patch_path(download_dir, candidate);
        fs::write(&path, body)?;

        match self.vcs.apply_patch_file(&path)? {
            ApplyOutcome::Applied => {
                let message = tag.encode();
                let sha = self.vcs.commit(&message)?;
                tracing::info!(
                    "applied {} (comment #{}) as {}",
                    candidate.filename,
                    candidate.comment_number,
                    sha
                );
                ledger.push(CommitRecord::new(sha.clone(), message));
                summary.applied.push(AppliedPatch {
                    order_index: candidate.order_index,
                    comment_number: candidate.comment_number,
                    file_id: candidate.file_id,
                    filename: candidate.filename.clone(),
                    sha,
                });
            }
            ApplyOutcome::Failed { reason } => {
                tracing::warn!(
                    "patch {} (comment #{}) did not apply: {}",
                    candidate.filename,
                    candidate.comment_number,
                    reason
                );
                summary.failed.push(failed(reason));
            }
        }
        Ok(())
    }
}

/// Local path for a downloaded patch. Only the final path component of the
/// tracker's filename is used.
fn patch_path(dir: &Path, candidate: &PatchCandidate) -> PathBuf {
    let name = Path::new(&candidate.filename)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| format!("{}.patch", candidate.file_id));
    dir.join(format!("{}-{}", candidate.order_index, name))
}
