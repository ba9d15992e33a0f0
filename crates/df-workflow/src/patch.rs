// patch.rs - Turn local work into a patch file for upload.
//
// The diff from the base branch to the feature tip is written into the
// repository root, and an empty commit records the provisional tag. Once the file
// is uploaded and shows up on the issue, `update` matches it by filename and
// moves the high-water mark past it.

use std::fs;
use std::path::{Path, PathBuf};

use df_git::VcsExecutor;
use df_ledger::{CommitRecord, ProvenanceTag};
use df_tracker::IssueTracker;
use serde::{Deserialize, Serialize};

use crate::config::WorkflowConfig;
use crate::context::{locate, BranchContext};
use crate::error::{Result, WorkflowError};

/// Result of `patch`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatchOutcome {
    pub issue: u64,
    pub filename: String,
    pub path: PathBuf,
    pub expected_comment_id: u64,
    /// The commit holding the provisional tag.
    pub sha: String,
}

/// Outgoing patch name: `{issue}-{comment}.{project}.{description}.patch`.
/// The description is the feature branch name without its issue prefix and
/// is left out when there is none.
pub fn patch_filename(issue: u64, expected_comment_id: u64, project: &str, branch: &str) -> String {
    let prefix = format!("{}-", issue);
    match branch.strip_prefix(prefix.as_str()).filter(|d| !d.is_empty()) {
        Some(description) => format!(
            "{}-{}.{}.{}.patch",
            issue, expected_comment_id, project, description
        ),
        None => format!("{}-{}.{}.patch", issue, expected_comment_id, project),
    }
}

/// Runs `patch` for the checked-out feature branch.
pub struct PatchRunner<'a> {
    vcs: &'a dyn VcsExecutor,
    tracker: &'a dyn IssueTracker,
    config: &'a WorkflowConfig,
    repo_root: PathBuf,
}

impl<'a> PatchRunner<'a> {
    pub fn new(
        vcs: &'a dyn VcsExecutor,
        tracker: &'a dyn IssueTracker,
        config: &'a WorkflowConfig,
        repo_root: impl Into<PathBuf>,
    ) -> Self {
        Self {
            vcs,
            tracker,
            config,
            repo_root: repo_root.into(),
        }
    }

    pub fn run(&self) -> Result<PatchOutcome> {
        let BranchContext {
            issue,
            feature,
            base,
            ledger,
        } = locate(self.vcs, &self.config.git, None)?;

        // Only work committed after the last dorgflow commit is worth posting.
        if ledger.last().map_or(true, CommitRecord::is_tagged) {
            return Err(WorkflowError::NothingToPatch {
                branch: feature.name,
            });
        }

        let expected_comment_id = self.tracker.comment_count(issue)? + 1;
        let project = self.config.patch.project_name(&self.repo_root);
        let filename = patch_filename(issue, expected_comment_id, &project, &feature.name);
        let tag = ProvenanceTag::posted(expected_comment_id, &filename)?;

        let diff = self.vcs.diff(&base.tip, &feature.tip)?;
        let path = self.write_patch(&filename, &diff)?;

        let message = tag.encode();
        let sha = self.vcs.commit(&message)?;
        tracing::info!(
            "wrote {} for comment #{}; recorded as {}",
            path.display(),
            expected_comment_id,
            sha
        );

        Ok(PatchOutcome {
            issue,
            filename,
            path,
            expected_comment_id,
            sha,
        })
    }

    fn write_patch(&self, filename: &str, diff: &str) -> Result<PathBuf> {
        let path = self.repo_root.join(Path::new(filename));
        fs::write(&path, diff)?;
        Ok(path)
    }
}
