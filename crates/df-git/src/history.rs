// history.rs - Read the feature branch's own commits as a patch ledger.

use df_ledger::{CommitRecord, PatchLedger};

use crate::branches::{BaseBranch, FeatureBranch};
use crate::error::{GitError, Result};
use crate::executor::VcsExecutor;

/// Reads the commits unique to a feature branch and decodes their tags.
///
/// No filtering by author or date happens here: untagged commits are kept so
/// the ledger reflects the branch exactly.
pub struct HistoryReader<'a> {
    vcs: &'a dyn VcsExecutor,
}

impl<'a> HistoryReader<'a> {
    pub fn new(vcs: &'a dyn VcsExecutor) -> Self {
        Self { vcs }
    }

    pub fn is_working_tree_clean(&self) -> Result<bool> {
        self.vcs.is_clean()
    }

    /// Fail with [`GitError::DirtyWorkingTree`] if tracked files have
    /// uncommitted changes. Runs before anything else touches the repo.
    pub fn ensure_clean(&self) -> Result<()> {
        if self.is_working_tree_clean()? {
            Ok(())
        } else {
            Err(GitError::DirtyWorkingTree)
        }
    }

    /// Commits reachable from the feature tip but not from the base, oldest
    /// first, each decoded into a provenance tag where possible.
    pub fn commits_unique_to_feature_branch(
        &self,
        feature: &FeatureBranch,
        base: &BaseBranch,
    ) -> Result<PatchLedger> {
        let entries = self.vcs.log_unique_commits(&feature.tip, &base.tip)?;
        let records: Vec<CommitRecord> = entries
            .into_iter()
            .map(|entry| CommitRecord::new(entry.sha, entry.message))
            .collect();

        let tagged = records.iter().filter(|r| r.is_tagged()).count();
        tracing::debug!(
            feature = %feature.name,
            base = %base.name,
            commits = records.len(),
            tagged,
            "read feature branch history"
        );

        Ok(PatchLedger::from_records(records))
    }
}
