// context.rs - Precondition checks shared by `update` and `patch`.
//
// Order matters: the clean-tree check runs before anything else, and every
// check runs before the tracker is contacted or the repository is touched.

use df_git::{
    issue_number_from_branch, BaseBranch, BranchResolver, FeatureBranch, GitConfig,
    HistoryReader, VcsExecutor,
};
use df_ledger::PatchLedger;

use crate::error::{Result, WorkflowError};

/// The checked-out feature branch and its history, ready for reconciling.
#[derive(Debug, Clone)]
pub struct BranchContext {
    pub issue: u64,
    pub feature: FeatureBranch,
    pub base: BaseBranch,
    pub ledger: PatchLedger,
}

/// Run the preconditions and read the feature branch history.
///
/// `issue` overrides the issue number; without it the number is read from
/// the current branch name.
pub fn locate(
    vcs: &dyn VcsExecutor,
    git: &GitConfig,
    issue: Option<u64>,
) -> Result<BranchContext> {
    let history = HistoryReader::new(vcs);
    history.ensure_clean()?;

    let issue = match issue {
        Some(issue) => issue,
        None => {
            let branch = vcs.current_branch()?;
            issue_number_from_branch(&branch).ok_or(WorkflowError::NoIssueNumber { branch })?
        }
    };

    let resolver = BranchResolver::new(vcs, git)?;
    let feature = resolver.find_feature_branch(issue)?;
    resolver.ensure_checked_out(&feature)?;
    let base = resolver.resolve_base(&feature)?;
    let ledger = history.commits_unique_to_feature_branch(&feature, &base)?;

    tracing::info!(
        vcs = vcs.name(),
        "issue {}: feature branch '{}' on base '{}' ({} commit(s))",
        issue,
        feature.name,
        base.name,
        ledger.len()
    );

    Ok(BranchContext {
        issue,
        feature,
        base,
        ledger,
    })
}
