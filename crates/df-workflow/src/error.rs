// error.rs - Error types for the dorgflow workflows.

use df_git::GitError;
use df_ledger::LedgerError;
use df_tracker::TrackerError;
use thiserror::Error;

/// Errors that abort a workflow run.
///
/// Patches that fail to apply are not errors; they are reported in the
/// run summary.
#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error(transparent)]
    Git(#[from] GitError),

    #[error(transparent)]
    Tracker(#[from] TrackerError),

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// No `--issue` given and the current branch name does not start with one.
    #[error("no issue number given and none found in branch name '{branch}'")]
    NoIssueNumber { branch: String },

    /// `setup` was asked for an issue that already has a branch.
    #[error("feature branch '{branch}' already exists for issue {issue}")]
    FeatureBranchExists { issue: u64, branch: String },

    /// `setup` must start from a release branch.
    #[error("current branch '{current}' is not a base branch; check out the release branch to work against first")]
    NotOnBaseBranch { current: String },

    /// `patch` found no local work after the last dorgflow commit.
    #[error("nothing to patch on '{branch}': no commits since the last dorgflow commit")]
    NothingToPatch { branch: String },

    #[error("invalid config file {path}: {message}")]
    Config { path: String, message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl WorkflowError {
    /// Whether the run stopped on an unmet precondition, before touching
    /// the repository.
    pub fn is_precondition(&self) -> bool {
        match self {
            Self::Git(e) => e.is_precondition(),
            Self::NoIssueNumber { .. }
            | Self::FeatureBranchExists { .. }
            | Self::NotOnBaseBranch { .. }
            | Self::NothingToPatch { .. } => true,
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, WorkflowError>;
