// error.rs - Error types for git access and branch preconditions.

use thiserror::Error;

/// Errors raised while inspecting or mutating the repository.
#[derive(Debug, Error)]
pub enum GitError {
    /// Uncommitted changes to tracked files would be clobbered by patching.
    #[error("working tree has uncommitted changes; commit or stash them first")]
    DirtyWorkingTree,

    /// No local branch is named after the issue.
    #[error("no feature branch found for issue {issue}")]
    NoFeatureBranch { issue: u64 },

    /// The feature branch exists but something else is checked out.
    #[error("feature branch '{expected}' is not checked out (current branch is '{current}')")]
    NotOnFeatureBranch { expected: String, current: String },

    /// No long-lived branch is an ancestor of the feature branch.
    #[error("could not find a base branch for feature branch '{feature}'")]
    NoBaseBranch { feature: String },

    /// A git subprocess exited non-zero.
    #[error("git {command} failed: {stderr}")]
    CommandFailed { command: String, stderr: String },

    /// A git subprocess succeeded but printed something we cannot parse.
    #[error("unexpected output from git {command}: {detail}")]
    UnexpectedOutput { command: String, detail: String },

    /// A configured base branch pattern is not a valid regex.
    #[error("invalid base branch pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        source: regex::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl GitError {
    /// Whether this error is an unmet precondition rather than a failure
    /// talking to git. Preconditions are always raised before any mutation.
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            Self::DirtyWorkingTree
                | Self::NoFeatureBranch { .. }
                | Self::NotOnFeatureBranch { .. }
                | Self::NoBaseBranch { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, GitError>;
