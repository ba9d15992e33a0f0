//! Core VcsExecutor trait and result types

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Branch name → tip commit sha, sorted by name.
pub type BranchList = BTreeMap<String, String>;

/// One commit as printed by `git log`, before its message is decoded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub sha: String,
    pub message: String,
}

impl LogEntry {
    pub fn new(sha: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            sha: sha.into(),
            message: message.into(),
        }
    }
}

/// Result of trying to apply one patch file.
///
/// A patch that does not apply is an expected outcome, not an error: the
/// caller records it and moves on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ApplyOutcome {
    Applied,
    Failed { reason: String },
}

impl ApplyOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied)
    }
}

/// Everything dorgflow needs from version control.
///
/// Calls are synchronous and operate on one checkout. Any failure other than
/// a patch not applying surfaces as a [`crate::GitError`].
pub trait VcsExecutor: Send + Sync {
    /// Whether tracked files are unmodified (untracked files are ignored).
    fn is_clean(&self) -> Result<bool>;

    /// Name of the checked-out branch (`HEAD` when detached).
    fn current_branch(&self) -> Result<String>;

    /// All local branches with their tips.
    fn branch_list(&self) -> Result<BranchList>;

    /// Local branches whose tips are ancestors of (or equal to) `tip`.
    fn branches_reachable_from(&self, tip: &str) -> Result<BranchList>;

    /// Number of commits reachable from `tip` but not from `ancestor`.
    fn commit_distance(&self, ancestor: &str, tip: &str) -> Result<u64>;

    /// Commits reachable from `tip` but not from `base`, oldest first.
    fn log_unique_commits(&self, tip: &str, base: &str) -> Result<Vec<LogEntry>>;

    /// Unified diff from `base` to `tip`.
    fn diff(&self, base: &str, tip: &str) -> Result<String>;

    /// Apply a patch file to the working tree and index.
    fn apply_patch_file(&self, path: &Path) -> Result<ApplyOutcome>;

    /// Commit whatever is staged (possibly nothing) and return the new sha.
    fn commit(&self, message: &str) -> Result<String>;

    /// Create branch `name` at `from` and check it out.
    fn create_branch(&self, name: &str, from: &str) -> Result<()>;

    /// Executor display name (for logs).
    fn name(&self) -> &str;
}
