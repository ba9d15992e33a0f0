//! Git integration for dorgflow.
//!
//! All repository access goes through the [`VcsExecutor`] trait so the
//! workflow can run against the real `git` binary ([`GitExecutor`]) or an
//! in-memory repository in tests (`fakes::FakeVcs`, behind the `fakes`
//! feature). On top of it sit the two read-side components:
//! [`BranchResolver`] finds the feature branch and the long-lived branch it
//! grew from, and [`HistoryReader`] turns the commits between them into a
//! [`df_ledger::PatchLedger`].

pub mod branches;
pub mod config;
pub mod error;
pub mod executor;
#[cfg(any(test, feature = "fakes"))]
pub mod fakes;
pub mod git;
pub mod history;

pub use branches::{issue_number_from_branch, BaseBranch, BranchResolver, FeatureBranch};
pub use config::GitConfig;
pub use error::{GitError, Result};
pub use executor::{ApplyOutcome, BranchList, LogEntry, VcsExecutor};
pub use git::GitExecutor;
pub use history::HistoryReader;
