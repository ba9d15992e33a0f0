//! # df-workflow
//!
//! The three dorgflow commands as library code, over the [`df_git`] and
//! [`df_tracker`] seams:
//!
//! - [`UpdateRunner`] checks preconditions, reconciles the feature branch
//!   history with the issue's files and applies whatever is new
//! - [`SetupRunner`] creates the feature branch for an issue, then updates it
//! - [`PatchRunner`] writes local work out as a patch file and records it
//!   with a provisional tag
//!
//! Every precondition is checked before the tracker is contacted or the
//! repository is modified.

pub mod config;
pub mod context;
pub mod error;
pub mod patch;
pub mod setup;
pub mod summary;
pub mod update;

pub use config::{PatchConfig, WorkflowConfig, CONFIG_PATH};
pub use context::{locate, BranchContext};
pub use error::{Result, WorkflowError};
pub use patch::{patch_filename, PatchOutcome, PatchRunner};
pub use setup::{feature_branch_name, slugify, SetupOutcome, SetupRunner};
pub use summary::{AppliedPatch, FailedPatch, PlannedPatch, UpdateSummary};
pub use update::{UpdateOptions, UpdateRunner};
