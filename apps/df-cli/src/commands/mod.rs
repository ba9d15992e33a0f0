// Command implementations. Each module exposes `execute`, which builds the
// runner for its command, prints the outcome and maps failures to errors.

pub mod patch;
pub mod setup;
pub mod update;

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use df_git::{GitExecutor, VcsExecutor};
use df_tracker::{DrupalOrgClient, IssueTracker};
use df_workflow::{UpdateSummary, WorkflowConfig};

/// Everything a command needs from the command line.
pub struct Context {
    pub project_root: PathBuf,
    pub config: WorkflowConfig,
    pub json: bool,
}

impl Context {
    pub fn new(project_root: PathBuf, config: WorkflowConfig, json: bool) -> Self {
        Self {
            project_root,
            config,
            json,
        }
    }

    pub fn git(&self) -> GitExecutor {
        let git = GitExecutor::new(&self.project_root);
        tracing::debug!("{} in {}", git.name(), git.work_dir().display());
        git
    }

    pub fn tracker(&self) -> anyhow::Result<DrupalOrgClient> {
        let tracker = DrupalOrgClient::new(self.config.tracker.clone())
            .context("failed to set up the drupal.org client")?;
        tracing::debug!(
            "{} API at {}",
            tracker.name(),
            self.config.tracker.api_base_url
        );
        Ok(tracker)
    }

    pub fn root(&self) -> &Path {
        &self.project_root
    }
}

/// Print a value as pretty JSON on stdout.
pub fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Human-readable run report on stdout.
pub fn print_summary(summary: &UpdateSummary) {
    println!(
        "Issue {}: branch '{}' on '{}'",
        summary.issue, summary.feature_branch, summary.base_branch
    );

    if summary.dry_run {
        for patch in &summary.pending {
            println!("  would apply  #{:<4} {}", patch.comment_number, patch.filename);
        }
    }
    for patch in &summary.applied {
        let short = &patch.sha[..patch.sha.len().min(10)];
        println!(
            "  applied      #{:<4} {} ({})",
            patch.comment_number, patch.filename, short
        );
    }
    for patch in &summary.failed {
        println!(
            "  FAILED       #{:<4} {}: {}",
            patch.comment_number, patch.filename, patch.reason
        );
    }

    if summary.skipped > 0 {
        println!(
            "  {} earlier patch(es) at or before file {} already handled",
            summary.skipped, summary.high_water_index
        );
    }
    if summary.is_up_to_date() {
        println!("Up to date.");
    }
}

/// Turn apply failures into a non-zero exit.
pub fn check_success(summary: &UpdateSummary) -> anyhow::Result<()> {
    if summary.is_success() {
        return Ok(());
    }
    anyhow::bail!(
        "{} patch(es) did not apply; the working tree is left for manual resolution",
        summary.failed.len()
    )
}
