//! # dorgflow
//!
//! Keeps a local feature branch in step with the patches posted on a
//! drupal.org issue. The branch's own commit history records which patches
//! have been applied:
//! - `dorgflow setup --issue N` creates the feature branch from the current
//!   release branch and applies the issue's patches
//! - `dorgflow update` applies patches posted since the last run
//! - `dorgflow patch` writes local work out as a patch file for upload

mod commands;

use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use df_workflow::WorkflowConfig;
use tracing_subscriber::EnvFilter;

use crate::commands::Context;

/// dorgflow: drupal.org patch workflow on git.
#[derive(Parser)]
#[command(name = "dorgflow", version, about)]
struct Cli {
    /// Repository root (defaults to current directory).
    #[arg(long, default_value = ".", global = true)]
    project_root: PathBuf,

    /// Config file (defaults to <project-root>/.dorgflow/config.toml).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print the result as JSON instead of text.
    #[arg(long, global = true)]
    json: bool,

    /// Debug logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply patches posted to the issue since the last run.
    Update {
        /// Issue number (defaults to the number at the start of the branch name).
        #[arg(long)]
        issue: Option<u64>,
        /// Show what would be applied without changing anything.
        #[arg(long)]
        dry_run: bool,
    },
    /// Create the feature branch for an issue and apply its patches.
    Setup {
        /// Issue number.
        #[arg(long)]
        issue: u64,
    },
    /// Write the feature branch's changes to a patch file for upload.
    Patch,
}

fn init_logging(verbose: bool) -> anyhow::Result<()> {
    let level = if verbose { "debug" } else { "info" };
    let mut filter = EnvFilter::from_default_env();
    for target in ["dorgflow", "df_ledger", "df_git", "df_tracker", "df_workflow"] {
        filter = filter.add_directive(format!("{}={}", target, level).parse()?);
    }

    // Logs go to stderr; stdout carries the run summary.
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose)?;

    let project_root = cli.project_root.canonicalize().unwrap_or(cli.project_root);
    let config = match &cli.config {
        Some(path) => WorkflowConfig::load(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => WorkflowConfig::for_repo(&project_root).context("failed to load config")?,
    };
    tracing::debug!("project root {}", project_root.display());
    let ctx = Context::new(project_root, config, cli.json);

    match &cli.command {
        Commands::Update { issue, dry_run } => commands::update::execute(&ctx, *issue, *dry_run),
        Commands::Setup { issue } => commands::setup::execute(&ctx, *issue),
        Commands::Patch => commands::patch::execute(&ctx),
    }
}
