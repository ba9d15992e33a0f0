//! Git executor backed by the `git` command-line binary

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use crate::error::{GitError, Result};
use crate::executor::{ApplyOutcome, BranchList, LogEntry, VcsExecutor};

const FIELD_SEP: char = '\x1f';
const RECORD_SEP: char = '\x1e';

/// Runs git subcommands in one working directory.
pub struct GitExecutor {
    /// Working directory for git operations
    work_dir: PathBuf,
}

impl GitExecutor {
    /// Create a new GitExecutor for the given working directory
    pub fn new(work_dir: impl Into<PathBuf>) -> Self {
        Self {
            work_dir: work_dir.into(),
        }
    }

    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    fn run(&self, args: &[&str]) -> Result<Output> {
        tracing::debug!("git {}", args.join(" "));
        let output = Command::new("git")
            .args(args)
            .current_dir(&self.work_dir)
            .output()?;
        Ok(output)
    }

    /// Run a git command and return its stdout untouched
    fn git_raw(&self, args: &[&str]) -> Result<String> {
        let output = self.run(args)?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(GitError::CommandFailed {
                command: args.join(" "),
                stderr: stderr.trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    /// Run a git command and return its trimmed stdout
    fn git_cmd(&self, args: &[&str]) -> Result<String> {
        self.git_raw(args).map(|out| out.trim().to_string())
    }

    fn for_each_branch(&self, extra: Option<&str>) -> Result<BranchList> {
        let mut args = vec!["for-each-ref", "--format=%(refname:short)%09%(objectname)"];
        if let Some(extra) = extra {
            args.push(extra);
        }
        // Local branches only; remote-tracking refs are not read.
        args.push("refs/heads");
        let out = self.git_cmd(&args)?;
        parse_branch_list(&out)
    }
}

impl VcsExecutor for GitExecutor {
    fn is_clean(&self) -> Result<bool> {
        let status = self.git_cmd(&["status", "--porcelain", "--untracked-files=no"])?;
        Ok(status.is_empty())
    }

    fn current_branch(&self) -> Result<String> {
        self.git_cmd(&["rev-parse", "--abbrev-ref", "HEAD"])
    }

    fn branch_list(&self) -> Result<BranchList> {
        self.for_each_branch(None)
    }

    fn branches_reachable_from(&self, tip: &str) -> Result<BranchList> {
        let merged = format!("--merged={}", tip);
        self.for_each_branch(Some(&merged))
    }

    fn commit_distance(&self, ancestor: &str, tip: &str) -> Result<u64> {
        let range = format!("{}..{}", ancestor, tip);
        let out = self.git_cmd(&["rev-list", "--count", &range])?;
        out.parse().map_err(|_| GitError::UnexpectedOutput {
            command: format!("rev-list --count {}", range),
            detail: out.clone(),
        })
    }

    fn log_unique_commits(&self, tip: &str, base: &str) -> Result<Vec<LogEntry>> {
        let range = format!("{}..{}", base, tip);
        let out = self.git_raw(&["log", "--reverse", "--format=%H%x1f%B%x1e", &range])?;
        parse_log(&out)
    }

    fn diff(&self, base: &str, tip: &str) -> Result<String> {
        self.git_raw(&["diff", "--binary", base, tip])
    }

    fn apply_patch_file(&self, path: &Path) -> Result<ApplyOutcome> {
        let path_arg = path.to_string_lossy();
        let output = self.run(&["apply", "--index", &path_arg])?;

        if output.status.success() {
            tracing::debug!("GitExecutor: applied {}", path.display());
            Ok(ApplyOutcome::Applied)
        } else {
            let reason = String::from_utf8_lossy(&output.stderr).trim().to_string();
            Ok(ApplyOutcome::Failed { reason })
        }
    }

    fn commit(&self, message: &str) -> Result<String> {
        self.git_cmd(&["commit", "--allow-empty", "--quiet", "-m", message])?;
        let sha = self.git_cmd(&["rev-parse", "HEAD"])?;
        tracing::info!("GitExecutor: committed {}", short_sha(&sha));
        Ok(sha)
    }

    fn create_branch(&self, name: &str, from: &str) -> Result<()> {
        tracing::info!("GitExecutor: creating branch {} from {}", name, from);
        self.git_cmd(&["checkout", "-b", name, from])?;
        Ok(())
    }

    fn name(&self) -> &str {
        "git"
    }
}

fn short_sha(sha: &str) -> &str {
    sha.get(..8).unwrap_or(sha)
}

fn parse_branch_list(out: &str) -> Result<BranchList> {
    out.lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| {
            line.split_once('\t')
                .map(|(name, sha)| (name.to_string(), sha.trim().to_string()))
                .ok_or_else(|| GitError::UnexpectedOutput {
                    command: "for-each-ref".to_string(),
                    detail: line.to_string(),
                })
        })
        .collect()
}

fn parse_log(out: &str) -> Result<Vec<LogEntry>> {
    out.split(RECORD_SEP)
        .map(|record| record.trim_start_matches('\n'))
        .filter(|record| !record.trim().is_empty())
        .map(|record| {
            record
                .split_once(FIELD_SEP)
                .map(|(sha, message)| LogEntry::new(sha.trim(), message.trim_end()))
                .ok_or_else(|| GitError::UnexpectedOutput {
                    command: "log".to_string(),
                    detail: record.to_string(),
                })
        })
        .collect()
}
