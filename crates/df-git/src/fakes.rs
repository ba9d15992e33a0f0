//! In-memory VcsExecutor (testing only)
//!
//! `FakeVcs` models one checkout: a branch table, the commits unique to the
//! checked-out branch, and which patch files refuse to apply. Every trait
//! call is recorded so tests can assert what was (and was not) touched.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::error::{GitError, Result};
use crate::executor::{ApplyOutcome, BranchList, LogEntry, VcsExecutor};

#[derive(Debug)]
struct FakeState {
    clean: bool,
    current: String,
    branches: BranchList,
    unreachable: BTreeSet<String>,
    distances: HashMap<(String, String), u64>,
    log: Vec<LogEntry>,
    diff: String,
    failing: BTreeSet<String>,
    calls: Vec<String>,
    applied: Vec<PathBuf>,
    commits: Vec<String>,
    next_sha: u64,
}

/// In-memory repository implementing [`VcsExecutor`].
#[derive(Debug)]
pub struct FakeVcs {
    state: Mutex<FakeState>,
}

impl Default for FakeVcs {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeVcs {
    /// A clean repository with no branches, on a detached `HEAD`.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(FakeState {
                clean: true,
                current: "HEAD".to_string(),
                branches: BTreeMap::new(),
                unreachable: BTreeSet::new(),
                distances: HashMap::new(),
                log: Vec::new(),
                diff: String::new(),
                failing: BTreeSet::new(),
                calls: Vec::new(),
                applied: Vec::new(),
                commits: Vec::new(),
                next_sha: 1,
            }),
        }
    }

    pub fn with_clean(self, clean: bool) -> Self {
        self.state.lock().unwrap().clean = clean;
        self
    }

    pub fn with_current_branch(self, name: &str) -> Self {
        self.state.lock().unwrap().current = name.to_string();
        self
    }

    /// Add a branch that is reachable from any tip.
    pub fn with_branch(self, name: &str, tip: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .branches
            .insert(name.to_string(), tip.to_string());
        self
    }

    /// Add a branch that is never reachable from the feature tip.
    pub fn with_unreachable_branch(self, name: &str, tip: &str) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            state.branches.insert(name.to_string(), tip.to_string());
            state.unreachable.insert(name.to_string());
        }
        self
    }

    /// Set `commit_distance(ancestor, tip)`; unset pairs report 0.
    pub fn with_distance(self, ancestor: &str, tip: &str, distance: u64) -> Self {
        self.state
            .lock()
            .unwrap()
            .distances
            .insert((ancestor.to_string(), tip.to_string()), distance);
        self
    }

    /// Commits unique to the current branch, oldest first.
    pub fn with_log(self, log: Vec<LogEntry>) -> Self {
        self.state.lock().unwrap().log = log;
        self
    }

    pub fn with_diff(self, diff: &str) -> Self {
        self.state.lock().unwrap().diff = diff.to_string();
        self
    }

    /// Make patch files with this file name fail to apply.
    pub fn fail_patch(self, file_name: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .failing
            .insert(file_name.to_string());
        self
    }

    /// Every trait method called, in order, by name.
    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    /// Whether any mutating method was called.
    pub fn was_mutated(&self) -> bool {
        self.calls()
            .iter()
            .any(|c| matches!(c.as_str(), "apply_patch_file" | "commit" | "create_branch"))
    }

    /// File names of patches that applied, in order.
    pub fn applied_files(&self) -> Vec<String> {
        self.state
            .lock()
            .unwrap()
            .applied
            .iter()
            .filter_map(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
            .collect()
    }

    /// Messages of commits created through the executor.
    pub fn commit_messages(&self) -> Vec<String> {
        self.state.lock().unwrap().commits.clone()
    }

    /// Current commits unique to the branch, including ones created here.
    pub fn log(&self) -> Vec<LogEntry> {
        self.state.lock().unwrap().log.clone()
    }

    fn record(&self, call: &str) -> std::sync::MutexGuard<'_, FakeState> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(call.to_string());
        state
    }
}

impl VcsExecutor for FakeVcs {
    fn is_clean(&self) -> Result<bool> {
        Ok(self.record("is_clean").clean)
    }

    fn current_branch(&self) -> Result<String> {
        Ok(self.record("current_branch").current.clone())
    }

    fn branch_list(&self) -> Result<BranchList> {
        Ok(self.record("branch_list").branches.clone())
    }

    fn branches_reachable_from(&self, _tip: &str) -> Result<BranchList> {
        let state = self.record("branches_reachable_from");
        Ok(state
            .branches
            .iter()
            .filter(|(name, _)| !state.unreachable.contains(*name))
            .map(|(name, tip)| (name.clone(), tip.clone()))
            .collect())
    }

    fn commit_distance(&self, ancestor: &str, tip: &str) -> Result<u64> {
        let state = self.record("commit_distance");
        Ok(state
            .distances
            .get(&(ancestor.to_string(), tip.to_string()))
            .copied()
            .unwrap_or(0))
    }

    fn log_unique_commits(&self, _tip: &str, _base: &str) -> Result<Vec<LogEntry>> {
        Ok(self.record("log_unique_commits").log.clone())
    }

    fn diff(&self, _base: &str, _tip: &str) -> Result<String> {
        Ok(self.record("diff").diff.clone())
    }

    fn apply_patch_file(&self, path: &Path) -> Result<ApplyOutcome> {
        let mut state = self.record("apply_patch_file");
        if !path.exists() {
            return Err(GitError::CommandFailed {
                command: format!("apply --index {}", path.display()),
                stderr: "No such file".to_string(),
            });
        }
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        if state.failing.contains(&file_name) {
            return Ok(ApplyOutcome::Failed {
                reason: format!("error: patch failed: {}", file_name),
            });
        }
        state.applied.push(path.to_path_buf());
        Ok(ApplyOutcome::Applied)
    }

    fn commit(&self, message: &str) -> Result<String> {
        let mut state = self.record("commit");
        let sha = format!("sha-new-{}", state.next_sha);
        state.next_sha += 1;
        state.commits.push(message.to_string());
        state.log.push(LogEntry::new(sha.clone(), message));
        let current = state.current.clone();
        if let Some(tip) = state.branches.get_mut(&current) {
            *tip = sha.clone();
        }
        Ok(sha)
    }

    fn create_branch(&self, name: &str, from: &str) -> Result<()> {
        let mut state = self.record("create_branch");
        if state.branches.contains_key(name) {
            return Err(GitError::CommandFailed {
                command: format!("checkout -b {} {}", name, from),
                stderr: format!("fatal: a branch named '{}' already exists", name),
            });
        }
        state.branches.insert(name.to_string(), from.to_string());
        state.current = name.to_string();
        state.log.clear();
        Ok(())
    }

    fn name(&self) -> &str {
        "fake"
    }
}
