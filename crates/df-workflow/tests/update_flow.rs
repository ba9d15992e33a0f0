//! End-to-end workflow tests against a real git repository.
//!
//! Each test builds a throwaway repository on a `8.3.x` base branch, serves
//! issue files from a `FakeTracker`, and drives the runners through the real
//! `GitExecutor`.

use std::path::Path;
use std::process::Command;

use df_git::{GitError, GitExecutor, VcsExecutor};
use df_tracker::fakes::FakeTracker;
use df_workflow::{
    PatchRunner, SetupRunner, UpdateOptions, UpdateRunner, UpdateSummary, WorkflowConfig,
    WorkflowError,
};
use tempfile::tempdir;

fn git(dir: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "git {:?}: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

fn init_repo(dir: &Path) {
    git(dir, &["init", "--quiet"]);
    git(dir, &["symbolic-ref", "HEAD", "refs/heads/8.3.x"]);
    git(dir, &["config", "user.name", "Test User"]);
    git(dir, &["config", "user.email", "test@example.com"]);
    git(dir, &["config", "commit.gpgsign", "false"]);

    std::fs::write(dir.join("README.md"), "# Test\n").unwrap();
    git(dir, &["add", "."]);
    git(dir, &["commit", "--quiet", "-m", "Initial commit"]);
}

fn init_feature_repo(dir: &Path) {
    init_repo(dir);
    git(dir, &["checkout", "--quiet", "-b", "123456-terrible-bug"]);
}

/// A patch adding `name` with one line of content.
fn new_file_patch(name: &str, content: &str) -> String {
    format!(
        "diff --git a/{name} b/{name}\nnew file mode 100644\n--- /dev/null\n+++ b/{name}\n@@ -0,0 +1 @@\n+{content}\n"
    )
}

/// A patch against README lines that do not exist.
fn broken_patch() -> String {
    "diff --git a/README.md b/README.md\n--- a/README.md\n+++ b/README.md\n@@ -1 +1 @@\n-# Something else entirely\n+# Replaced\n"
        .to_string()
}

fn update(dir: &Path, tracker: &FakeTracker) -> Result<UpdateSummary, WorkflowError> {
    let vcs = GitExecutor::new(dir);
    let config = WorkflowConfig::default();
    UpdateRunner::new(&vcs, tracker, &config).run(&UpdateOptions::default())
}

fn feature_log(dir: &Path) -> Vec<String> {
    let out = git(dir, &["log", "--reverse", "--format=%s", "8.3.x..HEAD"]);
    out.lines()
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect()
}

#[test]
fn applies_new_patches_and_records_them() {
    let dir = tempdir().unwrap();
    init_feature_repo(dir.path());

    let tracker = FakeTracker::new("Terribly awful bug")
        .with_file(1, 200, 400, "fix-1.patch", true)
        .with_body("fix-1.patch", &new_file_patch("one.txt", "one"))
        .with_file(5, 205, 405, "fix-5.patch", false)
        .with_body("fix-5.patch", &new_file_patch("five.txt", "five"))
        .with_file(6, 206, 406, "fix-5.not.patch.txt", true)
        .with_file(10, 210, 410, "fix-10.patch", true)
        .with_body("fix-10.patch", &new_file_patch("ten.txt", "ten"));

    let summary = update(dir.path(), &tracker).unwrap();

    assert!(summary.is_success());
    assert_eq!(summary.base_branch, "8.3.x");
    let applied: Vec<u64> = summary.applied.iter().map(|a| a.order_index).collect();
    assert_eq!(applied, vec![1, 10]);

    assert!(dir.path().join("one.txt").exists());
    assert!(!dir.path().join("five.txt").exists());
    assert!(dir.path().join("ten.txt").exists());

    assert_eq!(
        feature_log(dir.path()),
        vec![
            "Patch from Drupal.org. Comment: 1; URL: https://www.drupal.org/node/123456#comment-400; file: fix-1.patch; fid: 200. Automatic commit by dorgflow.",
            "Patch from Drupal.org. Comment: 10; URL: https://www.drupal.org/node/123456#comment-410; file: fix-10.patch; fid: 210. Automatic commit by dorgflow.",
        ]
    );
    assert!(GitExecutor::new(dir.path()).is_clean().unwrap());

    // Nothing new on the issue: the second run does nothing.
    let again = update(dir.path(), &tracker).unwrap();
    assert!(again.is_up_to_date());
    assert_eq!(again.high_water_index, 10);
    assert_eq!(feature_log(dir.path()).len(), 2);
}

#[test]
fn failed_patch_is_superseded_by_a_later_success() {
    let dir = tempdir().unwrap();
    init_feature_repo(dir.path());

    let tracker = FakeTracker::new("t")
        .with_file(1, 201, 401, "broken-1.patch", true)
        .with_body("broken-1.patch", &broken_patch())
        .with_file(10, 210, 410, "fix-10.patch", true)
        .with_body("fix-10.patch", &new_file_patch("ten.txt", "ten"));

    let summary = update(dir.path(), &tracker).unwrap();

    assert!(!summary.is_success());
    assert_eq!(summary.failed.len(), 1);
    assert_eq!(summary.failed[0].filename, "broken-1.patch");
    assert_eq!(summary.applied.len(), 1);
    assert_eq!(
        std::fs::read_to_string(dir.path().join("README.md")).unwrap(),
        "# Test\n"
    );

    let again = update(dir.path(), &tracker).unwrap();
    assert!(again.is_success());
    assert!(again.is_up_to_date());
    assert_eq!(again.skipped, 2);
}

#[test]
fn dirty_tree_stops_before_the_tracker() {
    let dir = tempdir().unwrap();
    init_feature_repo(dir.path());
    std::fs::write(dir.path().join("README.md"), "# Local edit\n").unwrap();

    let tracker = FakeTracker::new("t").with_file(1, 201, 401, "fix-1.patch", true);
    let err = update(dir.path(), &tracker).unwrap_err();

    assert!(matches!(err, WorkflowError::Git(GitError::DirtyWorkingTree)));
    assert!(tracker.calls().is_empty());
    assert_eq!(
        std::fs::read_to_string(dir.path().join("README.md")).unwrap(),
        "# Local edit\n"
    );
}

#[test]
fn feature_branch_must_be_checked_out() {
    let dir = tempdir().unwrap();
    init_feature_repo(dir.path());
    git(dir.path(), &["checkout", "--quiet", "8.3.x"]);

    let vcs = GitExecutor::new(dir.path());
    let tracker = FakeTracker::new("t");
    let config = WorkflowConfig::default();
    let err = UpdateRunner::new(&vcs, &tracker, &config)
        .run(&UpdateOptions {
            issue: Some(123456),
            dry_run: false,
        })
        .unwrap_err();

    assert!(matches!(
        err,
        WorkflowError::Git(GitError::NotOnFeatureBranch { .. })
    ));
    assert!(tracker.calls().is_empty());
}

#[test]
fn setup_creates_branch_from_base() {
    let dir = tempdir().unwrap();
    init_repo(dir.path());

    let tracker = FakeTracker::new("Terribly awful bug")
        .with_file(2, 202, 402, "fix-2.patch", true)
        .with_body("fix-2.patch", &new_file_patch("two.txt", "two"));
    let vcs = GitExecutor::new(dir.path());
    let config = WorkflowConfig::default();

    let outcome = SetupRunner::new(&vcs, &tracker, &config).run(123456).unwrap();

    assert_eq!(outcome.branch, "123456-terribly-awful-bug");
    assert_eq!(
        git(dir.path(), &["rev-parse", "--abbrev-ref", "HEAD"]),
        "123456-terribly-awful-bug"
    );
    assert_eq!(outcome.update.applied.len(), 1);
    assert!(dir.path().join("two.txt").exists());

    let err = SetupRunner::new(&vcs, &tracker, &config)
        .run(123456)
        .unwrap_err();
    assert!(matches!(err, WorkflowError::FeatureBranchExists { .. }));
}

#[test]
fn posted_patch_is_recognised_when_it_appears_on_the_issue() {
    let dir = tempdir().unwrap();
    init_feature_repo(dir.path());

    let tracker = FakeTracker::new("t")
        .with_file(1, 201, 401, "fix-1.patch", true)
        .with_body("fix-1.patch", &new_file_patch("one.txt", "one"));
    update(dir.path(), &tracker).unwrap();

    // Local work on top of the applied patch.
    std::fs::write(dir.path().join("one.txt"), "one\nmore\n").unwrap();
    git(dir.path(), &["commit", "--quiet", "-am", "Fixing the bug."]);

    let vcs = GitExecutor::new(dir.path());
    let mut config = WorkflowConfig::default();
    config.patch.project = Some("project".to_string());
    let outcome = PatchRunner::new(&vcs, &tracker, &config, dir.path())
        .run()
        .unwrap();

    assert_eq!(outcome.expected_comment_id, 2);
    assert_eq!(outcome.filename, "123456-2.project.terrible-bug.patch");
    let diff = std::fs::read_to_string(&outcome.path).unwrap();
    assert!(diff.contains("+more"));
    assert_eq!(
        feature_log(dir.path()).last().map(String::as_str),
        Some("Patch for Drupal.org. Comment (expected): 2; file: 123456-2.project.terrible-bug.patch. Automatic commit by dorgflow.")
    );

    // The upload shows up as comment #2 with real ids; a newer patch follows.
    let tracker = FakeTracker::new("t")
        .with_file(1, 201, 401, "fix-1.patch", true)
        .with_file(2, 299, 499, "123456-2.project.terrible-bug.patch", true)
        .with_file(3, 203, 403, "fix-3.patch", true)
        .with_body("fix-3.patch", &new_file_patch("three.txt", "three"));

    let summary = update(dir.path(), &tracker).unwrap();
    assert_eq!(summary.high_water_index, 2);
    let applied: Vec<u64> = summary.applied.iter().map(|a| a.order_index).collect();
    assert_eq!(applied, vec![3]);
}
