// setup.rs - Create the feature branch for an issue, then update it.

use df_git::{BranchResolver, GitError, HistoryReader, VcsExecutor};
use df_tracker::IssueTracker;
use serde::{Deserialize, Serialize};

use crate::config::WorkflowConfig;
use crate::error::{Result, WorkflowError};
use crate::summary::UpdateSummary;
use crate::update::{UpdateOptions, UpdateRunner};

/// Longest branch-name description derived from an issue title.
pub const MAX_SLUG_LEN: usize = 40;

/// Result of `setup`: the new branch and the update that followed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetupOutcome {
    pub branch: String,
    pub created_from: String,
    pub update: UpdateSummary,
}

/// Lowercase `text`, collapse every run of non-alphanumerics into one `-`,
/// trim dashes, and cut to at most `max_len` characters.
pub fn slugify(text: &str, max_len: usize) -> String {
    let mut slug = String::with_capacity(text.len());
    for c in text.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    slug.truncate(max_len);
    slug.trim_end_matches('-').to_string()
}

/// Feature branch name for an issue: `{issue}-{slug}`, or just the number
/// when the title has nothing usable.
pub fn feature_branch_name(issue: u64, title: &str) -> String {
    let slug = slugify(title, MAX_SLUG_LEN);
    if slug.is_empty() {
        issue.to_string()
    } else {
        format!("{}-{}", issue, slug)
    }
}

/// Runs `setup` against one repository and one tracker.
pub struct SetupRunner<'a> {
    vcs: &'a dyn VcsExecutor,
    tracker: &'a dyn IssueTracker,
    config: &'a WorkflowConfig,
}

impl<'a> SetupRunner<'a> {
    pub fn new(
        vcs: &'a dyn VcsExecutor,
        tracker: &'a dyn IssueTracker,
        config: &'a WorkflowConfig,
    ) -> Self {
        Self {
            vcs,
            tracker,
            config,
        }
    }

    pub fn run(&self, issue: u64) -> Result<SetupOutcome> {
        HistoryReader::new(self.vcs).ensure_clean()?;

        let resolver = BranchResolver::new(self.vcs, &self.config.git)?;
        match resolver.find_feature_branch(issue) {
            Ok(existing) => {
                return Err(WorkflowError::FeatureBranchExists {
                    issue,
                    branch: existing.name,
                })
            }
            Err(GitError::NoFeatureBranch { .. }) => {}
            Err(other) => return Err(other.into()),
        }

        let current = self.vcs.current_branch()?;
        if !resolver.is_base_branch_name(&current) {
            return Err(WorkflowError::NotOnBaseBranch { current });
        }
        let tip = self
            .vcs
            .branch_list()?
            .remove(&current)
            .ok_or_else(|| GitError::UnexpectedOutput {
                command: "for-each-ref".to_string(),
                detail: format!("checked-out branch '{}' is not listed", current),
            })?;

        let title = self.tracker.issue_title(issue)?;
        let branch = feature_branch_name(issue, &title);
        self.vcs.create_branch(&branch, &tip)?;
        tracing::info!("created feature branch '{}' from '{}'", branch, current);

        let update = UpdateRunner::new(self.vcs, self.tracker, self.config).run(&UpdateOptions {
            issue: Some(issue),
            dry_run: false,
        })?;

        Ok(SetupOutcome {
            branch,
            created_from: current,
            update,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use df_git::fakes::FakeVcs;
    use df_tracker::fakes::FakeTracker;

    #[test]
    fn slug_rules() {
        assert_eq!(slugify("Terribly awful bug", 40), "terribly-awful-bug");
        assert_eq!(
            slugify("  Fix: Views' \"exposed\" filters -- broken!! ", 40),
            "fix-views-exposed-filters-broken"
        );
        assert_eq!(slugify("Ünïcode only ☃", 40), "n-code-only");
        assert_eq!(slugify("abc def", 4), "abc");
        assert_eq!(slugify("!!!", 40), "");
    }

    #[test]
    fn branch_name_from_title() {
        assert_eq!(
            feature_branch_name(123456, "Terribly awful bug"),
            "123456-terribly-awful-bug"
        );
        assert_eq!(feature_branch_name(123456, "???"), "123456");

        let long = feature_branch_name(1, &"word ".repeat(30));
        assert!(long.len() <= 2 + MAX_SLUG_LEN);
        assert!(!long.ends_with('-'));
    }

    #[test]
    fn creates_branch_and_applies_patches() {
        let vcs = FakeVcs::new()
            .with_branch("8.3.x", "sha-master")
            .with_current_branch("8.3.x");
        let tracker = FakeTracker::new("Terribly awful bug")
            .with_file(1, 201, 401, "fix-1.patch", true)
            .with_file(3, 203, 403, "fix-3.patch", true);
        let config = WorkflowConfig::default();

        let outcome = SetupRunner::new(&vcs, &tracker, &config).run(123456).unwrap();

        assert_eq!(outcome.branch, "123456-terribly-awful-bug");
        assert_eq!(outcome.created_from, "8.3.x");
        assert_eq!(outcome.update.base_branch, "8.3.x");
        assert_eq!(outcome.update.applied.len(), 2);
        assert!(vcs.calls().contains(&"create_branch".to_string()));
    }

    #[test]
    fn existing_branch_is_refused() {
        let vcs = FakeVcs::new()
            .with_branch("8.3.x", "sha-master")
            .with_branch("123456-terrible-bug", "sha-feature")
            .with_current_branch("8.3.x");
        let tracker = FakeTracker::new("t");
        let config = WorkflowConfig::default();

        let err = SetupRunner::new(&vcs, &tracker, &config)
            .run(123456)
            .unwrap_err();
        assert!(matches!(err, WorkflowError::FeatureBranchExists { .. }));
        assert!(tracker.calls().is_empty());
        assert!(!vcs.was_mutated());
    }

    #[test]
    fn must_start_on_a_base_branch() {
        let vcs = FakeVcs::new()
            .with_branch("8.3.x", "sha-master")
            .with_branch("scratch", "sha")
            .with_current_branch("scratch");
        let tracker = FakeTracker::new("t");
        let config = WorkflowConfig::default();

        let err = SetupRunner::new(&vcs, &tracker, &config)
            .run(123456)
            .unwrap_err();
        assert!(matches!(err, WorkflowError::NotOnBaseBranch { .. }));
        assert!(err.is_precondition());
        assert!(!vcs.was_mutated());
    }
}
