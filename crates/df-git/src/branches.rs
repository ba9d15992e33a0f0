// branches.rs - Locate the feature branch and the base branch it grew from.
//
// The feature branch is found by name: it is the issue number, optionally
// followed by `-` and a description (`123456-terrible-bug`). The base branch
// is the long-lived release branch (`8.3.x`, `8.x-2.x`, ...) closest behind
// the feature tip; commits between the two are the ledger.

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::config::GitConfig;
use crate::error::{GitError, Result};
use crate::executor::VcsExecutor;

/// The per-issue working branch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureBranch {
    pub name: String,
    pub tip: String,
}

/// The long-lived branch the feature branch diverged from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseBranch {
    pub name: String,
    pub tip: String,
}

/// Whether `name` is a feature branch for `issue`.
pub fn is_feature_branch_for(name: &str, issue: u64) -> bool {
    let issue = issue.to_string();
    match name.strip_prefix(issue.as_str()) {
        Some(rest) => rest.is_empty() || rest.starts_with('-'),
        None => false,
    }
}

/// Issue number encoded at the start of a branch name, if any.
///
/// `123456-terrible-bug` gives 123456; `8.3.x` gives nothing because the
/// digits are not followed by `-` or the end of the name.
pub fn issue_number_from_branch(name: &str) -> Option<u64> {
    let digits_end = name
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(name.len());
    if digits_end == 0 {
        return None;
    }
    let rest = &name[digits_end..];
    if !rest.is_empty() && !rest.starts_with('-') {
        return None;
    }
    name[..digits_end].parse().ok()
}

/// Answers branch questions against one repository.
pub struct BranchResolver<'a> {
    vcs: &'a dyn VcsExecutor,
    patterns: Vec<Regex>,
}

impl<'a> BranchResolver<'a> {
    pub fn new(vcs: &'a dyn VcsExecutor, config: &GitConfig) -> Result<Self> {
        let patterns = config
            .base_branch_patterns
            .iter()
            .map(|pattern| {
                Regex::new(pattern).map_err(|source| GitError::InvalidPattern {
                    pattern: pattern.clone(),
                    source,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { vcs, patterns })
    }

    /// Whether `name` looks like a long-lived release branch.
    pub fn is_base_branch_name(&self, name: &str) -> bool {
        self.patterns.iter().any(|p| p.is_match(name))
    }

    /// Find the local branch named after `issue`.
    pub fn find_feature_branch(&self, issue: u64) -> Result<FeatureBranch> {
        let branches = self.vcs.branch_list()?;
        let mut matching = branches
            .into_iter()
            .filter(|(name, _)| is_feature_branch_for(name, issue));

        let (name, tip) = matching
            .next()
            .ok_or(GitError::NoFeatureBranch { issue })?;

        let others: Vec<String> = matching.map(|(name, _)| name).collect();
        if !others.is_empty() {
            tracing::warn!(
                "several branches match issue {}; using '{}' (also found: {})",
                issue,
                name,
                others.join(", ")
            );
        }

        Ok(FeatureBranch { name, tip })
    }

    /// Fail with [`GitError::NotOnFeatureBranch`] unless `feature` is the
    /// checked-out branch.
    pub fn ensure_checked_out(&self, feature: &FeatureBranch) -> Result<()> {
        let current = self.vcs.current_branch()?;
        if current == feature.name {
            Ok(())
        } else {
            Err(GitError::NotOnFeatureBranch {
                expected: feature.name.clone(),
                current,
            })
        }
    }

    /// Pick the base branch for `feature`: a branch whose name matches a base
    /// pattern and whose tip is reachable from the feature tip. The one with
    /// the fewest commits between its tip and the feature tip wins; equal
    /// distances go to the lexicographically smallest name.
    pub fn resolve_base(&self, feature: &FeatureBranch) -> Result<BaseBranch> {
        let reachable = self.vcs.branches_reachable_from(&feature.tip)?;

        let mut best: Option<(u64, BaseBranch)> = None;
        for (name, tip) in reachable {
            if name == feature.name || !self.is_base_branch_name(&name) {
                continue;
            }
            let distance = self.vcs.commit_distance(&tip, &feature.tip)?;
            tracing::debug!(base = %name, distance, "base branch candidate");

            // BTreeMap iterates by name, so a strict `<` keeps the smallest
            // name among equal distances.
            if best.as_ref().map_or(true, |(d, _)| distance < *d) {
                best = Some((distance, BaseBranch { name, tip }));
            }
        }

        best.map(|(_, base)| base).ok_or_else(|| GitError::NoBaseBranch {
            feature: feature.name.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fakes::FakeVcs;

    fn standard_repo() -> FakeVcs {
        FakeVcs::new()
            .with_branch("123456-terrible-bug", "sha-feature")
            .with_branch("8.3.x", "sha-master")
            .with_branch("some-branch-name", "sha")
            .with_branch("something-else", "sha")
            .with_current_branch("123456-terrible-bug")
    }

    fn feature() -> FeatureBranch {
        FeatureBranch {
            name: "123456-terrible-bug".to_string(),
            tip: "sha-feature".to_string(),
        }
    }

    #[test]
    fn feature_branch_name_rules() {
        assert!(is_feature_branch_for("123456-terrible-bug", 123456));
        assert!(is_feature_branch_for("123456", 123456));
        assert!(!is_feature_branch_for("1234567-other", 123456));
        assert!(!is_feature_branch_for("x-123456", 123456));

        assert_eq!(issue_number_from_branch("123456-terrible-bug"), Some(123456));
        assert_eq!(issue_number_from_branch("123456"), Some(123456));
        assert_eq!(issue_number_from_branch("8.3.x"), None);
        assert_eq!(issue_number_from_branch("8.x-2.x"), None);
        assert_eq!(issue_number_from_branch("some-branch-name"), None);
    }

    #[test]
    fn default_patterns_recognise_release_branches() {
        let vcs = FakeVcs::new();
        let resolver = BranchResolver::new(&vcs, &GitConfig::default()).unwrap();

        for name in ["8.x-2.x", "8.3.x", "10.1.x", "7.x", "2.0.x"] {
            assert!(resolver.is_base_branch_name(name), "{}", name);
        }
        for name in ["main", "123456-terrible-bug", "8.3.x-dev", "feature/8.3.x"] {
            assert!(!resolver.is_base_branch_name(name), "{}", name);
        }
    }

    #[test]
    fn finds_feature_branch() {
        let vcs = standard_repo();
        let resolver = BranchResolver::new(&vcs, &GitConfig::default()).unwrap();

        assert_eq!(resolver.find_feature_branch(123456).unwrap(), feature());
    }

    #[test]
    fn missing_feature_branch() {
        let vcs = FakeVcs::new()
            .with_branch("8.x-2.x", "sha")
            .with_branch("some-branch-name", "sha");
        let resolver = BranchResolver::new(&vcs, &GitConfig::default()).unwrap();

        let err = resolver.find_feature_branch(123456).unwrap_err();
        assert!(matches!(err, GitError::NoFeatureBranch { issue: 123456 }));
    }

    #[test]
    fn feature_branch_must_be_current() {
        let vcs = standard_repo().with_current_branch("8.x-2.x");
        let resolver = BranchResolver::new(&vcs, &GitConfig::default()).unwrap();

        let err = resolver.ensure_checked_out(&feature()).unwrap_err();
        match err {
            GitError::NotOnFeatureBranch { expected, current } => {
                assert_eq!(expected, "123456-terrible-bug");
                assert_eq!(current, "8.x-2.x");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn resolves_single_base() {
        let vcs = standard_repo();
        let resolver = BranchResolver::new(&vcs, &GitConfig::default()).unwrap();

        let base = resolver.resolve_base(&feature()).unwrap();
        assert_eq!(base.name, "8.3.x");
        assert_eq!(base.tip, "sha-master");
    }

    #[test]
    fn prefers_closest_base() {
        let vcs = standard_repo()
            .with_branch("8.x-2.x", "sha-old")
            .with_distance("sha-old", "sha-feature", 40)
            .with_distance("sha-master", "sha-feature", 3);
        let resolver = BranchResolver::new(&vcs, &GitConfig::default()).unwrap();

        assert_eq!(resolver.resolve_base(&feature()).unwrap().name, "8.3.x");
    }

    #[test]
    fn ties_go_to_smallest_name() {
        let vcs = standard_repo()
            .with_branch("8.4.x", "sha-master")
            .with_distance("sha-master", "sha-feature", 3);
        let resolver = BranchResolver::new(&vcs, &GitConfig::default()).unwrap();

        assert_eq!(resolver.resolve_base(&feature()).unwrap().name, "8.3.x");
    }

    #[test]
    fn unreachable_release_branches_are_ignored() {
        let vcs = FakeVcs::new()
            .with_branch("123456-terrible-bug", "sha-feature")
            .with_unreachable_branch("8.3.x", "sha-elsewhere");
        let resolver = BranchResolver::new(&vcs, &GitConfig::default()).unwrap();

        let err = resolver.resolve_base(&feature()).unwrap_err();
        assert!(matches!(err, GitError::NoBaseBranch { .. }));
    }

    #[test]
    fn invalid_pattern_is_reported() {
        let vcs = FakeVcs::new();
        let config = GitConfig {
            base_branch_patterns: vec!["([".to_string()],
        };
        assert!(matches!(
            BranchResolver::new(&vcs, &config),
            Err(GitError::InvalidPattern { .. })
        ));
    }
}
