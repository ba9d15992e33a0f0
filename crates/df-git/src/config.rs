// config.rs - Git-side configuration.

use serde::{Deserialize, Serialize};

/// Branch names treated as long-lived base branches: Drupal core and
/// contrib release lines such as `8.x-2.x`, `8.3.x`, `10.1.x` and `7.x`.
pub const DEFAULT_BASE_BRANCH_PATTERNS: &[&str] =
    &[r"^\d+\.x-\d+\.x$", r"^\d+\.\d+\.x$", r"^\d+\.x$"];

/// Git configuration, the `[git]` table of `.dorgflow/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitConfig {
    /// Regexes a branch name must match to be considered a base branch.
    #[serde(default = "default_base_branch_patterns")]
    pub base_branch_patterns: Vec<String>,
}

impl Default for GitConfig {
    fn default() -> Self {
        Self {
            base_branch_patterns: default_base_branch_patterns(),
        }
    }
}

fn default_base_branch_patterns() -> Vec<String> {
    DEFAULT_BASE_BRANCH_PATTERNS
        .iter()
        .map(|p| p.to_string())
        .collect()
}
