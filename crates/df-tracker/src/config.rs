// config.rs - Issue tracker configuration.

use serde::{Deserialize, Serialize};

use df_ledger::DEFAULT_PATCH_SUFFIX;

/// Tracker configuration, the `[tracker]` table of `.dorgflow/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackerConfig {
    /// Base URL of the JSON API (no trailing slash).
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Base URL of the website, used for links recorded in commits.
    #[serde(default = "default_site_url")]
    pub site_url: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// File suffix that marks an attachment as a patch.
    #[serde(default = "default_patch_suffix")]
    pub patch_suffix: String,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            site_url: default_site_url(),
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
            patch_suffix: default_patch_suffix(),
        }
    }
}

// Serde default functions
fn default_api_base_url() -> String {
    "https://www.drupal.org/api-d7".to_string()
}

fn default_site_url() -> String {
    "https://www.drupal.org".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_user_agent() -> String {
    format!("dorgflow/{}", env!("CARGO_PKG_VERSION"))
}

fn default_patch_suffix() -> String {
    DEFAULT_PATCH_SUFFIX.to_string()
}
