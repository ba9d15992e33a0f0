//! Workflow configuration structures

use std::path::Path;

use df_git::GitConfig;
use df_tracker::TrackerConfig;
use serde::{Deserialize, Serialize};

use crate::error::{Result, WorkflowError};

/// Location of the config file, relative to the repository root.
pub const CONFIG_PATH: &str = ".dorgflow/config.toml";

/// Top-level configuration from .dorgflow/config.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorkflowConfig {
    /// Base branch detection
    #[serde(default)]
    pub git: GitConfig,

    /// Issue tracker connection and patch naming
    #[serde(default)]
    pub tracker: TrackerConfig,

    /// Outgoing patch files
    #[serde(default)]
    pub patch: PatchConfig,
}

/// Outgoing patch configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PatchConfig {
    /// Project machine name used in patch file names. Defaults to the
    /// repository directory name.
    #[serde(default)]
    pub project: Option<String>,
}

impl PatchConfig {
    pub fn project_name(&self, repo_root: &Path) -> String {
        if let Some(project) = &self.project {
            return project.clone();
        }
        repo_root
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "project".to_string())
    }
}

impl WorkflowConfig {
    /// Load config from `path`. Missing or malformed files are errors.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| WorkflowError::Config {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }

    /// Load config from `path`, returning defaults if the file doesn't
    /// exist. A file that exists but does not parse is still an error.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!("no config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        Self::load(path)
    }

    /// Load `.dorgflow/config.toml` under `repo_root`, or defaults.
    pub fn for_repo(repo_root: &Path) -> Result<Self> {
        Self::load_or_default(&repo_root.join(CONFIG_PATH))
    }
}
