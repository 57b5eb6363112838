//! Repository configuration (`.skein/config.toml`)

use crate::repo::atomic_write;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RepoConfig {
    #[serde(default)]
    pub user: UserConfig,
    #[serde(default)]
    pub merge: MergeConfig,
    #[serde(default)]
    pub branch: BranchConfig,
    #[serde(default)]
    pub log: LogConfig,
}

/// Identity recorded on every commit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserConfig {
    pub name: String,
}

impl Default for UserConfig {
    fn default() -> Self {
        Self {
            name: "user".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeConfig {
    /// Resolve conflicting paths by line interleaving instead of aborting
    pub force: bool,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self { force: true }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BranchConfig {
    /// Branch created by the first commit in a repository
    pub default: String,
}

impl Default for BranchConfig {
    fn default() -> Self {
        Self {
            default: "master".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
}

impl RepoConfig {
    /// Load from `path`; a missing file yields the defaults
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
    }

    pub fn save(&self, path: &Path, tmp_dir: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize config to TOML")?;
        atomic_write(tmp_dir, path, content.as_bytes())
    }
}
