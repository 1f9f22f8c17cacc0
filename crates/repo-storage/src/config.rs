//! File-backed storage configuration.
//!
//! ```toml
//! [target]
//! base_dir = "/srv/repos/r1"
//! owner_id = "acme"
//! repo_id = "repo1"
//! nested_path = "app"
//!
//! [options]
//! root_folder = "strip"
//! staged_extraction = true
//! ```

use crate::options::StorageOptions;
use crate::target::StorageTarget;
use crate::{Result, StorageManager};
use repo_fs::{ConfigStore, NormalizedPath};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageConfig {
    pub target: StorageTarget,
    #[serde(default)]
    pub options: StorageOptions,
}

impl StorageConfig {
    pub fn new(target: StorageTarget) -> Self {
        Self {
            target,
            options: StorageOptions::default(),
        }
    }

    /// Load from a TOML, JSON or YAML file, chosen by extension.
    pub fn load(path: &NormalizedPath) -> Result<Self> {
        let config: Self = ConfigStore::new().load(path)?;
        config.options.validate()?;
        tracing::debug!(
            config = %path,
            repo_id = config.target.repo_id(),
            "Loaded storage config"
        );
        Ok(config)
    }

    pub fn save(&self, path: &NormalizedPath) -> Result<()> {
        Ok(ConfigStore::new().save(path, self)?)
    }

    /// Manager for this target and options, logging through `tracing`.
    pub fn into_manager(self) -> Result<StorageManager> {
        StorageManager::new(self.target).with_options(self.options)
    }
}
