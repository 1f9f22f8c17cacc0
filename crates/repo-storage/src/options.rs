//! Tunables for extraction, compression and pruning.

use crate::{Error, Result};
use repo_fs::{VcsDir, validate_path_identifier};
use serde::{Deserialize, Serialize};

/// Highest deflate level; the default for compression.
pub const MAX_COMPRESSION_LEVEL: i64 = 9;

/// How the top-level folder of an archive is treated during extraction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RootFolder {
    /// Strip the first segment only when every entry shares one top-level directory.
    #[default]
    Auto,
    /// Always strip the first segment of multi-segment entries.
    Strip,
    /// Never strip.
    Keep,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageOptions {
    pub compression_level: i64,
    pub root_folder: RootFolder,
    /// Extract into a staging directory and move into place only on success.
    pub staged_extraction: bool,
    /// Directories removed by `prune_vcs_metadata`.
    pub vcs_dirs: Vec<String>,
}

impl Default for StorageOptions {
    fn default() -> Self {
        Self {
            compression_level: MAX_COMPRESSION_LEVEL,
            root_folder: RootFolder::default(),
            staged_extraction: false,
            vcs_dirs: VcsDir::ALL.iter().map(|d| d.as_str().to_string()).collect(),
        }
    }
}

impl StorageOptions {
    pub fn validate(&self) -> Result<()> {
        if !(0..=MAX_COMPRESSION_LEVEL).contains(&self.compression_level) {
            return Err(Error::InvalidOptions {
                message: format!(
                    "compression_level {} is outside 0..={MAX_COMPRESSION_LEVEL}",
                    self.compression_level
                ),
            });
        }
        for dir in &self.vcs_dirs {
            validate_path_identifier(dir, "VCS directory")
                .map_err(|message| Error::InvalidOptions { message })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_prune_git_and_github_at_max_level() {
        let options = StorageOptions::default();
        assert_eq!(options.vcs_dirs, vec![".git", ".github"]);
        assert_eq!(options.compression_level, 9);
        assert_eq!(options.root_folder, RootFolder::Auto);
        assert!(options.validate().is_ok());
    }

    #[test]
    fn out_of_range_level_is_rejected() {
        let options = StorageOptions {
            compression_level: 12,
            ..Default::default()
        };
        assert!(matches!(options.validate(), Err(Error::InvalidOptions { .. })));
    }

    #[test]
    fn vcs_dirs_must_be_single_components() {
        let options = StorageOptions {
            vcs_dirs: vec!["..".into()],
            ..Default::default()
        };
        assert!(options.validate().is_err());
    }
}
