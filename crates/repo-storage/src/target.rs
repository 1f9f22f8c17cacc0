//! The immutable description of where a repository lives on disk.

use crate::{Error, Result};
use repo_fs::{ARCHIVE_EXTENSION, NormalizedPath, validate_path_identifier};
use serde::{Deserialize, Serialize};

/// Where a repository's files and archive live.
///
/// Constructed once per logical repository operation. The archive path is
/// always `{base_dir}/{repo_id}.zip` and never depends on the version or the
/// nested path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "TargetFields", into = "TargetFields")]
pub struct StorageTarget {
    base_dir: NormalizedPath,
    owner_id: String,
    repo_id: String,
    version_id: Option<String>,
    nested_path: Option<String>,
}

/// Unvalidated field set used for (de)serialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct TargetFields {
    base_dir: NormalizedPath,
    owner_id: String,
    repo_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    version_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    nested_path: Option<String>,
}

impl TryFrom<TargetFields> for StorageTarget {
    type Error = Error;

    fn try_from(fields: TargetFields) -> Result<Self> {
        let mut builder =
            StorageTarget::builder(fields.base_dir, fields.owner_id, fields.repo_id);
        if let Some(version_id) = fields.version_id {
            builder = builder.version_id(version_id);
        }
        if let Some(nested_path) = fields.nested_path {
            builder = builder.nested_path(nested_path);
        }
        builder.build()
    }
}

impl From<StorageTarget> for TargetFields {
    fn from(target: StorageTarget) -> Self {
        Self {
            base_dir: target.base_dir,
            owner_id: target.owner_id,
            repo_id: target.repo_id,
            version_id: target.version_id,
            nested_path: target.nested_path,
        }
    }
}

impl StorageTarget {
    /// Target without a version or nested path.
    pub fn new(
        base_dir: impl Into<NormalizedPath>,
        owner_id: impl Into<String>,
        repo_id: impl Into<String>,
    ) -> Result<Self> {
        Self::builder(base_dir, owner_id, repo_id).build()
    }

    pub fn builder(
        base_dir: impl Into<NormalizedPath>,
        owner_id: impl Into<String>,
        repo_id: impl Into<String>,
    ) -> StorageTargetBuilder {
        StorageTargetBuilder {
            base_dir: base_dir.into(),
            owner_id: owner_id.into(),
            repo_id: repo_id.into(),
            version_id: None,
            nested_path: None,
        }
    }

    pub fn base_dir(&self) -> &NormalizedPath {
        &self.base_dir
    }

    pub fn owner_id(&self) -> &str {
        &self.owner_id
    }

    pub fn repo_id(&self) -> &str {
        &self.repo_id
    }

    pub fn version_id(&self) -> Option<&str> {
        self.version_id.as_deref()
    }

    /// Normalized nested prefix: `/`-separated, no empty or `.` segments.
    pub fn nested_path(&self) -> Option<&str> {
        self.nested_path.as_deref()
    }

    /// `{base_dir}/{repo_id}.zip`
    pub fn archive_path(&self) -> NormalizedPath {
        self.base_dir
            .join(&format!("{}.{}", self.repo_id, ARCHIVE_EXTENSION))
    }
}

/// Builder for [`StorageTarget`]; validation happens in [`build`](Self::build).
#[derive(Debug, Clone)]
pub struct StorageTargetBuilder {
    base_dir: NormalizedPath,
    owner_id: String,
    repo_id: String,
    version_id: Option<String>,
    nested_path: Option<String>,
}

impl StorageTargetBuilder {
    pub fn version_id(mut self, version_id: impl Into<String>) -> Self {
        self.version_id = Some(version_id.into());
        self
    }

    pub fn nested_path(mut self, nested_path: impl Into<String>) -> Self {
        self.nested_path = Some(nested_path.into());
        self
    }

    pub fn build(self) -> Result<StorageTarget> {
        if self.base_dir.is_empty() {
            return Err(Error::InvalidTarget {
                field: "base_dir",
                message: "base directory must not be empty".into(),
            });
        }
        validate_path_identifier(&self.owner_id, "Owner id").map_err(|message| {
            Error::InvalidTarget {
                field: "owner_id",
                message,
            }
        })?;
        validate_path_identifier(&self.repo_id, "Repository id").map_err(|message| {
            Error::InvalidTarget {
                field: "repo_id",
                message,
            }
        })?;
        let nested_path = match self.nested_path {
            Some(raw) => normalize_nested_path(&raw)?,
            None => None,
        };

        Ok(StorageTarget {
            base_dir: self.base_dir,
            owner_id: self.owner_id,
            repo_id: self.repo_id,
            version_id: self.version_id.filter(|v| !v.is_empty()),
            nested_path,
        })
    }
}

fn normalize_nested_path(raw: &str) -> Result<Option<String>> {
    let path = NormalizedPath::new(raw);
    if path.has_parent_segments() {
        return Err(Error::InvalidTarget {
            field: "nested_path",
            message: format!("'{raw}' must not contain '..'"),
        });
    }
    let joined = path.segments().collect::<Vec<_>>().join("/");
    Ok(if joined.is_empty() { None } else { Some(joined) })
}
