//! Filesystem primitives used by the storage layer.
//!
//! The async helpers wrap `tokio::fs` and attach the failing path to every
//! error. [`write_atomic`] is synchronous and meant to run on a blocking
//! thread.

use crate::{Error, NormalizedPath, Result};
use chrono::{DateTime, Utc};
use fs2::FileExt;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Kind of filesystem entry reported by [`stat`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Dir,
    Other,
}

/// Size and type metadata for a filesystem entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileStats {
    pub len: u64,
    pub kind: EntryKind,
    pub modified: Option<DateTime<Utc>>,
    pub readonly: bool,
}

impl FileStats {
    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Dir
    }

    pub fn is_file(&self) -> bool {
        self.kind == EntryKind::File
    }
}

impl From<fs::Metadata> for FileStats {
    fn from(meta: fs::Metadata) -> Self {
        let kind = if meta.is_dir() {
            EntryKind::Dir
        } else if meta.is_file() {
            EntryKind::File
        } else {
            EntryKind::Other
        };
        Self {
            len: meta.len(),
            kind,
            modified: meta.modified().ok().map(DateTime::<Utc>::from),
            readonly: meta.permissions().readonly(),
        }
    }
}

/// True iff an entry exists at `path`. Stat failures count as absent.
pub async fn path_exists(path: &NormalizedPath) -> bool {
    tokio::fs::symlink_metadata(path.to_native()).await.is_ok()
}

/// Create `path` and any missing ancestors. No-op when it already exists.
pub async fn ensure_dir(path: &NormalizedPath) -> Result<()> {
    if path_exists(path).await {
        return Ok(());
    }
    tracing::debug!(path = %path, "Creating directory");
    let native = path.to_native();
    tokio::fs::create_dir_all(&native)
        .await
        .map_err(|e| Error::io(native, e))
}

/// Metadata for the entry at `path`, following symlinks.
pub async fn stat(path: &NormalizedPath) -> Result<FileStats> {
    let native = path.to_native();
    tokio::fs::metadata(&native)
        .await
        .map(FileStats::from)
        .map_err(|e| Error::io(native, e))
}

/// Recursively delete `path` if it exists.
pub async fn remove_path(path: &NormalizedPath) -> Result<()> {
    let native = path.to_native();
    let meta = match tokio::fs::symlink_metadata(&native).await {
        Ok(meta) => meta,
        Err(_) => return Ok(()),
    };
    tracing::debug!(path = %path, dir = meta.is_dir(), "Removing path");
    let removed = if meta.is_dir() {
        tokio::fs::remove_dir_all(&native).await
    } else {
        tokio::fs::remove_file(&native).await
    };
    removed.map_err(|e| Error::io(native, e))
}

/// Create or truncate `path` with `content`.
pub async fn write_file(path: &NormalizedPath, content: &[u8]) -> Result<()> {
    let native = path.to_native();
    tokio::fs::write(&native, content)
        .await
        .map_err(|e| Error::io(native, e))
}

/// True when `path` is a directory with no entries.
pub async fn is_empty_dir(path: &NormalizedPath) -> Result<bool> {
    let native = path.to_native();
    let mut entries = tokio::fs::read_dir(&native)
        .await
        .map_err(|e| Error::io(&native, e))?;
    let first = entries
        .next_entry()
        .await
        .map_err(|e| Error::io(&native, e))?;
    Ok(first.is_none())
}

/// Sibling path used to stage writes to `path` before renaming into place.
///
/// The name is hidden and carries the process id so concurrent processes do
/// not share a staging file.
pub fn temp_path_for(path: &Path) -> PathBuf {
    let temp_name = format!(
        ".{}.{}.tmp",
        path.file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default(),
        std::process::id()
    );
    path.with_file_name(temp_name)
}

/// Write content atomically to a file with locking.
///
/// Writes to a temp file in the same directory, then renames over `path`.
/// An advisory lock is held on the temp file while writing.
pub fn write_atomic(path: &NormalizedPath, content: &[u8]) -> Result<()> {
    let native_path = path.to_native();

    if let Some(parent) = native_path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    }

    let temp_path = temp_path_for(&native_path);

    let mut temp_file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(&temp_path)
        .map_err(|e| Error::io(&temp_path, e))?;

    temp_file
        .lock_exclusive()
        .map_err(|_| Error::LockFailed {
            path: native_path.clone(),
        })?;

    let written = temp_file
        .write_all(content)
        .and_then(|()| temp_file.sync_all())
        .map_err(|e| Error::io(&temp_path, e));
    let _ = FileExt::unlock(&temp_file);
    drop(temp_file);

    if let Err(e) = written {
        let _ = fs::remove_file(&temp_path);
        return Err(e);
    }

    fs::rename(&temp_path, &native_path).map_err(|e| {
        let _ = fs::remove_file(&temp_path);
        Error::io(&native_path, e)
    })
}

/// Read text content from a file.
pub fn read_text(path: &NormalizedPath) -> Result<String> {
    let native_path = path.to_native();
    fs::read_to_string(&native_path).map_err(|e| Error::io(&native_path, e))
}

/// Write text content to a file atomically.
pub fn write_text(path: &NormalizedPath, content: &str) -> Result<()> {
    write_atomic(path, content.as_bytes())
}
