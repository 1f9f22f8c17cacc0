//! Injectable logging collaborator for storage operations.
//!
//! [`StorageManager`](crate::StorageManager) reports what it does through a
//! [`StorageLogger`] handed to it at construction, so it has no hidden global
//! output. [`TracingLogger`] is the default.

use crate::entry_path::SkipReason;
use crate::target::StorageTarget;
use repo_fs::NormalizedPath;

/// Something a storage operation did or is about to do.
#[derive(Debug, Clone, Copy)]
pub enum StorageEvent<'a> {
    Checking { path: &'a NormalizedPath },
    Saving { archive: &'a NormalizedPath, bytes: usize },
    Saved { archive: &'a NormalizedPath },
    FetchingStats { path: &'a NormalizedPath },
    Extracting { archive: &'a NormalizedPath },
    EntrySkipped { name: &'a str, reason: SkipReason },
    Extracted { written: usize, skipped: usize },
    Pruning { path: &'a NormalizedPath },
    Compressing { base: &'a NormalizedPath },
    Compressed { archive: &'a NormalizedPath, files: usize, dirs: usize },
    RemovingTarget { path: &'a NormalizedPath },
    RemovingArchive { archive: &'a NormalizedPath },
}

pub trait StorageLogger: Send + Sync + std::fmt::Debug {
    fn log(&self, target: &StorageTarget, event: StorageEvent<'_>);
}

/// Forwards events to `tracing` with structured fields.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLogger;

impl StorageLogger for TracingLogger {
    fn log(&self, target: &StorageTarget, event: StorageEvent<'_>) {
        let repo_id = target.repo_id();
        let owner_id = target.owner_id();
        match event {
            StorageEvent::Checking { path } => {
                tracing::debug!(repo_id, owner_id, path = %path, "Checking path");
            }
            StorageEvent::Saving { archive, bytes } => {
                tracing::info!(repo_id, owner_id, archive = %archive, bytes, "Saving repo");
            }
            StorageEvent::Saved { archive } => {
                tracing::info!(repo_id, owner_id, archive = %archive, "Repo saved");
            }
            StorageEvent::FetchingStats { path } => {
                tracing::debug!(repo_id, owner_id, path = %path, "Fetching stats");
            }
            StorageEvent::Extracting { archive } => {
                tracing::info!(repo_id, owner_id, archive = %archive, "Unzipping repo");
            }
            StorageEvent::EntrySkipped { name, reason } => {
                tracing::trace!(repo_id, entry = name, %reason, "Skipping archive entry");
            }
            StorageEvent::Extracted { written, skipped } => {
                tracing::info!(repo_id, owner_id, written, skipped, "Repo unzipped");
            }
            StorageEvent::Pruning { path } => {
                tracing::debug!(repo_id, owner_id, path = %path, "Removing VCS metadata");
            }
            StorageEvent::Compressing { base } => {
                tracing::info!(repo_id, owner_id, base = %base, "Zipping repo");
            }
            StorageEvent::Compressed {
                archive,
                files,
                dirs,
            } => {
                tracing::info!(repo_id, owner_id, archive = %archive, files, dirs, "Repo zipped");
            }
            StorageEvent::RemovingTarget { path } => {
                tracing::info!(repo_id, owner_id, path = %path, "Removing repo");
            }
            StorageEvent::RemovingArchive { archive } => {
                tracing::info!(repo_id, owner_id, archive = %archive, "Removing zip");
            }
        }
    }
}

/// Discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullLogger;

impl StorageLogger for NullLogger {
    fn log(&self, _target: &StorageTarget, _event: StorageEvent<'_>) {}
}
