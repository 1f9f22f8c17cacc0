//! Repository storage manager
//!
//! Every operation works against one fixed [`StorageTarget`], issues its
//! filesystem or archive calls in sequence and returns the first error.
//! Nothing is retried.

use crate::archive::{self, CompressReport, ExtractPlan, ExtractReport};
use crate::logger::{StorageEvent, StorageLogger, TracingLogger};
use crate::options::StorageOptions;
use crate::target::StorageTarget;
use crate::{Error, Result};
use repo_fs::{FileStats, NormalizedPath, io};
use std::io::ErrorKind;
use std::sync::Arc;
use tracing::Instrument;

/// Owns the on-disk lifecycle of one repository.
///
/// Two managers pointed at the same base directory are not coordinated;
/// callers must not run them concurrently.
#[derive(Debug, Clone)]
pub struct StorageManager {
    target: StorageTarget,
    options: StorageOptions,
    logger: Arc<dyn StorageLogger>,
}

impl StorageManager {
    /// Manager with default options that logs through `tracing`.
    pub fn new(target: StorageTarget) -> Self {
        Self {
            target,
            options: StorageOptions::default(),
            logger: Arc::new(TracingLogger),
        }
    }

    pub fn with_logger(mut self, logger: Arc<dyn StorageLogger>) -> Self {
        self.logger = logger;
        self
    }

    pub fn with_options(mut self, options: StorageOptions) -> Result<Self> {
        options.validate()?;
        self.options = options;
        Ok(self)
    }

    pub fn target(&self) -> &StorageTarget {
        &self.target
    }

    pub fn options(&self) -> &StorageOptions {
        &self.options
    }

    /// `{base_dir}/{repo_id}.zip`
    pub fn archive_path(&self) -> NormalizedPath {
        self.target.archive_path()
    }

    fn log(&self, event: StorageEvent<'_>) {
        self.logger.log(&self.target, event);
    }

    fn span(&self, op: &'static str) -> tracing::Span {
        tracing::info_span!(
            "storage",
            op,
            repo_id = self.target.repo_id(),
            owner_id = self.target.owner_id(),
        )
    }

    /* ----- Filesystem helpers ----- */

    /// True iff an entry exists at `path`; stat failures read as absent.
    pub async fn path_exists(&self, path: &NormalizedPath) -> bool {
        io::path_exists(path).await
    }

    pub async fn ensure_dir(&self, path: &NormalizedPath) -> Result<()> {
        Ok(io::ensure_dir(path).await?)
    }

    pub async fn stat(&self, path: &NormalizedPath) -> Result<FileStats> {
        Ok(io::stat(path).await?)
    }

    pub async fn remove_path(&self, path: &NormalizedPath) -> Result<()> {
        Ok(io::remove_path(path).await?)
    }

    pub async fn write_file(&self, path: &NormalizedPath, content: &[u8]) -> Result<()> {
        Ok(io::write_file(path, content).await?)
    }

    /* ----- Repository operations ----- */

    /// True when the base directory is absent or an empty directory.
    ///
    /// A non-empty directory, or a base path that is not a directory, is
    /// not a valid extraction target.
    pub async fn is_target_empty_or_absent(&self) -> Result<bool> {
        let base = self.target.base_dir();
        self.log(StorageEvent::Checking { path: base });
        async {
            if !io::path_exists(base).await {
                return Ok(true);
            }
            match io::stat(base).await {
                Ok(stats) if !stats.is_dir() => return Ok(false),
                Ok(_) => {}
                // Dangling symlink: present, but not a directory.
                Err(e) if e.io_kind() == Some(ErrorKind::NotFound) => return Ok(false),
                Err(e) => return Err(Error::from(e)),
            }
            Ok::<_, Error>(io::is_empty_dir(base).await?)
        }
        .instrument(self.span("is_target_empty_or_absent"))
        .await
    }

    /// Write `bytes` to the archive path, replacing any previous archive.
    pub async fn save_archive(&self, bytes: impl Into<Vec<u8>>) -> Result<()> {
        let bytes = bytes.into();
        let archive = self.archive_path();
        self.log(StorageEvent::Saving {
            archive: &archive,
            bytes: bytes.len(),
        });
        async {
            io::ensure_dir(self.target.base_dir()).await?;
            let path = archive.clone();
            tokio::task::spawn_blocking(move || io::write_atomic(&path, &bytes)).await??;
            Ok::<_, Error>(())
        }
        .instrument(self.span("save_archive"))
        .await?;
        self.log(StorageEvent::Saved { archive: &archive });
        Ok(())
    }

    /// Stats of the base directory itself; fails when it is absent.
    pub async fn fetch_target_stats(&self) -> Result<FileStats> {
        let base = self.target.base_dir();
        self.log(StorageEvent::FetchingStats { path: base });
        Ok(io::stat(base)
            .instrument(self.span("fetch_target_stats"))
            .await?)
    }

    /// Expand the stored archive into the base directory.
    ///
    /// Without staged extraction a failure can leave a partial tree behind.
    pub async fn extract_archive(&self) -> Result<ExtractReport> {
        let archive = self.archive_path();
        self.log(StorageEvent::Extracting { archive: &archive });
        let span = self.span("extract_archive");

        let report = async {
            let base = self.target.base_dir().clone();
            io::ensure_dir(&base).await?;

            let plan = ExtractPlan {
                root_folder: self.options.root_folder,
                nested_path: self.target.nested_path().map(str::to_string),
            };
            let staged = self.options.staged_extraction;
            let logger = Arc::clone(&self.logger);
            let target = self.target.clone();
            let source = archive.clone();
            let current = tracing::Span::current();

            tokio::task::spawn_blocking(move || {
                current.in_scope(|| {
                    let mut on_skip = |name: &str, reason| {
                        logger.log(&target, StorageEvent::EntrySkipped { name, reason });
                    };
                    if staged {
                        extract_staged(&source, &base, &plan, &mut on_skip)
                    } else {
                        archive::extract_to(&source, &base, &plan, Some(&source), &mut on_skip)
                    }
                })
            })
            .await?
        }
        .instrument(span)
        .await?;

        self.log(StorageEvent::Extracted {
            written: report.written.len(),
            skipped: report.skipped,
        });
        Ok(report)
    }

    /// Remove the configured VCS directories directly under the base directory.
    pub async fn prune_vcs_metadata(&self) -> Result<()> {
        async {
            for dir in &self.options.vcs_dirs {
                let path = self.target.base_dir().join(dir);
                if io::path_exists(&path).await {
                    self.log(StorageEvent::Pruning { path: &path });
                    io::remove_path(&path).await?;
                }
            }
            Ok::<_, Error>(())
        }
        .instrument(self.span("prune_vcs_metadata"))
        .await
    }

    /// Zip the base directory into the archive path at the configured level.
    pub async fn compress_target(&self) -> Result<CompressReport> {
        let base = self.target.base_dir().clone();
        let archive = self.archive_path();
        self.log(StorageEvent::Compressing { base: &base });

        let report = async {
            io::ensure_dir(&base).await?;
            let level = self.options.compression_level;
            let (base, dest) = (base.clone(), archive.clone());
            let logger = Arc::clone(&self.logger);
            let target = self.target.clone();
            let current = tracing::Span::current();
            tokio::task::spawn_blocking(move || {
                current.in_scope(|| {
                    let mut on_skip = |name: &str, reason| {
                        logger.log(&target, StorageEvent::EntrySkipped { name, reason });
                    };
                    archive::compress_dir(&base, &dest, level, &mut on_skip)
                })
            })
            .await?
        }
        .instrument(self.span("compress_target"))
        .await?;

        self.log(StorageEvent::Compressed {
            archive: &archive,
            files: report.files,
            dirs: report.dirs,
        });
        Ok(report)
    }

    /// Recursively remove the base directory. Idempotent.
    pub async fn remove_target(&self) -> Result<()> {
        let base = self.target.base_dir();
        self.log(StorageEvent::RemovingTarget { path: base });
        Ok(io::remove_path(base)
            .instrument(self.span("remove_target"))
            .await?)
    }

    /// Remove the archive file. Idempotent.
    pub async fn remove_archive(&self) -> Result<()> {
        let archive = self.archive_path();
        self.log(StorageEvent::RemovingArchive { archive: &archive });
        Ok(io::remove_path(&archive)
            .instrument(self.span("remove_archive"))
            .await?)
    }
}

/// Extract into a temp directory under `base`, then move into place.
///
/// The staging directory is removed on drop, so a failed extraction leaves
/// `base` as it was.
fn extract_staged(
    source: &NormalizedPath,
    base: &NormalizedPath,
    plan: &ExtractPlan,
    on_skip: &mut dyn FnMut(&str, crate::entry_path::SkipReason),
) -> Result<ExtractReport> {
    let base_native = base.to_native();
    let staging = tempfile::Builder::new()
        .prefix(".extract-")
        .tempdir_in(&base_native)
        .map_err(|e| Error::io(&base_native, e))?;
    let staging_path = NormalizedPath::new(staging.path());

    // The archive's own path, seen from inside the staging directory.
    let guard = source
        .relative_to(base)
        .map(|relative| staging_path.join(relative.as_str()));

    let report = archive::extract_to(source, &staging_path, plan, guard.as_ref(), on_skip)?;
    archive::merge_into(staging.path(), &base_native)?;
    staging
        .close()
        .map_err(|e| Error::io(&base_native, e))?;
    Ok(report)
}
