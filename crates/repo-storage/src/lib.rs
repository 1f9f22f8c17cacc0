//! Repository storage for Repository Manager.
//!
//! Persists an uploaded repository archive, expands it onto disk (scoped to
//! a nested subtree when configured), strips VCS metadata, re-compresses the
//! tree and removes artifacts. Everything hangs off one [`StorageTarget`]:
//!
//! ```no_run
//! # async fn demo() -> repo_storage::Result<()> {
//! use repo_storage::{StorageManager, StorageTarget};
//!
//! let target = StorageTarget::builder("/srv/repos/r1", "acme", "repo1")
//!     .nested_path("app")
//!     .build()?;
//! let manager = StorageManager::new(target);
//!
//! if manager.is_target_empty_or_absent().await? {
//!     manager.save_archive(std::fs::read("upload.zip").unwrap()).await?;
//!     manager.extract_archive().await?;
//!     manager.prune_vcs_metadata().await?;
//! }
//! # Ok(())
//! # }
//! ```

pub mod archive;
pub mod config;
pub mod entry_path;
pub mod error;
pub mod logger;
pub mod logging;
pub mod manager;
pub mod options;
pub mod target;

pub use archive::{ARCHIVE_MARK, CompressReport, ExtractReport};
pub use config::StorageConfig;
pub use entry_path::{EntryRewriter, Rewrite, SkipReason};
pub use error::{Error, Result};
pub use logger::{NullLogger, StorageEvent, StorageLogger, TracingLogger};
pub use manager::StorageManager;
pub use options::{RootFolder, StorageOptions};
pub use repo_fs::{EntryKind, FileStats, NormalizedPath};
pub use target::{StorageTarget, StorageTargetBuilder};
