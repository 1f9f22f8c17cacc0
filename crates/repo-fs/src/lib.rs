//! Filesystem layer for repository storage
//!
//! Provides normalized paths, async filesystem primitives, atomic writes and
//! format-agnostic config loading.

pub mod config;
pub mod constants;
pub mod error;
pub mod io;
pub mod path;

pub use config::{ConfigFormat, ConfigStore};
pub use constants::{ARCHIVE_EXTENSION, VcsDir};
pub use error::{Error, Result};
pub use io::{EntryKind, FileStats};
pub use path::{NormalizedPath, validate_path_identifier};
