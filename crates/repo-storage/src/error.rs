//! Error types for repo-storage

use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Filesystem error: {0}")]
    Fs(#[from] repo_fs::Error),

    #[error("Archive error at {path}: {source}")]
    Archive {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },

    #[error("Archive entry '{name}' would be written outside the base directory")]
    UnsafeEntry { name: String },

    #[error("Invalid storage target {field}: {message}")]
    InvalidTarget { field: &'static str, message: String },

    #[error("Invalid storage options: {message}")]
    InvalidOptions { message: String },

    #[error("Failed to walk {path}: {source}")]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("Blocking storage task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Fs(repo_fs::Error::io(path, source))
    }

    pub(crate) fn archive(path: impl Into<PathBuf>, source: zip::result::ZipError) -> Self {
        Self::Archive {
            path: path.into(),
            source,
        }
    }

    /// The kind of the underlying I/O failure, if there is one.
    ///
    /// Looks through archive errors that wrap an I/O failure as well.
    pub fn io_kind(&self) -> Option<std::io::ErrorKind> {
        match self {
            Self::Fs(err) => err.io_kind(),
            Self::Archive {
                source: zip::result::ZipError::Io(err),
                ..
            } => Some(err.kind()),
            Self::Walk { source, .. } => source.io_error().map(|e| e.kind()),
            _ => None,
        }
    }
}
