//! Well-known names inside a stored repository.

use std::path::Path;

/// File extension of stored repository archives.
pub const ARCHIVE_EXTENSION: &str = "zip";

/// Version-control metadata directories stripped from stored repositories.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VcsDir {
    /// The `.git` directory (Git database)
    Git,
    /// The `.github` directory (workflows, templates)
    Github,
}

impl VcsDir {
    pub const ALL: [VcsDir; 2] = [VcsDir::Git, VcsDir::Github];

    /// Get the string representation of the directory name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Git => ".git",
            Self::Github => ".github",
        }
    }
}

impl AsRef<Path> for VcsDir {
    fn as_ref(&self) -> &Path {
        Path::new(self.as_str())
    }
}

impl AsRef<str> for VcsDir {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl std::fmt::Display for VcsDir {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
