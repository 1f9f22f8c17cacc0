//! Fake VCS metadata fixtures.
//!
//! Directory structure only; nothing here is a usable repository.

use std::fs;
use std::path::Path;

/// Creates a minimal `.git` directory under `path`.
///
/// # Panics
/// Panics if the filesystem operations fail.
pub fn fake_git_dir(path: &Path) {
    fs::create_dir_all(path.join(".git/refs/heads"))
        .unwrap_or_else(|e| panic!("fake_git_dir: failed to create refs/heads: {e}"));
    fs::write(path.join(".git/HEAD"), "ref: refs/heads/main\n")
        .unwrap_or_else(|e| panic!("fake_git_dir: failed to write HEAD: {e}"));
    fs::write(path.join(".git/refs/heads/main"), "")
        .unwrap_or_else(|e| panic!("fake_git_dir: failed to write refs/heads/main: {e}"));
}

/// Creates a `.github` directory with one workflow under `path`.
///
/// # Panics
/// Panics if the filesystem operations fail.
pub fn fake_github_dir(path: &Path) {
    fs::create_dir_all(path.join(".github/workflows"))
        .unwrap_or_else(|e| panic!("fake_github_dir: failed to create workflows: {e}"));
    fs::write(
        path.join(".github/workflows/ci.yml"),
        "on: push\njobs: {}\n",
    )
    .unwrap_or_else(|e| panic!("fake_github_dir: failed to write ci.yml: {e}"));
}
