//! Rewriting archive entry names into paths below the base directory.
//!
//! An entry name is split into segments, the archive's root folder is
//! optionally dropped, then the nested prefix (if any) is required and
//! dropped. Whatever remains is the path relative to the base directory.

use crate::options::RootFolder;
use crate::{Error, Result};
use repo_fs::NormalizedPath;

/// Why an entry was not written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Directory entries are implied by the files below them.
    Directory,
    /// The entry lies outside the configured nested path.
    OutsideNestedPath,
    /// Nothing is left of the name once prefixes are stripped.
    Empty,
    /// The entry would overwrite the archive being read.
    ArchiveItself,
    /// A symlink under the base directory whose target is missing.
    DanglingLink,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            Self::Directory => "directory",
            Self::OutsideNestedPath => "outside nested path",
            Self::Empty => "empty path",
            Self::ArchiveItself => "archive itself",
            Self::DanglingLink => "dangling symlink",
        };
        f.write_str(text)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rewrite {
    /// Write the entry at this path, relative to the base directory.
    Write(NormalizedPath),
    Skip(SkipReason),
}

/// Split an entry name into its meaningful segments.
///
/// Fails with [`Error::UnsafeEntry`] for absolute names, drive prefixes and
/// any `..` segment.
pub fn entry_segments(name: &str) -> Result<Vec<&str>> {
    let unsafe_entry = || Error::UnsafeEntry {
        name: name.to_string(),
    };
    if name.starts_with(['/', '\\']) {
        return Err(unsafe_entry());
    }
    let segments: Vec<&str> = name
        .split(['/', '\\'])
        .filter(|seg| !seg.is_empty() && *seg != ".")
        .collect();
    if segments.iter().any(|seg| *seg == "..") {
        return Err(unsafe_entry());
    }
    if segments.first().is_some_and(|first| first.contains(':')) {
        return Err(unsafe_entry());
    }
    Ok(segments)
}

/// True when every entry lives below one shared top-level directory.
///
/// `entries` yields `(name, is_dir)`. A file at the archive root, an unsafe
/// name or an empty archive means there is no single root.
pub fn has_single_root<'a>(entries: impl IntoIterator<Item = (&'a str, bool)>) -> bool {
    let mut root: Option<&str> = None;
    for (name, is_dir) in entries {
        let Ok(segments) = entry_segments(name) else {
            return false;
        };
        let Some(first) = segments.first().copied() else {
            continue;
        };
        if !is_dir && segments.len() == 1 {
            return false;
        }
        match root {
            None => root = Some(first),
            Some(existing) if existing != first => return false,
            Some(_) => {}
        }
    }
    root.is_some()
}

/// Applies the root-folder and nested-path rules to entry names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryRewriter {
    strip_root: bool,
    nested: Vec<String>,
}

impl EntryRewriter {
    pub fn new(strip_root: bool, nested_path: Option<&str>) -> Self {
        let nested = nested_path
            .map(|p| {
                p.split(['/', '\\'])
                    .filter(|seg| !seg.is_empty() && *seg != ".")
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();
        Self { strip_root, nested }
    }

    /// Build a rewriter for a concrete archive, resolving [`RootFolder::Auto`]
    /// against its entry list.
    pub fn resolve<'a>(
        mode: RootFolder,
        nested_path: Option<&str>,
        entries: impl IntoIterator<Item = (&'a str, bool)>,
    ) -> Self {
        let strip_root = match mode {
            RootFolder::Strip => true,
            RootFolder::Keep => false,
            RootFolder::Auto => has_single_root(entries),
        };
        Self::new(strip_root, nested_path)
    }

    pub fn strips_root(&self) -> bool {
        self.strip_root
    }

    pub fn rewrite(&self, name: &str, is_dir: bool) -> Result<Rewrite> {
        let segments = entry_segments(name)?;
        if is_dir {
            return Ok(Rewrite::Skip(SkipReason::Directory));
        }

        let mut rest = segments.as_slice();
        if self.strip_root && rest.len() > 1 {
            rest = &rest[1..];
        }

        if !self.nested.is_empty() {
            let inside = rest.len() > self.nested.len()
                && rest.iter().zip(&self.nested).all(|(seg, want)| *seg == want);
            if !inside {
                return Ok(Rewrite::Skip(SkipReason::OutsideNestedPath));
            }
            rest = &rest[self.nested.len()..];
        }

        if rest.is_empty() {
            return Ok(Rewrite::Skip(SkipReason::Empty));
        }
        Ok(Rewrite::Write(NormalizedPath::new(rest.join("/"))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn write(path: &str) -> Rewrite {
        Rewrite::Write(NormalizedPath::new(path))
    }

    #[rstest]
    #[case("root/a.txt", write("a.txt"))]
    #[case("root/sub/b.txt", write("sub/b.txt"))]
    #[case("a.txt", write("a.txt"))]
    #[case("root//./sub\\c.txt", write("sub/c.txt"))]
    fn strips_root_folder(#[case] name: &str, #[case] expected: Rewrite) {
        let rewriter = EntryRewriter::new(true, None);
        assert_eq!(rewriter.rewrite(name, false).unwrap(), expected);
    }

    #[test]
    fn keeps_names_when_not_stripping() {
        let rewriter = EntryRewriter::new(false, None);
        assert_eq!(rewriter.rewrite("sub/b.txt", false).unwrap(), write("sub/b.txt"));
    }

    #[rstest]
    #[case("root/app/a.txt", write("a.txt"))]
    #[case("root/app/src/main.rs", write("src/main.rs"))]
    #[case("root/other/b.txt", Rewrite::Skip(SkipReason::OutsideNestedPath))]
    #[case("root/application/c.txt", Rewrite::Skip(SkipReason::OutsideNestedPath))]
    #[case("root/app", Rewrite::Skip(SkipReason::OutsideNestedPath))]
    #[case("root/other/app/d.txt", Rewrite::Skip(SkipReason::OutsideNestedPath))]
    fn scopes_to_nested_path(#[case] name: &str, #[case] expected: Rewrite) {
        let rewriter = EntryRewriter::new(true, Some("app"));
        assert_eq!(rewriter.rewrite(name, false).unwrap(), expected);
    }

    #[test]
    fn multi_segment_nested_path() {
        let rewriter = EntryRewriter::new(true, Some("packages/web"));
        assert_eq!(
            rewriter.rewrite("root/packages/web/index.ts", false).unwrap(),
            write("index.ts")
        );
        assert_eq!(
            rewriter.rewrite("root/packages/api/index.ts", false).unwrap(),
            Rewrite::Skip(SkipReason::OutsideNestedPath)
        );
    }

    #[test]
    fn directories_are_skipped() {
        let rewriter = EntryRewriter::new(true, None);
        assert_eq!(
            rewriter.rewrite("root/sub/", true).unwrap(),
            Rewrite::Skip(SkipReason::Directory)
        );
    }

    #[rstest]
    #[case("/etc/passwd")]
    #[case("\\windows\\system32")]
    #[case("root/../../etc/passwd")]
    #[case("..")]
    #[case("C:/evil.txt")]
    fn unsafe_names_fail(#[case] name: &str) {
        let rewriter = EntryRewriter::new(true, None);
        assert!(matches!(
            rewriter.rewrite(name, false),
            Err(Error::UnsafeEntry { .. })
        ));
    }

    #[test]
    fn single_root_detection() {
        assert!(has_single_root([
            ("owner-repo-abc123/", true),
            ("owner-repo-abc123/a.txt", false),
            ("owner-repo-abc123/sub/b.txt", false),
        ]));
        assert!(!has_single_root([("a.txt", false), ("sub/b.txt", false)]));
        assert!(!has_single_root([("one/a.txt", false), ("two/b.txt", false)]));
        assert!(!has_single_root(std::iter::empty::<(&str, bool)>()));
    }

    #[test]
    fn auto_mode_resolves_per_archive() {
        let zipball = [("root/", true), ("root/a.txt", false)];
        assert!(EntryRewriter::resolve(RootFolder::Auto, None, zipball).strips_root());

        let flat = [("a.txt", false), ("sub/b.txt", false)];
        assert!(!EntryRewriter::resolve(RootFolder::Auto, None, flat).strips_root());
        assert!(EntryRewriter::resolve(RootFolder::Strip, None, flat).strips_root());
        assert!(!EntryRewriter::resolve(RootFolder::Keep, None, zipball).strips_root());
    }
}
