//! Synchronous zip extraction and compression.
//!
//! These run on tokio's blocking pool; the zip codec has no async API.

use crate::entry_path::{EntryRewriter, Rewrite, SkipReason};
use crate::options::RootFolder;
use crate::{Error, Result};
use repo_fs::NormalizedPath;
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter};
use std::path::Path;
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

/// Archive comment written by [`compress_dir`].
///
/// Its entries are already relative to the base directory, so
/// [`RootFolder::Auto`] never strips a folder from a marked archive.
pub const ARCHIVE_MARK: &str = "repo-storage";

/// What an extraction wrote.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractReport {
    /// Written paths, relative to the base directory, in archive order.
    pub written: Vec<NormalizedPath>,
    pub skipped: usize,
}

/// What a compression stored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompressReport {
    pub files: usize,
    pub dirs: usize,
    /// Entries left out, such as symlinks whose target is missing.
    pub skipped: usize,
    pub archive_len: u64,
}

/// Extraction settings taken from the target and its options.
#[derive(Debug, Clone)]
pub struct ExtractPlan {
    pub root_folder: RootFolder,
    pub nested_path: Option<String>,
}

/// Extract `archive` below `dest`.
///
/// `skip_guard` is a path (usually the archive itself) that must never be
/// overwritten. `on_skip` sees every entry that is not written.
pub fn extract_to(
    archive: &NormalizedPath,
    dest: &NormalizedPath,
    plan: &ExtractPlan,
    skip_guard: Option<&NormalizedPath>,
    on_skip: &mut dyn FnMut(&str, SkipReason),
) -> Result<ExtractReport> {
    let archive_native = archive.to_native();
    let file = File::open(&archive_native).map_err(|e| Error::io(&archive_native, e))?;
    let mut zip =
        ZipArchive::new(BufReader::new(file)).map_err(|e| Error::archive(&archive_native, e))?;

    let names: Vec<(String, bool)> = zip
        .file_names()
        .map(|name| (name.to_string(), name.ends_with('/')))
        .collect();
    let root_folder = match plan.root_folder {
        RootFolder::Auto if zip.comment() == ARCHIVE_MARK.as_bytes() => RootFolder::Keep,
        mode => mode,
    };
    let rewriter = EntryRewriter::resolve(
        root_folder,
        plan.nested_path.as_deref(),
        names.iter().map(|(name, is_dir)| (name.as_str(), *is_dir)),
    );

    let mut report = ExtractReport::default();
    for index in 0..zip.len() {
        let mut entry = zip
            .by_index(index)
            .map_err(|e| Error::archive(&archive_native, e))?;
        let name = entry.name().to_string();

        let relative = match rewriter.rewrite(&name, entry.is_dir())? {
            Rewrite::Write(relative) => relative,
            Rewrite::Skip(reason) => {
                report.skipped += 1;
                on_skip(&name, reason);
                continue;
            }
        };

        let out_path = dest.join(relative.as_str());
        if skip_guard.is_some_and(|guard| *guard == out_path) {
            report.skipped += 1;
            on_skip(&name, SkipReason::ArchiveItself);
            continue;
        }

        let out_native = out_path.to_native();
        if let Some(parent) = out_native.parent() {
            fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
        }
        let mut out = File::create(&out_native).map_err(|e| Error::io(&out_native, e))?;
        io::copy(&mut entry, &mut out).map_err(|e| Error::io(&out_native, e))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            if let Some(mode) = entry.unix_mode().map(|m| m & 0o777)
                && mode != 0
            {
                fs::set_permissions(&out_native, fs::Permissions::from_mode(mode))
                    .map_err(|e| Error::io(&out_native, e))?;
            }
        }

        report.written.push(relative);
    }

    Ok(report)
}

/// Move everything under `staging` into `dest`, replacing what is there.
pub fn merge_into(staging: &Path, dest: &Path) -> Result<()> {
    for entry in WalkDir::new(staging).min_depth(1).sort_by_file_name() {
        let entry = entry.map_err(|source| Error::Walk {
            path: staging.to_path_buf(),
            source,
        })?;
        let Ok(relative) = entry.path().strip_prefix(staging) else {
            continue;
        };
        let target = dest.join(relative);
        let existing = fs::symlink_metadata(&target).ok();

        if entry.file_type().is_dir() {
            if existing.as_ref().is_some_and(|meta| !meta.is_dir()) {
                fs::remove_file(&target).map_err(|e| Error::io(&target, e))?;
            }
            fs::create_dir_all(&target).map_err(|e| Error::io(&target, e))?;
            continue;
        }

        if existing.is_some_and(|meta| meta.is_dir()) {
            fs::remove_dir_all(&target).map_err(|e| Error::io(&target, e))?;
        }
        fs::rename(entry.path(), &target).map_err(|e| Error::io(&target, e))?;
    }
    Ok(())
}

/// Zip every entry under `base` into `archive`, paths relative to `base`.
///
/// The archive is built in a temp file beside `archive` and renamed into
/// place once complete. `archive` and its temp file are never included.
/// Symlinks whose target is missing are reported to `on_skip` and left out.
pub fn compress_dir(
    base: &NormalizedPath,
    archive: &NormalizedPath,
    compression_level: i64,
    on_skip: &mut dyn FnMut(&str, SkipReason),
) -> Result<CompressReport> {
    let base_native = base.to_native();
    let archive_native = archive.to_native();
    let temp_native = repo_fs::io::temp_path_for(&archive_native);

    let mut entries = Vec::new();
    for entry in WalkDir::new(&base_native).min_depth(1).sort_by_file_name() {
        let entry = entry.map_err(|source| Error::Walk {
            path: base_native.clone(),
            source,
        })?;
        if entry.path() == archive_native || entry.path() == temp_native {
            continue;
        }
        entries.push(entry);
    }

    let built = write_zip(&base_native, &temp_native, &entries, compression_level, on_skip);
    let report = match built {
        Ok(report) => report,
        Err(e) => {
            let _ = fs::remove_file(&temp_native);
            return Err(e);
        }
    };

    fs::rename(&temp_native, &archive_native).map_err(|e| {
        let _ = fs::remove_file(&temp_native);
        Error::io(&archive_native, e)
    })?;
    Ok(report)
}

fn write_zip(
    base: &Path,
    out: &Path,
    entries: &[walkdir::DirEntry],
    compression_level: i64,
    on_skip: &mut dyn FnMut(&str, SkipReason),
) -> Result<CompressReport> {
    let file = File::create(out).map_err(|e| Error::io(out, e))?;
    let mut zip = ZipWriter::new(BufWriter::new(file));
    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .compression_level(Some(compression_level));
    zip.set_comment(ARCHIVE_MARK);

    let mut report = CompressReport::default();
    for entry in entries {
        let path = entry.path();
        let Ok(relative) = path.strip_prefix(base) else {
            continue;
        };
        let name = NormalizedPath::new(relative);
        // Follows symlinks, so linked files are stored by content.
        let meta = match fs::metadata(path) {
            Ok(meta) => meta,
            Err(e) if entry.path_is_symlink() && e.kind() == io::ErrorKind::NotFound => {
                report.skipped += 1;
                on_skip(name.as_str(), SkipReason::DanglingLink);
                continue;
            }
            Err(e) => return Err(Error::io(path, e)),
        };

        if meta.is_dir() {
            if entry.file_type().is_symlink() {
                continue;
            }
            zip.add_directory(format!("{name}/"), options)
                .map_err(|e| Error::archive(out, e))?;
            report.dirs += 1;
            continue;
        }
        if !meta.is_file() {
            continue;
        }

        let mut file_options = options.large_file(meta.len() >= u64::from(u32::MAX));
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            file_options = file_options.unix_permissions(meta.permissions().mode());
        }

        zip.start_file(name.as_str(), file_options)
            .map_err(|e| Error::archive(out, e))?;
        let mut source = File::open(path).map_err(|e| Error::io(path, e))?;
        io::copy(&mut source, &mut zip).map_err(|e| Error::io(path, e))?;
        report.files += 1;
    }

    let writer = zip.finish().map_err(|e| Error::archive(out, e))?;
    let file = writer
        .into_inner()
        .map_err(|e| Error::io(out, e.into_error()))?;
    file.sync_all().map_err(|e| Error::io(out, e))?;
    report.archive_len = file.metadata().map_err(|e| Error::io(out, e))?.len();
    Ok(report)
}
