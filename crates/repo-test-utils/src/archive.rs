//! In-memory zip fixtures.

use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Builds a zip archive entry by entry, in insertion order.
///
/// ```rust
/// use repo_test_utils::archive::ZipFixture;
///
/// let bytes = ZipFixture::new()
///     .dir("owner-repo-abc123/")
///     .file("owner-repo-abc123/README.md", "# hi")
///     .build();
/// assert!(bytes.starts_with(b"PK"));
/// ```
#[derive(Debug, Default, Clone)]
pub struct ZipFixture {
    entries: Vec<Entry>,
}

#[derive(Debug, Clone)]
enum Entry {
    Dir(String),
    File {
        name: String,
        content: Vec<u8>,
        mode: Option<u32>,
    },
}

impl ZipFixture {
    pub fn new() -> Self {
        Self::default()
    }

    /// A GitHub-style zipball: every file wrapped in `root/`.
    pub fn zipball(root: &str, files: &[(&str, &str)]) -> Self {
        files
            .iter()
            .fold(Self::new().dir(&format!("{root}/")), |fixture, (name, content)| {
                fixture.file(&format!("{root}/{name}"), content)
            })
    }

    pub fn dir(mut self, name: &str) -> Self {
        self.entries.push(Entry::Dir(name.to_string()));
        self
    }

    pub fn file(mut self, name: &str, content: impl AsRef<[u8]>) -> Self {
        self.entries.push(Entry::File {
            name: name.to_string(),
            content: content.as_ref().to_vec(),
            mode: None,
        });
        self
    }

    pub fn file_with_mode(mut self, name: &str, content: impl AsRef<[u8]>, mode: u32) -> Self {
        self.entries.push(Entry::File {
            name: name.to_string(),
            content: content.as_ref().to_vec(),
            mode: Some(mode),
        });
        self
    }

    /// Serialize the archive.
    ///
    /// # Panics
    /// Panics if the zip writer fails.
    pub fn build(&self) -> Vec<u8> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

        for entry in &self.entries {
            match entry {
                Entry::Dir(name) => zip
                    .add_directory(name.as_str(), options)
                    .unwrap_or_else(|e| panic!("ZipFixture: failed to add dir {name}: {e}")),
                Entry::File {
                    name,
                    content,
                    mode,
                } => {
                    let file_options = match mode {
                        Some(mode) => options.unix_permissions(*mode),
                        None => options,
                    };
                    zip.start_file(name.as_str(), file_options)
                        .unwrap_or_else(|e| panic!("ZipFixture: failed to start {name}: {e}"));
                    zip.write_all(content)
                        .unwrap_or_else(|e| panic!("ZipFixture: failed to write {name}: {e}"));
                }
            }
        }

        zip.finish()
            .unwrap_or_else(|e| panic!("ZipFixture: failed to finish archive: {e}"))
            .into_inner()
    }
}

/// Names of all entries in `bytes`, in archive order.
///
/// # Panics
/// Panics if `bytes` is not a readable zip archive.
pub fn entry_names(bytes: &[u8]) -> Vec<String> {
    let archive = zip::ZipArchive::new(Cursor::new(bytes))
        .unwrap_or_else(|e| panic!("entry_names: not a zip archive: {e}"));
    archive.file_names().map(str::to_string).collect()
}
