//! End-to-end repository lifecycle
//!
//! Exercises the full flow a hosting service drives: config loading ->
//! validity gate -> upload -> extract -> prune -> re-compress -> cleanup.

use assert_fs::prelude::*;
use predicates::prelude::*;
use pretty_assertions::assert_eq;
use repo_fs::NormalizedPath;
use repo_storage::{StorageConfig, StorageManager, StorageTarget};
use repo_test_utils::archive::{ZipFixture, entry_names};

fn write_config(dir: &assert_fs::TempDir, base: &std::path::Path, nested: Option<&str>) -> NormalizedPath {
    let nested_line = nested
        .map(|n| format!("nested_path = \"{n}\"\n"))
        .unwrap_or_default();
    let config = dir.child("storage.toml");
    config
        .write_str(&format!(
            "[target]\nbase_dir = \"{}\"\nowner_id = \"acme\"\nrepo_id = \"widget\"\nversion_id = \"v1\"\n{nested_line}",
            NormalizedPath::new(base)
        ))
        .unwrap();
    NormalizedPath::new(config.path())
}

fn uploaded_zipball() -> Vec<u8> {
    ZipFixture::new()
        .dir("acme-widget-1a2b3c/")
        .dir("acme-widget-1a2b3c/.git/")
        .file("acme-widget-1a2b3c/.git/HEAD", "ref: refs/heads/main\n")
        .file("acme-widget-1a2b3c/.github/workflows/ci.yml", "on: push\n")
        .file("acme-widget-1a2b3c/README.md", "# widget\n")
        .file("acme-widget-1a2b3c/app/src/main.rs", "fn main() {}\n")
        .file("acme-widget-1a2b3c/docs/guide.md", "guide\n")
        .build()
}

#[tokio::test]
async fn full_lifecycle_from_config_file() {
    let temp = assert_fs::TempDir::new().unwrap();
    let base = temp.child("repos/acme/widget");
    let config_path = write_config(&temp, base.path(), None);

    let config = StorageConfig::load(&config_path).unwrap();
    assert_eq!(config.target.version_id(), Some("v1"));
    let manager = config.into_manager().unwrap();

    assert!(manager.is_target_empty_or_absent().await.unwrap());
    manager.save_archive(uploaded_zipball()).await.unwrap();
    assert!(!manager.is_target_empty_or_absent().await.unwrap());

    manager.extract_archive().await.unwrap();
    base.child("README.md").assert("# widget\n");
    base.child("app/src/main.rs").assert(predicate::path::is_file());
    base.child(".git/HEAD").assert(predicate::path::exists());

    manager.prune_vcs_metadata().await.unwrap();
    base.child(".git").assert(predicate::path::missing());
    base.child(".github").assert(predicate::path::missing());

    manager.remove_archive().await.unwrap();
    manager.compress_target().await.unwrap();
    let bytes = std::fs::read(manager.archive_path().to_native()).unwrap();
    assert_eq!(
        entry_names(&bytes),
        vec!["README.md", "app/", "app/src/", "app/src/main.rs", "docs/", "docs/guide.md"]
    );

    let stats = manager.fetch_target_stats().await.unwrap();
    assert!(stats.is_dir());

    manager.remove_target().await.unwrap();
    base.assert(predicate::path::missing());
    assert!(manager.is_target_empty_or_absent().await.unwrap());
}

#[tokio::test]
async fn nested_subtree_is_published_on_its_own() {
    let temp = assert_fs::TempDir::new().unwrap();
    let base = temp.child("repos/acme/widget-app");
    let config = StorageConfig::load(&write_config(&temp, base.path(), Some("app"))).unwrap();
    let manager = config.into_manager().unwrap();

    manager.save_archive(uploaded_zipball()).await.unwrap();
    let report = manager.extract_archive().await.unwrap();

    assert_eq!(report.written, vec![NormalizedPath::new("src/main.rs")]);
    base.child("src/main.rs").assert("fn main() {}\n");
    base.child("README.md").assert(predicate::path::missing());
    base.child("docs").assert(predicate::path::missing());
}

#[tokio::test]
async fn recompressed_archive_round_trips_into_fresh_target() {
    let temp = assert_fs::TempDir::new().unwrap();
    let source = StorageManager::new(
        StorageTarget::new(temp.child("source").path(), "acme", "widget").unwrap(),
    );
    source.save_archive(uploaded_zipball()).await.unwrap();
    source.extract_archive().await.unwrap();
    source.prune_vcs_metadata().await.unwrap();
    source.remove_archive().await.unwrap();
    source.compress_target().await.unwrap();
    let bytes = std::fs::read(source.archive_path().to_native()).unwrap();

    let mirror = StorageManager::new(
        StorageTarget::new(temp.child("mirror").path(), "acme", "widget").unwrap(),
    );
    mirror.save_archive(bytes).await.unwrap();
    mirror.extract_archive().await.unwrap();

    for file in ["README.md", "app/src/main.rs", "docs/guide.md"] {
        let original = std::fs::read(temp.child("source").child(file).path()).unwrap();
        let mirrored = std::fs::read(temp.child("mirror").child(file).path()).unwrap();
        assert_eq!(mirrored, original, "{file}");
    }
}
