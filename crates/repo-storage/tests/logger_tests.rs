//! The injected logger sees every operation; nothing is printed globally.

use repo_storage::{NullLogger, StorageEvent, StorageLogger, StorageManager, StorageTarget};
use repo_test_utils::archive::ZipFixture;
use repo_test_utils::store::TestStore;
use std::sync::{Arc, Mutex};

#[derive(Debug, Default)]
struct RecordingLogger {
    events: Mutex<Vec<String>>,
}

impl RecordingLogger {
    fn kinds(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }
}

impl StorageLogger for RecordingLogger {
    fn log(&self, target: &StorageTarget, event: StorageEvent<'_>) {
        assert_eq!(target.repo_id(), "repo1");
        let kind = match event {
            StorageEvent::Checking { .. } => "checking".to_string(),
            StorageEvent::Saving { bytes, .. } => format!("saving:{bytes}"),
            StorageEvent::Saved { .. } => "saved".to_string(),
            StorageEvent::FetchingStats { .. } => "stats".to_string(),
            StorageEvent::Extracting { .. } => "extracting".to_string(),
            StorageEvent::EntrySkipped { name, reason } => format!("skip:{name}:{reason}"),
            StorageEvent::Extracted { written, skipped } => {
                format!("extracted:{written}:{skipped}")
            }
            StorageEvent::Pruning { path } => format!("pruning:{}", path.file_name().unwrap_or("")),
            StorageEvent::Compressing { .. } => "compressing".to_string(),
            StorageEvent::Compressed { files, dirs, .. } => format!("compressed:{files}:{dirs}"),
            StorageEvent::RemovingTarget { .. } => "removing-target".to_string(),
            StorageEvent::RemovingArchive { .. } => "removing-archive".to_string(),
        };
        self.events.lock().unwrap().push(kind);
    }
}

#[tokio::test]
async fn lifecycle_events_reach_the_injected_logger() {
    let store = TestStore::new();
    let logger = Arc::new(RecordingLogger::default());
    let manager = StorageManager::new(
        StorageTarget::builder(store.base(), "acme", "repo1")
            .nested_path("app")
            .build()
            .unwrap(),
    )
    .with_logger(logger.clone());
    let bytes = ZipFixture::new()
        .file("root/app/a.txt", "a")
        .file("root/other/b.txt", "b")
        .build();
    let len = bytes.len();

    manager.is_target_empty_or_absent().await.unwrap();
    manager.save_archive(bytes).await.unwrap();
    manager.extract_archive().await.unwrap();
    store.write_files(&[(".git/HEAD", "ref")]);
    manager.prune_vcs_metadata().await.unwrap();
    manager.compress_target().await.unwrap();
    manager.remove_archive().await.unwrap();
    manager.remove_target().await.unwrap();

    assert_eq!(
        logger.kinds(),
        vec![
            "checking".to_string(),
            format!("saving:{len}"),
            "saved".to_string(),
            "extracting".to_string(),
            "skip:root/other/b.txt:outside nested path".to_string(),
            "extracted:1:1".to_string(),
            "pruning:.git".to_string(),
            "compressing".to_string(),
            "compressed:1:0".to_string(),
            "removing-archive".to_string(),
            "removing-target".to_string(),
        ]
    );
}

#[tokio::test]
async fn null_logger_is_silent_and_harmless() {
    let store = TestStore::new();
    let manager = StorageManager::new(StorageTarget::new(store.base(), "acme", "repo1").unwrap())
        .with_logger(Arc::new(NullLogger));

    assert!(manager.is_target_empty_or_absent().await.unwrap());
    manager.remove_target().await.unwrap();
}

#[cfg(unix)]
#[tokio::test]
async fn compress_reports_dangling_symlink_as_skipped() {
    let store = TestStore::new();
    store.write_files(&[("a.txt", "a")]);
    std::os::unix::fs::symlink(store.base().join("missing"), store.base().join("link")).unwrap();
    let logger = Arc::new(RecordingLogger::default());
    let manager = StorageManager::new(StorageTarget::new(store.base(), "acme", "repo1").unwrap())
        .with_logger(logger.clone());

    manager.compress_target().await.unwrap();

    assert_eq!(
        logger.kinds(),
        vec![
            "compressing".to_string(),
            "skip:link:dangling symlink".to_string(),
            "compressed:1:0".to_string(),
        ]
    );
}
