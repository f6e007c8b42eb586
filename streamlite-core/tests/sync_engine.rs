use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use streamlite_core::{
    CatalogStore, InMemoryCatalog, MediaError, NewVideo, Result, SkipKind, SyncEngine,
    VideoRecord, catalog_timestamp, scanner::normalize_path,
};
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

fn write_file(dir: &Path, name: &str, len: usize) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, vec![7u8; len]).unwrap();
    path
}

fn library() -> (TempDir, Arc<InMemoryCatalog>, SyncEngine) {
    let dir = tempfile::tempdir().unwrap();
    let catalog = Arc::new(InMemoryCatalog::new());
    let engine = SyncEngine::new(catalog.clone());
    (dir, catalog, engine)
}

#[tokio::test]
async fn first_scan_catalogs_every_video_with_disk_metadata() {
    let (dir, catalog, engine) = library();
    write_file(dir.path(), "a.mp4", 10);
    write_file(dir.path(), "nested/b.MKV", 20);
    write_file(dir.path(), "nested/deeper/c_clip-one.webm", 30);
    write_file(dir.path(), "notes.txt", 5);

    let report = engine.sync(dir.path()).await.unwrap();

    assert_eq!(report.added, 3);
    assert_eq!(report.updated, 0);
    assert_eq!(report.removed, 0);
    assert_eq!(report.found, 3);
    assert!(report.cleanup_performed);
    assert!(report.skipped.is_empty());

    for (name, size) in [("a.mp4", 10), ("nested/b.MKV", 20), ("nested/deeper/c_clip-one.webm", 30)] {
        let path = normalize_path(&dir.path().join(name));
        let record = catalog.find_by_path(&path).await.unwrap().unwrap();
        let mtime = catalog_timestamp(fs::metadata(&path).unwrap().modified().unwrap());

        assert_eq!(record.size_bytes, size);
        assert_eq!(record.modified_at, mtime);
    }

    let clip = catalog
        .find_by_path(&normalize_path(&dir.path().join("nested/deeper/c_clip-one.webm")))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(clip.filename, "c_clip-one.webm");
    assert_eq!(clip.title, "c clip one");
}

#[tokio::test]
async fn rescan_without_changes_is_a_no_op() {
    let (dir, catalog, engine) = library();
    write_file(dir.path(), "a.mp4", 10);
    write_file(dir.path(), "b.mov", 10);

    engine.sync(dir.path()).await.unwrap();
    let before = catalog.list_videos().await.unwrap();
    let report = engine.sync(dir.path()).await.unwrap();

    assert_eq!((report.added, report.updated, report.removed), (0, 0, 0));
    assert_eq!(catalog.list_videos().await.unwrap(), before);
}

#[tokio::test]
async fn changed_size_or_newer_mtime_updates_in_place() {
    let (dir, catalog, engine) = library();
    let grown = write_file(dir.path(), "grown.mp4", 10);
    let touched = write_file(dir.path(), "touched.mp4", 10);
    engine.sync(dir.path()).await.unwrap();
    let original = catalog
        .find_by_path(&normalize_path(&grown))
        .await
        .unwrap()
        .unwrap();

    fs::write(&grown, vec![1u8; 64]).unwrap();
    let later = SystemTime::now() + Duration::from_secs(3600);
    fs::File::options()
        .write(true)
        .open(&touched)
        .unwrap()
        .set_modified(later)
        .unwrap();

    let report = engine.sync(dir.path()).await.unwrap();

    assert_eq!(report.added, 0);
    assert_eq!(report.updated, 2);
    let updated = catalog
        .find_by_path(&normalize_path(&grown))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.id, original.id);
    assert_eq!(updated.size_bytes, 64);
    let touched = catalog
        .find_by_path(&normalize_path(&touched))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(touched.modified_at, catalog_timestamp(later));
}

#[tokio::test]
async fn deleting_one_file_removes_exactly_its_record() {
    let (dir, catalog, engine) = library();
    write_file(dir.path(), "keep.mp4", 10);
    let gone = write_file(dir.path(), "gone.mp4", 10);
    write_file(dir.path(), "sub/also-keep.avi", 10);
    engine.sync(dir.path()).await.unwrap();

    fs::remove_file(&gone).unwrap();
    let report = engine.sync(dir.path()).await.unwrap();

    assert_eq!(report.removed, 1);
    assert_eq!(catalog.len().await, 2);
    assert!(catalog.find_by_path(&normalize_path(&gone)).await.unwrap().is_none());
}

#[tokio::test]
async fn empty_root_never_wipes_the_catalog() {
    let (dir, catalog, engine) = library();
    let a = write_file(dir.path(), "a.mp4", 10);
    let b = write_file(dir.path(), "b.mp4", 10);
    engine.sync(dir.path()).await.unwrap();

    fs::remove_file(a).unwrap();
    fs::remove_file(b).unwrap();
    let report = engine.sync(dir.path()).await.unwrap();

    assert_eq!(report.removed, 0);
    assert_eq!(report.found, 0);
    assert!(!report.cleanup_performed);
    assert_eq!(catalog.len().await, 2);
}

#[tokio::test]
async fn missing_root_is_reported_and_nothing_changes() {
    let (dir, catalog, engine) = library();
    write_file(dir.path(), "a.mp4", 10);
    engine.sync(dir.path()).await.unwrap();

    let result = engine.sync(dir.path().join("unmounted")).await;

    assert!(matches!(result, Err(MediaError::RootUnavailable { .. })));
    assert_eq!(catalog.len().await, 1);
}

#[tokio::test]
async fn root_that_is_a_file_is_unavailable() {
    let (dir, _catalog, engine) = library();
    let file = write_file(dir.path(), "a.mp4", 10);

    let result = engine.sync(&file).await;

    assert!(matches!(result, Err(MediaError::RootUnavailable { .. })));
}

#[tokio::test]
async fn cancelled_scan_skips_cleanup() {
    let dir = tempfile::tempdir().unwrap();
    let catalog = Arc::new(InMemoryCatalog::new());
    write_file(dir.path(), "a.mp4", 10);
    SyncEngine::new(catalog.clone())
        .sync(dir.path())
        .await
        .unwrap();

    let token = CancellationToken::new();
    token.cancel();
    let report = SyncEngine::new(catalog.clone())
        .with_cancellation(token)
        .sync(dir.path())
        .await
        .unwrap();

    assert!(!report.cleanup_performed);
    assert_eq!(report.removed, 0);
    assert_eq!(catalog.len().await, 1);
}

/// Store that rejects inserts for one file name.
struct RejectingStore {
    inner: InMemoryCatalog,
    reject: &'static str,
}

#[async_trait]
impl CatalogStore for RejectingStore {
    async fn find_by_path(&self, path: &Path) -> Result<Option<VideoRecord>> {
        self.inner.find_by_path(path).await
    }

    async fn insert(&self, video: NewVideo) -> Result<VideoRecord> {
        if video.filename == self.reject {
            return Err(MediaError::Store("constraint violated".into()));
        }
        self.inner.insert(video).await
    }

    async fn update_metadata(
        &self,
        path: &Path,
        size_bytes: u64,
        modified_at: DateTime<Utc>,
    ) -> Result<()> {
        self.inner.update_metadata(path, size_bytes, modified_at).await
    }

    async fn delete(&self, path: &Path) -> Result<()> {
        self.inner.delete(path).await
    }

    async fn list_all_paths(&self) -> Result<Vec<PathBuf>> {
        self.inner.list_all_paths().await
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<VideoRecord>> {
        self.inner.get_by_id(id).await
    }

    async fn list_videos(&self) -> Result<Vec<VideoRecord>> {
        self.inner.list_videos().await
    }
}

#[tokio::test]
async fn store_failure_skips_one_file_and_scan_continues() {
    let dir = tempfile::tempdir().unwrap();
    write_file(dir.path(), "good.mp4", 10);
    let bad = write_file(dir.path(), "bad.mp4", 10);
    write_file(dir.path(), "also-good.mkv", 10);
    let store = Arc::new(RejectingStore {
        inner: InMemoryCatalog::new(),
        reject: "bad.mp4",
    });

    let report = SyncEngine::new(store.clone())
        .sync(dir.path())
        .await
        .unwrap();

    assert_eq!(report.added, 2);
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].kind, SkipKind::Store);
    assert_eq!(report.skipped[0].path, normalize_path(&bad));
    assert_eq!(store.inner.len().await, 2);
}
