use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;

use super::CatalogStore;
use crate::{MediaError, NewVideo, Result, VideoRecord};

/// Catalog kept in process memory. Used when no database is configured and
/// throughout the test suites.
#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    inner: RwLock<State>,
}

#[derive(Debug, Default)]
struct State {
    next_id: i64,
    by_path: HashMap<PathBuf, VideoRecord>,
}

impl InMemoryCatalog {
    /// Empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records.
    pub async fn len(&self) -> usize {
        self.inner.read().await.by_path.len()
    }

    /// True when no video is cataloged.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl CatalogStore for InMemoryCatalog {
    async fn find_by_path(&self, path: &Path) -> Result<Option<VideoRecord>> {
        Ok(self.inner.read().await.by_path.get(path).cloned())
    }

    async fn insert(&self, video: NewVideo) -> Result<VideoRecord> {
        let mut state = self.inner.write().await;

        if let Some(existing) = state.by_path.get_mut(&video.path) {
            existing.size_bytes = video.size_bytes;
            existing.modified_at = video.modified_at;
            return Ok(existing.clone());
        }

        state.next_id += 1;
        let record = VideoRecord {
            id: state.next_id,
            path: video.path.clone(),
            filename: video.filename,
            title: video.title,
            size_bytes: video.size_bytes,
            modified_at: video.modified_at,
            views: 0,
            likes: 0,
            duration_seconds: 0,
            created_at: Utc::now(),
        };
        state.by_path.insert(video.path, record.clone());
        Ok(record)
    }

    async fn update_metadata(
        &self,
        path: &Path,
        size_bytes: u64,
        modified_at: DateTime<Utc>,
    ) -> Result<()> {
        let mut state = self.inner.write().await;
        let record = state
            .by_path
            .get_mut(path)
            .ok_or_else(|| MediaError::NotFound(path.display().to_string()))?;
        record.size_bytes = size_bytes;
        record.modified_at = modified_at;
        Ok(())
    }

    async fn delete(&self, path: &Path) -> Result<()> {
        self.inner.write().await.by_path.remove(path);
        Ok(())
    }

    async fn list_all_paths(&self) -> Result<Vec<PathBuf>> {
        Ok(self.inner.read().await.by_path.keys().cloned().collect())
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<VideoRecord>> {
        Ok(self
            .inner
            .read()
            .await
            .by_path
            .values()
            .find(|record| record.id == id)
            .cloned())
    }

    async fn list_videos(&self) -> Result<Vec<VideoRecord>> {
        let mut videos: Vec<_> = self.inner.read().await.by_path.values().cloned().collect();
        videos.sort_by(|a, b| {
            b.modified_at
                .cmp(&a.modified_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(videos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn video(path: &str, size: u64, day: u32) -> NewVideo {
        NewVideo::new(
            PathBuf::from(path),
            size,
            Utc.with_ymd_and_hms(2024, 1, day, 0, 0, 0).unwrap(),
        )
    }

    #[tokio::test]
    async fn insert_assigns_ids_and_is_keyed_by_path() {
        let catalog = InMemoryCatalog::new();
        let a = catalog.insert(video("/v/a.mp4", 1, 1)).await.unwrap();
        let b = catalog.insert(video("/v/b.mp4", 2, 2)).await.unwrap();
        let a_again = catalog.insert(video("/v/a.mp4", 10, 3)).await.unwrap();

        assert_ne!(a.id, b.id);
        assert_eq!(a.id, a_again.id);
        assert_eq!(a_again.size_bytes, 10);
        assert_eq!(catalog.len().await, 2);
    }

    #[tokio::test]
    async fn update_delete_and_lookup() {
        let catalog = InMemoryCatalog::new();
        let record = catalog.insert(video("/v/a.mp4", 1, 1)).await.unwrap();
        let later = Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap();

        catalog
            .update_metadata(Path::new("/v/a.mp4"), 99, later)
            .await
            .unwrap();
        let found = catalog.get_by_id(record.id).await.unwrap().unwrap();
        assert_eq!(found.size_bytes, 99);
        assert_eq!(found.modified_at, later);

        catalog.delete(Path::new("/v/a.mp4")).await.unwrap();
        assert!(catalog.find_by_path(Path::new("/v/a.mp4")).await.unwrap().is_none());
        assert!(catalog.is_empty().await);
    }

    #[tokio::test]
    async fn updating_unknown_path_is_not_found() {
        let catalog = InMemoryCatalog::new();
        let result = catalog
            .update_metadata(Path::new("/v/missing.mp4"), 1, Utc::now())
            .await;

        assert!(matches!(result, Err(MediaError::NotFound(_))));
    }

    #[tokio::test]
    async fn list_videos_orders_newest_first() {
        let catalog = InMemoryCatalog::new();
        catalog.insert(video("/v/old.mp4", 1, 1)).await.unwrap();
        catalog.insert(video("/v/new.mp4", 1, 9)).await.unwrap();
        catalog.insert(video("/v/mid.mp4", 1, 5)).await.unwrap();

        let names: Vec<_> = catalog
            .list_videos()
            .await
            .unwrap()
            .into_iter()
            .map(|v| v.filename)
            .collect();

        assert_eq!(names, ["new.mp4", "mid.mp4", "old.mp4"]);
    }
}
