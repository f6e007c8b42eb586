//! Persisted video catalog.
//!
//! The scanner and the HTTP layer only see [`CatalogStore`]; adapters decide
//! where records live. Every method is one atomic store operation for one
//! path, which is what makes concurrent scans and streams safe without extra
//! locking inside a scan.

/// Process-local catalog
pub mod memory;
/// PostgreSQL catalog
#[cfg(feature = "database")]
pub mod postgres;

pub use memory::InMemoryCatalog;
#[cfg(feature = "database")]
pub use postgres::PostgresCatalog;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};

use crate::{NewVideo, Result, VideoRecord};

/// Storage port for video records, keyed by path.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Record stored under exactly `path`, if any.
    async fn find_by_path(&self, path: &Path) -> Result<Option<VideoRecord>>;

    /// Inserts a newly discovered video. Inserting a path that already exists
    /// refreshes its size and mtime instead of creating a second record.
    async fn insert(&self, video: NewVideo) -> Result<VideoRecord>;

    /// Overwrites size and mtime of an existing record. Fails with
    /// [`MediaError::NotFound`](crate::MediaError::NotFound) for an unknown path.
    async fn update_metadata(
        &self,
        path: &Path,
        size_bytes: u64,
        modified_at: DateTime<Utc>,
    ) -> Result<()>;

    /// Removes the record for `path`. Unknown paths are not an error.
    async fn delete(&self, path: &Path) -> Result<()>;

    /// Every stored path, in no particular order.
    async fn list_all_paths(&self) -> Result<Vec<PathBuf>>;

    /// Record with the given id, if any.
    async fn get_by_id(&self, id: i64) -> Result<Option<VideoRecord>>;

    /// All records, most recently modified first.
    async fn list_videos(&self) -> Result<Vec<VideoRecord>>;
}
