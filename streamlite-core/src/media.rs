use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use std::fs::Metadata;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::{MediaError, Result};

/// A cataloged video file.
///
/// `path` is the catalog key. The scanner owns `filename`, `title` (on insert
/// only), `size_bytes` and `modified_at`; the remaining fields belong to the
/// application and are never touched by a scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoRecord {
    /// Store-assigned id.
    pub id: i64,
    /// Normalized path the file was reached through. Unique.
    pub path: PathBuf,
    /// Last path component.
    pub filename: String,
    /// Derived from the filename on insert.
    pub title: String,
    /// File size at the last scan.
    pub size_bytes: u64,
    /// File mtime at the last scan, microsecond precision.
    pub modified_at: DateTime<Utc>,
    /// View counter.
    pub views: i32,
    /// Like counter.
    pub likes: i32,
    /// Length in seconds, 0 when unknown.
    pub duration_seconds: i32,
    /// When the record was first inserted.
    pub created_at: DateTime<Utc>,
}

impl VideoRecord {
    /// True when the on-disk file is newer than what we stored, or its size
    /// changed. Equal size and mtime is the no-op case.
    pub fn needs_refresh(&self, size_bytes: u64, modified_at: DateTime<Utc>) -> bool {
        modified_at > self.modified_at || size_bytes != self.size_bytes
    }
}

/// Insert payload for a newly discovered file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewVideo {
    /// Catalog key.
    pub path: PathBuf,
    /// Last path component.
    pub filename: String,
    /// See [`title_from_filename`].
    pub title: String,
    /// Size on disk.
    pub size_bytes: u64,
    /// Mtime at catalog precision.
    pub modified_at: DateTime<Utc>,
}

impl NewVideo {
    /// Derives `filename` and `title` from `path`.
    pub fn new(path: PathBuf, size_bytes: u64, modified_at: DateTime<Utc>) -> Self {
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let title = title_from_filename(&path);

        Self {
            path,
            filename,
            title,
            size_bytes,
            modified_at,
        }
    }
}

/// Human title for a file: the stem with `_` and `-` turned into spaces.
pub fn title_from_filename(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().replace(['_', '-'], " "))
        .unwrap_or_default()
}

/// Converts a filesystem timestamp to the precision the catalog stores.
///
/// PostgreSQL keeps microseconds, so anything finer is dropped here; comparing
/// a nanosecond mtime against its stored copy would otherwise always report
/// the file as modified.
pub fn catalog_timestamp(time: SystemTime) -> DateTime<Utc> {
    DateTime::<Utc>::from(time).trunc_subsecs(6)
}

/// Modification time of `metadata` at catalog precision.
pub fn modified_at(path: &Path, metadata: &Metadata) -> Result<DateTime<Utc>> {
    metadata
        .modified()
        .map(catalog_timestamp)
        .map_err(|e| MediaError::EntryAccess {
            path: path.to_path_buf(),
            reason: format!("modification time unavailable: {}", e),
        })
}
