use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row, postgres::PgPoolOptions, postgres::PgRow};
use std::path::{Path, PathBuf};
use tracing::info;

use super::CatalogStore;
use crate::{MediaError, NewVideo, Result, VideoRecord};

const VIDEO_COLUMNS: &str = "id, filename, filepath, title, views, likes, duration, \
                             file_size, created_at, modified_at";

/// Catalog stored in the `videos` table of a PostgreSQL database.
#[derive(Debug, Clone)]
pub struct PostgresCatalog {
    pool: PgPool,
}

impl PostgresCatalog {
    /// Connects a new pool. Call [`Self::initialize_schema`] before use.
    pub async fn new(connection_string: &str) -> Result<Self> {
        info!("Connecting to PostgreSQL database");

        let pool = PgPoolOptions::new()
            .max_connections(20)
            .connect(connection_string)
            .await
            .map_err(|e| MediaError::Store(format!("Failed to connect to PostgreSQL: {}", e)))?;

        info!("Successfully connected to PostgreSQL");

        Ok(Self { pool })
    }

    /// Wraps an existing pool.
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Underlying pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Applies pending schema migrations.
    pub async fn initialize_schema(&self) -> Result<()> {
        info!("Running catalog migrations");

        crate::MIGRATOR
            .run(&self.pool)
            .await
            .map_err(|e| MediaError::Store(format!("Migration failed: {}", e)))?;

        Ok(())
    }

    fn row_to_video(row: &PgRow) -> Result<VideoRecord> {
        let filepath: String = row.try_get("filepath").map_err(store_err)?;
        let file_size: i64 = row.try_get("file_size").map_err(store_err)?;

        Ok(VideoRecord {
            id: row.try_get("id").map_err(store_err)?,
            path: PathBuf::from(filepath),
            filename: row.try_get("filename").map_err(store_err)?,
            title: row.try_get("title").map_err(store_err)?,
            size_bytes: u64::try_from(file_size).unwrap_or(0),
            modified_at: row.try_get("modified_at").map_err(store_err)?,
            views: row.try_get("views").map_err(store_err)?,
            likes: row.try_get("likes").map_err(store_err)?,
            duration_seconds: row.try_get("duration").map_err(store_err)?,
            created_at: row.try_get("created_at").map_err(store_err)?,
        })
    }
}

fn store_err(e: sqlx::Error) -> MediaError {
    MediaError::Store(format!("Failed to decode video row: {}", e))
}

/// The `filepath` column is TEXT, so a path that is not UTF-8 has no exact
/// key. Lossy conversion would store a different path than the one on disk.
fn path_key(path: &Path) -> Result<&str> {
    path.to_str()
        .ok_or_else(|| MediaError::Store(format!("Path is not valid UTF-8: {}", path.display())))
}

fn size_column(size_bytes: u64) -> Result<i64> {
    i64::try_from(size_bytes)
        .map_err(|_| MediaError::Store(format!("File size {} does not fit BIGINT", size_bytes)))
}

#[async_trait]
impl CatalogStore for PostgresCatalog {
    async fn find_by_path(&self, path: &Path) -> Result<Option<VideoRecord>> {
        let row = sqlx::query(&format!("SELECT {VIDEO_COLUMNS} FROM videos WHERE filepath = $1"))
            .bind(path_key(path)?)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| MediaError::Store(format!("Failed to look up video by path: {}", e)))?;

        row.as_ref().map(Self::row_to_video).transpose()
    }

    async fn insert(&self, video: NewVideo) -> Result<VideoRecord> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO videos (filename, filepath, title, file_size, modified_at)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (filepath) DO UPDATE
            SET file_size = EXCLUDED.file_size,
                modified_at = EXCLUDED.modified_at
            RETURNING {VIDEO_COLUMNS}
            "#
        ))
        .bind(&video.filename)
        .bind(path_key(&video.path)?)
        .bind(&video.title)
        .bind(size_column(video.size_bytes)?)
        .bind(video.modified_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| MediaError::Store(format!("Failed to insert video {}: {}", video.filename, e)))?;

        Self::row_to_video(&row)
    }

    async fn update_metadata(
        &self,
        path: &Path,
        size_bytes: u64,
        modified_at: DateTime<Utc>,
    ) -> Result<()> {
        let result =
            sqlx::query("UPDATE videos SET file_size = $1, modified_at = $2 WHERE filepath = $3")
                .bind(size_column(size_bytes)?)
                .bind(modified_at)
                .bind(path_key(path)?)
                .execute(&self.pool)
                .await
                .map_err(|e| MediaError::Store(format!("Failed to update video metadata: {}", e)))?;

        if result.rows_affected() == 0 {
            return Err(MediaError::NotFound(path.display().to_string()));
        }
        Ok(())
    }

    async fn delete(&self, path: &Path) -> Result<()> {
        sqlx::query("DELETE FROM videos WHERE filepath = $1")
            .bind(path_key(path)?)
            .execute(&self.pool)
            .await
            .map_err(|e| MediaError::Store(format!("Failed to delete video: {}", e)))?;

        Ok(())
    }

    async fn list_all_paths(&self) -> Result<Vec<PathBuf>> {
        let rows = sqlx::query("SELECT filepath FROM videos")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| MediaError::Store(format!("Failed to list video paths: {}", e)))?;

        rows.iter()
            .map(|row| {
                row.try_get::<String, _>("filepath")
                    .map(PathBuf::from)
                    .map_err(store_err)
            })
            .collect()
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<VideoRecord>> {
        let row = sqlx::query(&format!("SELECT {VIDEO_COLUMNS} FROM videos WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| MediaError::Store(format!("Failed to fetch video: {}", e)))?;

        row.as_ref().map(Self::row_to_video).transpose()
    }

    async fn list_videos(&self) -> Result<Vec<VideoRecord>> {
        let rows = sqlx::query(&format!(
            "SELECT {VIDEO_COLUMNS} FROM videos ORDER BY modified_at DESC, id ASC"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| MediaError::Store(format!("Failed to fetch videos: {}", e)))?;

        rows.iter().map(Self::row_to_video).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn utf8_paths_are_keyed_verbatim() {
        let path = Path::new("/videos/Ünïcode clip.mp4");
        assert_eq!(path_key(path).unwrap(), "/videos/Ünïcode clip.mp4");
    }

    #[cfg(unix)]
    #[test]
    fn non_utf8_paths_have_no_key() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let path = Path::new(OsStr::from_bytes(b"/videos/bad\xff.mp4"));

        assert!(matches!(path_key(path), Err(MediaError::Store(_))));
    }
}
