use axum::{
    extract::{Path, State},
    response::Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use streamlite_core::VideoRecord;
use tracing::warn;

use super::parse_video_id;
use crate::errors::{AppError, AppResult};
use crate::infra::app_state::AppState;

/// Wire form of a catalog record.
#[derive(Debug, Serialize)]
pub struct VideoResponse {
    pub id: i64,
    pub filename: String,
    pub filepath: String,
    pub title: String,
    pub views: i32,
    pub likes: i32,
    pub duration: i32,
    pub file_size: u64,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

impl From<VideoRecord> for VideoResponse {
    fn from(video: VideoRecord) -> Self {
        Self {
            id: video.id,
            filename: video.filename,
            filepath: video.path.to_string_lossy().into_owned(),
            title: video.title,
            views: video.views,
            likes: video.likes,
            duration: video.duration_seconds,
            file_size: video.size_bytes,
            created_at: video.created_at,
            modified_at: video.modified_at,
        }
    }
}

pub async fn list_videos_handler(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<VideoResponse>>> {
    let videos = state.catalog.list_videos().await.map_err(|e| {
        warn!(error = %e, "Error querying videos");
        AppError::internal("Failed to fetch videos")
    })?;

    Ok(Json(videos.into_iter().map(VideoResponse::from).collect()))
}

pub async fn get_video_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<VideoResponse>> {
    let id = parse_video_id(&id)?;

    let video = state
        .catalog
        .get_by_id(id)
        .await
        .map_err(|e| {
            warn!(id, error = %e, "Error fetching video");
            AppError::internal("Failed to fetch video")
        })?
        .ok_or_else(|| AppError::not_found("Video not found"))?;

    Ok(Json(video.into()))
}
