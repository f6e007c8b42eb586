use axum::{
    extract::{Path, State},
    http::{HeaderMap, header},
    response::Response,
};
use tracing::warn;

use super::parse_video_id;
use crate::errors::{AppError, AppResult};
use crate::infra::app_state::AppState;
use crate::stream::RangeStreamer;

/// Streams a cataloged video, honoring `Range`.
///
/// The path is resolved from the catalog once; after that the response reads
/// straight from the open file, so a concurrent scan removing the record does
/// not affect a stream already in flight.
pub async fn stream_video_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> AppResult<Response> {
    let id = parse_video_id(&id)?;

    let video = state
        .catalog
        .get_by_id(id)
        .await
        .map_err(|e| {
            warn!(id, error = %e, "Error fetching video filepath");
            AppError::internal("Failed to fetch video")
        })?
        .ok_or_else(|| AppError::not_found("Video not found"))?;

    // A non-UTF-8 Range value is unsatisfiable, not absent.
    let range = headers
        .get(header::RANGE)
        .map(|value| value.to_str().unwrap_or_default());

    RangeStreamer::open(&video.path).await?.serve(range).await
}
