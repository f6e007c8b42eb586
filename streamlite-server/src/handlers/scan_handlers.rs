use axum::{extract::State, response::Json};
use serde::Serialize;
use streamlite_core::{MediaError, ScanReport, SkippedEntry};
use tracing::{info, warn};

use crate::errors::{AppError, AppResult};
use crate::infra::app_state::AppState;

#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    pub status: &'static str,
    pub added: usize,
    pub updated: usize,
    pub removed: usize,
    pub found: usize,
    pub cleanup_performed: bool,
    pub skipped: Vec<SkippedEntry>,
}

impl From<ScanReport> for RefreshResponse {
    fn from(report: ScanReport) -> Self {
        Self {
            status: "success",
            added: report.added,
            updated: report.updated,
            removed: report.removed,
            found: report.found,
            cleanup_performed: report.cleanup_performed,
            skipped: report.skipped,
        }
    }
}

/// Runs one scan of the video directory and reports what changed.
pub async fn refresh_videos_handler(
    State(state): State<AppState>,
) -> AppResult<Json<RefreshResponse>> {
    info!("Refreshing video directory scan");

    match state.refresh_catalog().await {
        Ok(report) => Ok(Json(report.into())),
        Err(err @ MediaError::RootUnavailable { .. }) => {
            warn!(error = %err, "Video directory unavailable");
            Err(err.into())
        }
        Err(err) => {
            warn!(error = %err, "Error during video refresh");
            Err(AppError::internal("Failed to refresh videos"))
        }
    }
}
