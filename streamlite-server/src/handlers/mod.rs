pub mod scan_handlers;
pub mod stream_handlers;
pub mod video_handlers;

use axum::response::Json;
use serde_json::{Value, json};
use tracing::debug;

pub async fn ping_handler() -> Json<Value> {
    debug!("Ping endpoint called");
    Json(json!({
        "status": "ok",
        "message": "StreamLite server is running",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Parses a numeric video id from the path.
pub(crate) fn parse_video_id(raw: &str) -> crate::errors::AppResult<i64> {
    raw.parse::<i64>()
        .map_err(|_| crate::errors::AppError::bad_request(format!("Invalid video id: {}", raw)))
}
