use axum::{
    body::Body,
    http::{StatusCode, header},
    response::Response,
};
use std::io::{self, SeekFrom};
use std::path::{Path, PathBuf};
use streamlite_core::{ByteRange, MediaError, parse_range_header, scanner::content_type_for};
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tokio_util::io::ReaderStream;
use tracing::{debug, info, warn};

use crate::errors::{AppError, AppResult};

/// An opened video file ready to be served, whole or in part.
///
/// The file handle moves into the response body and is closed when the body
/// finishes or the client goes away.
#[derive(Debug)]
pub struct RangeStreamer {
    file: File,
    path: PathBuf,
    total: u64,
    content_type: &'static str,
}

impl RangeStreamer {
    /// Opens `path` for streaming. Missing files are 404, permission
    /// problems 403, anything else 500.
    pub async fn open(path: &Path) -> AppResult<Self> {
        let file = File::open(path)
            .await
            .map_err(|e| open_error(path, e))?;
        let metadata = file.metadata().await.map_err(|e| open_error(path, e))?;

        if !metadata.is_file() {
            return Err(MediaError::StreamTargetMissing(path.to_path_buf()).into());
        }

        Ok(Self {
            file,
            path: path.to_path_buf(),
            total: metadata.len(),
            content_type: content_type_for(path),
        })
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn content_type(&self) -> &'static str {
        self.content_type
    }

    /// Builds the response for an optional `Range` header value.
    ///
    /// No header: 200 with the whole file. A satisfiable range: 206 with
    /// exactly that window. Anything else: 416.
    pub async fn serve(self, range_header: Option<&str>) -> AppResult<Response> {
        let Some(range_header) = range_header else {
            return self.serve_full();
        };

        let range = parse_range_header(range_header, self.total).map_err(|e| {
            debug!(path = %self.path.display(), header = range_header, "Unsatisfiable range");
            AppError::range_not_satisfiable(e.to_string(), self.total)
        })?;

        self.serve_range(range).await
    }

    fn serve_full(self) -> AppResult<Response> {
        info!(path = %self.path.display(), bytes = self.total, "Streaming entire file");

        // Content-Length is fixed at open; a file growing mid-stream must not
        // push the body past it.
        let body = Body::from_stream(ReaderStream::new(self.file.take(self.total)));
        Response::builder()
            .status(StatusCode::OK)
            .header(header::CONTENT_TYPE, self.content_type)
            .header(header::CONTENT_LENGTH, self.total)
            .header(header::ACCEPT_RANGES, "bytes")
            .body(body)
            .map_err(|e| AppError::internal(format!("Failed to build response: {}", e)))
    }

    async fn serve_range(mut self, range: ByteRange) -> AppResult<Response> {
        info!(
            path = %self.path.display(),
            start = range.start,
            end = range.end,
            total = self.total,
            "Serving range"
        );

        self.file
            .seek(SeekFrom::Start(range.start))
            .await
            .map_err(|e| {
                warn!(path = %self.path.display(), error = %e, "Failed to seek in file");
                AppError::internal("Failed to seek in video file")
            })?;

        let body = Body::from_stream(ReaderStream::new(self.file.take(range.len())));
        Response::builder()
            .status(StatusCode::PARTIAL_CONTENT)
            .header(header::CONTENT_TYPE, self.content_type)
            .header(header::CONTENT_LENGTH, range.len())
            .header(header::CONTENT_RANGE, range.content_range(self.total))
            .header(header::ACCEPT_RANGES, "bytes")
            .body(body)
            .map_err(|e| AppError::internal(format!("Failed to build response: {}", e)))
    }
}

fn open_error(path: &Path, err: io::Error) -> AppError {
    match err.kind() {
        io::ErrorKind::NotFound => {
            warn!(path = %path.display(), "Video file missing on disk");
            MediaError::StreamTargetMissing(path.to_path_buf()).into()
        }
        io::ErrorKind::PermissionDenied => {
            warn!(path = %path.display(), "Permission denied opening video file");
            AppError::forbidden("Permission denied")
        }
        _ => {
            warn!(path = %path.display(), error = %err, "Error opening video file");
            AppError::internal("Error opening video file")
        }
    }
}
