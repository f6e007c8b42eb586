use axum::{
    Json,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::fmt;
use streamlite_core::{MediaError, unsatisfied_content_range};

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
    /// File size to advertise in `Content-Range` on a 416.
    pub unsatisfied_total: Option<u64>,
}

impl AppError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            unsatisfied_total: None,
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::new(StatusCode::SERVICE_UNAVAILABLE, message)
    }

    pub fn range_not_satisfiable(message: impl Into<String>, total: u64) -> Self {
        Self {
            unsatisfied_total: Some(total),
            ..Self::new(StatusCode::RANGE_NOT_SATISFIABLE, message)
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": {
                "message": self.message,
                "status": self.status.as_u16(),
            }
        }));

        let mut response = (self.status, body).into_response();
        if let Some(total) = self.unsatisfied_total
            && let Ok(value) = HeaderValue::from_str(&unsatisfied_content_range(total))
        {
            response.headers_mut().insert(header::CONTENT_RANGE, value);
        }
        response
    }
}

impl From<MediaError> for AppError {
    fn from(err: MediaError) -> Self {
        match err {
            MediaError::NotFound(msg) => Self::not_found(msg),
            MediaError::StreamTargetMissing(path) => {
                Self::not_found(format!("Video file not found: {}", path.display()))
            }
            MediaError::RootUnavailable { .. } => Self::service_unavailable(err.to_string()),
            MediaError::Internal(msg) => Self::internal(msg),
            _ => Self::internal(err.to_string()),
        }
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self::internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn media_errors_map_to_statuses() {
        let cases = [
            (MediaError::NotFound("video 9".into()), StatusCode::NOT_FOUND),
            (
                MediaError::StreamTargetMissing(PathBuf::from("/v/a.mp4")),
                StatusCode::NOT_FOUND,
            ),
            (
                MediaError::RootUnavailable {
                    path: PathBuf::from("/v"),
                    reason: "video directory does not exist".into(),
                },
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (MediaError::Store("boom".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (err, status) in cases {
            assert_eq!(AppError::from(err).status, status);
        }
    }

    #[test]
    fn unsatisfiable_range_carries_content_range() {
        let response = AppError::range_not_satisfiable("bad range", 1000).into_response();

        assert_eq!(response.status(), StatusCode::RANGE_NOT_SATISFIABLE);
        assert_eq!(response.headers()[header::CONTENT_RANGE], "bytes */1000");
    }
}
