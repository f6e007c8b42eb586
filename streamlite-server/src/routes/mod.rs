use axum::{
    Router,
    http::{HeaderValue, Method, header},
    routing::{get, post},
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use tracing::warn;

use crate::handlers::{
    ping_handler,
    scan_handlers::refresh_videos_handler,
    stream_handlers::stream_video_handler,
    video_handlers::{get_video_handler, list_videos_handler},
};
use crate::infra::{app_state::AppState, config::Config};

/// Routes served under `/api`.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/videos", get(list_videos_handler))
        .route("/videos/refresh", post(refresh_videos_handler))
        .route("/videos/{id}", get(get_video_handler))
        .route("/videos/{id}/stream", get(stream_video_handler))
}

pub fn create_app(state: AppState) -> Router {
    let cors_layer = cors_layer(state.config());

    Router::new()
        .route("/ping", get(ping_handler))
        .nest("/api", api_routes())
        .layer(cors_layer)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(config: &Config) -> CorsLayer {
    if config.cors_permissive() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = config
        .cors_allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::RANGE])
        .expose_headers([header::CONTENT_RANGE, header::CONTENT_LENGTH, header::ACCEPT_RANGES])
}
