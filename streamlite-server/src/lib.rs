//! # StreamLite Server
//!
//! HTTP surface over the StreamLite video catalog: listing, on-demand
//! rescans of the video directory and seekable byte-range streaming.

pub mod errors;
pub mod handlers;
pub mod infra;
pub mod routes;
pub mod stream;

pub use errors::{AppError, AppResult};
pub use infra::app_state::AppState;
pub use infra::config::{Config, ServeArgs};
pub use routes::create_app;
