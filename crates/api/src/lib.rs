//! MeshMind HTTP API.
//!
//! Thin axum layer over the `matching` services: the [`auth::Caller`]
//! extractor turns gateway identity headers into a `Principal`, handlers
//! call one service each, and [`error::ApiError`] maps failures to status
//! codes with a JSON `{error}` body.

pub mod auth;
pub mod config;
pub mod error;
pub mod routes;
pub mod state;

use axum::Router;
use tower_http::trace::TraceLayer;

pub use config::{Config, ConfigError};
pub use error::ApiError;
pub use state::AppState;

/// The full application with state and request tracing applied.
pub fn app(state: AppState) -> Router {
    routes::router()
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
