//! Error types for the HTTP API.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use matching::MatchingError;
use serde_json::json;
use thiserror::Error;

/// Errors returned by API handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing or rejected identity.
    #[error("Unauthorized: {0}")]
    Unauthorized(&'static str),

    /// Service-layer failure.
    #[error(transparent)]
    Matching(#[from] MatchingError),

    /// Storage failure outside the services (identity upsert).
    #[error("Database error: {0}")]
    Database(#[from] database::DatabaseError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::Unauthorized(reason) => {
                tracing::warn!(reason, "Unauthorized request");
                (StatusCode::UNAUTHORIZED, json!({ "error": "Unauthorized" }))
            }
            ApiError::Database(err) => {
                tracing::error!("Database error: {}", err);
                internal()
            }
            ApiError::Matching(err) => match err {
                MatchingError::Validation(_)
                | MatchingError::BadRequest(_)
                | MatchingError::NoMessages => {
                    (StatusCode::BAD_REQUEST, json!({ "error": err.to_string() }))
                }
                MatchingError::QuotaExceeded(usage) => (
                    StatusCode::FORBIDDEN,
                    json!({ "error": err.to_string(), "usage": usage }),
                ),
                MatchingError::NotMember(_) | MatchingError::Forbidden(_) => {
                    (StatusCode::FORBIDDEN, json!({ "error": err.to_string() }))
                }
                MatchingError::NotFound { .. } => {
                    (StatusCode::NOT_FOUND, json!({ "error": err.to_string() }))
                }
                MatchingError::Conflict(_) => {
                    (StatusCode::CONFLICT, json!({ "error": err.to_string() }))
                }
                MatchingError::Upstream(source) => {
                    tracing::error!("Matching upstream error: {}", source);
                    (
                        StatusCode::BAD_GATEWAY,
                        json!({ "error": "Failed to match users" }),
                    )
                }
                MatchingError::Database(source) => {
                    tracing::error!("Database error: {}", source);
                    internal()
                }
            },
        };

        (status, Json(body)).into_response()
    }
}

fn internal() -> (StatusCode, serde_json::Value) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        json!({ "error": "Internal server error" }),
    )
}

/// Result type for API handlers.
pub type Result<T> = std::result::Result<T, ApiError>;
