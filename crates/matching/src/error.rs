//! Error types for matching services.

use brain_core::BrainError;
use database::{DatabaseError, ValidationError};
use thiserror::Error;

use crate::usage::UsageSnapshot;

/// Errors that can occur in the matching services.
#[derive(Debug, Error)]
pub enum MatchingError {
    /// User input failed validation.
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// Request is well-formed but not acceptable.
    #[error("{0}")]
    BadRequest(String),

    /// Standard-tier user has used up their matching quota.
    #[error("AI match limit reached")]
    QuotaExceeded(UsageSnapshot),

    /// Requester does not belong to the community.
    #[error("not a member of community {0}")]
    NotMember(String),

    /// Requester may not touch this resource.
    #[error("{0}")]
    Forbidden(String),

    /// Resource missing, or not visible to the requester.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// Resource exists or is in a state that forbids the change.
    #[error("{0}")]
    Conflict(String),

    /// The language model failed or returned an unusable reply.
    #[error("failed to match users: {0}")]
    Upstream(#[source] BrainError),

    /// Insight requested for a conversation without messages.
    #[error("conversation has no messages")]
    NoMessages,

    /// Storage failure.
    #[error("database error: {0}")]
    Database(#[source] DatabaseError),
}

impl From<DatabaseError> for MatchingError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::NotFound { entity, id } => MatchingError::NotFound { entity, id },
            DatabaseError::AlreadyExists { entity, id } => {
                MatchingError::Conflict(format!("{entity} already exists: {id}"))
            }
            DatabaseError::InvalidState { entity, id, state } => {
                MatchingError::Conflict(format!("{entity} {id} is {state}"))
            }
            other => MatchingError::Database(other),
        }
    }
}

/// Result type for matching services.
pub type Result<T> = std::result::Result<T, MatchingError>;
