//! Error types for brain operations.

use thiserror::Error;

/// Errors that can occur while talking to a language model.
#[derive(Debug, Error)]
pub enum BrainError {
    /// The brain is missing required configuration.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The brain is temporarily unavailable.
    #[error("brain unavailable: {0}")]
    Unavailable(String),

    /// Transport-level failure reaching the model.
    #[error("network error: {0}")]
    Network(String),

    /// The model returned an error or an empty completion.
    #[error("processing failed: {0}")]
    ProcessingFailed(String),

    /// The completion did not satisfy the expected reply format.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// The brain has been shut down.
    #[error("brain shut down")]
    ShutDown,

    /// A timeout occurred during processing.
    #[error("processing timed out")]
    Timeout,
}
