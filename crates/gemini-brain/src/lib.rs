//! Gemini-based brain implementation.
//!
//! Sends each prompt as a single user message to Gemini's OpenAI-compatible
//! chat-completions endpoint and returns the first choice's text. No
//! streaming, no tools, no conversation history.
//!
//! # Usage
//!
//! ```rust,no_run
//! use gemini_brain::GeminiBrain;
//! use brain_core::Brain;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let brain = GeminiBrain::from_env()?;
//!     let reply = brain.complete("Say hello").await?;
//!     println!("{reply}");
//!     Ok(())
//! }
//! ```

mod api_types;
mod brain;
mod config;

pub use brain::GeminiBrain;
pub use config::{GeminiBrainConfig, GeminiBrainConfigBuilder};

// Re-export brain-core types for convenience
pub use brain_core::{async_trait, Brain, BrainError};
