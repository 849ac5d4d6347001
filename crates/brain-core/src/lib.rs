//! Core traits and types for MeshMind's language-model integrations.
//!
//! This crate provides the shared interface between the matching services
//! and any completion backend. It defines:
//!
//! - [`Brain`] - The trait every completion backend implements
//! - [`PartnerRanker`] / [`InsightGenerator`] - The model-facing boundaries the services call
//! - [`PromptMatchmaker`] - Prompt construction plus strict reply parsing over a [`Brain`]
//! - [`BrainError`] - Error types for brain operations
//!
//! # Example
//!
//! ```rust
//! use brain_core::{async_trait, Brain, BrainError, PromptMatchmaker};
//!
//! struct AlwaysFirst;
//!
//! #[async_trait]
//! impl Brain for AlwaysFirst {
//!     async fn complete(&self, _prompt: &str) -> Result<String, BrainError> {
//!         Ok("[1]".to_string())
//!     }
//!
//!     fn name(&self) -> &str {
//!         "AlwaysFirst"
//!     }
//! }
//!
//! let _ranker = PromptMatchmaker::new(AlwaysFirst);
//! ```

mod error;
pub mod insight;
mod matchmaker;
mod prompt;
pub mod ranking;
mod trait_def;

pub use error::BrainError;
pub use insight::{Insight, InsightGenerator, TranscriptLine};
pub use matchmaker::PromptMatchmaker;
pub use prompt::{hash_prompt, strip_code_fences};
pub use ranking::{GoalSummary, LearnerProfile, PartnerRanker, MAX_PARTNERS};
pub use trait_def::Brain;

// Re-export async_trait for convenience
pub use async_trait::async_trait;
