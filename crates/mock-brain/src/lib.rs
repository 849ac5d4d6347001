//! Mock brain implementations for testing matching and insight flows.
//!
//! This crate provides test doubles for the `brain-core` boundaries:
//! - `ScriptedBrain` - Replies with canned completions and records prompts
//! - `FailingBrain` - Always fails, counting attempts
//! - `DelayedBrain` - Wraps another brain with artificial delay
//! - `FixedRanker` / `FixedInsight` - Skip prompting entirely
//!
//! For production completions, use the `gemini-brain` crate instead.
//!
//! # Example
//!
//! ```rust
//! use mock_brain::{Brain, ScriptedBrain};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), mock_brain::BrainError> {
//!     let brain = ScriptedBrain::new("[1]");
//!
//!     let reply = brain.complete("rank these partners").await?;
//!     assert_eq!(reply, "[1]");
//!     assert_eq!(brain.calls(), 1);
//!     Ok(())
//! }
//! ```

// Mock implementations
mod delayed;
mod failing;
mod fixed;
mod scripted;

// Re-export brain-core types for convenience
pub use brain_core::{
    async_trait, Brain, BrainError, Insight, InsightGenerator, LearnerProfile, PartnerRanker,
    TranscriptLine,
};

// Export mock implementations
pub use delayed::DelayedBrain;
pub use failing::FailingBrain;
pub use fixed::{FixedInsight, FixedRanker};
pub use scripted::ScriptedBrain;
