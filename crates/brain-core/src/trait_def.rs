//! The Brain trait definition.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::BrainError;

/// A text-completion backend: one prompt in, one completion out.
///
/// Implementations can range from scripted test doubles to hosted models.
/// This trait is object-safe and can be used with `Arc<dyn Brain>`.
#[async_trait]
pub trait Brain: Send + Sync {
    /// Complete a single prompt.
    ///
    /// # Arguments
    ///
    /// * `prompt` - The full prompt text, sent as one user message.
    ///
    /// # Returns
    ///
    /// The raw completion text, or an error if the call failed.
    async fn complete(&self, prompt: &str) -> Result<String, BrainError>;

    /// Get a human-readable name for this brain implementation.
    fn name(&self) -> &str;

    /// Check if the brain is ready to process prompts.
    ///
    /// Default implementation always returns true.
    async fn is_ready(&self) -> bool {
        true
    }

    /// Gracefully shut down the brain.
    ///
    /// Default implementation does nothing.
    async fn shutdown(&self) -> Result<(), BrainError> {
        Ok(())
    }
}

#[async_trait]
impl<B: Brain + ?Sized> Brain for Arc<B> {
    async fn complete(&self, prompt: &str) -> Result<String, BrainError> {
        (**self).complete(prompt).await
    }

    fn name(&self) -> &str {
        (**self).name()
    }

    async fn is_ready(&self) -> bool {
        (**self).is_ready().await
    }

    async fn shutdown(&self) -> Result<(), BrainError> {
        (**self).shutdown().await
    }
}
