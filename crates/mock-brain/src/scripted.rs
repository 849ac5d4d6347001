//! Scripted brain implementation - replies from a fixed script.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use brain_core::{async_trait, Brain, BrainError};

/// A brain that answers from a script and records every prompt it receives.
///
/// Replies are consumed in order; once the script runs out the last reply is
/// repeated.
#[derive(Debug, Default)]
pub struct ScriptedBrain {
    script: Mutex<VecDeque<String>>,
    last: Mutex<Option<String>>,
    prompts: Mutex<Vec<String>>,
    calls: AtomicUsize,
}

impl ScriptedBrain {
    /// Create a brain that always gives the same reply.
    pub fn new(reply: impl Into<String>) -> Self {
        Self::sequence([reply.into()])
    }

    /// Create a brain that gives the replies in order.
    ///
    /// # Example
    ///
    /// ```rust
    /// use mock_brain::ScriptedBrain;
    ///
    /// let brain = ScriptedBrain::sequence(["[1]", "[]"]);
    /// // First call answers "[1]", every later call answers "[]"
    /// ```
    pub fn sequence<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            script: Mutex::new(replies.into_iter().map(Into::into).collect()),
            ..Self::default()
        }
    }

    /// Number of completion calls made so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Every prompt received, oldest first.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts
            .lock()
            .map(|prompts| prompts.clone())
            .unwrap_or_default()
    }

    fn next_reply(&self) -> Option<String> {
        let mut script = self.script.lock().ok()?;
        let mut last = self.last.lock().ok()?;
        if let Some(reply) = script.pop_front() {
            *last = Some(reply);
        }
        last.clone()
    }
}

#[async_trait]
impl Brain for ScriptedBrain {
    async fn complete(&self, prompt: &str) -> Result<String, BrainError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.to_string());
        }

        self.next_reply()
            .ok_or_else(|| BrainError::ProcessingFailed("script is empty".to_string()))
    }

    fn name(&self) -> &str {
        "ScriptedBrain"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_single_reply_repeats() {
        let brain = ScriptedBrain::new("[2]");

        assert_eq!(brain.complete("a").await.unwrap(), "[2]");
        assert_eq!(brain.complete("b").await.unwrap(), "[2]");
        assert_eq!(brain.calls(), 2);
        assert_eq!(brain.prompts(), vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_sequence_then_last() {
        let brain = ScriptedBrain::sequence(["first", "second"]);

        assert_eq!(brain.complete("1").await.unwrap(), "first");
        assert_eq!(brain.complete("2").await.unwrap(), "second");
        assert_eq!(brain.complete("3").await.unwrap(), "second");
    }

    #[tokio::test]
    async fn test_empty_script_fails() {
        let brain = ScriptedBrain::sequence(Vec::<String>::new());

        assert!(brain.complete("x").await.is_err());
        assert_eq!(brain.calls(), 1);
    }
}
