//! Prompt-driven ranker and insight generator backed by any [`Brain`].

use async_trait::async_trait;

use crate::error::BrainError;
use crate::insight::{build_insight_prompt, parse_insight, Insight, InsightGenerator, TranscriptLine};
use crate::prompt::hash_prompt;
use crate::ranking::{build_ranking_prompt, parse_ranking, LearnerProfile, PartnerRanker};
use crate::trait_def::Brain;

/// Builds prompts, makes exactly one completion call and parses the reply strictly.
pub struct PromptMatchmaker<B: Brain> {
    brain: B,
}

impl<B: Brain> PromptMatchmaker<B> {
    pub fn new(brain: B) -> Self {
        Self { brain }
    }

    /// The wrapped completion backend.
    pub fn brain(&self) -> &B {
        &self.brain
    }
}

#[async_trait]
impl<B: Brain> PartnerRanker for PromptMatchmaker<B> {
    async fn rank(
        &self,
        requester: &LearnerProfile,
        candidates: &[LearnerProfile],
    ) -> Result<Vec<usize>, BrainError> {
        let prompt = build_ranking_prompt(requester, candidates);
        tracing::debug!(
            brain = self.brain.name(),
            candidates = candidates.len(),
            prompt_hash = %hash_prompt(&prompt),
            "Requesting partner ranking"
        );

        let reply = self.brain.complete(&prompt).await?;
        let ordinals = parse_ranking(&reply, candidates.len()).inspect_err(|e| {
            tracing::warn!(brain = self.brain.name(), error = %e, "Rejected ranking reply");
        })?;

        tracing::debug!(?ordinals, "Partner ranking accepted");
        Ok(ordinals)
    }
}

#[async_trait]
impl<B: Brain> InsightGenerator for PromptMatchmaker<B> {
    async fn generate(&self, transcript: &[TranscriptLine]) -> Result<Insight, BrainError> {
        let prompt = build_insight_prompt(transcript);
        tracing::debug!(
            brain = self.brain.name(),
            lines = transcript.len(),
            prompt_hash = %hash_prompt(&prompt),
            "Requesting conversation insight"
        );

        let reply = self.brain.complete(&prompt).await?;
        parse_insight(&reply)
    }
}
