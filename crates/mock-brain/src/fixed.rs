//! Fixed ranker and insight doubles that bypass prompting.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use brain_core::{
    async_trait, BrainError, Insight, InsightGenerator, LearnerProfile, PartnerRanker,
    TranscriptLine,
};

/// A ranker that returns the same ordinals on every call.
///
/// Records the candidate names it was offered so tests can assert on
/// candidate assembly.
#[derive(Debug, Default)]
pub struct FixedRanker {
    ordinals: Vec<usize>,
    calls: AtomicUsize,
    offered: Mutex<Vec<Vec<String>>>,
}

impl FixedRanker {
    pub fn new(ordinals: Vec<usize>) -> Self {
        Self {
            ordinals,
            ..Self::default()
        }
    }

    /// Number of ranking calls made so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Candidate names per call, in offer order.
    pub fn offered(&self) -> Vec<Vec<String>> {
        self.offered
            .lock()
            .map(|offered| offered.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl PartnerRanker for FixedRanker {
    async fn rank(
        &self,
        _requester: &LearnerProfile,
        candidates: &[LearnerProfile],
    ) -> Result<Vec<usize>, BrainError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut offered) = self.offered.lock() {
            offered.push(candidates.iter().map(|c| c.name.clone()).collect());
        }
        Ok(self.ordinals.clone())
    }
}

/// An insight generator with a fixed outcome.
#[derive(Debug, Default)]
pub struct FixedInsight {
    insight: Option<Insight>,
    calls: AtomicUsize,
    transcripts: Mutex<Vec<Vec<TranscriptLine>>>,
}

impl FixedInsight {
    /// Always succeed with `insight`.
    pub fn new(insight: Insight) -> Self {
        Self {
            insight: Some(insight),
            ..Self::default()
        }
    }

    /// Always fail with an invalid-response error.
    pub fn failing() -> Self {
        Self::default()
    }

    /// Number of generate calls made so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Transcripts received, oldest call first.
    pub fn transcripts(&self) -> Vec<Vec<TranscriptLine>> {
        self.transcripts
            .lock()
            .map(|transcripts| transcripts.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl InsightGenerator for FixedInsight {
    async fn generate(&self, transcript: &[TranscriptLine]) -> Result<Insight, BrainError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut transcripts) = self.transcripts.lock() {
            transcripts.push(transcript.to_vec());
        }
        self.insight
            .clone()
            .ok_or_else(|| BrainError::InvalidResponse("no insight configured".to_string()))
    }
}
