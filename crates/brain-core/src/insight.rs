//! Conversation insight: prompt construction and reply validation.

use std::fmt::Write;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::BrainError;
use crate::prompt::strip_code_fences;

/// Maximum number of topics or action items in an insight.
pub const MAX_INSIGHT_ITEMS: usize = 3;

/// One labelled line of a conversation transcript.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptLine {
    /// `Me` for the requester, otherwise the partner's display name.
    pub speaker: String,
    pub content: String,
}

impl TranscriptLine {
    pub fn new(speaker: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            speaker: speaker.into(),
            content: content.into(),
        }
    }
}

/// Structured summary of a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Insight {
    pub summary: String,
    pub topics: Vec<String>,
    pub action_items: Vec<String>,
}

/// Produces an [`Insight`] from a non-empty transcript.
#[async_trait]
pub trait InsightGenerator: Send + Sync {
    async fn generate(&self, transcript: &[TranscriptLine]) -> Result<Insight, BrainError>;
}

/// Build the insight prompt for a transcript.
pub fn build_insight_prompt(transcript: &[TranscriptLine]) -> String {
    let mut prompt = String::from(
        "Analyze the following conversation between two learning partners.\n\nConversation:\n",
    );

    for line in transcript {
        let _ = writeln!(prompt, "{}: {}", line.speaker, line.content);
    }

    let _ = write!(
        prompt,
        r#"
Provide a concise insight in JSON format with the following fields:
- "summary": A brief 1-2 sentence summary of what they discussed.
- "topics": An array of 1-{max} key topics (strings).
- "actionItems": An array of 1-{max} suggested next steps or action items for them (strings).

Return ONLY valid JSON.
"#,
        max = MAX_INSIGHT_ITEMS,
    );

    prompt
}

fn check_items(field: &str, items: &[String]) -> Result<(), BrainError> {
    if items.is_empty() || items.len() > MAX_INSIGHT_ITEMS {
        return Err(BrainError::InvalidResponse(format!(
            "{field} has {} entries, expected 1-{MAX_INSIGHT_ITEMS}",
            items.len()
        )));
    }
    if items.iter().any(|item| item.trim().is_empty()) {
        return Err(BrainError::InvalidResponse(format!(
            "{field} contains an empty entry"
        )));
    }
    Ok(())
}

/// Parse an insight reply, tolerating a surrounding code fence.
///
/// The summary must be non-empty; topics and action items must each hold
/// 1 to [`MAX_INSIGHT_ITEMS`] non-empty strings.
pub fn parse_insight(reply: &str) -> Result<Insight, BrainError> {
    let json_text = strip_code_fences(reply);

    let insight: Insight = serde_json::from_str(json_text)
        .map_err(|e| BrainError::InvalidResponse(format!("insight is not valid JSON: {e}")))?;

    if insight.summary.trim().is_empty() {
        return Err(BrainError::InvalidResponse(
            "insight summary is empty".to_string(),
        ));
    }
    check_items("topics", &insight.topics)?;
    check_items("actionItems", &insight.action_items)?;

    Ok(insight)
}
