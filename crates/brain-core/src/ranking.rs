//! Partner ranking: prompt construction and strict reply parsing.
//!
//! The ranking reply is a JSON array of 1-based candidate ordinals, best
//! first, holding at most [`MAX_PARTNERS`] entries. Anything else rejects the
//! whole reply.

use std::collections::HashSet;
use std::fmt::Write;
use std::sync::OnceLock;

use async_trait::async_trait;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::BrainError;

/// Maximum number of partners a single ranking may return.
pub const MAX_PARTNERS: usize = 3;

/// Locates the first integer array in a reply that may carry prose or fences.
///
/// Negative numbers are captured so they can be rejected instead of skipped.
const ORDINAL_ARRAY_PATTERN: &str = r"\[\s*(?:-?\d+(?:\s*,\s*-?\d+)*)?\s*\]";

/// A learning goal as presented to the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoalSummary {
    pub title: String,
    pub description: Option<String>,
}

impl GoalSummary {
    pub fn new(title: impl Into<String>, description: Option<String>) -> Self {
        Self {
            title: title.into(),
            description,
        }
    }
}

/// A learner and their goals in one community.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LearnerProfile {
    pub user_id: String,
    pub name: String,
    pub goals: Vec<GoalSummary>,
}

/// Ranks candidate partners for a requester.
///
/// Returns 1-based ordinals into `candidates`, best first, already validated:
/// at most [`MAX_PARTNERS`] entries, each in `1..=candidates.len()`, no
/// duplicates.
#[async_trait]
pub trait PartnerRanker: Send + Sync {
    async fn rank(
        &self,
        requester: &LearnerProfile,
        candidates: &[LearnerProfile],
    ) -> Result<Vec<usize>, BrainError>;
}

/// Collapse all whitespace runs, line breaks included, to single spaces so
/// user text cannot start a new line of the prompt layout.
fn one_line(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn write_goal(out: &mut String, indent: &str, goal: &GoalSummary) {
    let title = one_line(&goal.title);
    match goal.description.as_deref().map(one_line) {
        Some(description) if !description.is_empty() => {
            let _ = writeln!(out, "{indent}- {title}: {description}");
        }
        _ => {
            let _ = writeln!(out, "{indent}- {title}");
        }
    }
}

/// Build the ranking prompt for a requester and an ordered candidate list.
///
/// Candidates are numbered from 1 in the order given. The output is a pure
/// function of its inputs.
pub fn build_ranking_prompt(requester: &LearnerProfile, candidates: &[LearnerProfile]) -> String {
    let mut prompt = String::new();

    prompt.push_str(
        "You are a matching assistant for a learning platform. \
         Your job is to match learners with compatible learning partners.\n\n",
    );

    let requester_name = one_line(&requester.name);
    let _ = writeln!(prompt, "Current User: {requester_name}");
    prompt.push_str("Their Learning Goals:\n");
    if requester.goals.is_empty() {
        prompt.push_str("- (no goals listed)\n");
    }
    for goal in &requester.goals {
        write_goal(&mut prompt, "", goal);
    }

    prompt.push_str("\nPotential Partners:\n");
    for (idx, candidate) in candidates.iter().enumerate() {
        let _ = writeln!(prompt, "\n{}. {}", idx + 1, one_line(&candidate.name));
        prompt.push_str("   Goals:\n");
        for goal in &candidate.goals {
            write_goal(&mut prompt, "   ", goal);
        }
    }

    let _ = write!(
        prompt,
        r#"
Task: Analyze the learning goals and identify the top {max} most compatible learning partners for {name}.

Matching criteria:
1. Use semantic similarity. Goals do not need matching titles: "Learn the basics of React" matches "React Hooks deep dive" because both are about React.
2. Read both the title and the description to understand what each person wants to learn.
3. Be inclusive. If there is any reasonable connection between goals, include the partner. Broad overlaps such as "React" and "Web Development" count.
4. If the current user's goals look like test data, gibberish or placeholders (for example "test", "asdf", "hello", "123"), ignore semantic matching and return the first 1-{max} partners.

Return ONLY a JSON array of partner numbers (1-based) ordered by compatibility, with at most {max} entries.
Example: [2, 5, 1] means partner #2 is the best match, then #5, then #1.
Return [] only if the goals are clearly unrelated (for example Cooking vs Coding).
"#,
        max = MAX_PARTNERS,
        name = requester_name,
    );

    prompt
}

fn ordinal_array_pattern() -> Result<&'static Regex, BrainError> {
    static PATTERN: OnceLock<Result<Regex, regex::Error>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(ORDINAL_ARRAY_PATTERN))
        .as_ref()
        .map_err(|e| BrainError::InvalidResponse(format!("ordinal pattern: {e}")))
}

/// Parse and validate a ranking reply against `candidate_count` candidates.
///
/// The first bracketed integer list in the reply is used; without one the
/// whole trimmed reply must parse as JSON. Rejects non-arrays, more than
/// [`MAX_PARTNERS`] entries, non-integers, out-of-range ordinals and
/// duplicates.
pub fn parse_ranking(reply: &str, candidate_count: usize) -> Result<Vec<usize>, BrainError> {
    let trimmed = reply.trim();
    let json_text = match ordinal_array_pattern()?.find(trimmed) {
        Some(found) => found.as_str(),
        None => {
            tracing::warn!("No ordinal array found in ranking reply, parsing whole reply");
            trimmed
        }
    };

    let value: Value = serde_json::from_str(json_text)
        .map_err(|e| BrainError::InvalidResponse(format!("ranking is not valid JSON: {e}")))?;

    let Value::Array(items) = value else {
        return Err(BrainError::InvalidResponse(
            "ranking is not a JSON array".to_string(),
        ));
    };

    if items.len() > MAX_PARTNERS {
        return Err(BrainError::InvalidResponse(format!(
            "ranking has {} entries, max {}",
            items.len(),
            MAX_PARTNERS
        )));
    }

    let mut seen = HashSet::with_capacity(items.len());
    let mut ordinals = Vec::with_capacity(items.len());
    for item in &items {
        let ordinal = item
            .as_u64()
            .and_then(|n| usize::try_from(n).ok())
            .filter(|n| (1..=candidate_count).contains(n))
            .ok_or_else(|| {
                BrainError::InvalidResponse(format!(
                    "ordinal {item} outside 1..={candidate_count}"
                ))
            })?;

        if !seen.insert(ordinal) {
            return Err(BrainError::InvalidResponse(format!(
                "ordinal {ordinal} repeated"
            )));
        }
        ordinals.push(ordinal);
    }

    Ok(ordinals)
}
