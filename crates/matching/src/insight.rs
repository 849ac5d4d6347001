//! Conversation insight for a match participant.

use std::sync::Arc;

use brain_core::{Insight, InsightGenerator, TranscriptLine};
use database::{conversation, matches};
use sqlx::SqlitePool;

use crate::error::{MatchingError, Result};
use crate::principal::Principal;

/// Speaker label for the requester's own lines.
const SELF_LABEL: &str = "Me";

/// Speaker label when the partner has no display name.
const PARTNER_FALLBACK: &str = "Partner";

pub struct InsightService {
    pool: SqlitePool,
    generator: Arc<dyn InsightGenerator>,
}

impl InsightService {
    pub fn new(pool: SqlitePool, generator: Arc<dyn InsightGenerator>) -> Self {
        Self { pool, generator }
    }

    /// Summarize the latest messages of a match.
    ///
    /// Errors only for access problems or an empty conversation. Any
    /// generation or validation failure yields `Ok(None)`.
    pub async fn generate(&self, principal: &Principal, match_id: &str) -> Result<Option<Insight>> {
        let details = matches::get_details(&self.pool, match_id, principal.id()).await?;

        let messages =
            conversation::recent_messages(&self.pool, match_id, conversation::DEFAULT_HISTORY_LIMIT)
                .await?;
        if messages.is_empty() {
            return Err(MatchingError::NoMessages);
        }

        let partner_label = match details.partner.name.trim() {
            "" => PARTNER_FALLBACK,
            name => name,
        };
        let transcript: Vec<TranscriptLine> = messages
            .iter()
            .map(|m| {
                let speaker = if m.sender_id == principal.id() {
                    SELF_LABEL
                } else {
                    partner_label
                };
                TranscriptLine::new(speaker, m.content.as_str())
            })
            .collect();

        match self.generator.generate(&transcript).await {
            Ok(insight) => Ok(Some(insight)),
            Err(e) => {
                tracing::warn!(match_id, error = %e, "Conversation insight unavailable");
                Ok(None)
            }
        }
    }
}
