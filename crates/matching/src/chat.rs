//! Polled chat between partners of an active match.

use database::{conversation, matches, validation, ChatMessage, MatchStatus, Message};
use sqlx::SqlitePool;

use crate::error::{MatchingError, Result};
use crate::principal::Principal;

#[derive(Debug, Clone)]
pub struct ChatService {
    pool: SqlitePool,
}

impl ChatService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// The latest messages of a match, oldest first.
    ///
    /// Empty when the match has not been accepted yet.
    pub async fn list_messages(
        &self,
        principal: &Principal,
        match_id: &str,
    ) -> Result<Vec<ChatMessage>> {
        matches::get_details(&self.pool, match_id, principal.id()).await?;
        let messages =
            conversation::recent_messages(&self.pool, match_id, conversation::DEFAULT_HISTORY_LIMIT)
                .await?;
        Ok(messages)
    }

    /// Post a message to an active match.
    pub async fn send_message(
        &self,
        principal: &Principal,
        match_id: &str,
        content: &str,
    ) -> Result<Message> {
        let content = validation::validate_message_content(content)?;

        let details = matches::get_details(&self.pool, match_id, principal.id()).await?;
        if details.record.status != MatchStatus::Active {
            return Err(MatchingError::Conflict(format!(
                "match is {}, messages need an active match",
                details.record.status
            )));
        }

        let thread = conversation::for_match(&self.pool, match_id)
            .await?
            .ok_or_else(|| MatchingError::Conflict("match has no conversation".to_string()))?;

        let sent =
            conversation::create_message(&self.pool, &thread.id, principal.id(), &content).await?;
        tracing::debug!(match_id, message_id = %sent.id, "Message sent");
        Ok(sent)
    }
}
