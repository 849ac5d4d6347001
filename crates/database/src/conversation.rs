//! Conversations and chat messages.

use sqlx::SqlitePool;
use uuid::Uuid;

use crate::error::{DatabaseError, Result};
use crate::models::{ChatMessage, Conversation, Message};

/// Default number of messages returned for a conversation.
pub const DEFAULT_HISTORY_LIMIT: i64 = 50;

/// The conversation attached to a match, if the match was ever activated.
pub async fn for_match(pool: &SqlitePool, match_id: &str) -> Result<Option<Conversation>> {
    let conversation = sqlx::query_as::<_, Conversation>(
        r#"
        SELECT id, match_id, last_message_at, created_at
        FROM conversations
        WHERE match_id = ?
        "#,
    )
    .bind(match_id)
    .fetch_optional(pool)
    .await?;

    Ok(conversation)
}

/// The most recent `limit` messages of a match's conversation, oldest first.
///
/// Returns an empty list when the match has no conversation.
pub async fn recent_messages(
    pool: &SqlitePool,
    match_id: &str,
    limit: i64,
) -> Result<Vec<ChatMessage>> {
    let messages = sqlx::query_as::<_, ChatMessage>(
        r#"
        SELECT id, content, sender_id, sender_name, created_at
        FROM (
            SELECT m.rowid AS seq, m.id, m.content, m.sender_id,
                   u.name AS sender_name, m.created_at
            FROM messages m
            INNER JOIN conversations c ON c.id = m.conversation_id
            INNER JOIN users u ON u.id = m.sender_id
            WHERE c.match_id = ?
            ORDER BY seq DESC
            LIMIT ?
        )
        ORDER BY seq ASC
        "#,
    )
    .bind(match_id)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(messages)
}

/// Append a message to a conversation and bump its last-message timestamp.
pub async fn create_message(
    pool: &SqlitePool,
    conversation_id: &str,
    sender_id: &str,
    content: &str,
) -> Result<Message> {
    let mut tx = pool.begin().await?;

    let message = sqlx::query_as::<_, Message>(
        r#"
        INSERT INTO messages (id, conversation_id, sender_id, content)
        VALUES (?, ?, ?, ?)
        RETURNING id, conversation_id, sender_id, content, created_at
        "#,
    )
    .bind(Uuid::new_v4().to_string())
    .bind(conversation_id)
    .bind(sender_id)
    .bind(content)
    .fetch_one(&mut *tx)
    .await?;

    let result = sqlx::query(
        r#"
        UPDATE conversations
        SET last_message_at = ?
        WHERE id = ?
        "#,
    )
    .bind(&message.created_at)
    .bind(conversation_id)
    .execute(&mut *tx)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound {
            entity: "Conversation",
            id: conversation_id.to_string(),
        });
    }

    tx.commit().await?;
    Ok(message)
}
