//! Match ledger: pairwise matches scoped to a community.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use uuid::Uuid;

use crate::error::{DatabaseError, Result};
use crate::models::{Community, Conversation, Match, MatchStatus, UserSummary};

const MATCH_COLUMNS: &str = "id, user1_id, user2_id, community_id, status, created_at, updated_at";

/// A match seen from one participant, with its community and the partner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchDetails {
    #[serde(rename = "match")]
    pub record: Match,
    pub community: Community,
    pub partner: UserSummary,
}

#[derive(FromRow)]
struct MatchDetailsRow {
    id: String,
    user1_id: String,
    user2_id: String,
    community_id: String,
    status: MatchStatus,
    created_at: String,
    updated_at: String,
    community_name: String,
    community_description: Option<String>,
    community_created_by: Option<String>,
    community_created_at: String,
    partner_id: String,
    partner_name: String,
    partner_email: String,
    partner_image_url: Option<String>,
}

impl From<MatchDetailsRow> for MatchDetails {
    fn from(row: MatchDetailsRow) -> Self {
        Self {
            community: Community {
                id: row.community_id.clone(),
                name: row.community_name,
                description: row.community_description,
                created_by: row.community_created_by,
                created_at: row.community_created_at,
            },
            partner: UserSummary {
                id: row.partner_id,
                name: row.partner_name,
                email: row.partner_email,
                image_url: row.partner_image_url,
            },
            record: Match {
                id: row.id,
                user1_id: row.user1_id,
                user2_id: row.user2_id,
                community_id: row.community_id,
                status: row.status,
                created_at: row.created_at,
                updated_at: row.updated_at,
            },
        }
    }
}

const DETAILS_SELECT: &str = r#"
    SELECT m.id, m.user1_id, m.user2_id, m.community_id, m.status, m.created_at, m.updated_at,
           c.name AS community_name, c.description AS community_description,
           c.created_by AS community_created_by, c.created_at AS community_created_at,
           p.id AS partner_id, p.name AS partner_name, p.email AS partner_email,
           p.image_url AS partner_image_url
    FROM matches m
    INNER JOIN communities c ON c.id = m.community_id
    INNER JOIN users p
        ON p.id = CASE WHEN m.user1_id = ?1 THEN m.user2_id ELSE m.user1_id END
    WHERE (m.user1_id = ?1 OR m.user2_id = ?1)
"#;

/// Create a pending match initiated by `initiator_id`.
///
/// Fails with [`DatabaseError::AlreadyExists`] when the pair already has a
/// non-declined match in the community.
pub async fn create_match(
    pool: &SqlitePool,
    initiator_id: &str,
    partner_id: &str,
    community_id: &str,
) -> Result<Match> {
    let query = format!(
        r#"
        INSERT INTO matches (id, user1_id, user2_id, community_id, status)
        VALUES (?, ?, ?, ?, 'pending')
        RETURNING {MATCH_COLUMNS}
        "#
    );

    let created = sqlx::query_as::<_, Match>(&query)
        .bind(Uuid::new_v4().to_string())
        .bind(initiator_id)
        .bind(partner_id)
        .bind(community_id)
        .fetch_one(pool)
        .await
        .map_err(|e| {
            DatabaseError::from_insert(
                e,
                "Match",
                format!("{}/{}/{}", community_id, initiator_id, partner_id),
            )
        })?;

    Ok(created)
}

/// Get a match by ID.
pub async fn get_match(pool: &SqlitePool, id: &str) -> Result<Match> {
    let query = format!("SELECT {MATCH_COLUMNS} FROM matches WHERE id = ?");

    sqlx::query_as::<_, Match>(&query)
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| DatabaseError::NotFound {
            entity: "Match",
            id: id.to_string(),
        })
}

/// All matches (any status) involving a user within a community.
pub async fn matches_in_community(
    pool: &SqlitePool,
    user_id: &str,
    community_id: &str,
) -> Result<Vec<Match>> {
    let query = format!(
        r#"
        SELECT {MATCH_COLUMNS}
        FROM matches
        WHERE community_id = ?1 AND (user1_id = ?2 OR user2_id = ?2)
        ORDER BY created_at, rowid
        "#
    );

    let found = sqlx::query_as::<_, Match>(&query)
        .bind(community_id)
        .bind(user_id)
        .fetch_all(pool)
        .await?;

    Ok(found)
}

/// Ids of everyone the user has a match record with in a community.
pub async fn paired_user_ids(
    pool: &SqlitePool,
    user_id: &str,
    community_id: &str,
) -> Result<HashSet<String>> {
    let found = matches_in_community(pool, user_id, community_id).await?;
    Ok(found
        .iter()
        .map(|m| m.partner_id(user_id).to_string())
        .collect())
}

/// The most recent match between two users in a community, regardless of
/// who initiated it.
pub async fn find_pair(
    pool: &SqlitePool,
    user_a: &str,
    user_b: &str,
    community_id: &str,
) -> Result<Option<Match>> {
    let query = format!(
        r#"
        SELECT {MATCH_COLUMNS}
        FROM matches
        WHERE community_id = ?1
          AND ((user1_id = ?2 AND user2_id = ?3) OR (user1_id = ?3 AND user2_id = ?2))
        ORDER BY created_at DESC, rowid DESC
        LIMIT 1
        "#
    );

    let found = sqlx::query_as::<_, Match>(&query)
        .bind(community_id)
        .bind(user_a)
        .bind(user_b)
        .fetch_optional(pool)
        .await?;

    Ok(found)
}

/// Matches of a given status involving a user, across communities.
pub async fn list_for_user(
    pool: &SqlitePool,
    user_id: &str,
    status: MatchStatus,
) -> Result<Vec<MatchDetails>> {
    let query = format!("{DETAILS_SELECT} AND m.status = ?2 ORDER BY m.created_at DESC, m.rowid DESC");

    let rows = sqlx::query_as::<_, MatchDetailsRow>(&query)
        .bind(user_id)
        .bind(status)
        .fetch_all(pool)
        .await?;

    Ok(rows.into_iter().map(MatchDetails::from).collect())
}

/// One match seen from a participant. Non-participants get `NotFound`.
pub async fn get_details(pool: &SqlitePool, match_id: &str, user_id: &str) -> Result<MatchDetails> {
    let query = format!("{DETAILS_SELECT} AND m.id = ?2");

    sqlx::query_as::<_, MatchDetailsRow>(&query)
        .bind(user_id)
        .bind(match_id)
        .fetch_optional(pool)
        .await?
        .map(MatchDetails::from)
        .ok_or_else(|| DatabaseError::NotFound {
            entity: "Match",
            id: match_id.to_string(),
        })
}

/// Move a pending match to active and open its conversation.
///
/// Both writes happen in one transaction, so an active match always has
/// exactly one conversation.
pub async fn activate(pool: &SqlitePool, match_id: &str) -> Result<(Match, Conversation)> {
    let mut tx = pool.begin().await?;

    let query = format!(
        r#"
        UPDATE matches
        SET status = 'active', updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
        WHERE id = ? AND status = 'pending'
        RETURNING {MATCH_COLUMNS}
        "#
    );
    let updated = sqlx::query_as::<_, Match>(&query)
        .bind(match_id)
        .fetch_optional(&mut *tx)
        .await?;

    let Some(updated) = updated else {
        tx.rollback().await?;
        return Err(transition_error(pool, match_id).await);
    };

    let conversation = sqlx::query_as::<_, Conversation>(
        r#"
        INSERT INTO conversations (id, match_id)
        VALUES (?, ?)
        RETURNING id, match_id, last_message_at, created_at
        "#,
    )
    .bind(Uuid::new_v4().to_string())
    .bind(&updated.id)
    .fetch_one(&mut *tx)
    .await
    .map_err(|e| DatabaseError::from_insert(e, "Conversation", match_id))?;

    tx.commit().await?;

    tracing::info!(match_id, conversation_id = %conversation.id, "Match activated");
    Ok((updated, conversation))
}

/// Move a pending match to declined.
pub async fn decline(pool: &SqlitePool, match_id: &str) -> Result<Match> {
    let query = format!(
        r#"
        UPDATE matches
        SET status = 'declined', updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
        WHERE id = ? AND status = 'pending'
        RETURNING {MATCH_COLUMNS}
        "#
    );

    let updated = sqlx::query_as::<_, Match>(&query)
        .bind(match_id)
        .fetch_optional(pool)
        .await?;

    match updated {
        Some(updated) => {
            tracing::info!(match_id, "Match declined");
            Ok(updated)
        }
        None => Err(transition_error(pool, match_id).await),
    }
}

/// Explain why a pending-only transition matched no row.
async fn transition_error(pool: &SqlitePool, match_id: &str) -> DatabaseError {
    match get_match(pool, match_id).await {
        Ok(existing) => DatabaseError::InvalidState {
            entity: "Match",
            id: match_id.to_string(),
            state: existing.status.to_string(),
        },
        Err(err) => err,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{test_db, test_user};

    async fn community_with(db: &crate::Database, owner: &str, others: &[&str]) -> String {
        let community = crate::community::create_community(db.pool(), "Web", None, owner)
            .await
            .unwrap();
        for other in others {
            crate::community::join(db.pool(), other, &community.id)
                .await
                .unwrap();
        }
        community.id
    }

    #[tokio::test]
    async fn test_create_match_is_pending() {
        let db = test_db().await;
        let alice = test_user(&db, "alice").await;
        let bob = test_user(&db, "bob").await;
        let community_id = community_with(&db, &alice.id, &[&bob.id]).await;

        let created = create_match(db.pool(), &alice.id, &bob.id, &community_id)
            .await
            .unwrap();
        assert_eq!(created.status, MatchStatus::Pending);
        assert_eq!(created.partner_id(&alice.id), bob.id);
        assert_eq!(created.partner_id(&bob.id), alice.id);
        assert!(created.involves(&bob.id));
    }

    #[tokio::test]
    async fn test_unordered_pair_is_unique_while_live() {
        let db = test_db().await;
        let alice = test_user(&db, "alice").await;
        let bob = test_user(&db, "bob").await;
        let community_id = community_with(&db, &alice.id, &[&bob.id]).await;

        let first = create_match(db.pool(), &alice.id, &bob.id, &community_id)
            .await
            .unwrap();

        // Reversed direction is the same pair
        let result = create_match(db.pool(), &bob.id, &alice.id, &community_id).await;
        assert!(matches!(result, Err(DatabaseError::AlreadyExists { .. })));

        // Declined matches release the pair at the storage level
        decline(db.pool(), &first.id).await.unwrap();
        create_match(db.pool(), &bob.id, &alice.id, &community_id)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_activate_creates_single_conversation() {
        let db = test_db().await;
        let alice = test_user(&db, "alice").await;
        let bob = test_user(&db, "bob").await;
        let community_id = community_with(&db, &alice.id, &[&bob.id]).await;
        let created = create_match(db.pool(), &alice.id, &bob.id, &community_id)
            .await
            .unwrap();

        let (active, conversation) = activate(db.pool(), &created.id).await.unwrap();
        assert_eq!(active.status, MatchStatus::Active);
        assert_eq!(conversation.match_id, created.id);

        // A second activation is rejected and does not open another conversation
        let again = activate(db.pool(), &created.id).await;
        assert!(matches!(again, Err(DatabaseError::InvalidState { .. })));

        let missing = activate(db.pool(), "nope").await;
        assert!(matches!(missing, Err(DatabaseError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_list_for_user_and_details() {
        let db = test_db().await;
        let alice = test_user(&db, "alice").await;
        let bob = test_user(&db, "bob").await;
        let carol = test_user(&db, "carol").await;
        let community_id = community_with(&db, &alice.id, &[&bob.id, &carol.id]).await;

        let with_bob = create_match(db.pool(), &alice.id, &bob.id, &community_id)
            .await
            .unwrap();
        create_match(db.pool(), &carol.id, &alice.id, &community_id)
            .await
            .unwrap();
        activate(db.pool(), &with_bob.id).await.unwrap();

        let pending = list_for_user(db.pool(), &alice.id, MatchStatus::Pending)
            .await
            .unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].partner.name, "carol");
        assert_eq!(pending[0].community.name, "Web");

        let active = list_for_user(db.pool(), &bob.id, MatchStatus::Active)
            .await
            .unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].partner.id, alice.id);

        let details = get_details(db.pool(), &with_bob.id, &bob.id).await.unwrap();
        assert_eq!(details.partner.id, alice.id);

        let outsider = get_details(db.pool(), &with_bob.id, &carol.id).await;
        assert!(matches!(outsider, Err(DatabaseError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_paired_user_ids_and_find_pair() {
        let db = test_db().await;
        let alice = test_user(&db, "alice").await;
        let bob = test_user(&db, "bob").await;
        let carol = test_user(&db, "carol").await;
        let community_id = community_with(&db, &alice.id, &[&bob.id, &carol.id]).await;

        let created = create_match(db.pool(), &bob.id, &alice.id, &community_id)
            .await
            .unwrap();
        decline(db.pool(), &created.id).await.unwrap();

        let paired = paired_user_ids(db.pool(), &alice.id, &community_id)
            .await
            .unwrap();
        assert!(paired.contains(&bob.id));
        assert!(!paired.contains(&carol.id));

        let found = find_pair(db.pool(), &alice.id, &bob.id, &community_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.status, MatchStatus::Declined);
        assert!(find_pair(db.pool(), &alice.id, &carol.id, &community_id)
            .await
            .unwrap()
            .is_none());
    }
}
