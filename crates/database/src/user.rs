//! User persistence: identity upserts, lookups, search and stats.

use sqlx::SqlitePool;
use uuid::Uuid;

use crate::error::{DatabaseError, Result};
use crate::models::{IdentityProfile, User, UserStats, UserSummary};
use crate::search::fold_case;

/// Maximum number of rows returned by [`search_users`].
pub const SEARCH_LIMIT: i64 = 10;

/// Create or refresh the user linked to an identity-provider account.
///
/// Keyed by `external_id`; repeated calls update email, name and avatar and
/// keep the internal id stable.
pub async fn upsert_identity(pool: &SqlitePool, profile: &IdentityProfile) -> Result<User> {
    let user = sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (id, external_id, email, name, image_url, name_folded, email_folded)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT(external_id) DO UPDATE SET
            email = excluded.email,
            name = excluded.name,
            image_url = excluded.image_url,
            name_folded = excluded.name_folded,
            email_folded = excluded.email_folded,
            updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
        RETURNING id, external_id, email, name, image_url, created_at, updated_at
        "#,
    )
    .bind(Uuid::new_v4().to_string())
    .bind(&profile.external_id)
    .bind(&profile.email)
    .bind(&profile.name)
    .bind(&profile.image_url)
    .bind(fold_case(&profile.name))
    .bind(fold_case(&profile.email))
    .fetch_one(pool)
    .await?;

    Ok(user)
}

/// Get a user by internal ID.
pub async fn get_user(pool: &SqlitePool, id: &str) -> Result<User> {
    sqlx::query_as::<_, User>(
        r#"
        SELECT id, external_id, email, name, image_url, created_at, updated_at
        FROM users
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| DatabaseError::NotFound {
        entity: "User",
        id: id.to_string(),
    })
}

/// Get a user by identity-provider id.
pub async fn get_user_by_external_id(pool: &SqlitePool, external_id: &str) -> Result<User> {
    sqlx::query_as::<_, User>(
        r#"
        SELECT id, external_id, email, name, image_url, created_at, updated_at
        FROM users
        WHERE external_id = ?
        "#,
    )
    .bind(external_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| DatabaseError::NotFound {
        entity: "User",
        id: external_id.to_string(),
    })
}

/// Search users by name or email substring (case-insensitive).
///
/// Excludes the searching user and anyone they already have a match with,
/// in any community and any status.
pub async fn search_users(
    pool: &SqlitePool,
    query: &str,
    current_user_id: &str,
) -> Result<Vec<UserSummary>> {
    let users = sqlx::query_as::<_, UserSummary>(
        r#"
        SELECT id, name, email, image_url
        FROM users
        WHERE id <> ?1
          AND id NOT IN (
              SELECT CASE WHEN user1_id = ?1 THEN user2_id ELSE user1_id END
              FROM matches
              WHERE user1_id = ?1 OR user2_id = ?1
          )
          AND (instr(name_folded, ?2) > 0 OR instr(email_folded, ?2) > 0)
        ORDER BY name
        LIMIT ?3
        "#,
    )
    .bind(current_user_id)
    .bind(fold_case(query))
    .bind(SEARCH_LIMIT)
    .fetch_all(pool)
    .await?;

    Ok(users)
}

/// Dashboard counts for a user.
pub async fn user_stats(pool: &SqlitePool, user_id: &str) -> Result<UserStats> {
    let stats = sqlx::query_as::<_, UserStats>(
        r#"
        SELECT
            (SELECT COUNT(*) FROM learning_goals WHERE user_id = ?1) AS goal_count,
            (SELECT COUNT(*) FROM learning_goals WHERE user_id = ?1 AND is_completed = 1)
                AS completed_goal_count,
            (SELECT COUNT(*) FROM community_members WHERE user_id = ?1) AS community_count,
            (SELECT COUNT(*) FROM matches
                WHERE (user1_id = ?1 OR user2_id = ?1) AND status = 'pending')
                AS pending_match_count,
            (SELECT COUNT(*) FROM matches
                WHERE (user1_id = ?1 OR user2_id = ?1) AND status = 'active')
                AS active_match_count
        "#,
    )
    .bind(user_id)
    .fetch_one(pool)
    .await?;

    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{test_db, test_user};

    #[tokio::test]
    async fn test_upsert_identity_is_idempotent() {
        let db = test_db().await;
        let profile = IdentityProfile {
            external_id: "idp|alice".to_string(),
            email: "alice@example.com".to_string(),
            name: "Alice".to_string(),
            image_url: None,
        };

        let first = upsert_identity(db.pool(), &profile).await.unwrap();
        let renamed = IdentityProfile {
            name: "Alice Liddell".to_string(),
            image_url: Some("https://img.example.com/a.png".to_string()),
            ..profile.clone()
        };
        let second = upsert_identity(db.pool(), &renamed).await.unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(second.name, "Alice Liddell");
        assert_eq!(second.image_url.as_deref(), Some("https://img.example.com/a.png"));

        let fetched = get_user_by_external_id(db.pool(), "idp|alice").await.unwrap();
        assert_eq!(fetched.id, first.id);
    }

    #[tokio::test]
    async fn test_get_user_not_found() {
        let db = test_db().await;
        let result = get_user(db.pool(), "missing").await;
        assert!(matches!(result, Err(DatabaseError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_search_users_excludes_self_and_partners() {
        let db = test_db().await;
        let alice = test_user(&db, "alice").await;
        let bob = test_user(&db, "bob").await;
        let _carol = test_user(&db, "carol").await;

        let community = crate::community::create_community(db.pool(), "Rust", None, &alice.id)
            .await
            .unwrap();
        crate::community::join(db.pool(), &bob.id, &community.id)
            .await
            .unwrap();
        crate::matches::create_match(db.pool(), &alice.id, &bob.id, &community.id)
            .await
            .unwrap();

        let results = search_users(db.pool(), "EXAMPLE.com", &alice.id).await.unwrap();
        let names: Vec<_> = results.iter().map(|u| u.name.as_str()).collect();
        assert_eq!(names, vec!["carol"]);
    }

    #[tokio::test]
    async fn test_search_users_folds_non_ascii_case() {
        let db = test_db().await;
        let alice = test_user(&db, "alice").await;
        let profile = IdentityProfile {
            external_id: "idp|elodie".to_string(),
            email: "Élodie.Martin@Example.fr".to_string(),
            name: "Élodie".to_string(),
            image_url: None,
        };
        upsert_identity(db.pool(), &profile).await.unwrap();

        for query in ["Élodie", "élodie", "ÉLODIE", "élodie.martin@example"] {
            let results = search_users(db.pool(), query, &alice.id).await.unwrap();
            assert_eq!(results.len(), 1, "no hit for {query:?}");
            assert_eq!(results[0].name, "Élodie");
        }

        // A rename refreshes the folded copy
        let renamed = IdentityProfile {
            name: "Øyvind".to_string(),
            ..profile
        };
        upsert_identity(db.pool(), &renamed).await.unwrap();
        assert!(search_users(db.pool(), "élodie", &alice.id).await.unwrap().is_empty());
        assert_eq!(search_users(db.pool(), "øYVIND", &alice.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_user_stats() {
        let db = test_db().await;
        let alice = test_user(&db, "alice").await;
        let community = crate::community::create_community(db.pool(), "Go", None, &alice.id)
            .await
            .unwrap();
        let goal = crate::goal::create_goal(
            db.pool(),
            &alice.id,
            &community.id,
            &crate::models::NewGoal {
                title: "Channels".to_string(),
                description: None,
            },
        )
        .await
        .unwrap();
        crate::goal::update_goal(
            db.pool(),
            &goal.id,
            &crate::models::GoalUpdate {
                is_completed: Some(true),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let stats = user_stats(db.pool(), &alice.id).await.unwrap();
        assert_eq!(stats.goal_count, 1);
        assert_eq!(stats.completed_goal_count, 1);
        assert_eq!(stats.community_count, 1);
        assert_eq!(stats.pending_match_count, 0);
    }
}
