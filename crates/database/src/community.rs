//! Communities and membership.

use sqlx::SqlitePool;
use uuid::Uuid;

use crate::error::{DatabaseError, Result};
use crate::models::{Community, CommunityPage, Membership, User};
use crate::search::fold_case;

/// Create a community and enrol its creator as the first member.
pub async fn create_community(
    pool: &SqlitePool,
    name: &str,
    description: Option<&str>,
    creator_id: &str,
) -> Result<Community> {
    let mut tx = pool.begin().await?;

    let community = sqlx::query_as::<_, Community>(
        r#"
        INSERT INTO communities (id, name, description, created_by, name_folded)
        VALUES (?, ?, ?, ?, ?)
        RETURNING id, name, description, created_by, created_at
        "#,
    )
    .bind(Uuid::new_v4().to_string())
    .bind(name)
    .bind(description)
    .bind(creator_id)
    .bind(fold_case(name))
    .fetch_one(&mut *tx)
    .await
    .map_err(|e| DatabaseError::from_insert(e, "Community", name))?;

    sqlx::query(
        r#"
        INSERT INTO community_members (id, user_id, community_id)
        VALUES (?, ?, ?)
        "#,
    )
    .bind(Uuid::new_v4().to_string())
    .bind(creator_id)
    .bind(&community.id)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    tracing::info!(community_id = %community.id, name, "Community created");
    Ok(community)
}

/// Get a community by ID.
pub async fn get_community(pool: &SqlitePool, id: &str) -> Result<Community> {
    sqlx::query_as::<_, Community>(
        r#"
        SELECT id, name, description, created_by, created_at
        FROM communities
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| DatabaseError::NotFound {
        entity: "Community",
        id: id.to_string(),
    })
}

/// One page of communities ordered by name.
///
/// `query` filters by case-insensitive name substring; blank means all.
/// `limit` must be positive and `offset` non-negative.
pub async fn list_communities(
    pool: &SqlitePool,
    query: Option<&str>,
    limit: i64,
    offset: i64,
) -> Result<CommunityPage> {
    let folded = query
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .map(fold_case);

    // One extra row tells us whether another page exists
    let mut items = sqlx::query_as::<_, Community>(
        r#"
        SELECT id, name, description, created_by, created_at
        FROM communities
        WHERE ?1 IS NULL OR instr(name_folded, ?1) > 0
        ORDER BY name_folded, id
        LIMIT ?2 OFFSET ?3
        "#,
    )
    .bind(folded)
    .bind(limit + 1)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    let next_offset = if items.len() as i64 > limit {
        items.truncate(limit as usize);
        Some(offset + limit)
    } else {
        None
    };

    Ok(CommunityPage { items, next_offset })
}

/// Add a user to a community.
pub async fn join(pool: &SqlitePool, user_id: &str, community_id: &str) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO community_members (id, user_id, community_id)
        VALUES (?, ?, ?)
        "#,
    )
    .bind(Uuid::new_v4().to_string())
    .bind(user_id)
    .bind(community_id)
    .execute(pool)
    .await
    .map_err(|e| {
        DatabaseError::from_insert(e, "Membership", format!("{}/{}", user_id, community_id))
    })?;

    Ok(())
}

/// Check whether a user belongs to a community.
pub async fn is_member(pool: &SqlitePool, user_id: &str, community_id: &str) -> Result<bool> {
    let found = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*) FROM community_members
        WHERE user_id = ? AND community_id = ?
        "#,
    )
    .bind(user_id)
    .bind(community_id)
    .fetch_one(pool)
    .await?;

    Ok(found > 0)
}

/// List the communities a user has joined.
pub async fn list_memberships(pool: &SqlitePool, user_id: &str) -> Result<Vec<Membership>> {
    let memberships = sqlx::query_as::<_, Membership>(
        r#"
        SELECT m.id AS membership_id, m.user_id, m.joined_at,
               c.id, c.name, c.description, c.created_by, c.created_at
        FROM community_members m
        INNER JOIN communities c ON c.id = m.community_id
        WHERE m.user_id = ?
        ORDER BY m.joined_at, m.rowid
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(memberships)
}

/// List the members of a community, optionally leaving one user out.
///
/// Ordered by join time so candidate numbering is stable across calls.
pub async fn list_members(
    pool: &SqlitePool,
    community_id: &str,
    exclude_user_id: Option<&str>,
) -> Result<Vec<User>> {
    let members = sqlx::query_as::<_, User>(
        r#"
        SELECT u.id, u.external_id, u.email, u.name, u.image_url, u.created_at, u.updated_at
        FROM community_members m
        INNER JOIN users u ON u.id = m.user_id
        WHERE m.community_id = ?1
          AND (?2 IS NULL OR u.id <> ?2)
        ORDER BY m.joined_at, m.rowid
        "#,
    )
    .bind(community_id)
    .bind(exclude_user_id)
    .fetch_all(pool)
    .await?;

    Ok(members)
}
