//! Communities and membership checks.

use database::{community, validation, Community, CommunityPage, Membership};
use sqlx::SqlitePool;

use crate::error::{MatchingError, Result};
use crate::principal::Principal;

/// Directory page size when the client gives none.
pub const DEFAULT_PAGE_SIZE: i64 = 10;

/// Largest directory page a client may ask for.
pub const MAX_PAGE_SIZE: i64 = 50;

/// Fail with `NotFound` for an unknown community and `NotMember` when the
/// user does not belong to it.
pub(crate) async fn require_member(
    pool: &SqlitePool,
    user_id: &str,
    community_id: &str,
) -> Result<Community> {
    let found = community::get_community(pool, community_id).await?;
    if !community::is_member(pool, user_id, community_id).await? {
        return Err(MatchingError::NotMember(community_id.to_string()));
    }
    Ok(found)
}

/// Community directory and membership operations.
#[derive(Debug, Clone)]
pub struct CommunityService {
    pool: SqlitePool,
}

impl CommunityService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// One page of the community directory, optionally filtered by name.
    ///
    /// `limit` defaults to [`DEFAULT_PAGE_SIZE`] and is capped at
    /// [`MAX_PAGE_SIZE`].
    pub async fn directory(
        &self,
        query: Option<&str>,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<CommunityPage> {
        let limit = limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);
        let offset = offset.unwrap_or(0);
        if offset < 0 {
            return Err(MatchingError::BadRequest(
                "offset cannot be negative".to_string(),
            ));
        }
        Ok(community::list_communities(&self.pool, query, limit, offset).await?)
    }

    /// The caller's memberships, with their communities.
    pub async fn memberships(&self, principal: &Principal) -> Result<Vec<Membership>> {
        Ok(community::list_memberships(&self.pool, principal.id()).await?)
    }

    /// Create a community; the caller becomes its first member.
    pub async fn create(
        &self,
        principal: &Principal,
        name: &str,
        description: Option<&str>,
    ) -> Result<Community> {
        let name = validation::validate_community_name(name)?;
        let description = validation::validate_description(description)?;

        let created =
            community::create_community(&self.pool, &name, description.as_deref(), principal.id())
                .await?;
        Ok(created)
    }

    /// Join an existing community.
    pub async fn join(&self, principal: &Principal, community_id: &str) -> Result<Community> {
        let found = community::get_community(&self.pool, community_id).await?;
        community::join(&self.pool, principal.id(), community_id).await?;

        tracing::info!(user_id = principal.id(), community_id, "Joined community");
        Ok(found)
    }
}
