//! Dashboard stats and partner search.

use database::{user, UserStats, UserSummary};
use sqlx::SqlitePool;

use crate::error::Result;
use crate::principal::Principal;

#[derive(Debug, Clone)]
pub struct UserService {
    pool: SqlitePool,
}

impl UserService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn stats(&self, principal: &Principal) -> Result<UserStats> {
        Ok(user::user_stats(&self.pool, principal.id()).await?)
    }

    /// Case-insensitive name/email search, skipping the caller and anyone
    /// already matched with them. Blank queries return nothing.
    pub async fn search(&self, principal: &Principal, query: &str) -> Result<Vec<UserSummary>> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }
        Ok(user::search_users(&self.pool, query, principal.id()).await?)
    }
}
