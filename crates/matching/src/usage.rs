//! Plan-based quota for matching runs.

use database::usage;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::error::{MatchingError, Result};
use crate::principal::Principal;

/// Default number of matching runs for standard-tier users.
pub const DEFAULT_FREE_LIMIT: i64 = 2;

/// Usage state reported to clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageSnapshot {
    pub is_pro: bool,
    pub limit: i64,
    pub used: i64,
    /// `None` for privileged users.
    pub remaining: Option<i64>,
}

/// Lifetime quota on matching runs for standard-tier users.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UsagePolicy {
    free_limit: i64,
}

impl Default for UsagePolicy {
    fn default() -> Self {
        Self::new(DEFAULT_FREE_LIMIT)
    }
}

impl UsagePolicy {
    pub fn new(free_limit: i64) -> Self {
        Self {
            free_limit: free_limit.max(0),
        }
    }

    fn snapshot_for(&self, principal: &Principal, used: i64) -> UsageSnapshot {
        if principal.is_privileged() {
            UsageSnapshot {
                is_pro: true,
                limit: self.free_limit,
                used,
                remaining: None,
            }
        } else {
            UsageSnapshot {
                is_pro: false,
                limit: self.free_limit,
                used,
                remaining: Some((self.free_limit - used).max(0)),
            }
        }
    }

    /// Current usage without changing anything.
    pub async fn snapshot(&self, pool: &SqlitePool, principal: &Principal) -> Result<UsageSnapshot> {
        let used = usage::used(pool, principal.id()).await?;
        Ok(self.snapshot_for(principal, used))
    }

    /// Refuse a standard-tier user who is already at the limit. Read-only.
    pub async fn check(&self, pool: &SqlitePool, principal: &Principal) -> Result<UsageSnapshot> {
        let snapshot = self.snapshot(pool, principal).await?;
        if !snapshot.is_pro && snapshot.used >= self.free_limit {
            tracing::info!(user_id = principal.id(), used = snapshot.used, "Match quota exhausted");
            return Err(MatchingError::QuotaExceeded(snapshot));
        }
        Ok(snapshot)
    }

    /// Consume one unit for a standard-tier user.
    ///
    /// Privileged users are never counted. The increment is a single
    /// conditional statement, so concurrent reservations never exceed the
    /// limit; the loser gets [`MatchingError::QuotaExceeded`].
    pub async fn reserve(&self, pool: &SqlitePool, principal: &Principal) -> Result<UsageSnapshot> {
        if principal.is_privileged() {
            return self.snapshot(pool, principal).await;
        }

        match usage::try_increment(pool, principal.id(), self.free_limit).await? {
            Some(used) => {
                tracing::debug!(user_id = principal.id(), used, limit = self.free_limit, "Reserved match quota");
                Ok(self.snapshot_for(principal, used))
            }
            None => {
                let snapshot = self.snapshot(pool, principal).await?;
                tracing::info!(user_id = principal.id(), used = snapshot.used, "Match quota exhausted");
                Err(MatchingError::QuotaExceeded(snapshot))
            }
        }
    }
}
