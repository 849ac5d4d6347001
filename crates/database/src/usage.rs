//! Usage counters for metered features.

use sqlx::SqlitePool;

use crate::models::UsageCounter;
use crate::Result;

/// Get a user's usage counter, if one exists.
pub async fn get_counter(pool: &SqlitePool, user_id: &str) -> Result<Option<UsageCounter>> {
    let record = sqlx::query_as::<_, UsageCounter>(
        r#"
        SELECT user_id, used, updated_at
        FROM usage_counters
        WHERE user_id = ?
        "#,
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    Ok(record)
}

/// Current usage for a user; zero when no counter exists yet.
pub async fn used(pool: &SqlitePool, user_id: &str) -> Result<i64> {
    Ok(get_counter(pool, user_id)
        .await?
        .map(|counter| counter.used)
        .unwrap_or(0))
}

/// Atomically consume one unit if the user is below `limit`.
///
/// Insert-or-increment in a single statement, so concurrent callers can never
/// push the counter past `limit`. Returns the new count, or `None` when the
/// limit was already reached and nothing changed.
pub async fn try_increment(pool: &SqlitePool, user_id: &str, limit: i64) -> Result<Option<i64>> {
    let used = sqlx::query_scalar::<_, i64>(
        r#"
        INSERT INTO usage_counters (user_id, used)
        SELECT ?1, 1 WHERE ?2 > 0
        ON CONFLICT(user_id) DO UPDATE SET
            used = usage_counters.used + 1,
            updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
        WHERE usage_counters.used < ?2
        RETURNING used
        "#,
    )
    .bind(user_id)
    .bind(limit)
    .fetch_optional(pool)
    .await?;

    Ok(used)
}
