//! SQLite persistence layer for MeshMind.
//!
//! This crate provides async database operations for users, communities,
//! learning goals, matches, conversations and usage counters using SQLx with
//! SQLite.
//!
//! # Example
//!
//! ```no_run
//! use database::{community, models::IdentityProfile, user, Database};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Connect and run migrations
//!     let db = Database::connect("sqlite:meshmind.db?mode=rwc").await?;
//!     db.migrate().await?;
//!
//!     // Resolve the caller and create a community they belong to
//!     let profile = IdentityProfile {
//!         external_id: "idp|alice".to_string(),
//!         email: "alice@example.com".to_string(),
//!         name: "Alice".to_string(),
//!         image_url: None,
//!     };
//!     let alice = user::upsert_identity(db.pool(), &profile).await?;
//!     community::create_community(db.pool(), "Rustaceans", None, &alice.id).await?;
//!
//!     Ok(())
//! }
//! ```

pub mod community;
pub mod conversation;
pub mod error;
pub mod goal;
pub mod matches;
pub mod models;
pub mod search;
pub mod usage;
pub mod user;
pub mod validation;

pub use error::{DatabaseError, Result};
pub use matches::MatchDetails;
pub use models::{
    ChatMessage, Community, CommunityPage, Conversation, GoalUpdate, IdentityProfile, LearningGoal, Match,
    MatchStatus, Membership, Message, NewGoal, UsageCounter, User, UserStats, UserSummary,
};
pub use search::fold_case;
pub use validation::ValidationError;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;

/// Database connection wrapper.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Default pool size for database connections.
    const DEFAULT_POOL_SIZE: u32 = 20;

    /// Connect to a SQLite database.
    ///
    /// The URL should be in the format `sqlite:path/to/db.sqlite?mode=rwc`.
    /// Use `?mode=rwc` to create the database file if it doesn't exist.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # async fn example() -> database::Result<()> {
    /// // File database
    /// let db = database::Database::connect("sqlite:data/meshmind.db?mode=rwc").await?;
    ///
    /// // In-memory database (for testing)
    /// let db = database::Database::connect("sqlite::memory:").await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn connect(url: &str) -> Result<Self> {
        Self::connect_with_pool_size(url, Self::DEFAULT_POOL_SIZE).await
    }

    /// Connect to a SQLite database with a custom pool size.
    pub async fn connect_with_pool_size(url: &str, pool_size: u32) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(pool_size)
            .acquire_timeout(std::time::Duration::from_secs(30))
            .connect_with(options)
            .await?;

        tracing::info!(
            "Connected to database: {} (pool size: {})",
            url,
            pool_size
        );

        Ok(Self { pool })
    }

    /// Run database migrations.
    ///
    /// This should be called once after connecting to ensure the schema is up to date.
    pub async fn migrate(&self) -> Result<()> {
        tracing::info!("Running database migrations...");

        sqlx::migrate!("./migrations").run(&self.pool).await?;

        tracing::info!("Migrations complete");
        Ok(())
    }

    /// Get a reference to the connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Close the database connection pool.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    pub async fn test_db() -> Database {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        db.migrate().await.unwrap();
        db
    }

    pub async fn test_user(db: &Database, name: &str) -> User {
        let profile = IdentityProfile {
            external_id: format!("idp|{name}"),
            email: format!("{name}@example.com"),
            name: name.to_string(),
            image_url: None,
        };
        user::upsert_identity(db.pool(), &profile).await.unwrap()
    }
}
