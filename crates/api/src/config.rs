//! Configuration loaded from environment variables.

use std::env;
use std::net::SocketAddr;

use matching::DEFAULT_FREE_LIMIT;

/// API server configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server bind address.
    pub addr: SocketAddr,
    /// SQLite database URL.
    pub database_url: String,
    /// Shared secret the identity gateway sends as a bearer token.
    pub identity_token: Option<String>,
    /// Matching runs allowed for standard-tier users.
    pub free_match_limit: i64,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// | Variable | Description | Default |
    /// |----------|-------------|---------|
    /// | `MESHMIND_ADDR` | Server bind address | `127.0.0.1:8790` |
    /// | `SQLITE_PATH` | SQLite database URL | `sqlite:meshmind.db?mode=rwc` |
    /// | `IDENTITY_PROXY_TOKEN` | Bearer token required from the gateway | (none) |
    /// | `FREE_MATCH_LIMIT` | Free matching runs per user | `2` |
    pub fn from_env() -> Result<Self, ConfigError> {
        let addr = env::var("MESHMIND_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:8790".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidAddr)?;

        let database_url = env::var("SQLITE_PATH")
            .unwrap_or_else(|_| "sqlite:meshmind.db?mode=rwc".to_string());

        let identity_token = env::var("IDENTITY_PROXY_TOKEN")
            .ok()
            .map(|token| token.trim().to_string())
            .filter(|token| !token.is_empty());

        let free_match_limit = match env::var("FREE_MATCH_LIMIT") {
            Ok(raw) => raw
                .trim()
                .parse::<i64>()
                .ok()
                .filter(|limit| *limit >= 0)
                .ok_or(ConfigError::InvalidFreeLimit(raw))?,
            Err(_) => DEFAULT_FREE_LIMIT,
        };

        Ok(Self {
            addr,
            database_url,
            identity_token,
            free_match_limit,
        })
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid MESHMIND_ADDR format")]
    InvalidAddr,

    #[error("FREE_MATCH_LIMIT must be a non-negative integer, got {0:?}")]
    InvalidFreeLimit(String),
}
