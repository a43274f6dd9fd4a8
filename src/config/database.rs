//! Postgres connection settings for the ledger.

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Connection settings. Every ledger write is a short transaction that
/// holds row locks, so the pool is small and statements are capped.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// `postgres://` URL. Carries credentials, so it is never logged.
    pub url: SecretString,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// How long a request waits for a pooled connection.
    #[serde(default = "default_acquire_timeout")]
    pub acquire_timeout_secs: u64,

    /// Server-side `statement_timeout` set on every connection.
    #[serde(default = "default_statement_timeout")]
    pub statement_timeout_secs: u64,

    /// Apply `migrations/` at startup.
    #[serde(default)]
    pub run_migrations: bool,
}

impl DatabaseConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: SecretString::new(url.into()),
            max_connections: default_max_connections(),
            acquire_timeout_secs: default_acquire_timeout(),
            statement_timeout_secs: default_statement_timeout(),
            run_migrations: false,
        }
    }

    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.acquire_timeout_secs)
    }

    pub fn statement_timeout(&self) -> Duration {
        Duration::from_secs(self.statement_timeout_secs)
    }

    /// Value for the `statement_timeout` connection option, in milliseconds.
    pub fn statement_timeout_option(&self) -> String {
        self.statement_timeout().as_millis().to_string()
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        let url = self.url.expose_secret();
        if url.is_empty() {
            return Err(ValidationError::MissingRequired("DATABASE__URL"));
        }
        if !url.starts_with("postgres://") && !url.starts_with("postgresql://") {
            return Err(ValidationError::InvalidDatabaseUrl);
        }
        if self.max_connections == 0 || self.max_connections > MAX_POOL_SIZE {
            return Err(ValidationError::InvalidPoolSize);
        }
        if self.acquire_timeout_secs == 0 || self.statement_timeout_secs == 0 {
            return Err(ValidationError::InvalidTimeout);
        }
        Ok(())
    }
}

const MAX_POOL_SIZE: u32 = 50;

fn default_max_connections() -> u32 {
    10
}

fn default_acquire_timeout() -> u64 {
    5
}

fn default_statement_timeout() -> u64 {
    5
}
