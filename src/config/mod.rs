//! Application configuration module
//!
//! Type-safe configuration loaded from environment variables with the
//! `config` and `dotenvy` crates. Variables use the `SHUTTER_LEDGER` prefix
//! and `__` between nested keys.
//!
//! # Example
//!
//! ```no_run
//! use shutter_ledger::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//! ```

mod auth;
mod database;
mod error;
mod gateway;
mod server;
mod storage;

pub use auth::AuthConfig;
pub use database::DatabaseConfig;
pub use error::{ConfigError, ValidationError};
pub use gateway::GatewayConfig;
pub use server::{Environment, ServerConfig};
pub use storage::StorageConfig;

use serde::Deserialize;

/// Root application configuration
///
/// Load using [`AppConfig::load()`] which reads from environment variables.
/// Every secret is required; a missing one fails the load.
#[derive(Debug, Deserialize)]
pub struct AppConfig {
    /// Listener, logging, and request limits
    #[serde(default)]
    pub server: ServerConfig,

    /// Ledger database (PostgreSQL)
    pub database: DatabaseConfig,

    /// Payment gateway configuration (Razorpay)
    pub gateway: GatewayConfig,

    /// Bearer token configuration
    pub auth: AuthConfig,

    /// Signed download URL configuration
    pub storage: StorageConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `SHUTTER_LEDGER` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    ///
    /// # Environment Variable Format
    ///
    /// - `SHUTTER_LEDGER__SERVER__BIND_ADDR=0.0.0.0:8080` -> `server.bind_addr`
    /// - `SHUTTER_LEDGER__GATEWAY__KEY_SECRET=...` -> `gateway.key_secret = ...`
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("SHUTTER_LEDGER")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.database.validate()?;
        // a ledger write must finish before the request is cut off
        if self.database.statement_timeout() >= self.server.request_timeout() {
            return Err(ValidationError::StatementOutlivesRequest);
        }
        self.gateway.validate(&self.server.environment)?;
        self.auth.validate()?;
        self.storage.validate()?;
        Ok(())
    }

    /// Check if running in production environment
    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }
}
