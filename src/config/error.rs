//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Invalid port number")]
    InvalidPort,

    #[error("Invalid timeout")]
    InvalidTimeout,

    #[error("Invalid database URL format")]
    InvalidDatabaseUrl,

    #[error("Pool max_connections must be between 1 and 50")]
    InvalidPoolSize,

    #[error("Request body limit must be between 1 KiB and 1 MiB")]
    InvalidBodyLimit,

    #[error("Database statement timeout must be shorter than the request timeout")]
    StatementOutlivesRequest,

    #[error("{0} must be an http(s) URL")]
    InvalidUrl(&'static str),

    #[error("{0} must use HTTPS in production")]
    MustBeHttps(&'static str),

    #[error("Invalid gateway key id format")]
    InvalidGatewayKeyId,

    #[error("{0} must be at least 32 bytes")]
    SecretTooShort(&'static str),

    #[error("Download URL lifetime must be between 1 and 86400 seconds")]
    InvalidDownloadTtl,
}
