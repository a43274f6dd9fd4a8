//! HTTP listener settings.

use serde::Deserialize;
use std::net::SocketAddr;
use std::time::Duration;

use super::error::ValidationError;

/// Listener, logging, and request-limit settings for the API.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// `host:port` to listen on.
    #[serde(default = "default_bind_addr")]
    pub bind_addr: SocketAddr,

    #[serde(default)]
    pub environment: Environment,

    /// `tracing` filter used when `RUST_LOG` is unset.
    #[serde(default = "default_log_filter")]
    pub log_filter: String,

    /// Upper bound on a whole request, gateway round trip included.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Largest accepted request body. Webhook bodies are stored verbatim.
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,

    /// Comma-separated browser origins. Required in production.
    pub cors_origins: Option<String>,
}

/// Deployment environment. Production switches to JSON logs and live
/// gateway keys.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl ServerConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }

    pub fn cors_origins_list(&self) -> Vec<String> {
        self.cors_origins
            .as_deref()
            .map(|s| {
                s.split(',')
                    .map(str::trim)
                    .filter(|origin| !origin.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.bind_addr.port() == 0 {
            return Err(ValidationError::InvalidPort);
        }
        if !(1..=MAX_REQUEST_TIMEOUT_SECS).contains(&self.request_timeout_secs) {
            return Err(ValidationError::InvalidTimeout);
        }
        if !(MIN_BODY_BYTES..=MAX_BODY_BYTES).contains(&self.max_body_bytes) {
            return Err(ValidationError::InvalidBodyLimit);
        }

        let origins = self.cors_origins_list();
        if self.is_production() && origins.is_empty() {
            return Err(ValidationError::MissingRequired("SERVER__CORS_ORIGINS"));
        }
        for origin in &origins {
            let secure = origin.starts_with("https://");
            if !secure && !origin.starts_with("http://") {
                return Err(ValidationError::InvalidUrl("SERVER__CORS_ORIGINS"));
            }
            if self.is_production() && !secure {
                return Err(ValidationError::MustBeHttps("SERVER__CORS_ORIGINS"));
            }
        }
        Ok(())
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            environment: Environment::default(),
            log_filter: default_log_filter(),
            request_timeout_secs: default_request_timeout(),
            max_body_bytes: default_max_body_bytes(),
            cors_origins: None,
        }
    }
}

const MAX_REQUEST_TIMEOUT_SECS: u64 = 120;
const MIN_BODY_BYTES: usize = 1024;
const MAX_BODY_BYTES: usize = 1024 * 1024;

fn default_bind_addr() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 8080))
}

fn default_log_filter() -> String {
    "info,shutter_ledger=debug,sqlx=warn,tower_http=info".to_string()
}

fn default_request_timeout() -> u64 {
    15
}

fn default_max_body_bytes() -> usize {
    64 * 1024
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_listen_on_all_interfaces() {
        let config = ServerConfig::default();
        assert_eq!(config.bind_addr.to_string(), "0.0.0.0:8080");
        assert_eq!(config.environment, Environment::Development);
        assert_eq!(config.request_timeout(), Duration::from_secs(15));
        assert_eq!(config.max_body_bytes, 64 * 1024);
        assert!(config.log_filter.contains("shutter_ledger=debug"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn cors_list_skips_blank_entries() {
        let config = ServerConfig {
            cors_origins: Some("http://localhost:5173, ,https://shop.example.com,".to_string()),
            ..Default::default()
        };
        assert_eq!(
            config.cors_origins_list(),
            vec!["http://localhost:5173", "https://shop.example.com"]
        );
    }

    #[test]
    fn port_zero_is_rejected() {
        let config = ServerConfig {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ValidationError::InvalidPort));
    }

    #[test]
    fn request_timeout_is_bounded() {
        for secs in [0, 121] {
            let config = ServerConfig {
                request_timeout_secs: secs,
                ..Default::default()
            };
            assert_eq!(config.validate(), Err(ValidationError::InvalidTimeout));
        }
    }

    #[test]
    fn body_limit_is_bounded() {
        for bytes in [512, 2 * 1024 * 1024] {
            let config = ServerConfig {
                max_body_bytes: bytes,
                ..Default::default()
            };
            assert_eq!(config.validate(), Err(ValidationError::InvalidBodyLimit));
        }
    }

    #[test]
    fn production_requires_https_origins() {
        let mut config = ServerConfig {
            environment: Environment::Production,
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ValidationError::MissingRequired("SERVER__CORS_ORIGINS"))
        );

        config.cors_origins = Some("http://shop.example.com".to_string());
        assert_eq!(
            config.validate(),
            Err(ValidationError::MustBeHttps("SERVER__CORS_ORIGINS"))
        );

        config.cors_origins = Some("https://shop.example.com".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn origin_without_scheme_is_rejected() {
        let config = ServerConfig {
            cors_origins: Some("shop.example.com".to_string()),
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ValidationError::InvalidUrl("SERVER__CORS_ORIGINS"))
        );
    }
}
