//! Payment gateway configuration (Razorpay)

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use super::error::ValidationError;
use super::server::Environment;

/// Payment gateway configuration
#[derive(Debug, Deserialize)]
pub struct GatewayConfig {
    /// API key id, also used as the basic-auth user
    pub key_id: String,

    /// API key secret. Signs client payment confirmations.
    pub key_secret: SecretString,

    /// Webhook signing secret
    pub webhook_secret: SecretString,

    /// REST API base URL
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl GatewayConfig {
    /// Get request timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Check if using gateway test keys
    pub fn is_test_mode(&self) -> bool {
        self.key_id.starts_with("rzp_test_")
    }

    /// Validate gateway configuration
    ///
    /// Live keys are refused outside production and test keys inside it.
    pub fn validate(&self, environment: &Environment) -> Result<(), ValidationError> {
        if self.key_id.is_empty() {
            return Err(ValidationError::MissingRequired("GATEWAY__KEY_ID"));
        }
        if self.key_secret.expose_secret().is_empty() {
            return Err(ValidationError::MissingRequired("GATEWAY__KEY_SECRET"));
        }
        if self.webhook_secret.expose_secret().is_empty() {
            return Err(ValidationError::MissingRequired("GATEWAY__WEBHOOK_SECRET"));
        }
        if !self.key_id.starts_with("rzp_") {
            return Err(ValidationError::InvalidGatewayKeyId);
        }
        if (*environment == Environment::Production) == self.is_test_mode() {
            return Err(ValidationError::InvalidGatewayKeyId);
        }
        if !self.api_base_url.starts_with("https://") && !self.api_base_url.starts_with("http://") {
            return Err(ValidationError::InvalidUrl("GATEWAY__API_BASE_URL"));
        }
        if *environment == Environment::Production && !self.api_base_url.starts_with("https://") {
            return Err(ValidationError::MustBeHttps("GATEWAY__API_BASE_URL"));
        }
        if self.timeout_secs == 0 || self.timeout_secs > 120 {
            return Err(ValidationError::InvalidTimeout);
        }
        Ok(())
    }
}

fn default_api_base_url() -> String {
    "https://api.razorpay.com".to_string()
}

fn default_timeout() -> u64 {
    10
}
