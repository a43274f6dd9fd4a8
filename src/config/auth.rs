//! Authentication configuration

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use super::error::ValidationError;

/// Bearer token configuration (HS256 JWTs)
#[derive(Debug, Deserialize)]
pub struct AuthConfig {
    /// Shared HMAC secret the identity provider signs tokens with
    pub jwt_secret: SecretString,

    /// Expected `iss` claim
    pub issuer: String,

    /// Expected `aud` claim
    pub audience: String,
}

impl AuthConfig {
    /// Validate authentication configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.jwt_secret.expose_secret().is_empty() {
            return Err(ValidationError::MissingRequired("AUTH__JWT_SECRET"));
        }
        if self.jwt_secret.expose_secret().len() < 32 {
            return Err(ValidationError::SecretTooShort("AUTH__JWT_SECRET"));
        }
        if self.issuer.is_empty() {
            return Err(ValidationError::MissingRequired("AUTH__ISSUER"));
        }
        if self.audience.is_empty() {
            return Err(ValidationError::MissingRequired("AUTH__AUDIENCE"));
        }
        Ok(())
    }
}
