//! HS256 JWT adapter for bearer token validation.
//!
//! Tokens are issued by the marketplace's identity service and signed with
//! a shared secret. Validation checks:
//!
//! - **Signature**: HMAC-SHA256 with the configured secret
//! - **Issuer (iss)**: must match the configured issuer
//! - **Audience (aud)**: must contain the configured audience
//! - **Expiry (exp)**: must be in the future
//!
//! The `sub` claim becomes the caller's `UserId`.

use async_trait::async_trait;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{AuthError, AuthenticatedUser, UserId};
use crate::ports::SessionValidator;

/// Configuration for the JWT validator.
#[derive(Clone)]
pub struct JwtConfig {
    pub issuer: String,
    pub audience: String,
    pub secret: SecretString,
}

impl JwtConfig {
    pub fn new(
        issuer: impl Into<String>,
        audience: impl Into<String>,
        secret: SecretString,
    ) -> Self {
        Self {
            issuer: issuer.into(),
            audience: audience.into(),
            secret,
        }
    }
}

impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field("secret", &"[REDACTED]")
            .finish()
    }
}

/// Claims read from marketplace tokens.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub iss: String,
    #[serde(default)]
    pub aud: Audience,
    pub exp: i64,
    #[serde(default)]
    pub email: Option<String>,
}

/// Audience can be a single string or array of strings in JWTs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Audience {
    #[default]
    None,
    Single(String),
    Multiple(Vec<String>),
}

/// Validates HS256 bearer tokens.
pub struct JwtSessionValidator {
    config: JwtConfig,
    key: DecodingKey,
}

impl JwtSessionValidator {
    pub fn new(config: JwtConfig) -> Self {
        let key = DecodingKey::from_secret(config.secret.expose_secret().as_bytes());
        Self { config, key }
    }

    fn validation(&self) -> Validation {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.config.issuer]);
        validation.set_audience(&[&self.config.audience]);
        validation.validate_exp = true;
        validation.set_required_spec_claims(&["exp", "iss", "aud", "sub"]);
        validation
    }
}

#[async_trait]
impl SessionValidator for JwtSessionValidator {
    async fn validate(&self, token: &str) -> Result<AuthenticatedUser, AuthError> {
        let data = decode::<Claims>(token, &self.key, &self.validation()).map_err(|e| {
            use jsonwebtoken::errors::ErrorKind;
            match e.kind() {
                ErrorKind::ExpiredSignature => {
                    tracing::debug!("Token expired");
                    AuthError::TokenExpired
                }
                ErrorKind::InvalidIssuer | ErrorKind::InvalidAudience => {
                    tracing::warn!(error = %e, "token issued for another service");
                    AuthError::InvalidToken
                }
                _ => {
                    tracing::debug!(error = %e, "token validation failed");
                    AuthError::InvalidToken
                }
            }
        })?;

        let user_id = UserId::new(data.claims.sub).map_err(|_| AuthError::InvalidToken)?;
        Ok(AuthenticatedUser::new(user_id, data.claims.email))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};

    const SECRET: &str = "jwt-test-secret";
    const ISSUER: &str = "https://id.shutter.test";
    const AUDIENCE: &str = "shutter-ledger";

    fn validator() -> JwtSessionValidator {
        JwtSessionValidator::new(JwtConfig::new(
            ISSUER,
            AUDIENCE,
            SecretString::new(SECRET.to_string()),
        ))
    }

    fn token(sub: &str, iss: &str, aud: Audience, exp_offset: i64, secret: &str) -> String {
        let claims = Claims {
            sub: sub.to_string(),
            iss: iss.to_string(),
            aud,
            exp: chrono::Utc::now().timestamp() + exp_offset,
            email: Some("buyer@example.com".to_string()),
        };
        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    fn good(sub: &str) -> String {
        token(sub, ISSUER, Audience::Single(AUDIENCE.to_string()), 3600, SECRET)
    }

    #[tokio::test]
    async fn valid_token_yields_subject() {
        let user = validator().validate(&good("buyer-1")).await.unwrap();
        assert_eq!(user.id.as_str(), "buyer-1");
        assert_eq!(user.email.as_deref(), Some("buyer@example.com"));
    }

    #[tokio::test]
    async fn audience_list_is_accepted() {
        let aud = Audience::Multiple(vec!["other".to_string(), AUDIENCE.to_string()]);
        let t = token("buyer-1", ISSUER, aud, 3600, SECRET);
        assert!(validator().validate(&t).await.is_ok());
    }

    #[tokio::test]
    async fn expired_token_is_reported_as_expired() {
        let t = token("buyer-1", ISSUER, Audience::Single(AUDIENCE.to_string()), -3600, SECRET);
        assert_eq!(validator().validate(&t).await.unwrap_err(), AuthError::TokenExpired);
    }

    #[tokio::test]
    async fn wrong_secret_is_invalid() {
        let t = token("buyer-1", ISSUER, Audience::Single(AUDIENCE.to_string()), 3600, "nope");
        assert_eq!(validator().validate(&t).await.unwrap_err(), AuthError::InvalidToken);
    }

    #[tokio::test]
    async fn wrong_issuer_is_invalid() {
        let t = token(
            "buyer-1",
            "https://evil.test",
            Audience::Single(AUDIENCE.to_string()),
            3600,
            SECRET,
        );
        assert_eq!(validator().validate(&t).await.unwrap_err(), AuthError::InvalidToken);
    }

    #[tokio::test]
    async fn wrong_audience_is_invalid() {
        let t = token("buyer-1", ISSUER, Audience::Single("other".to_string()), 3600, SECRET);
        assert!(validator().validate(&t).await.is_err());
    }

    #[tokio::test]
    async fn garbage_is_invalid() {
        assert_eq!(
            validator().validate("not-a-jwt").await.unwrap_err(),
            AuthError::InvalidToken
        );
    }

    #[test]
    fn debug_redacts_secret() {
        let config = JwtConfig::new(ISSUER, AUDIENCE, SecretString::new(SECRET.to_string()));
        assert!(!format!("{:?}", config).contains(SECRET));
    }
}
