//! Session validation port for bearer token validation.
//!
//! This port defines the contract for validating access tokens and extracting
//! user identity. It is provider-agnostic.
//!
//! All implementations MUST validate:
//! - **Issuer (iss)**: Token must come from expected identity provider
//! - **Audience (aud)**: Token must be intended for this application
//! - **Expiry (exp)**: Token must not be expired

use async_trait::async_trait;

use crate::domain::foundation::{AuthError, AuthenticatedUser};

/// Validates access tokens and extracts user identity.
///
/// # Contract
///
/// Implementations must:
/// - Return `AuthError::InvalidToken` for malformed/bad signature tokens
/// - Return `AuthError::TokenExpired` for expired tokens
/// - Return `AuthError::ServiceUnavailable` for transient errors
#[async_trait]
pub trait SessionValidator: Send + Sync {
    /// Validate a raw token (without "Bearer " prefix) and return the caller.
    async fn validate(&self, token: &str) -> Result<AuthenticatedUser, AuthError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::UserId;
    use std::collections::HashMap;
    use std::sync::RwLock;

    /// Simple mock implementation for testing the trait
    struct TestSessionValidator {
        tokens: RwLock<HashMap<String, AuthenticatedUser>>,
    }

    impl TestSessionValidator {
        fn with_token(token: &str, user: AuthenticatedUser) -> Self {
            let mut tokens = HashMap::new();
            tokens.insert(token.to_string(), user);
            Self {
                tokens: RwLock::new(tokens),
            }
        }
    }

    #[async_trait]
    impl SessionValidator for TestSessionValidator {
        async fn validate(&self, token: &str) -> Result<AuthenticatedUser, AuthError> {
            self.tokens
                .read()
                .unwrap()
                .get(token)
                .cloned()
                .ok_or(AuthError::InvalidToken)
        }
    }

    fn seller() -> AuthenticatedUser {
        AuthenticatedUser::new(UserId::new("seller-1").unwrap(), None)
    }

    #[tokio::test]
    async fn returns_user_for_known_token() {
        let validator = TestSessionValidator::with_token("tok", seller());
        assert_eq!(validator.validate("tok").await.unwrap(), seller());
    }

    #[tokio::test]
    async fn returns_invalid_token_for_unknown_token() {
        let validator = TestSessionValidator::with_token("tok", seller());
        assert!(matches!(
            validator.validate("other").await,
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn session_validator_trait_is_send_sync() {
        fn assert_send_sync<T: Send + Sync + ?Sized>() {}
        assert_send_sync::<dyn SessionValidator>();
    }
}
