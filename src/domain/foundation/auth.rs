//! Authentication types for the domain layer.
//!
//! These types represent a caller whose bearer token has been validated.
//! They carry no provider dependencies; any identity provider can populate
//! them through the `SessionValidator` port.

use super::UserId;
use thiserror::Error;

/// Authenticated caller extracted from a validated token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    /// The unique user identifier from the identity provider.
    pub id: UserId,

    /// Email address, if the token carries one.
    pub email: Option<String>,
}

impl AuthenticatedUser {
    /// Creates a new authenticated user.
    pub fn new(id: UserId, email: Option<String>) -> Self {
        Self { id, email }
    }

    /// Returns true when `other` names this same user.
    pub fn is(&self, other: &UserId) -> bool {
        &self.id == other
    }
}

/// Authentication errors that can occur during token validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// The token is missing, malformed, or has an invalid signature.
    #[error("Invalid or expired token")]
    InvalidToken,

    /// The token has expired.
    #[error("Token expired")]
    TokenExpired,

    /// Token is valid but the caller may not act on this resource.
    #[error("Insufficient permissions")]
    InsufficientPermissions,

    /// The identity provider is unavailable.
    #[error("Auth service unavailable: {0}")]
    ServiceUnavailable(String),
}

impl AuthError {
    /// Creates a service unavailable error with a message.
    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::ServiceUnavailable(message.into())
    }

    /// Returns true if this error indicates the caller should re-authenticate.
    pub fn requires_reauthentication(&self) -> bool {
        matches!(self, AuthError::InvalidToken | AuthError::TokenExpired)
    }
}
