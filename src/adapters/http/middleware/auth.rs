//! Authentication middleware and extractor for axum.
//!
//! - `auth_middleware` - validates Bearer tokens and injects the caller into extensions
//! - `RequireAuth` - extractor that rejects requests with no authenticated caller
//!
//! The middleware only depends on the `SessionValidator` port, so the JWT
//! validator and the test mock are interchangeable.
//!
//! ```text
//! Request → auth_middleware → injects AuthenticatedUser into extensions
//!                                      ↓
//!                              Handler → RequireAuth extractor reads from extensions
//! ```

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};

use crate::domain::foundation::{AuthError, AuthenticatedUser};
use crate::ports::SessionValidator;

/// Auth middleware state - wraps the session validator.
pub type AuthState = Arc<dyn SessionValidator>;

/// Authentication middleware that validates Bearer tokens.
///
/// 1. Extracts the Bearer token from the Authorization header
/// 2. Validates it through the `SessionValidator` port
/// 3. On success, injects `AuthenticatedUser` into request extensions
/// 4. On a missing token, continues without injecting; `RequireAuth` rejects later
/// 5. On an invalid token, returns 401 (503 when the provider is down)
pub async fn auth_middleware(
    State(validator): State<AuthState>,
    mut request: Request,
    next: Next,
) -> Response {
    let token = request
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "));

    match token {
        Some(token) => match validator.validate(token).await {
            Ok(user) => {
                request.extensions_mut().insert(user);
                next.run(request).await
            }
            Err(e) => auth_error_response(&e),
        },
        None => next.run(request).await,
    }
}

fn auth_error_response(error: &AuthError) -> Response {
    let (status, code, message) = match error {
        AuthError::TokenExpired => (StatusCode::UNAUTHORIZED, "TOKEN_EXPIRED", "Token expired"),
        AuthError::InvalidToken => (StatusCode::UNAUTHORIZED, "INVALID_TOKEN", "Invalid token"),
        AuthError::InsufficientPermissions => {
            (StatusCode::FORBIDDEN, "FORBIDDEN", "Insufficient permissions")
        }
        AuthError::ServiceUnavailable(msg) => {
            tracing::error!(error = %msg, "Auth service unavailable");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                "AUTH_UNAVAILABLE",
                "Authentication service unavailable",
            )
        }
    };

    (
        status,
        Json(serde_json::json!({
            "errorCode": code,
            "message": message
        })),
    )
        .into_response()
}

/// Extractor that requires authentication.
///
/// Returns 401 when the auth middleware did not inject a caller.
#[derive(Debug, Clone)]
pub struct RequireAuth(pub AuthenticatedUser);

impl<S> axum::extract::FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    fn from_request_parts<'life0, 'life1, 'async_trait>(
        parts: &'life0 mut axum::http::request::Parts,
        _state: &'life1 S,
    ) -> std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self, Self::Rejection>> + Send + 'async_trait>,
    >
    where
        'life0: 'async_trait,
        'life1: 'async_trait,
        Self: 'async_trait,
    {
        Box::pin(async move {
            parts
                .extensions
                .get::<AuthenticatedUser>()
                .cloned()
                .map(RequireAuth)
                .ok_or(AuthRejection::Unauthenticated)
        })
    }
}

/// Rejection type for authentication failures.
#[derive(Debug, Clone)]
pub enum AuthRejection {
    /// No valid authentication token was provided.
    Unauthenticated,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            AuthRejection::Unauthenticated => (
                StatusCode::UNAUTHORIZED,
                Json(serde_json::json!({
                    "errorCode": "UNAUTHENTICATED",
                    "message": "Authentication required"
                })),
            )
                .into_response(),
        }
    }
}
