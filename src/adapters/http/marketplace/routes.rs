//! Axum router configuration for marketplace endpoints.

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{
    authorize_upload, create_order, get_plan_status, handle_gateway_webhook, health,
    issue_download, verify_payment, MarketplaceAppState,
};

/// Routes that require a bearer token.
///
/// # Routes
/// - `POST /orders` - Issue a gateway order
/// - `POST /payments/verify` - Verify a payment confirmation
/// - `POST /uploads/authorize` - Take an upload slot
/// - `POST /downloads` - Signed download URL for a purchased photo
/// - `GET /plans/status` - Caller's plan status
pub fn marketplace_routes() -> Router<MarketplaceAppState> {
    Router::new()
        .route("/orders", post(create_order))
        .route("/payments/verify", post(verify_payment))
        .route("/uploads/authorize", post(authorize_upload))
        .route("/downloads", post(issue_download))
        .route("/plans/status", get(get_plan_status))
}

/// Routes reachable without a bearer token.
///
/// The gateway webhook is authenticated by its HMAC instead.
///
/// # Routes
/// - `POST /webhooks/gateway` - Gateway webhook
/// - `GET /health` - Liveness probe
pub fn public_routes() -> Router<MarketplaceAppState> {
    Router::new()
        .route("/webhooks/gateway", post(handle_gateway_webhook))
        .route("/health", get(health))
}
