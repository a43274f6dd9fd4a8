//! HTTP handlers for marketplace endpoints.
//!
//! These handlers connect axum routes to the application layer command and
//! query handlers. Identity always comes from the bearer token; a body
//! identity that names somebody else is refused.

use std::str::FromStr;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Json, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::application::handlers::{
    AuthorizeUploadCommand, AuthorizeUploadHandler, CreateOrderCommand, CreateOrderHandler,
    GetPlanStatusHandler, GetPlanStatusQuery, HandleGatewayWebhookCommand,
    HandleGatewayWebhookHandler, IssueDownloadCommand, IssueDownloadHandler, VerifyPaymentCommand,
    VerifyPaymentHandler,
};
use crate::domain::catalog::{ItemKind, ItemRef};
use crate::domain::commerce::CommerceError;
use crate::domain::foundation::{AuthenticatedUser, ItemId, OrderId, PaymentId, UserId};
use crate::domain::payment::SignatureVerifier;
use crate::domain::plan::UploadError;
use crate::ports::{
    EntitlementStore, ItemCatalog, ObjectStore, OrderRepository, PaymentGateway,
    PlanGrantRepository, PurchaseRepository, WebhookEventRepository,
};

use super::super::middleware::RequireAuth;
use super::dto::{
    AuthorizeUploadRequest, AuthorizeUploadResponse, CreateOrderRequest, CreateOrderResponse,
    DownloadRequest, DownloadResponse, ErrorResponse, HealthResponse, PlanStatusResponse,
    VerifyPaymentRequest, VerifyPaymentResponse, WebhookResponse,
};

/// Header carrying the gateway's webhook HMAC.
pub const SIGNATURE_HEADER: &str = "X-Signature";

// ════════════════════════════════════════════════════════════════════════════════
// Application State
// ════════════════════════════════════════════════════════════════════════════════

/// Shared application state containing all dependencies.
///
/// Built once at startup and cloned per request; every field is an `Arc`.
#[derive(Clone)]
pub struct MarketplaceAppState {
    pub catalog: Arc<dyn ItemCatalog>,
    pub orders: Arc<dyn OrderRepository>,
    pub entitlements: Arc<dyn EntitlementStore>,
    pub purchases: Arc<dyn PurchaseRepository>,
    pub plan_grants: Arc<dyn PlanGrantRepository>,
    pub webhook_events: Arc<dyn WebhookEventRepository>,
    pub gateway: Arc<dyn PaymentGateway>,
    pub objects: Arc<dyn ObjectStore>,
    pub signatures: Arc<SignatureVerifier>,
    pub download_ttl_secs: u64,
}

impl MarketplaceAppState {
    /// Create handlers on demand from the shared state.
    pub fn create_order_handler(&self) -> CreateOrderHandler {
        CreateOrderHandler::new(
            self.catalog.clone(),
            self.purchases.clone(),
            self.orders.clone(),
            self.gateway.clone(),
        )
    }

    pub fn verify_payment_handler(&self) -> VerifyPaymentHandler {
        VerifyPaymentHandler::new(
            self.signatures.clone(),
            self.orders.clone(),
            self.entitlements.clone(),
            self.gateway.clone(),
        )
    }

    pub fn authorize_upload_handler(&self) -> AuthorizeUploadHandler {
        AuthorizeUploadHandler::new(self.plan_grants.clone())
    }

    pub fn plan_status_handler(&self) -> GetPlanStatusHandler {
        GetPlanStatusHandler::new(self.plan_grants.clone())
    }

    pub fn issue_download_handler(&self) -> IssueDownloadHandler {
        IssueDownloadHandler::new(
            self.catalog.clone(),
            self.purchases.clone(),
            self.objects.clone(),
            self.download_ttl_secs,
        )
    }

    pub fn webhook_handler(&self) -> HandleGatewayWebhookHandler {
        HandleGatewayWebhookHandler::new(
            self.signatures.clone(),
            self.webhook_events.clone(),
            self.orders.clone(),
            self.entitlements.clone(),
        )
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Request Helpers
// ════════════════════════════════════════════════════════════════════════════════

fn body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload
        .map(|Json(value)| value)
        .map_err(|rejection| ApiError::bad_request("body", rejection.body_text()))
}

fn required<T>(field: &'static str, value: Option<T>) -> Result<T, ApiError> {
    value.ok_or_else(|| ApiError::bad_request(field, "is required"))
}

fn parse<T, E: std::fmt::Display>(
    field: &'static str,
    value: String,
    ctor: impl FnOnce(String) -> Result<T, E>,
) -> Result<T, ApiError> {
    ctor(value).map_err(|e| ApiError::bad_request(field, e.to_string()))
}

/// Refuses a body identity that is not the token subject.
fn ensure_caller(user: &AuthenticatedUser, claimed: &UserId) -> Result<(), ApiError> {
    if user.is(claimed) {
        Ok(())
    } else {
        tracing::warn!(caller = %user.id, claimed = %claimed, "Body identity does not match token");
        Err(CommerceError::forbidden("Caller may not act for another user").into())
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Command Handlers (POST endpoints)
// ════════════════════════════════════════════════════════════════════════════════

/// POST /orders - Issue a gateway order at the catalog price
pub async fn create_order(
    State(state): State<MarketplaceAppState>,
    RequireAuth(user): RequireAuth,
    payload: Result<Json<CreateOrderRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let req = body(payload)?;
    let buyer_id = parse("buyerId", required("buyerId", req.buyer_id)?, UserId::new)?;
    ensure_caller(&user, &buyer_id)?;

    let item_id = parse("itemId", required("itemId", req.item_id)?, ItemId::new)?;
    let kind = match req.item_type {
        Some(raw) => ItemKind::from_str(&raw)
            .map_err(|e| ApiError::bad_request("itemType", e.to_string()))?,
        None => ItemKind::default(),
    };

    let cmd = CreateOrderCommand {
        buyer_id,
        item: ItemRef { kind, id: item_id },
        note: req.note,
        client_amount: req.amount,
    };
    let result = state.create_order_handler().handle(cmd).await?;

    Ok((StatusCode::CREATED, Json(CreateOrderResponse::from(result))))
}

/// POST /payments/verify - Verify a client payment confirmation and grant
pub async fn verify_payment(
    State(state): State<MarketplaceAppState>,
    RequireAuth(user): RequireAuth,
    payload: Result<Json<VerifyPaymentRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let req = body(payload)?;
    let order_id = parse("orderId", required("orderId", req.order_id)?, OrderId::new)?;
    let payment_id = parse("paymentId", required("paymentId", req.payment_id)?, PaymentId::new)?;
    let signature = required("signature", req.signature)?;

    let cmd = VerifyPaymentCommand {
        caller: user.id,
        order_id,
        payment_id,
        signature,
    };
    let result = state.verify_payment_handler().handle(cmd).await?;

    Ok(Json(VerifyPaymentResponse::from(&result.grant)))
}

/// POST /uploads/authorize - Take one upload slot from the seller's plan
pub async fn authorize_upload(
    State(state): State<MarketplaceAppState>,
    RequireAuth(user): RequireAuth,
    payload: Result<Json<AuthorizeUploadRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let req = body(payload)?;
    let uid = parse("uid", required("uid", req.uid)?, UserId::new)?;
    ensure_caller(&user, &uid)?;
    let price_minor = required("price", req.price)?;

    let result = state
        .authorize_upload_handler()
        .handle(AuthorizeUploadCommand { uid, price_minor })
        .await?;

    Ok(Json(AuthorizeUploadResponse {
        allowed: true,
        remaining: result.remaining,
    }))
}

/// POST /downloads - Issue a signed read URL for a purchased photo
pub async fn issue_download(
    State(state): State<MarketplaceAppState>,
    RequireAuth(user): RequireAuth,
    payload: Result<Json<DownloadRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let req = body(payload)?;
    let buyer_id = parse("buyerId", required("buyerId", req.buyer_id)?, UserId::new)?;
    ensure_caller(&user, &buyer_id)?;
    let photo_id = parse("photoId", required("photoId", req.photo_id)?, ItemId::new)?;

    let result = state
        .issue_download_handler()
        .handle(IssueDownloadCommand { buyer_id, photo_id })
        .await?;

    Ok(Json(DownloadResponse::from(result)))
}

/// POST /webhooks/gateway - Audit and reconcile a gateway webhook
///
/// Unauthenticated; the HMAC in `X-Signature` over the raw body is the
/// only credential.
pub async fn handle_gateway_webhook(
    State(state): State<MarketplaceAppState>,
    headers: HeaderMap,
    payload: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let cmd = HandleGatewayWebhookCommand {
        payload: payload.to_vec(),
        signature,
    };
    let result = state.webhook_handler().handle(cmd).await?;

    Ok(Json(WebhookResponse::from(result)))
}

// ════════════════════════════════════════════════════════════════════════════════
// Query Handlers (GET endpoints)
// ════════════════════════════════════════════════════════════════════════════════

/// GET /plans/status - Plan state and quota for the authenticated seller
pub async fn get_plan_status(
    State(state): State<MarketplaceAppState>,
    RequireAuth(user): RequireAuth,
) -> Result<impl IntoResponse, ApiError> {
    let result = state
        .plan_status_handler()
        .handle(GetPlanStatusQuery { uid: user.id })
        .await?;

    Ok(Json(PlanStatusResponse::from(result)))
}

/// GET /health - Liveness probe
pub async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

// ════════════════════════════════════════════════════════════════════════════════
// Error Handling
// ════════════════════════════════════════════════════════════════════════════════

/// API error wrapper that converts domain errors to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    Commerce(CommerceError),
    Upload(UploadError),
}

impl ApiError {
    pub fn bad_request(field: &str, message: impl Into<String>) -> Self {
        ApiError::Commerce(CommerceError::validation(field, message))
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Commerce(err) => match err {
                CommerceError::InvalidItem { .. }
                | CommerceError::ValidationFailed { .. }
                | CommerceError::InvalidSignature => StatusCode::BAD_REQUEST,
                CommerceError::Forbidden(_) | CommerceError::NotPurchased(_) => {
                    StatusCode::FORBIDDEN
                }
                CommerceError::ItemNotFound(_) | CommerceError::OrderNotFound(_) => {
                    StatusCode::NOT_FOUND
                }
                CommerceError::AlreadyPurchased(_) | CommerceError::Conflict(_) => {
                    StatusCode::CONFLICT
                }
                CommerceError::PaymentNotCaptured { .. } | CommerceError::AmountMismatch { .. } => {
                    StatusCode::PAYMENT_REQUIRED
                }
                CommerceError::Gateway { retryable: true, .. } => StatusCode::SERVICE_UNAVAILABLE,
                CommerceError::Gateway { .. } => StatusCode::BAD_GATEWAY,
                CommerceError::Infrastructure(_) => StatusCode::SERVICE_UNAVAILABLE,
            },
            ApiError::Upload(err) => match err {
                UploadError::Rejected(_) | UploadError::Forbidden(_) => StatusCode::FORBIDDEN,
                UploadError::LostRace => StatusCode::CONFLICT,
                UploadError::ValidationFailed { .. } => StatusCode::BAD_REQUEST,
                UploadError::Infrastructure(_) => StatusCode::SERVICE_UNAVAILABLE,
            },
        }
    }
}

impl From<CommerceError> for ApiError {
    fn from(err: CommerceError) -> Self {
        ApiError::Commerce(err)
    }
}

impl From<UploadError> for ApiError {
    fn from(err: UploadError) -> Self {
        ApiError::Upload(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            ApiError::Commerce(err) => {
                if status.is_server_error() {
                    tracing::error!(code = err.code(), error = %err, "Request failed upstream");
                }
                let response = ErrorResponse::new(err.code(), err.message());
                match err {
                    CommerceError::ValidationFailed { field, .. } => {
                        response.with_details(serde_json::json!({ "field": field }))
                    }
                    CommerceError::Gateway { retryable, .. } => {
                        response.with_details(serde_json::json!({ "retryable": retryable }))
                    }
                    _ => response,
                }
            }
            ApiError::Upload(err) => {
                if status.is_server_error() {
                    tracing::error!(code = err.code(), error = %err, "Request failed upstream");
                }
                match err {
                    UploadError::Rejected(_) | UploadError::LostRace => {
                        ErrorResponse::new(err.code(), err.message()).with_reason(err.code())
                    }
                    _ => ErrorResponse::new(err.code(), err.message()),
                }
            }
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::catalog::Money;
    use crate::domain::plan::UploadRejection;

    fn status_of(err: impl Into<ApiError>) -> StatusCode {
        err.into().into_response().status()
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Status Mapping Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[test]
    fn invalid_signature_is_400() {
        assert_eq!(status_of(CommerceError::invalid_signature()), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn capture_failures_are_402() {
        assert_eq!(
            status_of(CommerceError::not_captured("authorized")),
            StatusCode::PAYMENT_REQUIRED
        );
        assert_eq!(
            status_of(CommerceError::amount_mismatch(Money::inr(19900), Money::inr(19800))),
            StatusCode::PAYMENT_REQUIRED
        );
    }

    #[test]
    fn unknown_order_is_404() {
        let err = CommerceError::OrderNotFound(OrderId::new("order_x").unwrap());
        assert_eq!(status_of(err), StatusCode::NOT_FOUND);
    }

    #[test]
    fn gateway_errors_split_on_retryable() {
        assert_eq!(status_of(CommerceError::gateway("timeout", true)), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(status_of(CommerceError::gateway("bad key", false)), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn upload_rejection_is_403_and_lost_race_is_409() {
        assert_eq!(
            status_of(UploadError::Rejected(UploadRejection::PlanExpired)),
            StatusCode::FORBIDDEN
        );
        assert_eq!(status_of(UploadError::LostRace), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn upload_rejection_body_carries_reason() {
        let response = ApiError::from(UploadError::Rejected(UploadRejection::NoActivePlan))
            .into_response();
        let bytes = axum::body::to_bytes(response.into_body(), 4096).await.unwrap();
        let body: ErrorResponse = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body.reason.as_deref(), Some("NoActivePlan"));
    }

    #[tokio::test]
    async fn validation_error_body_names_the_field() {
        let response = ApiError::bad_request("orderId", "is required").into_response();
        let bytes = axum::body::to_bytes(response.into_body(), 4096).await.unwrap();
        let body: ErrorResponse = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body.error_code, "VALIDATION_FAILED");
        assert_eq!(body.details.unwrap()["field"], "orderId");
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Helper Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[test]
    fn ensure_caller_refuses_other_users() {
        let user = AuthenticatedUser::new(UserId::new("buyer-1").unwrap(), None);
        assert!(ensure_caller(&user, &UserId::new("buyer-1").unwrap()).is_ok());
        let err = ensure_caller(&user, &UserId::new("buyer-2").unwrap()).unwrap_err();
        assert_eq!(err.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn required_field_missing_is_400() {
        let err = required::<String>("signature", None).unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn blank_id_is_400() {
        let err = parse("orderId", "  ".to_string(), OrderId::new).unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }
}
