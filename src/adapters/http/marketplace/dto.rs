//! HTTP DTOs for the marketplace endpoints.
//!
//! Request fields are optional at the serde level so that a missing field
//! is reported as a 400 naming the field, instead of a generic body error.
//! All JSON uses camelCase.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::application::handlers::{
    CreateOrderResult, GetPlanStatusResult, HandleGatewayWebhookResult, IssueDownloadResult,
};
use crate::domain::commerce::Grant;
use crate::domain::foundation::Timestamp;

// ════════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// `POST /orders`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub buyer_id: Option<String>,
    pub item_id: Option<String>,
    /// `photo` (default) or `plan`.
    pub item_type: Option<String>,
    pub note: Option<String>,
    /// Client-side price. Logged when it differs, never charged.
    pub amount: Option<i64>,
}

/// `POST /payments/verify`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyPaymentRequest {
    pub order_id: Option<String>,
    pub payment_id: Option<String>,
    pub signature: Option<String>,
}

/// `POST /uploads/authorize`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorizeUploadRequest {
    pub uid: Option<String>,
    /// Listing price in minor units.
    pub price: Option<i64>,
}

/// `POST /downloads`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadRequest {
    pub buyer_id: Option<String>,
    pub photo_id: Option<String>,
}

// ════════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderResponse {
    pub order_id: String,
    /// Minor units.
    pub amount: i64,
    pub currency: String,
}

impl From<CreateOrderResult> for CreateOrderResponse {
    fn from(result: CreateOrderResult) -> Self {
        Self {
            order_id: result.order_id.into_inner(),
            amount: result.amount.amount_minor,
            currency: result.amount.currency.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyPaymentResponse {
    /// `granted` or `already-granted`.
    pub status: String,
}

impl From<&Grant> for VerifyPaymentResponse {
    fn from(grant: &Grant) -> Self {
        Self {
            status: grant.status_str().to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorizeUploadResponse {
    pub allowed: bool,
    pub remaining: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadResponse {
    pub url: String,
    pub expires_at: Timestamp,
}

impl From<IssueDownloadResult> for DownloadResponse {
    fn from(result: IssueDownloadResult) -> Self {
        Self {
            url: result.url.url,
            expires_at: result.url.expires_at,
        }
    }
}

/// Seller plan status. Plan fields are absent when the seller never bought one.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanStatusResponse {
    /// `no_plan`, `active` or `expired`.
    pub state: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plan_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remaining: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upload_limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_price_per_item: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<Timestamp>,
}

impl From<GetPlanStatusResult> for PlanStatusResponse {
    fn from(result: GetPlanStatusResult) -> Self {
        let grant = result.grant;
        Self {
            state: result.state.as_str().to_string(),
            plan_id: grant.as_ref().map(|g| g.plan_id.to_string()),
            remaining: grant.as_ref().map(|g| g.upload_limit_remaining),
            upload_limit: grant.as_ref().map(|g| g.upload_limit),
            max_price_per_item: grant.as_ref().map(|g| g.max_price_per_item.amount_minor),
            currency: grant
                .as_ref()
                .map(|g| g.max_price_per_item.currency.to_string()),
            expires_at: grant.as_ref().map(|g| g.expires_at),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookResponse {
    /// `recorded` or `duplicate`.
    pub status: String,
    pub event_id: String,
}

impl From<HandleGatewayWebhookResult> for WebhookResponse {
    fn from(result: HandleGatewayWebhookResult) -> Self {
        let status = match &result {
            HandleGatewayWebhookResult::Recorded { .. } => "recorded",
            HandleGatewayWebhookResult::AlreadyRecorded { .. } => "duplicate",
        };
        Self {
            status: status.to_string(),
            event_id: result.event_id().to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

// ════════════════════════════════════════════════════════════════════════════════
// Error DTO
// ════════════════════════════════════════════════════════════════════════════════

/// Error body returned by every failing endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub error_code: String,
    pub message: String,
    /// Upload rejection reason (`NoActivePlan`, `PlanExpired`, `QuotaExhausted`, ...).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl ErrorResponse {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error_code: code.into(),
            message: message.into(),
            reason: None,
            details: None,
        }
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::catalog::Money;
    use crate::domain::foundation::{EventId, ItemId, OrderId, PaymentId, UserId};
    use crate::domain::plan::{PlanGrant, PlanState};

    #[test]
    fn create_order_request_reads_camel_case() {
        let req: CreateOrderRequest = serde_json::from_str(
            r#"{"buyerId":"b1","itemId":"p1","itemType":"plan","amount":100}"#,
        )
        .unwrap();
        assert_eq!(req.buyer_id.as_deref(), Some("b1"));
        assert_eq!(req.item_type.as_deref(), Some("plan"));
        assert_eq!(req.amount, Some(100));
        assert!(req.note.is_none());
    }

    #[test]
    fn create_order_response_splits_money() {
        let response = CreateOrderResponse::from(CreateOrderResult {
            order_id: OrderId::new("order_1").unwrap(),
            amount: Money::inr(19900),
        });
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["orderId"], "order_1");
        assert_eq!(json["amount"], 19900);
        assert_eq!(json["currency"], "INR");
    }

    #[test]
    fn plan_status_without_grant_only_has_state() {
        let response = PlanStatusResponse::from(GetPlanStatusResult {
            state: PlanState::NoPlan,
            grant: None,
        });
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json, serde_json::json!({"state": "no_plan"}));
    }

    #[test]
    fn plan_status_with_grant_reports_quota() {
        let now = Timestamp::now();
        let grant = PlanGrant {
            uid: UserId::new("seller-1").unwrap(),
            plan_id: ItemId::new("plan-basic").unwrap(),
            upload_limit: 25,
            upload_limit_remaining: 24,
            max_price_per_item: Money::inr(50000),
            expires_at: now.add_days(30),
            last_payment_id: PaymentId::new("pay_1").unwrap(),
            updated_at: now,
        };
        let response = PlanStatusResponse::from(GetPlanStatusResult {
            state: PlanState::Active,
            grant: Some(grant),
        });
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["state"], "active");
        assert_eq!(json["remaining"], 24);
        assert_eq!(json["uploadLimit"], 25);
        assert_eq!(json["maxPricePerItem"], 50000);
    }

    #[test]
    fn duplicate_webhook_is_reported_as_duplicate() {
        let response = WebhookResponse::from(HandleGatewayWebhookResult::AlreadyRecorded {
            event_id: EventId::new("evt_1").unwrap(),
        });
        assert_eq!(response.status, "duplicate");
        assert_eq!(response.event_id, "evt_1");
    }

    #[test]
    fn error_response_omits_empty_fields() {
        let json = serde_json::to_value(ErrorResponse::new("FORBIDDEN", "no")).unwrap();
        assert_eq!(json, serde_json::json!({"errorCode": "FORBIDDEN", "message": "no"}));
    }
}
