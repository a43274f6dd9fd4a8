//! PaymentGateway port - external payment service integration.
//!
//! The gateway creates orders for an exact amount and reports the live
//! state of a payment. Webhook verification lives in the domain
//! (`SignatureVerifier`) because it needs only the shared secret.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::catalog::Money;
use crate::domain::foundation::{DomainError, OrderId, PaymentId};
use crate::domain::payment::GatewayPayment;

/// Payment gateway port.
///
/// Calls carry a bounded timeout and are never retried here; callers may
/// retry because every write downstream of a confirmation is idempotent.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Creates a gateway order for the exact amount.
    async fn create_order(&self, request: CreateOrderRequest)
        -> Result<GatewayOrder, PaymentError>;

    /// Fetches the live payment record. `Ok(None)` when the gateway does not
    /// know the payment.
    async fn fetch_payment(
        &self,
        payment_id: &PaymentId,
    ) -> Result<Option<GatewayPayment>, PaymentError>;
}

/// Request to create a gateway order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateOrderRequest {
    pub amount: Money,
    /// Merchant-side reference, shown in the gateway dashboard.
    pub receipt: String,
    pub notes: BTreeMap<String, String>,
}

/// An order as created by the gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayOrder {
    pub id: OrderId,
    pub amount: Money,
    pub status: String,
}

/// Errors from payment gateway operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentError {
    /// Error code for categorization.
    pub code: PaymentErrorCode,

    /// Human-readable message.
    pub message: String,

    /// Gateway's own error code (if available).
    pub provider_code: Option<String>,

    /// Whether the operation can be retried.
    pub retryable: bool,
}

impl PaymentError {
    pub fn new(code: PaymentErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            provider_code: None,
            retryable: code.is_retryable(),
        }
    }

    pub fn with_provider_code(mut self, code: impl Into<String>) -> Self {
        self.provider_code = Some(code.into());
        self
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(PaymentErrorCode::NetworkError, message)
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(PaymentErrorCode::Timeout, message)
    }

    pub fn authentication(message: impl Into<String>) -> Self {
        Self::new(PaymentErrorCode::AuthenticationError, message)
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(PaymentErrorCode::InvalidRequest, message)
    }

    pub fn provider(message: impl Into<String>) -> Self {
        Self::new(PaymentErrorCode::ProviderError, message)
    }
}

impl std::fmt::Display for PaymentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for PaymentError {}

impl From<PaymentError> for DomainError {
    fn from(err: PaymentError) -> Self {
        use crate::domain::foundation::ErrorCode;

        let code = match err.code {
            PaymentErrorCode::InvalidRequest => ErrorCode::ValidationFailed,
            _ => ErrorCode::ExternalServiceError,
        };

        DomainError::new(code, err.message)
    }
}

/// Payment error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentErrorCode {
    /// Network connectivity issue.
    NetworkError,

    /// The call exceeded its deadline.
    Timeout,

    /// API authentication failed.
    AuthenticationError,

    /// The gateway rejected the request as malformed.
    InvalidRequest,

    /// Rate limit exceeded.
    RateLimitExceeded,

    /// Gateway-side failure (5xx).
    ProviderError,

    /// Unknown error.
    Unknown,
}

impl PaymentErrorCode {
    /// Check if this error type is typically retryable.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            PaymentErrorCode::NetworkError
                | PaymentErrorCode::Timeout
                | PaymentErrorCode::RateLimitExceeded
                | PaymentErrorCode::ProviderError
        )
    }
}

impl std::fmt::Display for PaymentErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            PaymentErrorCode::NetworkError => "network_error",
            PaymentErrorCode::Timeout => "timeout",
            PaymentErrorCode::AuthenticationError => "authentication_error",
            PaymentErrorCode::InvalidRequest => "invalid_request",
            PaymentErrorCode::RateLimitExceeded => "rate_limit_exceeded",
            PaymentErrorCode::ProviderError => "provider_error",
            PaymentErrorCode::Unknown => "unknown",
        };
        write!(f, "{}", s)
    }
}
