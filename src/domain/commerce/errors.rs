//! Commerce-specific error types.
//!
//! # HTTP Status Mapping
//!
//! | Error | HTTP Status |
//! |-------|-------------|
//! | InvalidItem | 400 |
//! | ValidationFailed | 400 |
//! | InvalidSignature | 400 |
//! | Forbidden / NotPurchased | 403 |
//! | ItemNotFound / OrderNotFound | 404 |
//! | AlreadyPurchased / Conflict | 409 |
//! | PaymentNotCaptured / AmountMismatch | 402 |
//! | Gateway | 502 (503 when retryable) |
//! | Infrastructure | 503 |

use crate::domain::catalog::Money;
use crate::domain::foundation::{DomainError, ErrorCategory, ItemId, OrderId};

/// Errors raised along the order, payment, and download paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommerceError {
    /// The item cannot be priced or bought.
    InvalidItem { item: String, reason: String },

    /// Request input was missing or malformed.
    ValidationFailed { field: String, message: String },

    /// The signature did not match the expected HMAC.
    InvalidSignature,

    /// The caller may not act on this resource.
    Forbidden(String),

    /// The buyer holds no license for this photo.
    NotPurchased(ItemId),

    /// The catalog has no purchasable item under this reference.
    ItemNotFound(String),

    /// No order with this id exists.
    OrderNotFound(OrderId),

    /// The buyer already owns this photo.
    AlreadyPurchased(ItemId),

    /// The store rejected a write that would break an invariant.
    Conflict(String),

    /// The gateway has no captured payment matching the order.
    PaymentNotCaptured { reason: String },

    /// The captured amount differs from the order snapshot.
    AmountMismatch { expected: Money, actual: Money },

    /// The gateway call failed.
    Gateway { message: String, retryable: bool },

    /// The store failed.
    Infrastructure(String),
}

impl CommerceError {
    pub fn invalid_item(item: impl Into<String>, reason: impl Into<String>) -> Self {
        CommerceError::InvalidItem {
            item: item.into(),
            reason: reason.into(),
        }
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        CommerceError::ValidationFailed {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn invalid_signature() -> Self {
        CommerceError::InvalidSignature
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        CommerceError::Forbidden(message.into())
    }

    pub fn not_captured(reason: impl Into<String>) -> Self {
        CommerceError::PaymentNotCaptured {
            reason: reason.into(),
        }
    }

    pub fn amount_mismatch(expected: Money, actual: Money) -> Self {
        CommerceError::AmountMismatch { expected, actual }
    }

    pub fn gateway(message: impl Into<String>, retryable: bool) -> Self {
        CommerceError::Gateway {
            message: message.into(),
            retryable,
        }
    }

    pub fn infrastructure(message: impl Into<String>) -> Self {
        CommerceError::Infrastructure(message.into())
    }

    /// Returns the stable error code reported to clients.
    pub fn code(&self) -> &'static str {
        match self {
            CommerceError::InvalidItem { .. } => "INVALID_ITEM",
            CommerceError::ValidationFailed { .. } => "VALIDATION_FAILED",
            CommerceError::InvalidSignature => "INVALID_SIGNATURE",
            CommerceError::Forbidden(_) => "FORBIDDEN",
            CommerceError::NotPurchased(_) => "NOT_PURCHASED",
            CommerceError::ItemNotFound(_) => "ITEM_NOT_FOUND",
            CommerceError::OrderNotFound(_) => "ORDER_NOT_FOUND",
            CommerceError::AlreadyPurchased(_) => "ALREADY_PURCHASED",
            CommerceError::Conflict(_) => "CONFLICT",
            CommerceError::PaymentNotCaptured { .. } => "PAYMENT_NOT_CAPTURED",
            CommerceError::AmountMismatch { .. } => "AMOUNT_MISMATCH",
            CommerceError::Gateway { .. } => "GATEWAY_ERROR",
            CommerceError::Infrastructure(_) => "SERVICE_UNAVAILABLE",
        }
    }

    /// Returns a user-friendly error message.
    pub fn message(&self) -> String {
        match self {
            CommerceError::InvalidItem { item, reason } => {
                format!("Item '{}' cannot be purchased: {}", item, reason)
            }
            CommerceError::ValidationFailed { field, message } => {
                format!("Validation failed for '{}': {}", field, message)
            }
            CommerceError::InvalidSignature => "Invalid payment signature".to_string(),
            CommerceError::Forbidden(msg) => msg.clone(),
            CommerceError::NotPurchased(item) => {
                format!("Photo {} has not been purchased", item)
            }
            CommerceError::ItemNotFound(item) => format!("Item not found: {}", item),
            CommerceError::OrderNotFound(id) => format!("Order not found: {}", id),
            CommerceError::AlreadyPurchased(item) => {
                format!("Photo {} is already purchased", item)
            }
            CommerceError::Conflict(msg) => msg.clone(),
            CommerceError::PaymentNotCaptured { reason } => {
                format!("Payment not captured: {}", reason)
            }
            CommerceError::AmountMismatch { expected, actual } => format!(
                "Captured amount {} does not match order amount {}",
                actual, expected
            ),
            CommerceError::Gateway { message, .. } => format!("Payment gateway error: {}", message),
            CommerceError::Infrastructure(msg) => format!("Error: {}", msg),
        }
    }

    /// Classifies this error.
    pub fn category(&self) -> ErrorCategory {
        match self {
            CommerceError::InvalidItem { .. } | CommerceError::ValidationFailed { .. } => {
                ErrorCategory::Validation
            }
            CommerceError::InvalidSignature
            | CommerceError::Forbidden(_)
            | CommerceError::NotPurchased(_) => ErrorCategory::Auth,
            CommerceError::ItemNotFound(_) | CommerceError::OrderNotFound(_) => {
                ErrorCategory::NotFound
            }
            CommerceError::AlreadyPurchased(_) | CommerceError::Conflict(_) => {
                ErrorCategory::Conflict
            }
            CommerceError::PaymentNotCaptured { .. } | CommerceError::AmountMismatch { .. } => {
                ErrorCategory::PaymentRequired
            }
            CommerceError::Gateway { .. } | CommerceError::Infrastructure(_) => {
                ErrorCategory::Upstream
            }
        }
    }
}

impl std::fmt::Display for CommerceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for CommerceError {}

impl From<DomainError> for CommerceError {
    fn from(err: DomainError) -> Self {
        match err.category() {
            ErrorCategory::Validation => CommerceError::ValidationFailed {
                field: err
                    .details
                    .get("field")
                    .cloned()
                    .unwrap_or_else(|| "unknown".to_string()),
                message: err.message,
            },
            ErrorCategory::Conflict => CommerceError::Conflict(err.message),
            _ => CommerceError::Infrastructure(err.to_string()),
        }
    }
}
