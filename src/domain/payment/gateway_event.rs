//! Gateway webhook payloads.
//!
//! Only the fields needed for auditing and reconciliation are read; the
//! raw body is what gets stored.

use serde::Deserialize;

use super::{GatewayPayment, GatewayPaymentStatus};
use crate::domain::catalog::{Currency, Money};
use crate::domain::foundation::{OrderId, PaymentId};

/// Event types that drive reconciliation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayEventType {
    PaymentCaptured,
    OrderPaid,
    PaymentFailed,
    Other(String),
}

impl GatewayEventType {
    pub fn parse(s: &str) -> Self {
        match s {
            "payment.captured" => Self::PaymentCaptured,
            "order.paid" => Self::OrderPaid,
            "payment.failed" => Self::PaymentFailed,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::PaymentCaptured => "payment.captured",
            Self::OrderPaid => "order.paid",
            Self::PaymentFailed => "payment.failed",
            Self::Other(s) => s,
        }
    }

    /// True for events that report a successful capture.
    pub fn settles_payment(&self) -> bool {
        matches!(self, Self::PaymentCaptured | Self::OrderPaid)
    }
}

#[derive(Debug, Deserialize)]
struct RawEvent {
    id: Option<String>,
    event: Option<String>,
    #[serde(default)]
    payload: RawPayload,
}

#[derive(Debug, Default, Deserialize)]
struct RawPayload {
    payment: Option<RawEntityWrapper>,
}

#[derive(Debug, Deserialize)]
struct RawEntityWrapper {
    entity: RawPaymentEntity,
}

#[derive(Debug, Deserialize)]
struct RawPaymentEntity {
    id: String,
    order_id: Option<String>,
    amount: i64,
    currency: String,
    status: String,
}

/// A parsed webhook delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayEvent {
    /// Gateway event id, if the payload carried one.
    pub id: Option<String>,
    pub event_type: GatewayEventType,
    /// Payment entity embedded in the event.
    pub payment: Option<GatewayPayment>,
}

impl GatewayEvent {
    /// Parses a verified webhook body. Bodies that are not JSON, or lack the
    /// expected shape, yield an event of type `unknown` with no payment.
    pub fn parse(raw_body: &[u8]) -> Self {
        let Ok(raw) = serde_json::from_slice::<RawEvent>(raw_body) else {
            return Self {
                id: None,
                event_type: GatewayEventType::Other("unknown".to_string()),
                payment: None,
            };
        };

        let payment = raw
            .payload
            .payment
            .and_then(|wrapper| payment_from_entity(wrapper.entity));

        Self {
            id: raw.id.filter(|id| !id.trim().is_empty()),
            event_type: GatewayEventType::parse(raw.event.as_deref().unwrap_or("unknown")),
            payment,
        }
    }
}

fn payment_from_entity(entity: RawPaymentEntity) -> Option<GatewayPayment> {
    let currency = Currency::new(&entity.currency).ok()?;
    Some(GatewayPayment {
        id: PaymentId::new(entity.id).ok()?,
        order_id: entity.order_id.and_then(|id| OrderId::new(id).ok()),
        amount: Money::new(entity.amount, currency).ok()?,
        status: GatewayPaymentStatus::parse(&entity.status),
    })
}
