//! Razorpay REST payloads.
//!
//! Only the fields we read are declared; everything else is ignored.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::catalog::{Currency, Money};
use crate::domain::foundation::{OrderId, PaymentId};
use crate::domain::payment::{GatewayPayment, GatewayPaymentStatus};
use crate::ports::{GatewayOrder, PaymentError};

/// Body of `POST /v1/orders`.
#[derive(Debug, Serialize)]
pub struct RazorpayOrderRequest<'a> {
    pub amount: i64,
    pub currency: &'a str,
    pub receipt: &'a str,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub notes: &'a BTreeMap<String, String>,
}

#[derive(Debug, Deserialize)]
pub struct RazorpayOrder {
    pub id: String,
    pub amount: i64,
    pub currency: String,
    pub status: String,
}

impl RazorpayOrder {
    pub fn into_domain(self) -> Result<GatewayOrder, PaymentError> {
        Ok(GatewayOrder {
            id: OrderId::new(self.id).map_err(|e| PaymentError::provider(e.to_string()))?,
            amount: money(self.amount, &self.currency)?,
            status: self.status,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct RazorpayPayment {
    pub id: String,
    pub order_id: Option<String>,
    pub amount: i64,
    pub currency: String,
    pub status: String,
}

impl RazorpayPayment {
    pub fn into_domain(self) -> Result<GatewayPayment, PaymentError> {
        Ok(GatewayPayment {
            id: PaymentId::new(self.id).map_err(|e| PaymentError::provider(e.to_string()))?,
            order_id: self.order_id.and_then(|id| OrderId::new(id).ok()),
            amount: money(self.amount, &self.currency)?,
            status: GatewayPaymentStatus::parse(&self.status),
        })
    }
}

/// Error envelope: `{"error": {"code": "...", "description": "..."}}`.
#[derive(Debug, Deserialize)]
pub struct RazorpayErrorEnvelope {
    pub error: RazorpayErrorBody,
}

#[derive(Debug, Deserialize)]
pub struct RazorpayErrorBody {
    pub code: Option<String>,
    pub description: Option<String>,
}

fn money(amount: i64, currency: &str) -> Result<Money, PaymentError> {
    let currency = Currency::new(currency).map_err(|e| PaymentError::provider(e.to_string()))?;
    Money::new(amount, currency).map_err(|e| PaymentError::provider(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_request_omits_empty_notes() {
        let notes = BTreeMap::new();
        let body = RazorpayOrderRequest {
            amount: 19900,
            currency: "INR",
            receipt: "rcpt_1",
            notes: &notes,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["amount"], 19900);
        assert!(json.get("notes").is_none());
    }

    #[test]
    fn payment_converts_to_domain() {
        let raw: RazorpayPayment = serde_json::from_str(
            r#"{"id":"pay_1","entity":"payment","order_id":"order_1","amount":19900,
                "currency":"INR","status":"captured","method":"upi","captured":true}"#,
        )
        .unwrap();
        let payment = raw.into_domain().unwrap();
        assert_eq!(payment.status, GatewayPaymentStatus::Captured);
        assert_eq!(payment.amount, Money::inr(19900));
        assert_eq!(payment.order_id.unwrap().as_str(), "order_1");
    }

    #[test]
    fn payment_with_bad_currency_is_provider_error() {
        let raw = RazorpayPayment {
            id: "pay_1".to_string(),
            order_id: None,
            amount: 100,
            currency: "rupees".to_string(),
            status: "captured".to_string(),
        };
        assert!(raw.into_domain().is_err());
    }

    #[test]
    fn error_envelope_parses() {
        let env: RazorpayErrorEnvelope = serde_json::from_str(
            r#"{"error":{"code":"BAD_REQUEST_ERROR","description":"The id provided does not exist"}}"#,
        )
        .unwrap();
        assert_eq!(env.error.code.as_deref(), Some("BAD_REQUEST_ERROR"));
    }
}
