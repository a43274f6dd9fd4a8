//! HMAC-SHA256 verification of gateway-issued signatures.
//!
//! Two inputs are signed by the gateway:
//!
//! - checkout confirmations: `order_id + "|" + payment_id` with the API key secret
//! - webhook deliveries: the exact raw request body with the webhook secret
//!
//! Webhook bodies must be verified before any JSON parsing; re-serialising
//! a parsed body does not reproduce the signed bytes.

use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::domain::foundation::{OrderId, PaymentId};

type HmacSha256 = Hmac<Sha256>;

/// Verifier for checkout and webhook signatures.
#[derive(Clone)]
pub struct SignatureVerifier {
    payment_secret: SecretString,
    webhook_secret: SecretString,
}

impl std::fmt::Debug for SignatureVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignatureVerifier")
            .field("payment_secret", &"[REDACTED]")
            .field("webhook_secret", &"[REDACTED]")
            .finish()
    }
}

impl SignatureVerifier {
    pub fn new(payment_secret: SecretString, webhook_secret: SecretString) -> Self {
        Self {
            payment_secret,
            webhook_secret,
        }
    }

    /// Checks a checkout confirmation signature for an order/payment pair.
    pub fn verify_payment(
        &self,
        order_id: &OrderId,
        payment_id: &PaymentId,
        signature_hex: &str,
    ) -> bool {
        let message = payment_message(order_id.as_str(), payment_id.as_str());
        verify(
            self.payment_secret.expose_secret().as_bytes(),
            message.as_bytes(),
            signature_hex,
        )
    }

    /// Checks a webhook signature over the raw, unparsed body.
    pub fn verify_webhook(&self, raw_body: &[u8], signature_hex: &str) -> bool {
        verify(
            self.webhook_secret.expose_secret().as_bytes(),
            raw_body,
            signature_hex,
        )
    }
}

fn payment_message(order_id: &str, payment_id: &str) -> String {
    format!("{}|{}", order_id, payment_id)
}

fn mac_bytes(key: &[u8], message: &[u8]) -> Option<Vec<u8>> {
    let mut mac = HmacSha256::new_from_slice(key).ok()?;
    mac.update(message);
    Some(mac.finalize().into_bytes().to_vec())
}

fn verify(key: &[u8], message: &[u8], signature_hex: &str) -> bool {
    let Ok(provided) = hex::decode(signature_hex.trim()) else {
        return false;
    };
    let Some(expected) = mac_bytes(key, message) else {
        return false;
    };
    constant_time_compare(&expected, &provided)
}

/// Length check first, then a comparison that touches every byte.
fn constant_time_compare(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.ct_eq(b).into()
}

/// Produces the hex signature the gateway attaches to a checkout confirmation.
pub fn sign_payment(secret: &str, order_id: &str, payment_id: &str) -> String {
    let message = payment_message(order_id, payment_id);
    mac_bytes(secret.as_bytes(), message.as_bytes())
        .map(hex::encode)
        .unwrap_or_default()
}

/// Produces the hex signature the gateway attaches to a webhook body.
pub fn sign_webhook(secret: &str, raw_body: &[u8]) -> String {
    mac_bytes(secret.as_bytes(), raw_body)
        .map(hex::encode)
        .unwrap_or_default()
}
