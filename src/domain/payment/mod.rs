//! Payment module - signature and capture verification, webhook payloads.

mod capture;
mod gateway_event;
mod signature;
mod webhook_event;

pub use capture::{CaptureVerifier, GatewayPayment, GatewayPaymentStatus, VerifiedPayment};
pub use gateway_event::{GatewayEvent, GatewayEventType};
pub use signature::{sign_payment, sign_webhook, SignatureVerifier};
pub use webhook_event::WebhookEvent;
