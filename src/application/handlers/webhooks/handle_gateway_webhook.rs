//! HandleGatewayWebhookHandler - Command handler for gateway webhook deliveries.

use std::sync::Arc;

use crate::application::handlers::commerce::EntitlementLedger;
use crate::domain::commerce::CommerceError;
use crate::domain::foundation::{EventId, Timestamp};
use crate::domain::payment::{
    CaptureVerifier, GatewayEvent, GatewayEventType, SignatureVerifier, WebhookEvent,
};
use crate::ports::{EntitlementStore, OrderRepository, SaveResult, WebhookEventRepository};

/// Command to handle a webhook.
#[derive(Debug, Clone)]
pub struct HandleGatewayWebhookCommand {
    /// Raw request body, exactly as received.
    pub payload: Vec<u8>,
    /// `X-Signature` header value, if present.
    pub signature: Option<String>,
}

/// What reconciliation did with an audited event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reconciliation {
    /// A new entitlement was written.
    Granted,
    /// The entitlement already existed.
    AlreadyGranted,
    /// The order moved from `Created` to `Failed`.
    MarkedFailed,
    /// Nothing to do for this event.
    Acknowledged,
    /// Reconciliation failed; the event stays audited.
    Failed(String),
}

/// Result of webhook processing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandleGatewayWebhookResult {
    /// First delivery: audited and reconciled.
    Recorded {
        event_id: EventId,
        reconciliation: Reconciliation,
    },
    /// Redelivery of an event already audited. Nothing else happened.
    AlreadyRecorded { event_id: EventId },
}

impl HandleGatewayWebhookResult {
    pub fn event_id(&self) -> &EventId {
        match self {
            Self::Recorded { event_id, .. } | Self::AlreadyRecorded { event_id } => event_id,
        }
    }
}

/// Handler for gateway webhooks.
///
/// Once the signature checks out, the delivery is audited before anything
/// else. Reconciliation is best-effort: its failures are logged and the
/// gateway still receives a success response, since the audit row already
/// exists and the client verification path covers the same payment.
///
/// Deduplication is by event id and happens before reconciliation. A
/// redelivery of an event whose reconciliation failed is therefore not
/// reconciled again. The payment is settled by client verification or by a
/// later event with its own id, such as `order.paid`.
pub struct HandleGatewayWebhookHandler {
    signatures: Arc<SignatureVerifier>,
    events: Arc<dyn WebhookEventRepository>,
    orders: Arc<dyn OrderRepository>,
    capture: CaptureVerifier,
    ledger: EntitlementLedger,
}

impl HandleGatewayWebhookHandler {
    pub fn new(
        signatures: Arc<SignatureVerifier>,
        events: Arc<dyn WebhookEventRepository>,
        orders: Arc<dyn OrderRepository>,
        entitlements: Arc<dyn EntitlementStore>,
    ) -> Self {
        Self {
            signatures,
            events,
            orders,
            capture: CaptureVerifier::new(),
            ledger: EntitlementLedger::new(entitlements),
        }
    }

    pub async fn handle(
        &self,
        cmd: HandleGatewayWebhookCommand,
    ) -> Result<HandleGatewayWebhookResult, CommerceError> {
        // 1. Verify the signature over the raw bytes
        let signed = cmd
            .signature
            .as_deref()
            .map(|sig| self.signatures.verify_webhook(&cmd.payload, sig))
            .unwrap_or(false);
        if !signed {
            tracing::warn!(bytes = cmd.payload.len(), "webhook signature rejected");
            return Err(CommerceError::invalid_signature());
        }

        // 2. Audit
        let event = GatewayEvent::parse(&cmd.payload);
        let audit = WebhookEvent::record(
            event.id.as_deref(),
            event.event_type.as_str(),
            &cmd.payload,
            Timestamp::now(),
        );

        match self.events.append(&audit).await? {
            SaveResult::AlreadyExists => {
                tracing::info!(event_id = %audit.id, "duplicate webhook delivery ignored");
                return Ok(HandleGatewayWebhookResult::AlreadyRecorded { event_id: audit.id });
            }
            SaveResult::Inserted => {
                tracing::info!(
                    event_id = %audit.id,
                    event_type = %audit.event_type,
                    "webhook audited"
                );
            }
        }

        // 3. Reconcile
        let reconciliation = match self.reconcile(&event).await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::warn!(
                    event_id = %audit.id,
                    error = %e,
                    code = e.code(),
                    "webhook reconciliation failed"
                );
                Reconciliation::Failed(e.message())
            }
        };

        Ok(HandleGatewayWebhookResult::Recorded {
            event_id: audit.id,
            reconciliation,
        })
    }

    async fn reconcile(&self, event: &GatewayEvent) -> Result<Reconciliation, CommerceError> {
        let Some(payment) = event.payment.as_ref() else {
            return Ok(Reconciliation::Acknowledged);
        };
        let Some(order_id) = payment.order_id.as_ref() else {
            return Ok(Reconciliation::Acknowledged);
        };

        match &event.event_type {
            t if t.settles_payment() => {
                let Some(order) = self.orders.find_by_id(order_id).await? else {
                    tracing::debug!(order_id = %order_id, "webhook for unknown order");
                    return Ok(Reconciliation::Acknowledged);
                };
                let verified = self.capture.check(Some(payment), &order)?;
                let grant = self.ledger.grant(verified).await?;
                Ok(if grant.is_new() {
                    Reconciliation::Granted
                } else {
                    Reconciliation::AlreadyGranted
                })
            }
            GatewayEventType::PaymentFailed => {
                if self.orders.mark_failed(order_id).await? {
                    tracing::info!(order_id = %order_id, "order marked failed");
                    Ok(Reconciliation::MarkedFailed)
                } else {
                    Ok(Reconciliation::Acknowledged)
                }
            }
            _ => Ok(Reconciliation::Acknowledged),
        }
    }
}
