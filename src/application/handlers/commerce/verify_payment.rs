//! VerifyPaymentHandler - Command handler for client-side payment confirmation.

use std::sync::Arc;

use super::entitlement_ledger::EntitlementLedger;
use crate::domain::commerce::{CommerceError, Grant};
use crate::domain::foundation::{OrderId, PaymentId, UserId};
use crate::domain::payment::{CaptureVerifier, SignatureVerifier};
use crate::ports::{EntitlementStore, OrderRepository, PaymentGateway};

/// Command carrying the checkout callback fields.
#[derive(Debug, Clone)]
pub struct VerifyPaymentCommand {
    /// The authenticated caller; must be the order's buyer.
    pub caller: UserId,
    pub order_id: OrderId,
    pub payment_id: PaymentId,
    /// Hex HMAC of `order_id|payment_id`.
    pub signature: String,
}

/// Result of a successful verification.
#[derive(Debug, Clone)]
pub struct VerifyPaymentResult {
    pub grant: Grant,
}

/// Handler for payment verification.
///
/// A valid signature proves the callback came through checkout. It is not
/// proof of payment: the gateway is asked for the payment record and only a
/// capture for the exact order amount grants anything.
pub struct VerifyPaymentHandler {
    signatures: Arc<SignatureVerifier>,
    orders: Arc<dyn OrderRepository>,
    gateway: Arc<dyn PaymentGateway>,
    capture: CaptureVerifier,
    ledger: EntitlementLedger,
}

impl VerifyPaymentHandler {
    pub fn new(
        signatures: Arc<SignatureVerifier>,
        orders: Arc<dyn OrderRepository>,
        entitlements: Arc<dyn EntitlementStore>,
        gateway: Arc<dyn PaymentGateway>,
    ) -> Self {
        Self {
            signatures,
            orders,
            gateway,
            capture: CaptureVerifier::new(),
            ledger: EntitlementLedger::new(entitlements),
        }
    }

    pub async fn handle(
        &self,
        cmd: VerifyPaymentCommand,
    ) -> Result<VerifyPaymentResult, CommerceError> {
        // 1. Signature over order_id|payment_id
        if !self
            .signatures
            .verify_payment(&cmd.order_id, &cmd.payment_id, &cmd.signature)
        {
            tracing::warn!(
                order_id = %cmd.order_id,
                payment_id = %cmd.payment_id,
                "payment signature mismatch"
            );
            return Err(CommerceError::invalid_signature());
        }

        // 2. Load the order snapshot
        let order = self
            .orders
            .find_by_id(&cmd.order_id)
            .await?
            .ok_or_else(|| CommerceError::OrderNotFound(cmd.order_id.clone()))?;

        if order.buyer_id != cmd.caller {
            return Err(CommerceError::forbidden("Order belongs to another buyer"));
        }

        // 3. Ask the gateway what actually happened
        let payment = self
            .gateway
            .fetch_payment(&cmd.payment_id)
            .await
            .map_err(|e| CommerceError::gateway(e.message, e.retryable))?;

        let verified = self.capture.check(payment.as_ref(), &order).map_err(|e| {
            tracing::warn!(
                order_id = %order.order_id,
                payment_id = %cmd.payment_id,
                error = %e,
                "capture check failed"
            );
            e
        })?;

        // 4. Grant
        let grant = self.ledger.grant(verified).await?;
        Ok(VerifyPaymentResult { grant })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::gateway::MockPaymentGateway;
    use crate::adapters::memory::InMemoryStore;
    use crate::domain::catalog::{Currency, ItemRef, Money};
    use crate::domain::commerce::{Order, OrderStatus};
    use crate::domain::foundation::{ItemId, Timestamp};
    use crate::domain::payment::{sign_payment, GatewayPayment, GatewayPaymentStatus};
    use crate::ports::PaymentError;
    use secrecy::SecretString;

    const KEY_SECRET: &str = "rzp_test_secret";

    // ════════════════════════════════════════════════════════════════════════════
    // Fixtures
    // ════════════════════════════════════════════════════════════════════════════

    struct Fixture {
        store: InMemoryStore,
        gateway: MockPaymentGateway,
        handler: VerifyPaymentHandler,
        order: Order,
    }

    async fn setup() -> Fixture {
        let store = InMemoryStore::new();
        let gateway = MockPaymentGateway::new();
        let order = Order::new(
            OrderId::new("order_1").unwrap(),
            UserId::new("buyer-1").unwrap(),
            ItemRef::photo(ItemId::new("photo-1").unwrap()),
            Money::inr(19900),
            None,
            Timestamp::now(),
        );
        store.insert(&order).await.unwrap();

        let signatures = SignatureVerifier::new(
            SecretString::new(KEY_SECRET.to_string()),
            SecretString::new("whsec".to_string()),
        );
        let handler = VerifyPaymentHandler::new(
            Arc::new(signatures),
            Arc::new(store.clone()),
            Arc::new(store.clone()),
            Arc::new(gateway.clone()),
        );
        Fixture {
            store,
            gateway,
            handler,
            order,
        }
    }

    fn command(order_id: &str, payment_id: &str) -> VerifyPaymentCommand {
        VerifyPaymentCommand {
            caller: UserId::new("buyer-1").unwrap(),
            order_id: OrderId::new(order_id).unwrap(),
            payment_id: PaymentId::new(payment_id).unwrap(),
            signature: sign_payment(KEY_SECRET, order_id, payment_id),
        }
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Success
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn captured_payment_grants_purchase() {
        let f = setup().await;
        f.gateway.capture(&f.order.order_id, "pay_1", Money::inr(19900));

        let result = f.handler.handle(command("order_1", "pay_1")).await.unwrap();

        assert_eq!(result.grant.status_str(), "granted");
        let stored = OrderRepository::find_by_id(&f.store, &f.order.order_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.status, OrderStatus::Paid);
    }

    #[tokio::test]
    async fn second_verification_is_already_granted() {
        let f = setup().await;
        f.gateway.capture(&f.order.order_id, "pay_1", Money::inr(19900));

        f.handler.handle(command("order_1", "pay_1")).await.unwrap();
        let again = f.handler.handle(command("order_1", "pay_1")).await.unwrap();

        assert_eq!(again.grant.status_str(), "already-granted");
        assert_eq!(f.store.purchase_count().await, 1);
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Rejections
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn bad_signature_touches_nothing() {
        let f = setup().await;
        let mut cmd = command("order_1", "pay_1");
        cmd.signature = sign_payment("wrong", "order_1", "pay_1");

        let err = f.handler.handle(cmd).await.unwrap_err();

        assert_eq!(err, CommerceError::InvalidSignature);
        assert_eq!(f.gateway.call_count("fetch_payment"), 0);
    }

    #[tokio::test]
    async fn unknown_order_is_not_found() {
        let f = setup().await;
        let err = f.handler.handle(command("order_404", "pay_1")).await.unwrap_err();
        assert!(matches!(err, CommerceError::OrderNotFound(_)));
    }

    #[tokio::test]
    async fn other_buyer_is_forbidden() {
        let f = setup().await;
        let mut cmd = command("order_1", "pay_1");
        cmd.caller = UserId::new("someone-else").unwrap();

        let err = f.handler.handle(cmd).await.unwrap_err();
        assert_eq!(err.code(), "FORBIDDEN");
    }

    #[tokio::test]
    async fn short_capture_is_amount_mismatch() {
        let f = setup().await;
        f.gateway.capture(&f.order.order_id, "pay_1", Money::inr(19800));

        let err = f.handler.handle(command("order_1", "pay_1")).await.unwrap_err();

        assert_eq!(
            err,
            CommerceError::amount_mismatch(Money::inr(19900), Money::inr(19800))
        );
        assert_eq!(f.store.purchase_count().await, 0);
    }

    #[tokio::test]
    async fn other_currency_is_amount_mismatch() {
        let f = setup().await;
        let usd = Money::new(19900, Currency::new("USD").unwrap()).unwrap();
        f.gateway.capture(&f.order.order_id, "pay_1", usd);

        let err = f.handler.handle(command("order_1", "pay_1")).await.unwrap_err();
        assert_eq!(err.code(), "AMOUNT_MISMATCH");
    }

    #[tokio::test]
    async fn authorized_payment_is_not_captured() {
        let f = setup().await;
        f.gateway.set_payment(GatewayPayment {
            id: PaymentId::new("pay_1").unwrap(),
            order_id: Some(f.order.order_id.clone()),
            amount: Money::inr(19900),
            status: GatewayPaymentStatus::Authorized,
        });

        let err = f.handler.handle(command("order_1", "pay_1")).await.unwrap_err();
        assert_eq!(err.code(), "PAYMENT_NOT_CAPTURED");
    }

    #[tokio::test]
    async fn unknown_payment_is_not_captured() {
        let f = setup().await;
        let err = f.handler.handle(command("order_1", "pay_ghost")).await.unwrap_err();
        assert!(matches!(err, CommerceError::PaymentNotCaptured { .. }));
    }

    #[tokio::test]
    async fn gateway_outage_is_retryable() {
        let f = setup().await;
        f.gateway.set_error(PaymentError::network("connection reset"));

        let err = f.handler.handle(command("order_1", "pay_1")).await.unwrap_err();

        assert!(err.category().is_retryable());
        assert_eq!(f.store.purchase_count().await, 0);
    }
}
