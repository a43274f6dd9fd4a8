//! Mock payment gateway for testing.
//!
//! Provides a configurable in-process `PaymentGateway` for unit and
//! integration tests. Supports:
//! - Order creation with sequential ids
//! - Simulated captures and arbitrary payment records
//! - Error injection
//! - Call tracking

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::domain::catalog::Money;
use crate::domain::foundation::{OrderId, PaymentId};
use crate::domain::payment::{GatewayPayment, GatewayPaymentStatus};
use crate::ports::{CreateOrderRequest, GatewayOrder, PaymentError, PaymentGateway};

/// Mock payment gateway.
///
/// ```ignore
/// let gateway = MockPaymentGateway::new();
/// let order = gateway.create_order(request).await?;
/// gateway.capture(&order.id, "pay_1", order.amount.clone());
/// ```
#[derive(Default)]
pub struct MockPaymentGateway {
    inner: Arc<Mutex<MockState>>,
}

#[derive(Default)]
struct MockState {
    orders: HashMap<OrderId, GatewayOrder>,
    payments: HashMap<PaymentId, GatewayPayment>,
    order_counter: u64,
    next_error: Option<PaymentError>,
    method_errors: HashMap<String, PaymentError>,
    call_log: Vec<MethodCall>,
}

/// Recorded method call for assertions.
#[derive(Debug, Clone)]
pub struct MethodCall {
    pub method: String,
    pub args: Vec<String>,
}

impl MockPaymentGateway {
    pub fn new() -> Self {
        Self::default()
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Configuration Methods
    // ════════════════════════════════════════════════════════════════════════════

    /// Records a captured payment for `order_id`.
    pub fn capture(&self, order_id: &OrderId, payment_id: &str, amount: Money) -> PaymentId {
        let payment_id = PaymentId::new(payment_id).expect("mock payment id must not be blank");
        self.set_payment(GatewayPayment {
            id: payment_id.clone(),
            order_id: Some(order_id.clone()),
            amount,
            status: GatewayPaymentStatus::Captured,
        });
        payment_id
    }

    /// Stores an arbitrary payment record.
    pub fn set_payment(&self, payment: GatewayPayment) {
        self.inner
            .lock()
            .unwrap()
            .payments
            .insert(payment.id.clone(), payment);
    }

    /// Set an error to return on the next call to any method.
    pub fn set_error(&self, error: PaymentError) {
        self.inner.lock().unwrap().next_error = Some(error);
    }

    /// Set an error for a specific method.
    pub fn set_method_error(&self, method: &str, error: PaymentError) {
        self.inner
            .lock()
            .unwrap()
            .method_errors
            .insert(method.to_string(), error);
    }

    /// Clear all configured errors.
    pub fn clear_errors(&self) {
        let mut state = self.inner.lock().unwrap();
        state.next_error = None;
        state.method_errors.clear();
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Call Tracking
    // ════════════════════════════════════════════════════════════════════════════

    pub fn calls(&self) -> Vec<MethodCall> {
        self.inner.lock().unwrap().call_log.clone()
    }

    pub fn call_count(&self, method: &str) -> usize {
        self.inner
            .lock()
            .unwrap()
            .call_log
            .iter()
            .filter(|c| c.method == method)
            .count()
    }

    /// Returns the order the gateway created with this id.
    pub fn order(&self, id: &OrderId) -> Option<GatewayOrder> {
        self.inner.lock().unwrap().orders.get(id).cloned()
    }

    fn record_call(&self, method: &str, args: Vec<String>) {
        self.inner.lock().unwrap().call_log.push(MethodCall {
            method: method.to_string(),
            args,
        });
    }

    fn check_error(&self, method: &str) -> Result<(), PaymentError> {
        let mut state = self.inner.lock().unwrap();

        if let Some(error) = state.method_errors.get(method) {
            return Err(error.clone());
        }

        if let Some(error) = state.next_error.take() {
            return Err(error);
        }

        Ok(())
    }
}

impl Clone for MockPaymentGateway {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

#[async_trait]
impl PaymentGateway for MockPaymentGateway {
    async fn create_order(
        &self,
        request: CreateOrderRequest,
    ) -> Result<GatewayOrder, PaymentError> {
        self.record_call(
            "create_order",
            vec![request.amount.to_string(), request.receipt.clone()],
        );
        self.check_error("create_order")?;

        let mut state = self.inner.lock().unwrap();
        state.order_counter += 1;
        let id = OrderId::new(format!("order_mock_{:06}", state.order_counter))
            .expect("generated order id is never blank");

        let order = GatewayOrder {
            id: id.clone(),
            amount: request.amount,
            status: "created".to_string(),
        };
        state.orders.insert(id, order.clone());
        Ok(order)
    }

    async fn fetch_payment(
        &self,
        payment_id: &PaymentId,
    ) -> Result<Option<GatewayPayment>, PaymentError> {
        self.record_call("fetch_payment", vec![payment_id.to_string()]);
        self.check_error("fetch_payment")?;

        Ok(self.inner.lock().unwrap().payments.get(payment_id).cloned())
    }
}
