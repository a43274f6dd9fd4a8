//! Cross-checks a gateway payment against the stored order.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::catalog::{ItemRef, Money, PlanTerms};
use crate::domain::commerce::{CommerceError, Order};
use crate::domain::foundation::{OrderId, PaymentId, UserId};

/// Payment status as reported by the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GatewayPaymentStatus {
    Created,
    Authorized,
    Captured,
    Refunded,
    Failed,
    #[serde(other)]
    Unknown,
}

impl GatewayPaymentStatus {
    pub fn parse(s: &str) -> Self {
        match s {
            "created" => Self::Created,
            "authorized" => Self::Authorized,
            "captured" => Self::Captured,
            "refunded" => Self::Refunded,
            "failed" => Self::Failed,
            _ => Self::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Authorized => "authorized",
            Self::Captured => "captured",
            Self::Refunded => "refunded",
            Self::Failed => "failed",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for GatewayPaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The live payment record fetched from the gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayPayment {
    pub id: PaymentId,
    pub order_id: Option<OrderId>,
    pub amount: Money,
    pub status: GatewayPaymentStatus,
}

/// A payment that the gateway confirmed as captured for exactly this order.
///
/// Only `CaptureVerifier::check` builds one, so holding a value is proof
/// that the capture checks passed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedPayment {
    buyer_id: UserId,
    item: ItemRef,
    order_id: OrderId,
    payment_id: PaymentId,
    amount: Money,
    plan_terms: Option<PlanTerms>,
}

impl VerifiedPayment {
    pub fn buyer_id(&self) -> &UserId {
        &self.buyer_id
    }

    pub fn item(&self) -> &ItemRef {
        &self.item
    }

    pub fn order_id(&self) -> &OrderId {
        &self.order_id
    }

    pub fn payment_id(&self) -> &PaymentId {
        &self.payment_id
    }

    pub fn amount(&self) -> &Money {
        &self.amount
    }

    /// Plan terms snapshotted on the order, for plan payments.
    pub fn plan_terms(&self) -> Option<&PlanTerms> {
        self.plan_terms.as_ref()
    }
}

/// Checks that a gateway payment settles a given order.
#[derive(Debug, Clone, Copy, Default)]
pub struct CaptureVerifier;

impl CaptureVerifier {
    pub fn new() -> Self {
        Self
    }

    /// Accepts only a captured payment linked to `order` for exactly the
    /// order's amount and currency.
    pub fn check(
        &self,
        payment: Option<&GatewayPayment>,
        order: &Order,
    ) -> Result<VerifiedPayment, CommerceError> {
        let payment =
            payment.ok_or_else(|| CommerceError::not_captured("payment does not exist"))?;

        if payment.status != GatewayPaymentStatus::Captured {
            return Err(CommerceError::not_captured(format!(
                "payment status is {}",
                payment.status
            )));
        }

        if payment.order_id.as_ref() != Some(&order.order_id) {
            return Err(CommerceError::not_captured(
                "payment belongs to a different order",
            ));
        }

        if payment.amount != order.amount {
            return Err(CommerceError::amount_mismatch(
                order.amount.clone(),
                payment.amount.clone(),
            ));
        }

        Ok(VerifiedPayment {
            buyer_id: order.buyer_id.clone(),
            item: order.item.clone(),
            order_id: order.order_id.clone(),
            payment_id: payment.id.clone(),
            amount: order.amount.clone(),
            plan_terms: order.plan_terms.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::catalog::Currency;
    use crate::domain::foundation::{ItemId, Timestamp};

    fn order() -> Order {
        Order::new(
            OrderId::new("order_1").unwrap(),
            UserId::new("buyer-1").unwrap(),
            ItemRef::photo(ItemId::new("photo-1").unwrap()),
            Money::inr(19900),
            None,
            Timestamp::now(),
        )
    }

    fn captured(amount: i64) -> GatewayPayment {
        GatewayPayment {
            id: PaymentId::new("pay_1").unwrap(),
            order_id: Some(OrderId::new("order_1").unwrap()),
            amount: Money::inr(amount),
            status: GatewayPaymentStatus::Captured,
        }
    }

    #[test]
    fn matching_capture_is_verified() {
        let verified = CaptureVerifier::new().check(Some(&captured(19900)), &order()).unwrap();
        assert_eq!(verified.amount(), &Money::inr(19900));
        assert_eq!(verified.payment_id().as_str(), "pay_1");
        assert_eq!(verified.buyer_id().as_str(), "buyer-1");
    }

    #[test]
    fn missing_payment_is_not_captured() {
        let err = CaptureVerifier::new().check(None, &order()).unwrap_err();
        assert!(matches!(err, CommerceError::PaymentNotCaptured { .. }));
    }

    #[test]
    fn authorized_payment_is_not_captured() {
        let mut p = captured(19900);
        p.status = GatewayPaymentStatus::Authorized;
        let err = CaptureVerifier::new().check(Some(&p), &order()).unwrap_err();
        assert!(matches!(err, CommerceError::PaymentNotCaptured { .. }));
    }

    #[test]
    fn payment_for_other_order_is_not_captured() {
        let mut p = captured(19900);
        p.order_id = Some(OrderId::new("order_2").unwrap());
        let err = CaptureVerifier::new().check(Some(&p), &order()).unwrap_err();
        assert!(matches!(err, CommerceError::PaymentNotCaptured { .. }));
    }

    #[test]
    fn payment_without_order_link_is_not_captured() {
        let mut p = captured(19900);
        p.order_id = None;
        assert!(CaptureVerifier::new().check(Some(&p), &order()).is_err());
    }

    #[test]
    fn short_capture_is_amount_mismatch() {
        let err = CaptureVerifier::new().check(Some(&captured(19800)), &order()).unwrap_err();
        assert_eq!(
            err,
            CommerceError::amount_mismatch(Money::inr(19900), Money::inr(19800))
        );
    }

    #[test]
    fn other_currency_is_amount_mismatch() {
        let mut p = captured(19900);
        p.amount = Money::new(19900, Currency::new("USD").unwrap()).unwrap();
        let err = CaptureVerifier::new().check(Some(&p), &order()).unwrap_err();
        assert!(matches!(err, CommerceError::AmountMismatch { .. }));
    }

    #[test]
    fn unknown_status_strings_parse_to_unknown() {
        assert_eq!(GatewayPaymentStatus::parse("captured"), GatewayPaymentStatus::Captured);
        assert_eq!(GatewayPaymentStatus::parse("disputed"), GatewayPaymentStatus::Unknown);
    }
}
