//! EntitlementLedger - turns a verified payment into exactly one entitlement.

use std::sync::Arc;

use crate::domain::catalog::ItemKind;
use crate::domain::commerce::{CommerceError, Entitlement, Grant, Purchase};
use crate::domain::foundation::Timestamp;
use crate::domain::payment::VerifiedPayment;
use crate::domain::plan::{PlanActivation, PlanGrant};
use crate::ports::{EntitlementStore, SaveResult};

/// Writes purchases and plan grants. Every write is keyed by a
/// deterministic id, so replaying the same payment returns the record
/// created the first time. Plan grants use the terms captured on the
/// order, never the live catalog.
pub struct EntitlementLedger {
    store: Arc<dyn EntitlementStore>,
}

impl EntitlementLedger {
    pub fn new(store: Arc<dyn EntitlementStore>) -> Self {
        Self { store }
    }

    pub async fn grant(&self, payment: VerifiedPayment) -> Result<Grant, CommerceError> {
        let now = Timestamp::now();
        let grant = match payment.item().kind {
            ItemKind::Photo => self.grant_photo(&payment, now).await?,
            ItemKind::Plan => self.grant_plan(&payment, now).await?,
        };

        if grant.is_new() {
            tracing::info!(
                order_id = %payment.order_id(),
                payment_id = %payment.payment_id(),
                buyer_id = %payment.buyer_id(),
                item = %payment.item(),
                "entitlement granted"
            );
        } else {
            tracing::debug!(
                order_id = %payment.order_id(),
                payment_id = %payment.payment_id(),
                "entitlement already granted"
            );
        }
        Ok(grant)
    }

    async fn grant_photo(
        &self,
        payment: &VerifiedPayment,
        now: Timestamp,
    ) -> Result<Grant, CommerceError> {
        let purchase = Purchase::new(
            payment.buyer_id().clone(),
            payment.item().id.clone(),
            payment.amount().clone(),
            payment.payment_id().clone(),
            payment.order_id().clone(),
            now,
        );

        let recorded = self.store.record_purchase(&purchase).await?;
        let entitlement = Entitlement::Purchase(recorded.record);
        Ok(match recorded.result {
            SaveResult::Inserted => Grant::Granted(entitlement),
            SaveResult::AlreadyExists => Grant::AlreadyGranted(entitlement),
        })
    }

    async fn grant_plan(
        &self,
        payment: &VerifiedPayment,
        now: Timestamp,
    ) -> Result<Grant, CommerceError> {
        let terms = payment.plan_terms().ok_or_else(|| {
            CommerceError::invalid_item(payment.item().to_string(), "order carries no plan terms")
        })?;

        let grant = PlanGrant::activate(
            payment.buyer_id().clone(),
            payment.item().id.clone(),
            terms,
            payment.payment_id().clone(),
            now,
        );
        let activation = PlanActivation::new(&grant, payment.order_id().clone(), now);

        let recorded = self.store.activate_plan(&activation, &grant).await?;
        let entitlement = Entitlement::Plan(recorded.record);
        Ok(match recorded.result {
            SaveResult::Inserted => Grant::Granted(entitlement),
            SaveResult::AlreadyExists => Grant::AlreadyGranted(entitlement),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryStore;
    use crate::domain::catalog::{ItemRef, Money, PlanTerms};
    use crate::domain::commerce::{Order, OrderStatus};
    use crate::domain::foundation::{ItemId, OrderId, PaymentId, UserId};
    use crate::domain::payment::{CaptureVerifier, GatewayPayment, GatewayPaymentStatus};
    use crate::ports::{OrderRepository, PlanGrantRepository};

    fn order(id: &str, item: ItemRef, amount: Money) -> Order {
        Order::new(
            OrderId::new(id).unwrap(),
            UserId::new("buyer-1").unwrap(),
            item,
            amount,
            None,
            Timestamp::now(),
        )
    }

    fn verified(order: &Order, payment_id: &str) -> VerifiedPayment {
        let payment = GatewayPayment {
            id: PaymentId::new(payment_id).unwrap(),
            order_id: Some(order.order_id.clone()),
            amount: order.amount.clone(),
            status: GatewayPaymentStatus::Captured,
        };
        CaptureVerifier::new().check(Some(&payment), order).unwrap()
    }

    fn basic_terms() -> PlanTerms {
        PlanTerms {
            upload_limit: 25,
            max_price_per_item: Money::inr(50000),
            duration_days: 30,
        }
    }

    fn plan_order(id: &str) -> Order {
        order(id, ItemRef::plan(ItemId::new("plan-basic").unwrap()), Money::inr(49900))
            .with_plan_terms(basic_terms())
    }

    async fn setup() -> (InMemoryStore, EntitlementLedger) {
        let store = InMemoryStore::new();
        let ledger = EntitlementLedger::new(Arc::new(store.clone()));
        (store, ledger)
    }

    #[tokio::test]
    async fn photo_payment_records_one_purchase() {
        let (store, ledger) = setup().await;
        let o = order("order_1", ItemRef::photo(ItemId::new("photo-1").unwrap()), Money::inr(19900));
        store.insert(&o).await.unwrap();

        let first = ledger.grant(verified(&o, "pay_1")).await.unwrap();
        let second = ledger.grant(verified(&o, "pay_1")).await.unwrap();

        assert!(first.is_new());
        assert_eq!(second.status_str(), "already-granted");
        assert_eq!(first.entitlement(), second.entitlement());
        assert_eq!(store.purchase_count().await, 1);

        let stored = OrderRepository::find_by_id(&store, &o.order_id).await.unwrap().unwrap();
        assert_eq!(stored.status, OrderStatus::Paid);
    }

    #[tokio::test]
    async fn plan_payment_grants_full_quota() {
        let (store, ledger) = setup().await;
        let o = plan_order("order_2");
        store.insert(&o).await.unwrap();

        let grant = ledger.grant(verified(&o, "pay_2")).await.unwrap();

        match grant {
            Grant::Granted(Entitlement::Plan(g)) => {
                assert_eq!(g.upload_limit_remaining, 25);
                assert_eq!(g.upload_limit, 25);
            }
            other => panic!("unexpected grant {:?}", other),
        }
        let stored = store
            .find_by_uid(&UserId::new("buyer-1").unwrap())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.plan_id.as_str(), "plan-basic");
    }

    #[tokio::test]
    async fn replayed_plan_payment_does_not_reset_quota() {
        let (store, ledger) = setup().await;
        let uid = UserId::new("buyer-1").unwrap();
        let o = plan_order("order_3");
        store.insert(&o).await.unwrap();

        ledger.grant(verified(&o, "pay_3")).await.unwrap();
        store.consume_upload(&uid, Timestamp::now()).await.unwrap();
        let replay = ledger.grant(verified(&o, "pay_3")).await.unwrap();

        assert!(!replay.is_new());
        assert_eq!(store.find_by_uid(&uid).await.unwrap().unwrap().upload_limit_remaining, 24);
        assert_eq!(store.activation_count().await, 1);
    }

    #[tokio::test]
    async fn plan_grant_follows_terms_on_the_order() {
        let (store, ledger) = setup().await;
        let o = order("order_4", ItemRef::plan(ItemId::new("plan-basic").unwrap()), Money::inr(49900))
            .with_plan_terms(PlanTerms {
                upload_limit: 7,
                max_price_per_item: Money::inr(1000),
                duration_days: 3,
            });
        store.insert(&o).await.unwrap();

        let before = Timestamp::now();
        let grant = ledger.grant(verified(&o, "pay_4")).await.unwrap();

        match grant.entitlement() {
            Entitlement::Plan(g) => {
                assert_eq!(g.upload_limit_remaining, 7);
                assert_eq!(g.max_price_per_item, Money::inr(1000));
                assert!(g.expires_at.is_before(&before.add_days(4)));
            }
            other => panic!("unexpected entitlement {:?}", other),
        }
    }

    #[tokio::test]
    async fn plan_order_without_terms_is_invalid_item() {
        let (store, ledger) = setup().await;
        let o = order("order_5", ItemRef::plan(ItemId::new("plan-basic").unwrap()), Money::inr(49900));
        store.insert(&o).await.unwrap();

        let err = ledger.grant(verified(&o, "pay_5")).await.unwrap_err();
        assert_eq!(err.code(), "INVALID_ITEM");
        assert_eq!(store.activation_count().await, 0);
    }

    #[tokio::test]
    async fn missing_order_surfaces_as_error() {
        let (_, ledger) = setup().await;
        let o = order("order_unknown", ItemRef::photo(ItemId::new("photo-1").unwrap()), Money::inr(19900));

        assert!(ledger.grant(verified(&o, "pay_6")).await.is_err());
    }
}
