//! In-memory implementation of every store port.
//!
//! One mutex guards all state, so each port method is a single critical
//! section and the atomicity contracts of `EntitlementStore` and
//! `PlanGrantRepository` hold exactly as they do in Postgres.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::catalog::{Photo, Plan};
use crate::domain::commerce::{Order, OrderStatus, Purchase};
use crate::domain::foundation::{
    DomainError, ErrorCode, EventId, ItemId, OrderId, Timestamp, UserId,
};
use crate::domain::payment::WebhookEvent;
use crate::domain::plan::{PlanActivation, PlanGrant};
use crate::ports::{
    EntitlementStore, ItemCatalog, OrderRepository, PlanGrantRepository, PurchaseRepository,
    Recorded, SaveResult, WebhookEventRepository,
};

#[derive(Default)]
struct State {
    photos: HashMap<ItemId, Photo>,
    plans: HashMap<ItemId, Plan>,
    orders: HashMap<OrderId, Order>,
    purchases: HashMap<String, Purchase>,
    activations: HashMap<String, PlanActivation>,
    grants: HashMap<UserId, PlanGrant>,
    webhook_events: HashMap<EventId, WebhookEvent>,
}

impl State {
    fn mark_paid(&mut self, order_id: &OrderId) -> Result<(), DomainError> {
        let order = self.orders.get_mut(order_id).ok_or_else(|| {
            DomainError::new(ErrorCode::OrderNotFound, format!("Order not found: {}", order_id))
        })?;
        order.mark_paid().map_err(|e| {
            DomainError::new(ErrorCode::InvalidStateTransition, e.to_string())
                .with_detail("order_id", order_id.as_str())
        })
    }
}

/// Shared in-memory store. Clones share the same state.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    state: Arc<Mutex<State>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_photo(&self, photo: Photo) {
        self.state.lock().await.photos.insert(photo.id.clone(), photo);
    }

    pub async fn add_plan(&self, plan: Plan) {
        self.state.lock().await.plans.insert(plan.id.clone(), plan);
    }

    /// Replaces a seller's grant directly, bypassing the ledger.
    pub async fn put_grant(&self, grant: PlanGrant) {
        self.state.lock().await.grants.insert(grant.uid.clone(), grant);
    }

    pub async fn purchase_count(&self) -> usize {
        self.state.lock().await.purchases.len()
    }

    pub async fn activation_count(&self) -> usize {
        self.state.lock().await.activations.len()
    }

    pub async fn webhook_event_count(&self) -> usize {
        self.state.lock().await.webhook_events.len()
    }
}

#[async_trait]
impl ItemCatalog for InMemoryStore {
    async fn find_photo(&self, id: &ItemId) -> Result<Option<Photo>, DomainError> {
        Ok(self.state.lock().await.photos.get(id).cloned())
    }

    async fn find_plan(&self, id: &ItemId) -> Result<Option<Plan>, DomainError> {
        Ok(self.state.lock().await.plans.get(id).cloned())
    }
}

#[async_trait]
impl OrderRepository for InMemoryStore {
    async fn insert(&self, order: &Order) -> Result<(), DomainError> {
        let mut state = self.state.lock().await;
        if state.orders.contains_key(&order.order_id) {
            return Err(DomainError::new(
                ErrorCode::Conflict,
                format!("Order {} already exists", order.order_id),
            ));
        }
        state.orders.insert(order.order_id.clone(), order.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &OrderId) -> Result<Option<Order>, DomainError> {
        Ok(self.state.lock().await.orders.get(id).cloned())
    }

    async fn mark_failed(&self, id: &OrderId) -> Result<bool, DomainError> {
        let mut state = self.state.lock().await;
        match state.orders.get_mut(id) {
            Some(order) if order.status == OrderStatus::Created => {
                order.status = OrderStatus::Failed;
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

#[async_trait]
impl EntitlementStore for InMemoryStore {
    async fn record_purchase(
        &self,
        purchase: &Purchase,
    ) -> Result<Recorded<Purchase>, DomainError> {
        let mut state = self.state.lock().await;
        if let Some(existing) = state.purchases.get(&purchase.id) {
            return Ok(Recorded::existing(existing.clone()));
        }
        state.mark_paid(&purchase.order_id)?;
        state.purchases.insert(purchase.id.clone(), purchase.clone());
        Ok(Recorded::inserted(purchase.clone()))
    }

    async fn activate_plan(
        &self,
        activation: &PlanActivation,
        grant: &PlanGrant,
    ) -> Result<Recorded<PlanGrant>, DomainError> {
        let mut state = self.state.lock().await;
        if state.activations.contains_key(&activation.id) {
            let current = state.grants.get(&grant.uid).cloned().ok_or_else(|| {
                DomainError::new(
                    ErrorCode::InternalError,
                    format!("Activation {} exists without a grant", activation.id),
                )
            })?;
            return Ok(Recorded::existing(current));
        }
        state.mark_paid(&activation.order_id)?;
        state
            .activations
            .insert(activation.id.clone(), activation.clone());
        let grant = grant.clone().renewing(state.grants.get(&grant.uid));
        state.grants.insert(grant.uid.clone(), grant.clone());
        Ok(Recorded::inserted(grant))
    }
}

#[async_trait]
impl PurchaseRepository for InMemoryStore {
    async fn find_by_buyer_and_item(
        &self,
        buyer_id: &UserId,
        item_id: &ItemId,
    ) -> Result<Option<Purchase>, DomainError> {
        let state = self.state.lock().await;
        Ok(state
            .purchases
            .values()
            .find(|p| &p.buyer_id == buyer_id && &p.item_id == item_id)
            .cloned())
    }
}

#[async_trait]
impl PlanGrantRepository for InMemoryStore {
    async fn find_by_uid(&self, uid: &UserId) -> Result<Option<PlanGrant>, DomainError> {
        Ok(self.state.lock().await.grants.get(uid).cloned())
    }

    async fn consume_upload(
        &self,
        uid: &UserId,
        now: Timestamp,
    ) -> Result<Option<u32>, DomainError> {
        let mut state = self.state.lock().await;
        Ok(state.grants.get_mut(uid).and_then(|g| g.take_slot(now)))
    }
}

#[async_trait]
impl WebhookEventRepository for InMemoryStore {
    async fn append(&self, event: &WebhookEvent) -> Result<SaveResult, DomainError> {
        let mut state = self.state.lock().await;
        if state.webhook_events.contains_key(&event.id) {
            return Ok(SaveResult::AlreadyExists);
        }
        state.webhook_events.insert(event.id.clone(), event.clone());
        Ok(SaveResult::Inserted)
    }

    async fn find_by_id(&self, id: &EventId) -> Result<Option<WebhookEvent>, DomainError> {
        Ok(self.state.lock().await.webhook_events.get(id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::catalog::{ItemRef, Money, PlanTerms};
    use crate::domain::foundation::PaymentId;

    fn order(id: &str) -> Order {
        Order::new(
            OrderId::new(id).unwrap(),
            UserId::new("buyer-1").unwrap(),
            ItemRef::photo(ItemId::new("photo-1").unwrap()),
            Money::inr(19900),
            None,
            Timestamp::now(),
        )
    }

    fn purchase(order_id: &str, payment: &str) -> Purchase {
        Purchase::new(
            UserId::new("buyer-1").unwrap(),
            ItemId::new("photo-1").unwrap(),
            Money::inr(19900),
            PaymentId::new(payment).unwrap(),
            OrderId::new(order_id).unwrap(),
            Timestamp::now(),
        )
    }

    #[tokio::test]
    async fn duplicate_order_insert_is_conflict() {
        let store = InMemoryStore::new();
        store.insert(&order("order_1")).await.unwrap();
        let err = store.insert(&order("order_1")).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::Conflict);
    }

    #[tokio::test]
    async fn record_purchase_marks_order_paid_once() {
        let store = InMemoryStore::new();
        store.insert(&order("order_1")).await.unwrap();

        let first = store.record_purchase(&purchase("order_1", "pay_1")).await.unwrap();
        let second = store.record_purchase(&purchase("order_1", "pay_1")).await.unwrap();

        assert_eq!(first.result, SaveResult::Inserted);
        assert_eq!(second.result, SaveResult::AlreadyExists);
        assert_eq!(first.record, second.record);
        assert_eq!(store.purchase_count().await, 1);

        let stored = OrderRepository::find_by_id(&store, &OrderId::new("order_1").unwrap())
            .await
            .unwrap()
            .unwrap();
        assert!(stored.is_paid());
    }

    #[tokio::test]
    async fn record_purchase_for_missing_order_writes_nothing() {
        let store = InMemoryStore::new();
        assert!(store.record_purchase(&purchase("order_x", "pay_1")).await.is_err());
        assert_eq!(store.purchase_count().await, 0);
    }

    #[tokio::test]
    async fn mark_failed_only_moves_created_orders() {
        let store = InMemoryStore::new();
        store.insert(&order("order_1")).await.unwrap();
        store.record_purchase(&purchase("order_1", "pay_1")).await.unwrap();

        assert!(!store.mark_failed(&OrderId::new("order_1").unwrap()).await.unwrap());

        store.insert(&order("order_2")).await.unwrap();
        assert!(store.mark_failed(&OrderId::new("order_2").unwrap()).await.unwrap());
        assert!(!store.mark_failed(&OrderId::new("order_2").unwrap()).await.unwrap());
    }

    #[tokio::test]
    async fn consume_upload_on_missing_grant_is_none() {
        let store = InMemoryStore::new();
        let uid = UserId::new("seller-1").unwrap();
        assert_eq!(store.consume_upload(&uid, Timestamp::now()).await.unwrap(), None);
    }

    async fn activate(store: &InMemoryStore, order_id: &str, payment: &str, days: u32) -> PlanGrant {
        store.insert(&order(order_id)).await.unwrap();
        let terms = PlanTerms {
            upload_limit: days,
            max_price_per_item: Money::inr(50000),
            duration_days: days,
        };
        let now = Timestamp::now();
        let grant = PlanGrant::activate(
            UserId::new("seller-1").unwrap(),
            ItemId::new("plan-basic").unwrap(),
            &terms,
            PaymentId::new(payment).unwrap(),
            now,
        );
        let activation = PlanActivation::new(&grant, OrderId::new(order_id).unwrap(), now);
        store.activate_plan(&activation, &grant).await.unwrap().record
    }

    #[tokio::test]
    async fn shorter_renewal_never_shortens_expiry() {
        let store = InMemoryStore::new();
        let month = activate(&store, "order_1", "pay_1", 30).await;
        let week = activate(&store, "order_2", "pay_2", 7).await;

        assert_eq!(week.expires_at, month.expires_at);
        assert_eq!(week.upload_limit_remaining, 7);
        let stored = store
            .find_by_uid(&UserId::new("seller-1").unwrap())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored, week);
    }
}
