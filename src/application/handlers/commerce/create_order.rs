//! CreateOrderHandler - Command handler for opening a gateway order.

use std::collections::BTreeMap;
use std::sync::Arc;

use uuid::Uuid;

use super::price_authority::PriceAuthority;
use crate::domain::catalog::{Item, ItemRef, Money};
use crate::domain::commerce::{CommerceError, Order};
use crate::domain::foundation::{OrderId, Timestamp, UserId};
use crate::ports::{CreateOrderRequest, ItemCatalog, OrderRepository, PaymentGateway, PurchaseRepository};

/// Command to create an order for one catalog item.
#[derive(Debug, Clone)]
pub struct CreateOrderCommand {
    pub buyer_id: UserId,
    pub item: ItemRef,
    pub note: Option<String>,
    /// Amount the client believes it is paying. Only compared and logged.
    pub client_amount: Option<i64>,
}

/// Result of successful order creation.
#[derive(Debug, Clone)]
pub struct CreateOrderResult {
    pub order_id: OrderId,
    pub amount: Money,
}

/// Handler for creating orders.
///
/// The amount always comes from the catalog. The order is persisted only
/// after the gateway has accepted it.
pub struct CreateOrderHandler {
    prices: PriceAuthority,
    purchases: Arc<dyn PurchaseRepository>,
    orders: Arc<dyn OrderRepository>,
    gateway: Arc<dyn PaymentGateway>,
}

impl CreateOrderHandler {
    pub fn new(
        catalog: Arc<dyn ItemCatalog>,
        purchases: Arc<dyn PurchaseRepository>,
        orders: Arc<dyn OrderRepository>,
        gateway: Arc<dyn PaymentGateway>,
    ) -> Self {
        Self {
            prices: PriceAuthority::new(catalog),
            purchases,
            orders,
            gateway,
        }
    }

    pub async fn handle(&self, cmd: CreateOrderCommand) -> Result<CreateOrderResult, CommerceError> {
        // 1. Resolve the authoritative price
        let priced = self.prices.resolve(&cmd.item).await.map_err(|e| match e {
            CommerceError::ItemNotFound(_) => {
                CommerceError::invalid_item(cmd.item.to_string(), "item is not available")
            }
            other => other,
        })?;

        // 2. Photos: no self-purchase, no second license
        if let Item::Photo(photo) = &priced.item {
            if photo.owner_id == cmd.buyer_id {
                return Err(CommerceError::invalid_item(
                    cmd.item.to_string(),
                    "cannot buy your own photo",
                ));
            }
            if self
                .purchases
                .find_by_buyer_and_item(&cmd.buyer_id, &photo.id)
                .await?
                .is_some()
            {
                return Err(CommerceError::AlreadyPurchased(photo.id.clone()));
            }
        }

        if let Some(client_amount) = cmd.client_amount {
            if client_amount != priced.price.amount_minor {
                tracing::info!(
                    buyer_id = %cmd.buyer_id,
                    item = %cmd.item,
                    client_amount,
                    server_amount = priced.price.amount_minor,
                    "client amount differs from catalog price, using catalog price"
                );
            }
        }

        // 3. Open the order at the gateway
        let mut notes = BTreeMap::new();
        notes.insert("buyer_id".to_string(), cmd.buyer_id.to_string());
        notes.insert("item_type".to_string(), cmd.item.kind.as_str().to_string());
        notes.insert("item_id".to_string(), cmd.item.id.to_string());
        if let Some(note) = &cmd.note {
            notes.insert("note".to_string(), note.clone());
        }

        let gateway_order = self
            .gateway
            .create_order(CreateOrderRequest {
                amount: priced.price.clone(),
                receipt: format!("rcpt_{}", Uuid::new_v4().simple()),
                notes,
            })
            .await
            .map_err(|e| CommerceError::gateway(e.message, e.retryable))?;

        // 4. Persist the order snapshot, plan terms included
        let order = Order::new(
            gateway_order.id,
            cmd.buyer_id,
            cmd.item,
            priced.price,
            cmd.note,
            Timestamp::now(),
        );
        let order = match &priced.item {
            Item::Plan(plan) => order.with_plan_terms(plan.terms()),
            Item::Photo(_) => order,
        };
        self.orders.insert(&order).await?;

        tracing::info!(
            order_id = %order.order_id,
            buyer_id = %order.buyer_id,
            item = %order.item,
            amount = %order.amount,
            "order created"
        );

        Ok(CreateOrderResult {
            order_id: order.order_id,
            amount: order.amount,
        })
    }
}
