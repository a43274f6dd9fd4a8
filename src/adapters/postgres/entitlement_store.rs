//! PostgreSQL implementation of EntitlementStore and PurchaseRepository.
//!
//! Each ledger write is one transaction. The idempotency row is inserted
//! with `ON CONFLICT DO NOTHING`; a concurrent duplicate blocks on the
//! primary key until the first transaction commits, then inserts nothing
//! and reads back the stored record. A renewal replaces the seller's quota
//! but never pulls `expires_at` earlier than the grant it replaces.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};

use super::plan_grant_repository::{PlanGrantRow, GRANT_COLUMNS};
use super::rows::{corrupt, db_error, money, timestamp, to_i32};
use crate::domain::commerce::Purchase;
use crate::domain::foundation::{DomainError, ErrorCode, ItemId, OrderId, PaymentId, UserId};
use crate::domain::plan::{PlanActivation, PlanGrant};
use crate::ports::{EntitlementStore, PurchaseRepository, Recorded};

pub struct PostgresEntitlementStore {
    pool: PgPool,
}

impl PostgresEntitlementStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct PurchaseRow {
    id: String,
    buyer_id: String,
    item_id: String,
    price_minor: i64,
    currency: String,
    payment_id: String,
    order_id: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<PurchaseRow> for Purchase {
    type Error = DomainError;

    fn try_from(row: PurchaseRow) -> Result<Self, Self::Error> {
        Ok(Purchase {
            id: row.id,
            buyer_id: UserId::new(row.buyer_id).map_err(|e| corrupt("purchases.buyer_id", e))?,
            item_id: ItemId::new(row.item_id).map_err(|e| corrupt("purchases.item_id", e))?,
            price: money(row.price_minor, &row.currency, "purchases.price_minor")?,
            payment_id: PaymentId::new(row.payment_id)
                .map_err(|e| corrupt("purchases.payment_id", e))?,
            order_id: OrderId::new(row.order_id).map_err(|e| corrupt("purchases.order_id", e))?,
            created_at: timestamp(row.created_at),
        })
    }
}

const PURCHASE_COLUMNS: &str =
    "id, buyer_id, item_id, price_minor, currency, payment_id, order_id, created_at";

async fn mark_paid(tx: &mut Transaction<'_, Postgres>, order_id: &OrderId) -> Result<(), DomainError> {
    let result = sqlx::query("UPDATE orders SET status = 'paid' WHERE order_id = $1")
        .bind(order_id.as_str())
        .execute(&mut **tx)
        .await
        .map_err(db_error("Failed to mark order paid"))?;

    if result.rows_affected() == 0 {
        return Err(DomainError::new(
            ErrorCode::OrderNotFound,
            format!("Order not found: {}", order_id),
        ));
    }
    Ok(())
}

#[async_trait]
impl EntitlementStore for PostgresEntitlementStore {
    async fn record_purchase(
        &self,
        purchase: &Purchase,
    ) -> Result<Recorded<Purchase>, DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("Failed to start transaction"))?;

        let inserted = sqlx::query(
            r#"
            INSERT INTO purchases (
                id, buyer_id, item_id, price_minor, currency, payment_id, order_id, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(&purchase.id)
        .bind(purchase.buyer_id.as_str())
        .bind(purchase.item_id.as_str())
        .bind(purchase.price.amount_minor)
        .bind(purchase.price.currency.as_str())
        .bind(purchase.payment_id.as_str())
        .bind(purchase.order_id.as_str())
        .bind(purchase.created_at.as_datetime())
        .execute(&mut *tx)
        .await
        .map_err(db_error("Failed to insert purchase"))?
        .rows_affected()
            > 0;

        if !inserted {
            let row: PurchaseRow = sqlx::query_as(&format!(
                "SELECT {} FROM purchases WHERE id = $1",
                PURCHASE_COLUMNS
            ))
            .bind(&purchase.id)
            .fetch_one(&mut *tx)
            .await
            .map_err(db_error("Failed to load existing purchase"))?;
            tx.commit().await.map_err(db_error("Failed to commit transaction"))?;
            return Ok(Recorded::existing(Purchase::try_from(row)?));
        }

        mark_paid(&mut tx, &purchase.order_id).await?;
        tx.commit().await.map_err(db_error("Failed to commit transaction"))?;

        Ok(Recorded::inserted(purchase.clone()))
    }

    async fn activate_plan(
        &self,
        activation: &PlanActivation,
        grant: &PlanGrant,
    ) -> Result<Recorded<PlanGrant>, DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("Failed to start transaction"))?;

        let inserted = sqlx::query(
            r#"
            INSERT INTO plan_activations (
                id, uid, plan_id, payment_id, order_id, expires_at, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(&activation.id)
        .bind(activation.uid.as_str())
        .bind(activation.plan_id.as_str())
        .bind(activation.payment_id.as_str())
        .bind(activation.order_id.as_str())
        .bind(activation.expires_at.as_datetime())
        .bind(activation.created_at.as_datetime())
        .execute(&mut *tx)
        .await
        .map_err(db_error("Failed to insert plan activation"))?
        .rows_affected()
            > 0;

        if !inserted {
            let row: PlanGrantRow = sqlx::query_as(&format!(
                "SELECT {} FROM plan_grants WHERE uid = $1",
                GRANT_COLUMNS
            ))
            .bind(grant.uid.as_str())
            .fetch_one(&mut *tx)
            .await
            .map_err(db_error("Failed to load existing plan grant"))?;
            tx.commit().await.map_err(db_error("Failed to commit transaction"))?;
            return Ok(Recorded::existing(PlanGrant::try_from(row)?));
        }

        let row: PlanGrantRow = sqlx::query_as(&format!(
            r#"
            INSERT INTO plan_grants (
                uid, plan_id, upload_limit, upload_limit_remaining, max_price_minor,
                currency, expires_at, last_payment_id, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (uid) DO UPDATE SET
                plan_id = EXCLUDED.plan_id,
                upload_limit = EXCLUDED.upload_limit,
                upload_limit_remaining = EXCLUDED.upload_limit_remaining,
                max_price_minor = EXCLUDED.max_price_minor,
                currency = EXCLUDED.currency,
                expires_at = GREATEST(plan_grants.expires_at, EXCLUDED.expires_at),
                last_payment_id = EXCLUDED.last_payment_id,
                updated_at = EXCLUDED.updated_at
            RETURNING {}
            "#,
            GRANT_COLUMNS
        ))
        .bind(grant.uid.as_str())
        .bind(grant.plan_id.as_str())
        .bind(to_i32(grant.upload_limit, "upload_limit")?)
        .bind(to_i32(grant.upload_limit_remaining, "upload_limit_remaining")?)
        .bind(grant.max_price_per_item.amount_minor)
        .bind(grant.max_price_per_item.currency.as_str())
        .bind(grant.expires_at.as_datetime())
        .bind(grant.last_payment_id.as_str())
        .bind(grant.updated_at.as_datetime())
        .fetch_one(&mut *tx)
        .await
        .map_err(db_error("Failed to upsert plan grant"))?;

        mark_paid(&mut tx, &activation.order_id).await?;
        tx.commit().await.map_err(db_error("Failed to commit transaction"))?;

        Ok(Recorded::inserted(PlanGrant::try_from(row)?))
    }
}

#[async_trait]
impl PurchaseRepository for PostgresEntitlementStore {
    async fn find_by_buyer_and_item(
        &self,
        buyer_id: &UserId,
        item_id: &ItemId,
    ) -> Result<Option<Purchase>, DomainError> {
        let row: Option<PurchaseRow> = sqlx::query_as(&format!(
            "SELECT {} FROM purchases WHERE buyer_id = $1 AND item_id = $2 ORDER BY created_at LIMIT 1",
            PURCHASE_COLUMNS
        ))
        .bind(buyer_id.as_str())
        .bind(item_id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to load purchase"))?;

        row.map(Purchase::try_from).transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::catalog::Money;

    #[test]
    fn purchase_row_converts() {
        let purchase = Purchase::try_from(PurchaseRow {
            id: "abc".to_string(),
            buyer_id: "buyer-1".to_string(),
            item_id: "photo-1".to_string(),
            price_minor: 19900,
            currency: "INR".to_string(),
            payment_id: "pay_1".to_string(),
            order_id: "order_1".to_string(),
            created_at: Utc::now(),
        })
        .unwrap();
        assert_eq!(purchase.price, Money::inr(19900));
        assert_eq!(purchase.payment_id.as_str(), "pay_1");
    }

    #[test]
    fn blank_payment_id_is_corrupt() {
        let result = Purchase::try_from(PurchaseRow {
            id: "abc".to_string(),
            buyer_id: "buyer-1".to_string(),
            item_id: "photo-1".to_string(),
            price_minor: 19900,
            currency: "INR".to_string(),
            payment_id: " ".to_string(),
            order_id: "order_1".to_string(),
            created_at: Utc::now(),
        });
        assert!(result.is_err());
    }
}
