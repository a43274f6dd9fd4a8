//! PostgreSQL implementation of OrderRepository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use super::rows::{corrupt, count, db_error, money, timestamp, to_i32};
use crate::domain::catalog::{ItemKind, ItemRef, PlanTerms};
use crate::domain::commerce::{Order, OrderStatus};
use crate::domain::foundation::{DomainError, ErrorCode, ItemId, OrderId, UserId};
use crate::ports::OrderRepository;

pub struct PostgresOrderRepository {
    pool: PgPool,
}

impl PostgresOrderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    order_id: String,
    buyer_id: String,
    item_type: String,
    item_id: String,
    amount_minor: i64,
    currency: String,
    status: String,
    note: Option<String>,
    plan_upload_limit: Option<i32>,
    plan_max_price_minor: Option<i64>,
    plan_max_price_currency: Option<String>,
    plan_duration_days: Option<i32>,
    created_at: DateTime<Utc>,
}

impl OrderRow {
    fn plan_terms(&self) -> Result<Option<PlanTerms>, DomainError> {
        match (
            self.plan_upload_limit,
            self.plan_max_price_minor,
            self.plan_max_price_currency.as_deref(),
            self.plan_duration_days,
        ) {
            (None, None, None, None) => Ok(None),
            (Some(limit), Some(max_minor), Some(currency), Some(days)) => Ok(Some(PlanTerms {
                upload_limit: count(limit, "orders.plan_upload_limit")?,
                max_price_per_item: money(max_minor, currency, "orders.plan_max_price_minor")?,
                duration_days: count(days, "orders.plan_duration_days")?,
            })),
            _ => Err(corrupt("orders.plan_upload_limit", "partial plan terms")),
        }
    }
}

impl TryFrom<OrderRow> for Order {
    type Error = DomainError;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        let kind: ItemKind = row.item_type.parse().map_err(|e| corrupt("orders.item_type", e))?;
        let status: OrderStatus = row.status.parse().map_err(|e| corrupt("orders.status", e))?;
        let plan_terms = row.plan_terms()?;
        Ok(Order {
            order_id: OrderId::new(row.order_id).map_err(|e| corrupt("orders.order_id", e))?,
            buyer_id: UserId::new(row.buyer_id).map_err(|e| corrupt("orders.buyer_id", e))?,
            item: ItemRef {
                kind,
                id: ItemId::new(row.item_id).map_err(|e| corrupt("orders.item_id", e))?,
            },
            amount: money(row.amount_minor, &row.currency, "orders.amount_minor")?,
            status,
            note: row.note,
            plan_terms,
            created_at: timestamp(row.created_at),
        })
    }
}

#[async_trait]
impl OrderRepository for PostgresOrderRepository {
    async fn insert(&self, order: &Order) -> Result<(), DomainError> {
        let terms = order.plan_terms.as_ref();
        let upload_limit = terms
            .map(|t| to_i32(t.upload_limit, "plan_upload_limit"))
            .transpose()?;
        let duration_days = terms
            .map(|t| to_i32(t.duration_days, "plan_duration_days"))
            .transpose()?;

        sqlx::query(
            r#"
            INSERT INTO orders (
                order_id, buyer_id, item_type, item_id, amount_minor, currency,
                status, note, plan_upload_limit, plan_max_price_minor,
                plan_max_price_currency, plan_duration_days, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            "#,
        )
        .bind(order.order_id.as_str())
        .bind(order.buyer_id.as_str())
        .bind(order.item.kind.as_str())
        .bind(order.item.id.as_str())
        .bind(order.amount.amount_minor)
        .bind(order.amount.currency.as_str())
        .bind(order.status.as_str())
        .bind(&order.note)
        .bind(upload_limit)
        .bind(terms.map(|t| t.max_price_per_item.amount_minor))
        .bind(terms.map(|t| t.max_price_per_item.currency.as_str()))
        .bind(duration_days)
        .bind(order.created_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return DomainError::new(
                        ErrorCode::Conflict,
                        format!("Order {} already exists", order.order_id),
                    );
                }
            }
            DomainError::new(ErrorCode::DatabaseError, format!("Failed to insert order: {}", e))
        })?;

        Ok(())
    }

    async fn find_by_id(&self, id: &OrderId) -> Result<Option<Order>, DomainError> {
        let row: Option<OrderRow> = sqlx::query_as(
            r#"
            SELECT order_id, buyer_id, item_type, item_id, amount_minor, currency,
                   status, note, plan_upload_limit, plan_max_price_minor,
                   plan_max_price_currency, plan_duration_days, created_at
            FROM orders
            WHERE order_id = $1
            "#,
        )
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to load order"))?;

        row.map(Order::try_from).transpose()
    }

    async fn mark_failed(&self, id: &OrderId) -> Result<bool, DomainError> {
        let result = sqlx::query(
            "UPDATE orders SET status = 'failed' WHERE order_id = $1 AND status = 'created'",
        )
        .bind(id.as_str())
        .execute(&self.pool)
        .await
        .map_err(db_error("Failed to mark order failed"))?;

        Ok(result.rows_affected() > 0)
    }
}
