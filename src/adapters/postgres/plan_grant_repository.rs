//! PostgreSQL implementation of PlanGrantRepository.
//!
//! Quota changes are single conditional `UPDATE ... RETURNING` statements.
//! The row-level lock taken by the update serialises concurrent uploads,
//! so the remaining count can never go below zero or above the limit.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use super::rows::{corrupt, count, db_error, money, timestamp};
use crate::domain::foundation::{DomainError, ItemId, PaymentId, Timestamp, UserId};
use crate::domain::plan::PlanGrant;
use crate::ports::PlanGrantRepository;

pub struct PostgresPlanGrantRepository {
    pool: PgPool,
}

impl PostgresPlanGrantRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

pub(super) const GRANT_COLUMNS: &str = "uid, plan_id, upload_limit, upload_limit_remaining, \
     max_price_minor, currency, expires_at, last_payment_id, updated_at";

#[derive(Debug, sqlx::FromRow)]
pub(super) struct PlanGrantRow {
    uid: String,
    plan_id: String,
    upload_limit: i32,
    upload_limit_remaining: i32,
    max_price_minor: i64,
    currency: String,
    expires_at: DateTime<Utc>,
    last_payment_id: String,
    updated_at: DateTime<Utc>,
}

impl TryFrom<PlanGrantRow> for PlanGrant {
    type Error = DomainError;

    fn try_from(row: PlanGrantRow) -> Result<Self, Self::Error> {
        Ok(PlanGrant {
            uid: UserId::new(row.uid).map_err(|e| corrupt("plan_grants.uid", e))?,
            plan_id: ItemId::new(row.plan_id).map_err(|e| corrupt("plan_grants.plan_id", e))?,
            upload_limit: count(row.upload_limit, "plan_grants.upload_limit")?,
            upload_limit_remaining: count(
                row.upload_limit_remaining,
                "plan_grants.upload_limit_remaining",
            )?,
            max_price_per_item: money(
                row.max_price_minor,
                &row.currency,
                "plan_grants.max_price_minor",
            )?,
            expires_at: timestamp(row.expires_at),
            last_payment_id: PaymentId::new(row.last_payment_id)
                .map_err(|e| corrupt("plan_grants.last_payment_id", e))?,
            updated_at: timestamp(row.updated_at),
        })
    }
}

#[async_trait]
impl PlanGrantRepository for PostgresPlanGrantRepository {
    async fn find_by_uid(&self, uid: &UserId) -> Result<Option<PlanGrant>, DomainError> {
        let row: Option<PlanGrantRow> = sqlx::query_as(&format!(
            "SELECT {} FROM plan_grants WHERE uid = $1",
            GRANT_COLUMNS
        ))
        .bind(uid.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to load plan grant"))?;

        row.map(PlanGrant::try_from).transpose()
    }

    async fn consume_upload(
        &self,
        uid: &UserId,
        now: Timestamp,
    ) -> Result<Option<u32>, DomainError> {
        let remaining: Option<i32> = sqlx::query_scalar(
            r#"
            UPDATE plan_grants
            SET upload_limit_remaining = upload_limit_remaining - 1, updated_at = $2
            WHERE uid = $1 AND upload_limit_remaining > 0 AND expires_at > $2
            RETURNING upload_limit_remaining
            "#,
        )
        .bind(uid.as_str())
        .bind(now.as_datetime())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to consume upload"))?;

        remaining
            .map(|r| count(r, "plan_grants.upload_limit_remaining"))
            .transpose()
    }
}
