//! PostgreSQL implementation of ItemCatalog.

use async_trait::async_trait;
use sqlx::PgPool;

use super::rows::{corrupt, count, db_error, money};
use crate::domain::catalog::{Photo, Plan};
use crate::domain::foundation::{DomainError, ItemId, UserId};
use crate::ports::ItemCatalog;

pub struct PostgresCatalog {
    pool: PgPool,
}

impl PostgresCatalog {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct PhotoRow {
    id: String,
    owner_id: String,
    price_minor: i64,
    currency: String,
    is_published: bool,
    object_key: String,
}

impl TryFrom<PhotoRow> for Photo {
    type Error = DomainError;

    fn try_from(row: PhotoRow) -> Result<Self, Self::Error> {
        Ok(Photo {
            id: ItemId::new(row.id).map_err(|e| corrupt("photos.id", e))?,
            owner_id: UserId::new(row.owner_id).map_err(|e| corrupt("photos.owner_id", e))?,
            price: money(row.price_minor, &row.currency, "photos.price_minor")?,
            is_published: row.is_published,
            object_key: row.object_key,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct PlanRow {
    id: String,
    price_minor: i64,
    currency: String,
    upload_limit: i32,
    max_price_minor: i64,
    duration_days: i32,
}

impl TryFrom<PlanRow> for Plan {
    type Error = DomainError;

    fn try_from(row: PlanRow) -> Result<Self, Self::Error> {
        Ok(Plan {
            id: ItemId::new(row.id).map_err(|e| corrupt("plans.id", e))?,
            price: money(row.price_minor, &row.currency, "plans.price_minor")?,
            upload_limit: count(row.upload_limit, "plans.upload_limit")?,
            max_price_per_item: money(row.max_price_minor, &row.currency, "plans.max_price_minor")?,
            duration_days: count(row.duration_days, "plans.duration_days")?,
        })
    }
}

#[async_trait]
impl ItemCatalog for PostgresCatalog {
    async fn find_photo(&self, id: &ItemId) -> Result<Option<Photo>, DomainError> {
        let row: Option<PhotoRow> = sqlx::query_as(
            r#"
            SELECT id, owner_id, price_minor, currency, is_published, object_key
            FROM photos
            WHERE id = $1
            "#,
        )
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to load photo"))?;

        row.map(Photo::try_from).transpose()
    }

    async fn find_plan(&self, id: &ItemId) -> Result<Option<Plan>, DomainError> {
        let row: Option<PlanRow> = sqlx::query_as(
            r#"
            SELECT id, price_minor, currency, upload_limit, max_price_minor, duration_days
            FROM plans
            WHERE id = $1
            "#,
        )
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to load plan"))?;

        row.map(Plan::try_from).transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::catalog::Money;

    #[test]
    fn plan_row_converts_with_shared_currency() {
        let plan = Plan::try_from(PlanRow {
            id: "plan-basic".to_string(),
            price_minor: 49900,
            currency: "INR".to_string(),
            upload_limit: 25,
            max_price_minor: 50000,
            duration_days: 30,
        })
        .unwrap();
        assert_eq!(plan.max_price_per_item, Money::inr(50000));
        assert_eq!(plan.upload_limit, 25);
    }

    #[test]
    fn negative_limit_is_corrupt() {
        let err = Plan::try_from(PlanRow {
            id: "plan-basic".to_string(),
            price_minor: 49900,
            currency: "INR".to_string(),
            upload_limit: -1,
            max_price_minor: 50000,
            duration_days: 30,
        })
        .unwrap_err();
        assert_eq!(err.details.get("column").map(String::as_str), Some("plans.upload_limit"));
    }

    #[test]
    fn photo_row_with_bad_currency_is_corrupt() {
        let result = Photo::try_from(PhotoRow {
            id: "photo-1".to_string(),
            owner_id: "seller-1".to_string(),
            price_minor: 100,
            currency: "rupees".to_string(),
            is_published: true,
            object_key: "k".to_string(),
        });
        assert!(result.is_err());
    }
}
