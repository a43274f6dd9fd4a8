//! PostgreSQL implementation of WebhookEventRepository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use super::rows::{corrupt, db_error, timestamp};
use crate::domain::foundation::{DomainError, EventId};
use crate::domain::payment::WebhookEvent;
use crate::ports::{SaveResult, WebhookEventRepository};

pub struct PostgresWebhookEventRepository {
    pool: PgPool,
}

impl PostgresWebhookEventRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct WebhookEventRow {
    id: String,
    event_type: String,
    received_at: DateTime<Utc>,
    raw_payload: Vec<u8>,
}

#[async_trait]
impl WebhookEventRepository for PostgresWebhookEventRepository {
    async fn append(&self, event: &WebhookEvent) -> Result<SaveResult, DomainError> {
        let result = sqlx::query(
            r#"
            INSERT INTO webhook_events (id, event_type, received_at, raw_payload)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(event.id.as_str())
        .bind(&event.event_type)
        .bind(event.received_at.as_datetime())
        .bind(event.raw_payload.as_slice())
        .execute(&self.pool)
        .await
        .map_err(db_error("Failed to append webhook event"))?;

        Ok(if result.rows_affected() > 0 {
            SaveResult::Inserted
        } else {
            SaveResult::AlreadyExists
        })
    }

    async fn find_by_id(&self, id: &EventId) -> Result<Option<WebhookEvent>, DomainError> {
        let row: Option<WebhookEventRow> = sqlx::query_as(
            "SELECT id, event_type, received_at, raw_payload FROM webhook_events WHERE id = $1",
        )
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to load webhook event"))?;

        row.map(|r| -> Result<WebhookEvent, DomainError> {
            Ok(WebhookEvent {
                id: EventId::new(r.id).map_err(|e| corrupt("webhook_events.id", e))?,
                event_type: r.event_type,
                received_at: timestamp(r.received_at),
                raw_payload: r.raw_payload,
            })
        })
        .transpose()
    }
}
