//! WebhookEventRepository port - append-only audit of gateway webhooks.
//!
//! The gateway may deliver the same webhook several times (timeouts, 5xx
//! responses, lost acknowledgements). Keying the audit row by event id makes
//! redelivery a no-op at this layer.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, EventId};
use crate::domain::payment::WebhookEvent;

/// Result of attempting an insert-if-absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveResult {
    /// Record was inserted (first time seeing this key).
    Inserted,
    /// Record already exists (duplicate).
    AlreadyExists,
}

/// Port for the webhook audit trail.
///
/// Implementations should rely on a primary key on the event id so that
/// concurrent deliveries cannot both insert.
#[async_trait]
pub trait WebhookEventRepository: Send + Sync {
    /// Appends the event unless one with the same id already exists.
    async fn append(&self, event: &WebhookEvent) -> Result<SaveResult, DomainError>;

    /// Finds an audited event by id.
    async fn find_by_id(&self, id: &EventId) -> Result<Option<WebhookEvent>, DomainError>;
}
