//! Append-only audit record of a verified webhook delivery.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{EventId, Timestamp};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookEvent {
    pub id: EventId,
    pub event_type: String,
    pub received_at: Timestamp,
    /// Body exactly as delivered and signed.
    pub raw_payload: Vec<u8>,
}

impl WebhookEvent {
    /// Builds the audit record. Without a gateway event id the record is
    /// keyed `synthetic-<unix-nanos>` of the receive time.
    pub fn record(
        gateway_id: Option<&str>,
        event_type: impl Into<String>,
        raw_body: &[u8],
        received_at: Timestamp,
    ) -> Self {
        let id = gateway_id
            .and_then(|id| EventId::new(id).ok())
            .unwrap_or_else(|| Self::synthetic_id(received_at));
        Self {
            id,
            event_type: event_type.into(),
            received_at,
            raw_payload: raw_body.to_vec(),
        }
    }

    fn synthetic_id(at: Timestamp) -> EventId {
        EventId::new(format!("synthetic-{}", at.as_unix_nanos()))
            .unwrap_or_else(|_| unreachable!("synthetic ids are never blank"))
    }
}
