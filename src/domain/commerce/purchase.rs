//! Buyer-side entitlements and their deterministic identifiers.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::domain::catalog::Money;
use crate::domain::foundation::{ItemId, OrderId, PaymentId, Timestamp, UserId};

/// Derives a stable ledger key from its parts.
///
/// Parts are joined with `|` and hashed with SHA-256, so the same logical
/// payment always maps to the same record.
pub fn ledger_key(parts: &[&str]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(parts.join("|").as_bytes());
    hex::encode(hasher.finalize())
}

/// A buyer's license to download a photo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Purchase {
    pub id: String,
    pub buyer_id: UserId,
    pub item_id: ItemId,
    pub price: Money,
    pub payment_id: PaymentId,
    pub order_id: OrderId,
    pub created_at: Timestamp,
}

impl Purchase {
    /// Builds a purchase whose id is derived from buyer, item, and payment.
    pub fn new(
        buyer_id: UserId,
        item_id: ItemId,
        price: Money,
        payment_id: PaymentId,
        order_id: OrderId,
        created_at: Timestamp,
    ) -> Self {
        let id = Self::id_for(&buyer_id, &item_id, &payment_id);
        Self {
            id,
            buyer_id,
            item_id,
            price,
            payment_id,
            order_id,
            created_at,
        }
    }

    pub fn id_for(buyer_id: &UserId, item_id: &ItemId, payment_id: &PaymentId) -> String {
        ledger_key(&[buyer_id.as_str(), item_id.as_str(), payment_id.as_str()])
    }
}
