//! EntitlementStore port - the atomic write behind the entitlement ledger.
//!
//! Each operation is one transaction at the store: insert the idempotency
//! record if absent, apply the entitlement, and mark the order `Paid`. A
//! plain read-then-write is not an acceptable implementation; concurrent
//! duplicate confirmations must produce exactly one record.

use async_trait::async_trait;

use super::SaveResult;
use crate::domain::commerce::Purchase;
use crate::domain::foundation::{DomainError, ItemId, UserId};
use crate::domain::plan::{PlanActivation, PlanGrant};

/// Outcome of an idempotent ledger write: whether it inserted, plus the
/// record that is now stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recorded<T> {
    pub result: SaveResult,
    pub record: T,
}

impl<T> Recorded<T> {
    pub fn inserted(record: T) -> Self {
        Self {
            result: SaveResult::Inserted,
            record,
        }
    }

    pub fn existing(record: T) -> Self {
        Self {
            result: SaveResult::AlreadyExists,
            record,
        }
    }
}

#[async_trait]
pub trait EntitlementStore: Send + Sync {
    /// Inserts the purchase unless one with the same id exists and marks its
    /// order `Paid`, atomically. A duplicate returns the stored purchase.
    async fn record_purchase(&self, purchase: &Purchase)
        -> Result<Recorded<Purchase>, DomainError>;

    /// Inserts the activation unless one with the same id exists, replaces
    /// the seller's grant, and marks the order `Paid`, atomically. The stored
    /// `expires_at` is the later of the current and the new expiry. A
    /// duplicate leaves the grant untouched and returns the current one.
    async fn activate_plan(
        &self,
        activation: &PlanActivation,
        grant: &PlanGrant,
    ) -> Result<Recorded<PlanGrant>, DomainError>;
}

/// Read access to buyer purchases.
#[async_trait]
pub trait PurchaseRepository: Send + Sync {
    /// Finds any purchase of `item_id` by `buyer_id`.
    async fn find_by_buyer_and_item(
        &self,
        buyer_id: &UserId,
        item_id: &ItemId,
    ) -> Result<Option<Purchase>, DomainError>;
}
