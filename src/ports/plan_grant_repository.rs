//! PlanGrantRepository port - the seller quota ledger.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, Timestamp, UserId};
use crate::domain::plan::PlanGrant;

/// Port for reading and atomically adjusting seller plan grants.
///
/// `consume_upload` must be a single conditional update at the store.
/// Concurrent uploads may never drive the remaining count below zero, and
/// nothing but a new plan payment ever raises it.
#[async_trait]
pub trait PlanGrantRepository: Send + Sync {
    /// Finds the seller's current grant.
    async fn find_by_uid(&self, uid: &UserId) -> Result<Option<PlanGrant>, DomainError>;

    /// Takes one upload slot if the grant exists, is unexpired at `now`, and
    /// has a slot left. Returns the new remaining count, or `None` when
    /// nothing was taken.
    async fn consume_upload(&self, uid: &UserId, now: Timestamp)
        -> Result<Option<u32>, DomainError>;
}
