//! OrderRepository port - persistence for gateway orders.

use async_trait::async_trait;

use crate::domain::commerce::Order;
use crate::domain::foundation::{DomainError, OrderId};

/// Port for storing orders.
///
/// Orders move to `Paid` only through `EntitlementStore`, inside the same
/// atomic write that records the entitlement.
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Inserts a new order. Fails with `Conflict` if the id already exists.
    async fn insert(&self, order: &Order) -> Result<(), DomainError>;

    /// Finds an order by its gateway id.
    async fn find_by_id(&self, id: &OrderId) -> Result<Option<Order>, DomainError>;

    /// Marks an order `Failed` if and only if it is still `Created`.
    ///
    /// Returns true when a row changed.
    async fn mark_failed(&self, id: &OrderId) -> Result<bool, DomainError>;
}
