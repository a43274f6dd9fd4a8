//! ItemCatalog port - read access to the photos and plans on sale.

use async_trait::async_trait;

use crate::domain::catalog::{Photo, Plan};
use crate::domain::foundation::{DomainError, ItemId};

/// Read-only view of the catalog. Prices returned here are the only
/// prices the payment path trusts.
#[async_trait]
pub trait ItemCatalog: Send + Sync {
    /// Finds a photo by id, published or not.
    async fn find_photo(&self, id: &ItemId) -> Result<Option<Photo>, DomainError>;

    /// Finds a plan by id.
    async fn find_plan(&self, id: &ItemId) -> Result<Option<Plan>, DomainError>;
}
