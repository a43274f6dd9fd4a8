//! PriceAuthority - resolves the server-side price of a catalog item.

use std::sync::Arc;

use crate::domain::catalog::{Item, ItemKind, ItemRef, Money};
use crate::domain::commerce::CommerceError;
use crate::ports::ItemCatalog;

/// A catalog item together with its authoritative price.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PricedItem {
    pub item: Item,
    pub price: Money,
}

/// Looks up prices in the catalog. Client-supplied amounts never reach here.
pub struct PriceAuthority {
    catalog: Arc<dyn ItemCatalog>,
}

impl PriceAuthority {
    pub fn new(catalog: Arc<dyn ItemCatalog>) -> Self {
        Self { catalog }
    }

    /// Returns the price of `item_ref`.
    ///
    /// Unpublished photos are treated exactly like unknown ones.
    pub async fn resolve(&self, item_ref: &ItemRef) -> Result<PricedItem, CommerceError> {
        let item = match item_ref.kind {
            ItemKind::Photo => self
                .catalog
                .find_photo(&item_ref.id)
                .await?
                .filter(|photo| photo.is_published)
                .map(Item::Photo),
            ItemKind::Plan => self.catalog.find_plan(&item_ref.id).await?.map(Item::Plan),
        };

        let item = item.ok_or_else(|| CommerceError::ItemNotFound(item_ref.to_string()))?;
        let price = item.price().clone();

        tracing::debug!(item = %item_ref, price = %price, "price resolved");
        Ok(PricedItem { item, price })
    }
}
