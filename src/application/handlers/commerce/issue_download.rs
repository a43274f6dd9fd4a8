//! IssueDownloadHandler - hands a licensed buyer a short-lived file URL.

use std::sync::Arc;

use crate::domain::commerce::CommerceError;
use crate::domain::foundation::{ItemId, Timestamp, UserId};
use crate::ports::{ItemCatalog, ObjectStore, PurchaseRepository, SignedUrl};

#[derive(Debug, Clone)]
pub struct IssueDownloadCommand {
    pub buyer_id: UserId,
    pub photo_id: ItemId,
}

#[derive(Debug, Clone)]
pub struct IssueDownloadResult {
    pub url: SignedUrl,
}

/// Issues signed URLs to buyers holding a purchase, and to the photo's owner.
pub struct IssueDownloadHandler {
    catalog: Arc<dyn ItemCatalog>,
    purchases: Arc<dyn PurchaseRepository>,
    objects: Arc<dyn ObjectStore>,
    ttl_secs: u64,
}

impl IssueDownloadHandler {
    pub fn new(
        catalog: Arc<dyn ItemCatalog>,
        purchases: Arc<dyn PurchaseRepository>,
        objects: Arc<dyn ObjectStore>,
        ttl_secs: u64,
    ) -> Self {
        Self {
            catalog,
            purchases,
            objects,
            ttl_secs,
        }
    }

    pub async fn handle(
        &self,
        cmd: IssueDownloadCommand,
    ) -> Result<IssueDownloadResult, CommerceError> {
        let photo = self
            .catalog
            .find_photo(&cmd.photo_id)
            .await?
            .ok_or_else(|| CommerceError::ItemNotFound(format!("photo:{}", cmd.photo_id)))?;

        if photo.owner_id != cmd.buyer_id
            && self
                .purchases
                .find_by_buyer_and_item(&cmd.buyer_id, &photo.id)
                .await?
                .is_none()
        {
            return Err(CommerceError::NotPurchased(photo.id));
        }

        let url = self
            .objects
            .signed_read_url(&photo.object_key, self.ttl_secs, Timestamp::now())
            .await?;

        tracing::info!(
            buyer_id = %cmd.buyer_id,
            photo_id = %photo.id,
            expires_at = url.expires_at.as_unix_secs(),
            "download url issued"
        );
        Ok(IssueDownloadResult { url })
    }
}
