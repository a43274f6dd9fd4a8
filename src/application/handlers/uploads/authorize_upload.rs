//! AuthorizeUploadHandler - Command handler reserving one upload slot.

use std::sync::Arc;

use crate::domain::foundation::{Timestamp, UserId};
use crate::domain::plan::{PlanGuard, UploadError};
use crate::ports::PlanGrantRepository;

#[derive(Debug, Clone)]
pub struct AuthorizeUploadCommand {
    pub uid: UserId,
    /// Asking price of the photo being uploaded, in minor units.
    pub price_minor: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizeUploadResult {
    pub remaining: u32,
}

/// Runs the plan guard, then takes one slot with a single atomic store
/// update. Two concurrent requests for the last slot both pass the guard;
/// only one wins the update and the other sees `LostRace`.
pub struct AuthorizeUploadHandler {
    grants: Arc<dyn PlanGrantRepository>,
    guard: PlanGuard,
}

impl AuthorizeUploadHandler {
    pub fn new(grants: Arc<dyn PlanGrantRepository>) -> Self {
        Self {
            grants,
            guard: PlanGuard::new(),
        }
    }

    pub async fn handle(
        &self,
        cmd: AuthorizeUploadCommand,
    ) -> Result<AuthorizeUploadResult, UploadError> {
        if cmd.price_minor < 0 {
            return Err(UploadError::validation("price", "must not be negative"));
        }

        let now = Timestamp::now();
        let grant = self.grants.find_by_uid(&cmd.uid).await?;

        if let Err(reason) = self.guard.evaluate(grant.as_ref(), cmd.price_minor, now) {
            tracing::info!(uid = %cmd.uid, reason = %reason, "upload rejected");
            return Err(reason.into());
        }

        let remaining = self
            .grants
            .consume_upload(&cmd.uid, now)
            .await?
            .ok_or(UploadError::LostRace)?;

        tracing::info!(uid = %cmd.uid, remaining, "upload slot taken");
        Ok(AuthorizeUploadResult { remaining })
    }
}
