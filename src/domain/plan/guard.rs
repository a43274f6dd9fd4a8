//! Upload admission policy for sellers.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::PlanGrant;
use crate::domain::foundation::Timestamp;

/// Why an upload was refused. The first failing check wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UploadRejection {
    NoActivePlan,
    PlanExpired,
    QuotaExhausted,
    PriceExceedsCap,
}

impl UploadRejection {
    /// Stable reason string reported to clients.
    pub fn as_str(&self) -> &'static str {
        match self {
            UploadRejection::NoActivePlan => "NoActivePlan",
            UploadRejection::PlanExpired => "PlanExpired",
            UploadRejection::QuotaExhausted => "QuotaExhausted",
            UploadRejection::PriceExceedsCap => "PriceExceedsCap",
        }
    }
}

impl fmt::Display for UploadRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Stateless policy consulted before every seller upload.
///
/// Passing the guard does not reserve anything; the caller must still take
/// a slot atomically at the store.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlanGuard;

impl PlanGuard {
    pub fn new() -> Self {
        Self
    }

    /// Checks, in order: plan exists, not expired, quota left, price within cap.
    pub fn evaluate(
        &self,
        grant: Option<&PlanGrant>,
        requested_price_minor: i64,
        now: Timestamp,
    ) -> Result<(), UploadRejection> {
        let grant = grant.ok_or(UploadRejection::NoActivePlan)?;

        if grant.is_expired(now) {
            return Err(UploadRejection::PlanExpired);
        }
        if grant.upload_limit_remaining == 0 {
            return Err(UploadRejection::QuotaExhausted);
        }
        if requested_price_minor > grant.max_price_per_item.amount_minor {
            return Err(UploadRejection::PriceExceedsCap);
        }
        Ok(())
    }
}
