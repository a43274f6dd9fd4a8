//! Outcome of writing an entitlement to the ledger.

use super::Purchase;
use crate::domain::plan::PlanGrant;

/// What a verified payment grants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entitlement {
    Purchase(Purchase),
    Plan(PlanGrant),
}

/// Whether the ledger wrote a new record or found the existing one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Grant {
    Granted(Entitlement),
    AlreadyGranted(Entitlement),
}

impl Grant {
    pub fn entitlement(&self) -> &Entitlement {
        match self {
            Grant::Granted(e) | Grant::AlreadyGranted(e) => e,
        }
    }

    pub fn is_new(&self) -> bool {
        matches!(self, Grant::Granted(_))
    }

    /// Wire representation: `granted` or `already-granted`.
    pub fn status_str(&self) -> &'static str {
        match self {
            Grant::Granted(_) => "granted",
            Grant::AlreadyGranted(_) => "already-granted",
        }
    }
}
