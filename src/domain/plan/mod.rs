//! Plan module - seller upload entitlements and the guard that enforces them.

mod errors;
mod grant;
mod guard;

pub use errors::UploadError;
pub use grant::{PlanActivation, PlanGrant, PlanState};
pub use guard::{PlanGuard, UploadRejection};
