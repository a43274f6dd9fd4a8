//! Upload quota handlers.
//!
//! ## Commands
//! - Authorizing an upload against the seller's plan
//!
//! ## Queries
//! - Current plan status

mod authorize_upload;
mod get_plan_status;

pub use authorize_upload::{AuthorizeUploadCommand, AuthorizeUploadHandler, AuthorizeUploadResult};
pub use get_plan_status::{GetPlanStatusHandler, GetPlanStatusQuery, GetPlanStatusResult};
