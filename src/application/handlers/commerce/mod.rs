//! Commerce handlers.
//!
//! ## Commands
//! - Creating gateway orders at the catalog price
//! - Verifying checkout confirmations and granting entitlements
//! - Issuing download URLs to licensed buyers
//!
//! `PriceAuthority` and `EntitlementLedger` are shared building blocks; the
//! webhook handler reuses the ledger.

mod create_order;
mod entitlement_ledger;
mod issue_download;
mod price_authority;
mod verify_payment;

pub use create_order::{CreateOrderCommand, CreateOrderHandler, CreateOrderResult};
pub use entitlement_ledger::EntitlementLedger;
pub use issue_download::{IssueDownloadCommand, IssueDownloadHandler, IssueDownloadResult};
pub use price_authority::{PriceAuthority, PricedItem};
pub use verify_payment::{VerifyPaymentCommand, VerifyPaymentHandler, VerifyPaymentResult};
