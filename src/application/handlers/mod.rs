//! Application handlers.
//!
//! Command and query handlers that orchestrate domain operations.

pub mod commerce;
pub mod uploads;
pub mod webhooks;

pub use commerce::{
    CreateOrderCommand, CreateOrderHandler, CreateOrderResult, EntitlementLedger,
    IssueDownloadCommand, IssueDownloadHandler, IssueDownloadResult, PriceAuthority, PricedItem,
    VerifyPaymentCommand, VerifyPaymentHandler, VerifyPaymentResult,
};
pub use uploads::{
    AuthorizeUploadCommand, AuthorizeUploadHandler, AuthorizeUploadResult, GetPlanStatusHandler,
    GetPlanStatusQuery, GetPlanStatusResult,
};
pub use webhooks::{
    HandleGatewayWebhookCommand, HandleGatewayWebhookHandler, HandleGatewayWebhookResult,
    Reconciliation,
};
