//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! ## Store Ports
//!
//! - `ItemCatalog` - Photos and plans with their authoritative prices
//! - `OrderRepository` - Gateway orders
//! - `EntitlementStore` - Atomic, idempotent entitlement writes
//! - `PurchaseRepository` - Buyer purchase lookups
//! - `PlanGrantRepository` - Seller quota ledger with atomic adjustments
//! - `WebhookEventRepository` - Webhook audit trail
//!
//! ## External Service Ports
//!
//! - `PaymentGateway` - Order creation and payment lookup
//! - `SessionValidator` - Bearer token validation
//! - `ObjectStore` - Signed read URLs

mod entitlement_store;
mod item_catalog;
mod object_store;
mod order_repository;
mod payment_gateway;
mod plan_grant_repository;
mod session_validator;
mod webhook_event_repository;

pub use entitlement_store::{EntitlementStore, PurchaseRepository, Recorded};
pub use item_catalog::ItemCatalog;
pub use object_store::{ObjectStore, SignedUrl};
pub use order_repository::OrderRepository;
pub use payment_gateway::{
    CreateOrderRequest, GatewayOrder, PaymentError, PaymentErrorCode, PaymentGateway,
};
pub use plan_grant_repository::PlanGrantRepository;
pub use session_validator::SessionValidator;
pub use webhook_event_repository::{SaveResult, WebhookEventRepository};
