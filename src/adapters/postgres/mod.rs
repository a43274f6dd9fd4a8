//! PostgreSQL adapters - Database implementations for repository ports.
//!
//! - `PostgresCatalog` - photos and plans
//! - `PostgresOrderRepository` - gateway orders
//! - `PostgresEntitlementStore` - transactional purchase and plan writes
//! - `PostgresPlanGrantRepository` - atomic quota updates
//! - `PostgresWebhookEventRepository` - webhook audit trail
//!
//! Schema lives in `migrations/` and is applied at startup.

mod catalog;
mod entitlement_store;
mod order_repository;
mod plan_grant_repository;
mod rows;
mod webhook_event_repository;

pub use catalog::PostgresCatalog;
pub use entitlement_store::PostgresEntitlementStore;
pub use order_repository::PostgresOrderRepository;
pub use plan_grant_repository::PostgresPlanGrantRepository;
pub use webhook_event_repository::PostgresWebhookEventRepository;
