//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `auth` - JWT session validation (and a mock for tests)
//! - `gateway` - Razorpay payment gateway (and a mock for tests)
//! - `http` - axum REST API
//! - `memory` - In-memory stores for tests and local runs
//! - `postgres` - sqlx-backed stores
//! - `storage` - HMAC-signed download URLs

pub mod auth;
pub mod gateway;
pub mod http;
pub mod memory;
pub mod postgres;
pub mod storage;

pub use auth::{JwtConfig, JwtSessionValidator, MockSessionValidator};
pub use gateway::{MockPaymentGateway, RazorpayConfig, RazorpayGateway};
pub use http::{build_router, HttpSettings, MarketplaceAppState};
pub use memory::InMemoryStore;
pub use postgres::{
    PostgresCatalog, PostgresEntitlementStore, PostgresOrderRepository,
    PostgresPlanGrantRepository, PostgresWebhookEventRepository,
};
pub use storage::HmacUrlSigner;
