//! HTTP adapter for the marketplace payment core.
//!
//! - `POST /orders` - Issue a gateway order at the catalog price
//! - `POST /payments/verify` - Verify a client payment confirmation
//! - `POST /uploads/authorize` - Take an upload slot
//! - `POST /downloads` - Signed download URL
//! - `GET /plans/status` - Seller plan status
//! - `POST /webhooks/gateway` - Gateway webhook (HMAC, no bearer token)
//! - `GET /health` - Liveness probe

pub mod dto;
pub mod handlers;
pub mod routes;

pub use dto::*;
pub use handlers::{ApiError, MarketplaceAppState, SIGNATURE_HEADER};
pub use routes::{marketplace_routes, public_routes};
