//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (ids, timestamps, errors)
//! - `catalog` - Photos, plans, and money
//! - `commerce` - Orders, purchases, and entitlement outcomes
//! - `plan` - Seller plan grants and the upload guard
//! - `payment` - Signature and capture verification, webhook payloads

pub mod catalog;
pub mod commerce;
pub mod foundation;
pub mod payment;
pub mod plan;
