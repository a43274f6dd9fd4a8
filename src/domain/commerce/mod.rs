//! Commerce module - orders, purchases, and the entitlement outcome.

mod entitlement;
mod errors;
mod order;
mod purchase;

pub use entitlement::{Entitlement, Grant};
pub use errors::CommerceError;
pub use order::{Order, OrderStatus};
pub use purchase::{ledger_key, Purchase};
