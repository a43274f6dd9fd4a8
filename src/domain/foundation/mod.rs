//! Foundation module - Shared domain primitives.
//!
//! Contains identifiers, timestamps, the state machine trait, and the error
//! types that form the vocabulary of the marketplace domain.

mod auth;
mod errors;
mod ids;
mod state_machine;
mod timestamp;

pub use auth::{AuthError, AuthenticatedUser};
pub use errors::{DomainError, ErrorCategory, ErrorCode, ValidationError};
pub use ids::{EventId, ItemId, OrderId, PaymentId, UserId};
pub use state_machine::StateMachine;
pub use timestamp::Timestamp;
