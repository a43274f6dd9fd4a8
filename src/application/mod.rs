//! Application layer - Commands, Queries, and Handlers.
//!
//! This layer orchestrates domain operations and coordinates between ports.
//! Handlers hold `Arc<dyn Port>` collaborators and no other state.

pub mod handlers;

pub use handlers::*;
