//! Authentication adapters.
//!
//! Implementations of the `SessionValidator` port:
//!
//! - `jwt` - HS256 bearer tokens from the marketplace identity service
//! - `mock` - Test implementation that doesn't require real tokens

mod jwt;
mod mock;

pub use jwt::{Audience, Claims, JwtConfig, JwtSessionValidator};
pub use mock::MockSessionValidator;
