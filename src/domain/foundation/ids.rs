//! Strongly-typed identifier value objects.
//!
//! Every identifier in the marketplace is an opaque string: user ids come
//! from the identity provider, order and payment ids from the gateway, and
//! item ids from the document store.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::ValidationError;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident, $field:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Creates a new identifier, returning error if blank.
            pub fn new(id: impl Into<String>) -> Result<Self, ValidationError> {
                let id = id.into();
                if id.trim().is_empty() {
                    return Err(ValidationError::empty_field($field));
                }
                Ok(Self(id))
            }

            /// Returns the inner string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consumes the identifier and returns the inner string.
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

string_id!(
    /// User identifier (the `sub` claim from the identity provider).
    UserId,
    "user_id"
);

string_id!(
    /// Identifier of a photo or plan in the catalog.
    ItemId,
    "item_id"
);

string_id!(
    /// Gateway-issued order identifier.
    OrderId,
    "order_id"
);

string_id!(
    /// Gateway-issued payment identifier.
    PaymentId,
    "payment_id"
);

string_id!(
    /// Identifier of an audited gateway webhook event.
    EventId,
    "event_id"
);
