//! Money value object.
//!
//! Amounts are held as integers in the currency's smallest unit (paise,
//! cents). Floating point never touches a price.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::ValidationError;

/// Upper-case ISO-4217 currency code.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Currency(String);

impl Currency {
    /// Parses a three-letter currency code, normalising to upper case.
    pub fn new(code: impl AsRef<str>) -> Result<Self, ValidationError> {
        let code = code.as_ref().trim();
        if code.is_empty() {
            return Err(ValidationError::empty_field("currency"));
        }
        if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(ValidationError::invalid_format(
                "currency",
                "expected a three-letter ISO-4217 code",
            ));
        }
        Ok(Self(code.to_ascii_uppercase()))
    }

    /// Indian rupee, the marketplace's default settlement currency.
    pub fn inr() -> Self {
        Self("INR".to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Currency {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Currency::new(value)
    }
}

impl From<Currency> for String {
    fn from(currency: Currency) -> Self {
        currency.0
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An amount of money in minor units.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Money {
    pub amount_minor: i64,
    pub currency: Currency,
}

impl Money {
    /// Creates a non-negative amount.
    pub fn new(amount_minor: i64, currency: Currency) -> Result<Self, ValidationError> {
        if amount_minor < 0 {
            return Err(ValidationError::out_of_range(
                "amount",
                0,
                i64::MAX,
                amount_minor,
            ));
        }
        Ok(Self {
            amount_minor,
            currency,
        })
    }

    /// Convenience constructor for rupee amounts in paise.
    pub fn inr(amount_minor: i64) -> Self {
        Self {
            amount_minor: amount_minor.max(0),
            currency: Currency::inr(),
        }
    }

    /// Returns true if the amount is zero.
    pub fn is_zero(&self) -> bool {
        self.amount_minor == 0
    }

    /// Renders the amount in major units with two decimals, e.g. `199.00`.
    pub fn display_major(&self) -> String {
        format!("{}.{:02}", self.amount_minor / 100, self.amount_minor % 100)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.display_major(), self.currency)
    }
}
