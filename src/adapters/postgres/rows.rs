//! Conversions shared by the PostgreSQL adapters.

use chrono::{DateTime, Utc};

use crate::domain::catalog::{Currency, Money};
use crate::domain::foundation::{DomainError, ErrorCode, Timestamp};

/// Maps a sqlx error into a `DatabaseError` with context.
pub(super) fn db_error(context: &'static str) -> impl FnOnce(sqlx::Error) -> DomainError {
    move |e| DomainError::new(ErrorCode::DatabaseError, format!("{}: {}", context, e))
}

/// A stored value that no longer parses into the domain type.
pub(super) fn corrupt(column: &str, err: impl std::fmt::Display) -> DomainError {
    DomainError::new(
        ErrorCode::DatabaseError,
        format!("Invalid stored value in {}: {}", column, err),
    )
    .with_detail("column", column)
}

pub(super) fn money(amount_minor: i64, currency: &str, column: &str) -> Result<Money, DomainError> {
    let currency = Currency::new(currency).map_err(|e| corrupt(column, e))?;
    Money::new(amount_minor, currency).map_err(|e| corrupt(column, e))
}

pub(super) fn count(value: i32, column: &str) -> Result<u32, DomainError> {
    u32::try_from(value).map_err(|e| corrupt(column, e))
}

pub(super) fn to_i32(value: u32, field: &str) -> Result<i32, DomainError> {
    i32::try_from(value)
        .map_err(|_| DomainError::validation(field, format!("{} does not fit the schema", value)))
}

pub(super) fn timestamp(dt: DateTime<Utc>) -> Timestamp {
    Timestamp::from_datetime(dt)
}
