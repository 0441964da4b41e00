//! Diesel and pool failure mapping shared by the repositories.
//!
//! Each repository passes its own `connection`/`query` constructors so the
//! classification lives in one place.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::debug;

use super::pool::PoolError;

/// A pool failure is always a connection problem.
pub(crate) fn map_pool_error<E, C>(error: PoolError, connection: C) -> E
where
    C: FnOnce(String) -> E,
{
    connection(error.into_message())
}

/// Classify a Diesel error as a connection or query failure.
///
/// Driver messages are logged at debug level and replaced with fixed text so
/// SQL never reaches callers.
pub(crate) fn map_diesel_error<E, Q, C>(error: DieselError, query: Q, connection: C) -> E
where
    Q: FnOnce(&'static str) -> E,
    C: FnOnce(&'static str) -> E,
{
    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        other => debug!(error = %other, "diesel operation failed"),
    }

    match error {
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _)
        | DieselError::BrokenTransactionManager => connection("database connection error"),
        DieselError::NotFound => query("record not found"),
        DieselError::QueryBuilderError(_) => query("database query error"),
        DieselError::DeserializationError(_) => query("stored row could not be decoded"),
        _ => query("database error"),
    }
}

/// True when `error` is a unique constraint violation.
pub(crate) fn is_unique_violation(error: &DieselError) -> bool {
    matches!(
        error,
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _)
    )
}
