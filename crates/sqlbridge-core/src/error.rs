//! Error types for the SQL abstraction layer.

use thiserror::Error;

/// A driver-level statement failure, normalized to a code/message pair.
///
/// Backends convert their native errors to this record at the connection
/// boundary; native error types never escape raw.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("sql error{}: {}", .code.map(|c| format!(" [{c}]")).unwrap_or_default(), .message)]
pub struct SqlError {
    /// Backend error code, when one was reported.
    pub code: Option<i64>,
    /// Human readable message.
    pub message: String,
}

impl SqlError {
    /// Creates a new error from a code and message.
    #[must_use]
    pub fn new(code: Option<i64>, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Creates an error carrying only a message.
    #[must_use]
    pub fn message(message: impl Into<String>) -> Self {
        Self::new(None, message)
    }

    /// The error reported when a statement runs on a released connection.
    #[must_use]
    pub fn closed() -> Self {
        Self::message("the connection has been closed")
    }
}

/// Errors reported by the abstraction layer.
#[derive(Debug, Error)]
pub enum Error {
    /// A backend-required configuration key is absent.
    #[error("missing configuration parameter: {0}")]
    MissingSetting(&'static str),

    /// The `driver` setting names a backend this crate cannot connect to.
    #[error("unsupported driver: {0}")]
    UnsupportedDriver(String),

    /// An invalid enum-like argument (output format, ...).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The operation is not available on the selected backend.
    #[error("operation not supported by the {backend} backend: {operation}")]
    Unsupported {
        /// Backend name.
        backend: &'static str,
        /// Operation that was requested.
        operation: &'static str,
    },

    /// A statement failure raised while a transaction is open.
    ///
    /// Outside a transaction the same failure is recorded on the query
    /// object and reported through `has_error()` instead.
    #[error(transparent)]
    Sql(#[from] SqlError),
}

/// Result type alias for this crate.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sql_error_display() {
        let e = SqlError::new(Some(19), "constraint failed");
        assert_eq!(e.to_string(), "sql error [19]: constraint failed");
        let e = SqlError::message("syntax error");
        assert_eq!(e.to_string(), "sql error: syntax error");
    }

    #[test]
    fn test_error_from_sql_error() {
        let err: Error = SqlError::message("boom").into();
        assert!(matches!(err, Error::Sql(_)));
    }
}
