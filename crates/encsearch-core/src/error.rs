//! Core error types.

use std::time::Duration;

use thiserror::Error;

use crate::model::{SearchField, SearchOperator};

/// Errors raised by the search core.
#[derive(Debug, Error)]
pub enum Error {
    /// The field does not support the requested operator.
    #[error("field '{field}' does not support {operator} search")]
    UnsupportedOperator {
        field: SearchField,
        operator: SearchOperator,
    },

    /// The search value violates the operator's length bounds.
    #[error("{operator} value length {len} outside allowed range [{min}, {max}]")]
    ValueLength {
        operator: SearchOperator,
        len: usize,
        min: usize,
        max: usize,
    },

    /// An otherwise malformed request parameter.
    #[error("invalid parameter '{name}': {message}")]
    InvalidParameter { name: String, message: String },

    /// Primary (encrypted-search) store failure.
    #[error("primary store error: {0}")]
    Primary(String),

    /// Secondary (relational) store failure before any identifiers were resolved.
    #[error("secondary store error: {0}")]
    Secondary(String),

    /// Identifiers were resolved but the follow-up record fetch failed.
    ///
    /// The request as a whole is fatal; partial results are never returned.
    #[error("record fetch failed after identifier search: {0}")]
    PartialFetch(String),

    /// A backend call exceeded its timeout.
    #[error("backend call timed out after {0:?}")]
    Timeout(Duration),

    /// The concurrency limiter refused the request within its bounded wait.
    #[error("request throttled: concurrent request limit reached")]
    Throttled,

    /// Record lookup by identifier found nothing.
    #[error("record not found")]
    NotFound,

    /// A backend row/document arrived without its correlation identifier.
    #[error("record missing correlation identifier")]
    MissingIdentifier,
}

impl Error {
    /// Whether this error is a client-input (configuration) error rather
    /// than a backend fault. Configuration errors are rejected before any
    /// backend call and map to a 4xx-equivalent status.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Error::UnsupportedOperator { .. }
                | Error::ValueLength { .. }
                | Error::InvalidParameter { .. }
        )
    }
}
