//! Record store error types.

use thiserror::Error;

/// Errors surfaced by the persistent record store.
#[derive(Debug, Error)]
#[allow(missing_docs)]
pub enum StoreError {
    #[error("record not found: {record}")]
    NotFound { record: String },

    #[error("record store network error: {message}")]
    NetworkError { message: String },

    #[error("record serialization failed: {message}")]
    Serialization { message: String },

    #[error("unexpected record store error: {message}")]
    Unexpected { message: String },
}

impl StoreError {
    /// Creates a not-found error.
    #[must_use]
    pub fn not_found(record: impl Into<String>) -> Self {
        Self::NotFound {
            record: record.into(),
        }
    }

    /// Creates a network error.
    #[must_use]
    pub fn network(message: impl Into<String>) -> Self {
        Self::NetworkError {
            message: message.into(),
        }
    }

    /// Creates a serialization error.
    #[must_use]
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization {
            message: message.into(),
        }
    }

    /// Creates an unexpected error.
    #[must_use]
    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::Unexpected {
            message: message.into(),
        }
    }
}
