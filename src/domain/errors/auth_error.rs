//! Authentication error types.

use thiserror::Error;

/// Authentication error variants.
#[derive(Debug, Error)]
#[allow(missing_docs)]
pub enum AuthError {
    #[error("invalid credentials: {reason}")]
    InvalidCredentials { reason: String },

    #[error("sign-in rejected by identity provider: {message}")]
    SignInRejected { message: String },

    #[error("no account registered for this email")]
    AccountNotFound,

    #[error("password reset request failed: {message}")]
    ResetFailed { message: String },

    #[error("network error during authentication: {message}")]
    NetworkError { message: String },

    #[error("unexpected authentication error: {message}")]
    Unexpected { message: String },
}

impl AuthError {
    /// Creates an invalid credentials error.
    #[must_use]
    pub fn invalid_credentials(reason: impl Into<String>) -> Self {
        Self::InvalidCredentials {
            reason: reason.into(),
        }
    }

    /// Creates a rejected sign-in error.
    #[must_use]
    pub fn rejected(message: impl Into<String>) -> Self {
        Self::SignInRejected {
            message: message.into(),
        }
    }

    /// Creates a reset failure error.
    #[must_use]
    pub fn reset_failed(message: impl Into<String>) -> Self {
        Self::ResetFailed {
            message: message.into(),
        }
    }

    /// Creates a network error.
    #[must_use]
    pub fn network(message: impl Into<String>) -> Self {
        Self::NetworkError {
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

    /// Returns whether the user can retry with different input.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::InvalidCredentials { .. }
                | Self::SignInRejected { .. }
                | Self::AccountNotFound
                | Self::NetworkError { .. }
        )
    }
}
