//! Authentication port definition.
//!
//! The identity provider itself is an external service; this crate only
//! consumes sign-in and password-reset results.

use async_trait::async_trait;

use crate::domain::entities::UserProfile;
use crate::domain::errors::AuthError;

/// Port for the external identity provider.
#[async_trait]
pub trait AuthPort: Send + Sync {
    /// Signs in with email/password and returns the authenticated profile.
    async fn sign_in(&self, email: &str, password: &str) -> Result<UserProfile, AuthError>;

    /// Requests a password reset email for the account.
    async fn send_password_reset(&self, email: &str) -> Result<(), AuthError>;
}
