//! Authentication data transfer objects.

use crate::domain::entities::UserProfile;

/// Sign-in request payload.
#[derive(Debug, Clone)]
pub struct SignInRequest {
    /// Account email.
    pub email: String,
    /// Plaintext password, forwarded to the identity provider.
    pub password: String,
}

impl SignInRequest {
    /// Creates a new request.
    #[must_use]
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

/// Successful sign-in result.
#[derive(Debug, Clone)]
pub struct SignInResponse {
    /// The authenticated profile, marked as current user.
    pub profile: UserProfile,
}

impl SignInResponse {
    /// Creates a new response.
    #[must_use]
    pub const fn new(profile: UserProfile) -> Self {
        Self { profile }
    }
}
