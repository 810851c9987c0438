//! Sign-in use case implementation.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::application::dto::{SignInRequest, SignInResponse};
use crate::domain::errors::AuthError;
use crate::domain::ports::AuthPort;

/// Handles the sign-in and password-reset workflow against the external
/// identity provider.
#[derive(Clone)]
pub struct SignInUseCase {
    auth_port: Arc<dyn AuthPort>,
}

impl SignInUseCase {
    /// Creates new sign-in use case.
    #[must_use]
    pub const fn new(auth_port: Arc<dyn AuthPort>) -> Self {
        Self { auth_port }
    }

    /// Executes sign-in with the provided request.
    ///
    /// # Errors
    /// Returns error if the input is malformed or the provider rejects it.
    pub async fn execute(&self, request: SignInRequest) -> Result<SignInResponse, AuthError> {
        if request.email.trim().is_empty() || !request.email.contains('@') {
            warn!("Sign-in attempted with malformed email");
            return Err(AuthError::invalid_credentials("malformed email address"));
        }
        if request.password.is_empty() {
            return Err(AuthError::invalid_credentials("empty password"));
        }

        debug!(email = %request.email, "Attempting sign-in");

        let profile = self
            .auth_port
            .sign_in(&request.email, &request.password)
            .await
            .map_err(|e| {
                warn!(error = %e, "Sign-in failed");
                e
            })?;

        info!(user_id = %profile.id(), "Successfully signed in");

        Ok(SignInResponse::new(profile))
    }

    /// Requests a password reset email.
    ///
    /// # Errors
    /// Returns error if the email is malformed or the provider refuses.
    pub async fn request_password_reset(&self, email: &str) -> Result<(), AuthError> {
        if email.trim().is_empty() || !email.contains('@') {
            return Err(AuthError::invalid_credentials("malformed email address"));
        }

        debug!(email = %email, "Requesting password reset");
        self.auth_port.send_password_reset(email).await?;
        info!("Password reset email requested");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::mocks::MockAuthPort;

    #[tokio::test]
    async fn successful_sign_in() {
        let auth_port = Arc::new(MockAuthPort::new(true));
        let use_case = SignInUseCase::new(auth_port);

        let result = use_case
            .execute(SignInRequest::new("test@example.com", "hunter2"))
            .await;

        assert!(result.is_ok());
        let response = result.unwrap();
        assert!(response.profile.is_current());
    }

    #[tokio::test]
    async fn malformed_email_is_rejected_locally() {
        let auth_port = Arc::new(MockAuthPort::new(true));
        let use_case = SignInUseCase::new(auth_port);

        let result = use_case
            .execute(SignInRequest::new("not-an-email", "hunter2"))
            .await;

        assert!(matches!(result, Err(AuthError::InvalidCredentials { .. })));
    }

    #[tokio::test]
    async fn empty_password_is_rejected_locally() {
        let auth_port = Arc::new(MockAuthPort::new(true));
        let use_case = SignInUseCase::new(auth_port);

        let result = use_case
            .execute(SignInRequest::new("test@example.com", ""))
            .await;

        assert!(matches!(result, Err(AuthError::InvalidCredentials { .. })));
    }

    #[tokio::test]
    async fn provider_rejection_surfaces() {
        let auth_port = Arc::new(MockAuthPort::new(false));
        let use_case = SignInUseCase::new(auth_port);

        let result = use_case
            .execute(SignInRequest::new("test@example.com", "hunter2"))
            .await;

        assert!(matches!(result, Err(AuthError::SignInRejected { .. })));
    }

    #[tokio::test]
    async fn password_reset_round_trip() {
        let auth_port = Arc::new(MockAuthPort::new(true));
        let use_case = SignInUseCase::new(auth_port.clone());

        assert!(use_case
            .request_password_reset("test@example.com")
            .await
            .is_ok());

        auth_port.set_should_succeed(false);
        assert!(matches!(
            use_case.request_password_reset("test@example.com").await,
            Err(AuthError::ResetFailed { .. })
        ));
    }
}
