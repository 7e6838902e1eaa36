//! Admin sign-in error types.

use thiserror::Error;

use showroom_backend::BackendError;

/// Errors that can occur when signing in.
#[derive(Debug, Error)]
pub enum LoginError {
    /// Malformed email, or the backend refused the credentials.
    #[error("Invalid email or password.")]
    InvalidCredentials,

    /// The backend client has not completed its readiness probe.
    #[error("The backend is not reachable yet. Please try again in a moment.")]
    ConnectionNotReady,

    /// Transport or protocol failure.
    #[error("Sign-in failed: {0}")]
    Backend(#[from] BackendError),
}

impl LoginError {
    /// Message safe to show on the login form.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Backend(_) => "Sign-in failed. Please try again.".to_string(),
            _ => self.to_string(),
        }
    }
}
