//! Admin account checks.
//!
//! # Usage
//!
//! ```bash
//! ADMIN_CHECK_PASSWORD=... showroom-cli admin check-login -e staff@dealer.com
//! ```
//!
//! # Environment Variables
//!
//! - `BACKEND_URL` - Base URL of the backend RPC service
//! - `BACKEND_SERVICE_KEY` - Optional shared key
//! - `ADMIN_CHECK_PASSWORD` - Password to try; read from the environment so it
//!   never lands in shell history

use secrecy::{ExposeSecret, SecretString};
use showroom_backend::{BackendClient, BackendError};
use showroom_core::{Email, EmailError};
use thiserror::Error;

use super::{MissingEnvVar, backend_config, required_env};

/// Errors that can occur during admin checks.
#[derive(Debug, Error)]
pub enum AdminError {
    #[error(transparent)]
    Config(#[from] MissingEnvVar),

    /// Invalid email.
    #[error("Invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    /// The backend refused the credentials.
    #[error("Login rejected for {0}")]
    Rejected(String),
}

/// Log in with the given email and `ADMIN_CHECK_PASSWORD`.
///
/// Reports the granted role; the backend session is closed again afterwards.
///
/// # Errors
///
/// Returns an error if configuration is missing, the backend fails, or the
/// credentials are rejected.
pub async fn check_login(email: &str) -> Result<(), AdminError> {
    dotenvy::dotenv().ok();

    let email = Email::parse(email)?;
    let password = SecretString::from(required_env("ADMIN_CHECK_PASSWORD")?);
    let client = BackendClient::new(&backend_config()?)?;

    tracing::info!(email = %email, "Checking admin login...");
    let session = client
        .admin_login(email.as_str(), password.expose_secret())
        .await?
        .ok_or_else(|| AdminError::Rejected(email.to_string()))?;

    tracing::info!(email = %email, role = session.role(), "Login accepted");

    if let Err(e) = client.admin_logout(session.token()).await {
        tracing::warn!(error = %e, "Could not close the check session");
    }
    Ok(())
}
