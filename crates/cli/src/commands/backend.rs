//! Backend connectivity check.
//!
//! # Usage
//!
//! ```bash
//! showroom-cli backend ping
//! ```
//!
//! Exits non-zero when the backend does not answer its health check.

use showroom_backend::{BackendClient, BackendError};
use thiserror::Error;

use super::{MissingEnvVar, backend_config};

/// Errors from backend commands.
#[derive(Debug, Error)]
pub enum BackendCommandError {
    #[error(transparent)]
    Config(#[from] MissingEnvVar),

    #[error("Backend unreachable: {0}")]
    Backend(#[from] BackendError),
}

/// Probe the backend health endpoint once.
///
/// # Errors
///
/// Returns an error if `BACKEND_URL` is unset or the probe fails.
pub async fn ping() -> Result<(), BackendCommandError> {
    dotenvy::dotenv().ok();
    let client = BackendClient::new(&backend_config()?)?;

    tracing::info!(endpoint = client.endpoint(), "Probing backend...");
    client.probe().await?;

    tracing::info!(endpoint = client.endpoint(), "Backend is healthy");
    Ok(())
}
