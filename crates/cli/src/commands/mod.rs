//! CLI subcommands.

pub mod admin;
pub mod backend;
pub mod migrate;

use secrecy::SecretString;
use showroom_backend::BackendConfig;

/// Read a required environment variable.
pub(crate) fn required_env(name: &'static str) -> Result<String, MissingEnvVar> {
    std::env::var(name)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .ok_or(MissingEnvVar(name))
}

/// A required environment variable is unset or blank.
#[derive(Debug, thiserror::Error)]
#[error("Missing environment variable: {0}")]
pub struct MissingEnvVar(pub &'static str);

/// Backend connection settings from `BACKEND_URL` and `BACKEND_SERVICE_KEY`.
pub(crate) fn backend_config() -> Result<BackendConfig, MissingEnvVar> {
    Ok(BackendConfig {
        url: required_env("BACKEND_URL")?,
        service_key: std::env::var("BACKEND_SERVICE_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty())
            .map(SecretString::from),
    })
}
