//! Backend transport errors.

use thiserror::Error;

/// Errors that can occur when calling the backend service.
#[derive(Debug, Error)]
pub enum BackendError {
    /// The client has not yet seen a healthy backend.
    #[error("backend connection is not ready")]
    NotReady,

    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// The backend returned an error envelope.
    #[error("backend error ({code}): {message}")]
    Rpc {
        /// Machine-readable error code.
        code: String,
        /// Human-readable message.
        message: String,
    },

    /// The requested record does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Rate limited by the backend.
    #[error("rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// Non-success HTTP status without an error envelope.
    #[error("backend returned HTTP {0}")]
    Status(u16),
}
