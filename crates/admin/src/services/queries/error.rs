//! Query layer error types.

use thiserror::Error;

use showroom_backend::BackendError;

/// Closed classification of query failures. Callers match on this instead
/// of inspecting messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    ConnectionNotReady,
    MissingSession,
    SessionExpired,
    NotFound,
    Rejected,
    Backend,
}

/// Errors from the admin query layer.
#[derive(Debug, Error)]
pub enum QueryError {
    /// The backend client has not completed its readiness probe.
    #[error("Backend connection is not ready yet.")]
    ConnectionNotReady,

    /// No token is available for a token-gated call.
    #[error("Admin session required.")]
    MissingSession,

    /// The backend answered `null`/`false` or refused the token.
    #[error("Session expired or unauthorized. Please sign in again.")]
    SessionExpired,

    #[error("Not found: {0}")]
    NotFound(String),

    /// The backend refused the request for a reason other than the token.
    #[error("{message}")]
    Rejected { code: String, message: String },

    /// Transport or protocol failure.
    #[error("Backend error: {0}")]
    Backend(#[source] BackendError),
}

impl QueryError {
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::ConnectionNotReady => ErrorKind::ConnectionNotReady,
            Self::MissingSession => ErrorKind::MissingSession,
            Self::SessionExpired => ErrorKind::SessionExpired,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Rejected { .. } => ErrorKind::Rejected,
            Self::Backend(_) => ErrorKind::Backend,
        }
    }

    /// Whether the user has to sign in again.
    #[must_use]
    pub const fn is_session_failure(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::MissingSession | ErrorKind::SessionExpired
        )
    }
}

impl From<BackendError> for QueryError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::NotReady => Self::ConnectionNotReady,
            BackendError::NotFound(what) => Self::NotFound(what),
            BackendError::Rpc { code, .. } if code == "unauthorized" => Self::SessionExpired,
            BackendError::Rpc { code, message } => Self::Rejected { code, message },
            other => Self::Backend(other),
        }
    }
}
