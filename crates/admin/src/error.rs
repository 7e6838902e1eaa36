//! Unified error handling for admin.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// Request errors that are not tied to a page's own error handling.
///
/// Page handlers report backend failures through toasts and inline notices;
/// this covers unknown routes and malformed requests.
#[derive(Debug, Error)]
pub enum AppError {
    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        };
        tracing::debug!(error = %self, "Admin request rejected");
        (status, self.to_string()).into_response()
    }
}

/// Tag Sentry events with the signed-in admin's role.
pub fn set_sentry_role(role: &str) {
    sentry::configure_scope(|scope| {
        scope.set_tag("admin_role", role);
    });
}
