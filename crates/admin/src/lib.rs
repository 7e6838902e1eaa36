//! Showroom admin library.
//!
//! The admin panel as a library, so the binary and the integration tests
//! build the same router.
//!
//! # Security
//!
//! Every page except the login form sits behind the route guard, which
//! re-validates the stored backend session on each request. The development
//! auth bypass is refused by configuration for https or non-loopback binds.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod components;
pub mod config;
pub mod error;
pub mod filters;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;

#[cfg(test)]
mod test_support;

use std::time::Duration;

use axum::{
    Router,
    extract::State,
    http::{Request, Response, StatusCode, Uri},
    middleware::from_fn,
    routing::get,
};
use tower_http::{
    services::ServeDir,
    trace::{DefaultOnResponse, OnResponse, TraceLayer},
};
use tower_sessions::{SessionManagerLayer, SessionStore as SessionBackend};
use tracing::Span;

use error::AppError;
use middleware::{request_id_middleware, security_headers_middleware, session_cookie_middleware};
use state::AppState;

/// Directory the static assets are served from, relative to the workspace root.
pub const STATIC_DIR: &str = "crates/admin/static";

/// Assemble the admin application around a session backend.
///
/// The cookie middleware runs inside the session layer so the session store
/// sees both the tower-sessions session and the mirror cookie.
pub fn build_app<S: SessionBackend + Clone>(
    state: AppState,
    session_layer: SessionManagerLayer<S>,
) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .merge(routes::routes())
        .nest_service("/static", ServeDir::new(STATIC_DIR))
        .fallback(not_found)
        .layer(from_fn(session_cookie_middleware))
        .layer(session_layer)
        .layer(from_fn(security_headers_middleware))
        .layer(from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = tracing::field::Empty,
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &Response<_>, latency: Duration, span: &Span| {
                        span.record("status", response.status().as_u16());
                        span.record(
                            "latency_ms",
                            u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                        );
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        )
        .with_state(state)
}

async fn not_found(uri: Uri) -> AppError {
    AppError::NotFound(uri.path().to_string())
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Requires a reachable session database (when configured) and a backend
/// that has passed its health probe.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    if let Some(pool) = state.pool()
        && let Err(e) = sqlx::query("SELECT 1").fetch_one(pool).await
    {
        tracing::warn!(error = %e, "Session database not reachable");
        return StatusCode::SERVICE_UNAVAILABLE;
    }
    if state.backend().is_ready() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}
