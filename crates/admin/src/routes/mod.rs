//! HTTP route handlers for admin.
//!
//! # Route Structure
//!
//! ```text
//! # Auth (unguarded)
//! GET  /admin/login                          - Login form (?expired=1 shows a notice)
//! POST /admin/login                          - Submit credentials
//! POST /admin/logout                         - Logout
//!
//! # Dashboard
//! GET  /admin                                - Counts and visits
//!
//! # Catalog and content (list, new, create, edit, update, delete)
//! GET  /admin/vehicles                       - ?q=&status=
//! GET  /admin/vehicles/new
//! POST /admin/vehicles
//! GET  /admin/vehicles/{id}/edit
//! POST /admin/vehicles/{id}
//! POST /admin/vehicles/{id}/delete
//! ...same shape for /admin/promotions, /admin/testimonials, /admin/blog
//! POST /admin/testimonials/{id}/approve      - Publish a submitted testimonial
//!
//! # Moderation
//! GET  /admin/blog/comments
//! POST /admin/blog/comments/{id}/approve
//! POST /admin/blog/comments/{id}/delete
//!
//! # Media
//! GET  /admin/media
//! POST /admin/media                          - Multipart upload
//! POST /admin/media/{id}                     - Edit alt text
//! POST /admin/media/{id}/delete
//!
//! # Leads
//! GET  /admin/leads
//! POST /admin/leads/contacts/{id}/status
//! POST /admin/leads/contacts/{id}/delete
//! POST /admin/leads/simulations/{id}/delete
//!
//! # Reporting and account
//! GET  /admin/stats
//! GET  /admin/profile
//! ```
//!
//! Every page except the login form takes the `RequireAdmin` extractor.

pub mod auth;
pub mod blog;
pub mod dashboard;
pub mod leads;
pub mod media;
pub mod profile;
pub mod promotions;
pub mod stats;
pub mod testimonials;
pub mod vehicles;

use askama::Template;
use axum::{
    Router,
    response::{Html, IntoResponse, Redirect, Response},
};
use chrono::{DateTime, NaiveDate, Utc};

use crate::middleware::AdminContext;
use crate::services::{Flash, QueryError};
use crate::state::AppState;

/// Where session-class failures send the admin.
pub const EXPIRED_LOGIN_PATH: &str = "/admin/login?expired=1";

/// Build the admin router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(auth::router())
        .merge(dashboard::router())
        .merge(vehicles::router())
        .merge(promotions::router())
        .merge(testimonials::router())
        .merge(blog::router())
        .merge(media::router())
        .merge(leads::router())
        .merge(stats::router())
        .merge(profile::router())
}

/// Render a template, logging failures.
pub(crate) fn render(template: &impl Template) -> Html<String> {
    Html(template.render().unwrap_or_else(|e| {
        tracing::error!("Template render error: {}", e);
        "Internal Server Error".to_string()
    }))
}

/// Clear the stored session and send the admin to the login form.
pub(crate) async fn session_ended(ctx: &AdminContext) -> Response {
    ctx.store.clear().await;
    Redirect::to(EXPIRED_LOGIN_PATH).into_response()
}

/// Unwrap a query result, or turn its error into a response.
///
/// Session failures end the session. Anything else becomes an error toast on
/// `back`.
pub(crate) async fn settle<T>(
    ctx: &AdminContext,
    result: Result<T, QueryError>,
    back: &str,
) -> Result<T, Response> {
    match result {
        Ok(value) => Ok(value),
        Err(err) if err.is_session_failure() => Err(session_ended(ctx).await),
        Err(err) => {
            tracing::warn!(error = %err, kind = ?err.kind(), "Admin operation failed");
            Flash::error(err.to_string())
                .push(ctx.store.session())
                .await;
            Err(Redirect::to(back).into_response())
        }
    }
}

/// Like [`settle`] for page reads: other failures render the page empty with
/// the message inline.
pub(crate) async fn load<T: Default>(
    ctx: &AdminContext,
    result: Result<T, QueryError>,
) -> Result<(T, Option<String>), Response> {
    match result {
        Ok(value) => Ok((value, None)),
        Err(err) if err.is_session_failure() => Err(session_ended(ctx).await),
        Err(err) => {
            tracing::warn!(error = %err, kind = ?err.kind(), "Admin page read failed");
            Ok((T::default(), Some(err.to_string())))
        }
    }
}

/// Message to show on a re-rendered form, unless the failure ends the session.
pub(crate) async fn failure_message(
    ctx: &AdminContext,
    err: QueryError,
) -> Result<String, Response> {
    if err.is_session_failure() {
        return Err(session_ended(ctx).await);
    }
    tracing::warn!(error = %err, kind = ?err.kind(), "Admin form submission failed");
    Ok(err.to_string())
}

/// Toast a success message and redirect.
pub(crate) async fn done(ctx: &AdminContext, message: &str, to: &str) -> Response {
    Flash::success(message).push(ctx.store.session()).await;
    Redirect::to(to).into_response()
}

/// `2026-03-14 09:30`, or a dash when the timestamp is missing.
pub(crate) fn date_label(at: Option<DateTime<Utc>>) -> String {
    at.map_or_else(|| "—".to_string(), |at| at.format("%Y-%m-%d %H:%M").to_string())
}

pub(crate) fn day_label(day: Option<NaiveDate>) -> String {
    day.map_or_else(String::new, |d| d.format("%Y-%m-%d").to_string())
}

/// Blank-aware form field: `None` when empty after trimming.
pub(crate) fn optional(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

/// HTML checkboxes submit a value only when checked.
pub(crate) fn checked(value: Option<&String>) -> bool {
    value.is_some_and(|v| matches!(v.as_str(), "on" | "true" | "1"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::middleware::AdminContext;
    use crate::test_support::memory_store;
    use axum::http::{StatusCode, header};
    use showroom_core::AdminSession;

    fn ctx() -> AdminContext {
        AdminContext {
            session: AdminSession::new("T1", "R1"),
            store: memory_store(),
            bypass: false,
        }
    }

    #[tokio::test]
    async fn test_settle_session_failure_clears_and_redirects() {
        let ctx = ctx();
        ctx.store.set(&AdminSession::new("T1", "R1").unwrap()).await;

        let response = settle::<()>(&ctx, Err(QueryError::SessionExpired), "/admin/vehicles")
            .await
            .unwrap_err();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers().get(header::LOCATION).unwrap(),
            EXPIRED_LOGIN_PATH
        );
        assert!(ctx.store.get().await.is_none());
    }

    #[tokio::test]
    async fn test_settle_other_failure_flashes_and_goes_back() {
        let ctx = ctx();
        let err = QueryError::Rejected {
            code: "invalid".to_string(),
            message: "Year is required".to_string(),
        };

        let response = settle::<()>(&ctx, Err(err), "/admin/vehicles")
            .await
            .unwrap_err();

        assert_eq!(
            response.headers().get(header::LOCATION).unwrap(),
            "/admin/vehicles"
        );
        assert_eq!(
            Flash::take(ctx.store.session()).await,
            Some(Flash::error("Year is required"))
        );
    }

    #[tokio::test]
    async fn test_load_keeps_page_on_backend_failure() {
        let ctx = ctx();
        let (rows, error) = load::<Vec<u8>>(&ctx, Err(QueryError::ConnectionNotReady))
            .await
            .unwrap();
        assert!(rows.is_empty());
        assert_eq!(error.unwrap(), "Backend connection is not ready yet.");
    }

    #[test]
    fn test_form_helpers() {
        assert_eq!(optional("  "), None);
        assert_eq!(optional(" Red "), Some("Red".to_string()));
        assert!(checked(Some(&"on".to_string())));
        assert!(!checked(None));
    }
}
