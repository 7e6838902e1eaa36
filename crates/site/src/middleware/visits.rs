//! Counts successful page views once per visitor session.

use axum::{
    extract::{OriginalUri, Request, State},
    http::Method,
    middleware::Next,
    response::Response,
};
use tower_sessions::Session;

use crate::state::AppState;

/// Record a visit for every successful `GET` of a page route.
///
/// Applied to page routes only, so static assets, health checks and form
/// submissions are never counted.
pub async fn visit_tracking_middleware(
    State(state): State<AppState>,
    session: Session,
    request: Request,
    next: Next,
) -> Response {
    // Nested routers see a stripped URI; count the path the visitor requested.
    let page = (request.method() == Method::GET).then(|| {
        request
            .extensions()
            .get::<OriginalUri>()
            .map_or_else(|| request.uri().path(), |OriginalUri(uri)| uri.path())
            .to_string()
    });

    let response = next.run(request).await;

    if let Some(page) = page
        && response.status().is_success()
    {
        // The handle is dropped; the backend call finishes in the background.
        let _ = state.visits().track(&session, &page).await;
    }

    response
}
