//! Admin profile route handler.

use askama::Template;
use axum::{Router, response::Html, routing::get};
use tracing::instrument;

use crate::{filters, middleware::RequireAdmin, services::Flash, state::AppState};

use super::{dashboard::AdminUserView, render};

/// Profile page template.
#[derive(Template)]
#[template(path = "profile.html")]
pub struct ProfileTemplate {
    pub admin_user: AdminUserView,
    pub current_path: String,
    pub flash: Option<Flash>,
    /// Masked session token, absent in bypass mode without a backend session.
    pub token: Option<String>,
}

/// Build the profile router.
pub fn router() -> Router<AppState> {
    Router::new().route("/admin/profile", get(index))
}

/// Profile page handler.
///
/// GET /admin/profile
#[instrument(skip_all)]
pub async fn index(RequireAdmin(ctx): RequireAdmin) -> Html<String> {
    let template = ProfileTemplate {
        admin_user: AdminUserView::from(&ctx),
        current_path: "/admin/profile".to_string(),
        flash: Flash::take(ctx.store.session()).await,
        token: ctx.session.as_ref().map(|s| s.token().masked()),
    };
    render(&template)
}
