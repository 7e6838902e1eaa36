//! Dashboard route handler.

use askama::Template;
use axum::{
    Router,
    extract::State,
    response::{Html, Response},
    routing::get,
};
use chrono::Utc;
use tracing::instrument;

use crate::{
    filters,
    middleware::{AdminContext, RequireAdmin},
    services::{DashboardSummary, Flash},
    state::AppState,
};

use super::{load, render};

/// Signed-in admin as shown in the page chrome.
#[derive(Debug, Clone)]
pub struct AdminUserView {
    pub role: String,
    pub signed_in: bool,
    pub bypass: bool,
}

impl From<&AdminContext> for AdminUserView {
    fn from(ctx: &AdminContext) -> Self {
        Self {
            role: ctx.role().to_string(),
            signed_in: ctx.session.is_some(),
            bypass: ctx.bypass,
        }
    }
}

/// Dashboard template.
#[derive(Template)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub admin_user: AdminUserView,
    pub current_path: String,
    pub flash: Option<Flash>,
    pub summary: Option<DashboardSummary>,
    pub error: Option<String>,
}

/// Build the dashboard router.
pub fn router() -> Router<AppState> {
    Router::new().route("/admin", get(index))
}

/// Dashboard page handler.
///
/// GET /admin
#[instrument(skip_all)]
pub async fn index(
    RequireAdmin(ctx): RequireAdmin,
    State(state): State<AppState>,
) -> Result<Html<String>, Response> {
    let today = Utc::now().date_naive();
    let result = ctx
        .queries(&state)
        .dashboard_summary(today)
        .await
        .map(Some);
    let (summary, error) = load(&ctx, result).await?;

    let template = DashboardTemplate {
        admin_user: AdminUserView::from(&ctx),
        current_path: "/admin".to_string(),
        flash: Flash::take(ctx.store.session()).await,
        summary,
        error,
    };

    Ok(render(&template))
}
