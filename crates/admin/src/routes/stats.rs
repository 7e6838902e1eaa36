//! Visitor statistics route handler.

use askama::Template;
use axum::{
    Router,
    extract::State,
    response::{Html, Response},
    routing::get,
};
use tracing::instrument;

use showroom_core::VisitorStats;

use crate::{filters, middleware::RequireAdmin, services::Flash, state::AppState};

use super::{dashboard::AdminUserView, load, render};

/// One ranked page on the stats table.
#[derive(Debug, Clone)]
pub struct PageRow {
    pub page: String,
    pub visits: u64,
    pub share: u64,
}

/// Visitor stats template.
#[derive(Template)]
#[template(path = "stats.html")]
pub struct StatsTemplate {
    pub admin_user: AdminUserView,
    pub current_path: String,
    pub flash: Option<Flash>,
    pub total_visits: u64,
    pub pages: Vec<PageRow>,
    pub error: Option<String>,
}

/// Build the stats router.
pub fn router() -> Router<AppState> {
    Router::new().route("/admin/stats", get(index))
}

fn page_rows(stats: &VisitorStats) -> Vec<PageRow> {
    stats
        .ranked()
        .into_iter()
        .map(|p| PageRow {
            share: stats.share_percent(&p),
            page: p.page,
            visits: p.visits,
        })
        .collect()
}

/// Visitor stats page handler.
///
/// GET /admin/stats
#[instrument(skip_all)]
pub async fn index(
    RequireAdmin(ctx): RequireAdmin,
    State(state): State<AppState>,
) -> Result<Html<String>, Response> {
    let (stats, error) = load(&ctx, ctx.queries(&state).visitor_stats().await).await?;

    let template = StatsTemplate {
        admin_user: AdminUserView::from(&ctx),
        current_path: "/admin/stats".to_string(),
        flash: Flash::take(ctx.store.session()).await,
        total_visits: stats.total_visits,
        pages: page_rows(&stats),
        error,
    };

    Ok(render(&template))
}

#[cfg(test)]
#[allow(clippy::indexing_slicing)]
mod tests {
    use super::*;
    use showroom_core::PageVisits;

    #[test]
    fn test_page_rows_ranked_with_share() {
        let stats = VisitorStats {
            total_visits: 40,
            pages: vec![
                PageVisits {
                    page: "/blog".to_string(),
                    visits: 10,
                },
                PageVisits {
                    page: "/vehicles".to_string(),
                    visits: 30,
                },
            ],
        };
        let rows = page_rows(&stats);
        assert_eq!(rows[0].page, "/vehicles");
        assert_eq!(rows[0].share, 75);
        assert_eq!(rows[1].share, 25);
    }
}
