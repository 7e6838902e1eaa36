//! Home page route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::{Router, extract::State, routing::get};
use chrono::Utc;
use tracing::{instrument, warn};

use showroom_core::Vehicle;

use crate::filters;
use crate::state::AppState;

use super::{
    SiteView, VehicleCard, blog::PostCard, promotions::PromotionCard,
    testimonials::TestimonialCard,
};

const FEATURED_LIMIT: usize = 6;
const SECTION_LIMIT: usize = 3;

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub site: SiteView,
    pub current_path: String,
    pub featured: Vec<VehicleCard>,
    pub promotions: Vec<PromotionCard>,
    pub testimonials: Vec<TestimonialCard>,
    pub posts: Vec<PostCard>,
}

/// Create the home router.
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(home))
}

/// Vehicles for the home page: featured ones first, topped up with the
/// newest available stock.
fn showcase(vehicles: &[Vehicle], limit: usize) -> Vec<&Vehicle> {
    let mut picked: Vec<&Vehicle> = vehicles
        .iter()
        .filter(|v| v.featured && v.is_available())
        .take(limit)
        .collect();

    if picked.len() < limit {
        let mut rest: Vec<&Vehicle> = vehicles
            .iter()
            .filter(|v| !v.featured && v.is_available())
            .collect();
        rest.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        picked.extend(rest.into_iter().take(limit - picked.len()));
    }
    picked
}

/// Display the home page.
///
/// Each section loads independently; a section whose backend read fails is
/// left empty instead of failing the page.
#[instrument(skip(state))]
pub async fn home(State(state): State<AppState>) -> HomeTemplate {
    let catalog = state.catalog();
    let (vehicles, promotions, testimonials, posts) = tokio::join!(
        catalog.vehicles(),
        catalog.promotions(),
        catalog.testimonials(),
        catalog.posts(),
    );

    let featured = match vehicles {
        Ok(vehicles) => showcase(&vehicles, FEATURED_LIMIT)
            .into_iter()
            .map(|v| VehicleCard::new(v, &state))
            .collect(),
        Err(e) => {
            warn!(error = %e, "Home: vehicles unavailable");
            Vec::new()
        }
    };

    let today = Utc::now().date_naive();
    let promotions = match promotions {
        Ok(promotions) => promotions
            .iter()
            .filter(|p| p.is_running(today))
            .take(SECTION_LIMIT)
            .map(PromotionCard::from)
            .collect(),
        Err(e) => {
            warn!(error = %e, "Home: promotions unavailable");
            Vec::new()
        }
    };

    let testimonials = match testimonials {
        Ok(testimonials) => testimonials
            .iter()
            .take(SECTION_LIMIT)
            .map(TestimonialCard::from)
            .collect(),
        Err(e) => {
            warn!(error = %e, "Home: testimonials unavailable");
            Vec::new()
        }
    };

    let posts = match posts {
        Ok(posts) => posts.iter().take(SECTION_LIMIT).map(PostCard::from).collect(),
        Err(e) => {
            warn!(error = %e, "Home: posts unavailable");
            Vec::new()
        }
    };

    HomeTemplate {
        site: SiteView::of(&state),
        current_path: "/".to_string(),
        featured,
        promotions,
        testimonials,
        posts,
    }
}
