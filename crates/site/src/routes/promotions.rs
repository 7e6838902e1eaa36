//! Promotions page.

use askama::Template;
use askama_web::WebTemplate;
use axum::{Router, extract::State, routing::get};
use chrono::{NaiveDate, Utc};
use tracing::instrument;

use showroom_core::{Promotion, VehicleId};

use crate::error::Result;
use crate::filters;
use crate::state::AppState;

use super::SiteView;

/// Promotion view for cards and the promotions page.
#[derive(Debug, Clone)]
pub struct PromotionCard {
    pub title: String,
    pub description: String,
    pub discount: Option<String>,
    pub image: Option<String>,
    pub ends: Option<String>,
    pub vehicle_id: Option<VehicleId>,
}

impl From<&Promotion> for PromotionCard {
    fn from(p: &Promotion) -> Self {
        Self {
            title: p.title.clone(),
            description: p.description.clone(),
            discount: p.discount_label(),
            image: p.image_url.clone(),
            ends: p.ends_on.map(|d| d.format("%b %-d, %Y").to_string()),
            vehicle_id: p.vehicle_id,
        }
    }
}

/// Promotions page template.
#[derive(Template, WebTemplate)]
#[template(path = "promotions.html")]
pub struct PromotionsTemplate {
    pub site: SiteView,
    pub current_path: String,
    pub promotions: Vec<PromotionCard>,
}

/// Create the promotions router.
pub fn router() -> Router<AppState> {
    Router::new().route("/promotions", get(index))
}

/// Running promotions, soonest-ending first; open-ended ones last.
fn running(promotions: &[Promotion], today: NaiveDate) -> Vec<&Promotion> {
    let mut running: Vec<&Promotion> = promotions.iter().filter(|p| p.is_running(today)).collect();
    running.sort_by_key(|p| p.ends_on.unwrap_or(NaiveDate::MAX));
    running
}

/// Display running promotions.
///
/// GET /promotions
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> Result<PromotionsTemplate> {
    let promotions = state.catalog().promotions().await?;
    let today = Utc::now().date_naive();

    Ok(PromotionsTemplate {
        site: SiteView::of(&state),
        current_path: "/promotions".to_string(),
        promotions: running(&promotions, today)
            .into_iter()
            .map(PromotionCard::from)
            .collect(),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use showroom_core::PromotionId;

    fn promo(id: u64, active: bool, starts: Option<&str>, ends: Option<&str>) -> Promotion {
        Promotion {
            id: PromotionId::new(id),
            title: format!("Promo {id}"),
            description: String::new(),
            discount_percent: None,
            starts_on: starts.map(|d| d.parse().unwrap()),
            ends_on: ends.map(|d| d.parse().unwrap()),
            active,
            image_url: None,
            vehicle_id: None,
        }
    }

    #[test]
    fn test_running_filters_and_orders() {
        let today: NaiveDate = "2024-06-15".parse().unwrap();
        let promotions = vec![
            promo(1, true, None, None),
            promo(2, true, Some("2024-06-01"), Some("2024-06-30")),
            promo(3, false, None, Some("2024-06-20")),
            promo(4, true, Some("2024-07-01"), None),
            promo(5, true, None, Some("2024-06-15")),
            promo(6, true, None, Some("2024-06-14")),
        ];
        let ids: Vec<u64> = running(&promotions, today).iter().map(|p| p.id.get()).collect();
        assert_eq!(ids, vec![5, 2, 1]);
    }

    #[test]
    fn test_card_formats_end_date() {
        let card = PromotionCard::from(&promo(1, true, None, Some("2024-06-05")));
        assert_eq!(card.ends.as_deref(), Some("Jun 5, 2024"));
    }
}
