//! Vehicle catalog route handlers.
//!
//! Filtering and sorting happen server-side over the cached catalog; every
//! active filter must match for a vehicle to be listed.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Router,
    extract::{Path, Query, State},
    routing::get,
};
use chrono::Utc;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::instrument;

use showroom_core::{FuelType, Vehicle, VehicleId};

use crate::error::{AppError, Result};
use crate::filters;
use crate::state::AppState;

use super::{SiteView, VehicleCard, empty_as_none, mileage_label, money};

/// Catalog query string as submitted by the filter form.
#[derive(Debug, Default, Deserialize)]
pub struct CatalogQuery {
    #[serde(default)]
    pub make: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub fuel: Option<FuelType>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub max_price: Option<Decimal>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub min_year: Option<u16>,
    #[serde(default)]
    pub q: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub sort: Option<SortOrder>,
}

/// Catalog ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    /// Backend order: featured first, then newest.
    #[default]
    Relevance,
    PriceAsc,
    PriceDesc,
    YearDesc,
}

impl SortOrder {
    pub const ALL: &'static [Self] = &[Self::Relevance, Self::PriceAsc, Self::PriceDesc, Self::YearDesc];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Relevance => "",
            Self::PriceAsc => "price_asc",
            Self::PriceDesc => "price_desc",
            Self::YearDesc => "year_desc",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Relevance => "Featured",
            Self::PriceAsc => "Price: low to high",
            Self::PriceDesc => "Price: high to low",
            Self::YearDesc => "Newest model year",
        }
    }
}

impl std::str::FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|order| order.as_str() == s.trim())
            .ok_or_else(|| format!("unknown sort order '{s}'"))
    }
}

/// The filters in effect for one catalog request.
#[derive(Debug, Clone, Default)]
pub struct CatalogFilter {
    pub make: Option<String>,
    pub fuel: Option<FuelType>,
    pub max_price: Option<Decimal>,
    pub min_year: Option<u16>,
    pub text: String,
    pub sort: SortOrder,
}

impl From<&CatalogQuery> for CatalogFilter {
    fn from(query: &CatalogQuery) -> Self {
        Self {
            make: query
                .make
                .as_deref()
                .map(str::trim)
                .filter(|m| !m.is_empty())
                .map(String::from),
            fuel: query.fuel,
            max_price: query.max_price,
            min_year: query.min_year,
            text: query.q.as_deref().unwrap_or_default().trim().to_string(),
            sort: query.sort.unwrap_or_default(),
        }
    }
}

impl CatalogFilter {
    /// Whether `vehicle` passes every active filter.
    #[must_use]
    pub fn matches(&self, vehicle: &Vehicle) -> bool {
        self.make
            .as_deref()
            .is_none_or(|make| vehicle.make.eq_ignore_ascii_case(make))
            && self.fuel.is_none_or(|fuel| vehicle.fuel_type == fuel)
            && self.max_price.is_none_or(|max| vehicle.price <= max)
            && self.min_year.is_none_or(|min| vehicle.year >= min)
            && vehicle.matches_text(&self.text)
    }

    /// Matching vehicles in the requested order.
    #[must_use]
    pub fn apply<'a>(&self, vehicles: &'a [Vehicle]) -> Vec<&'a Vehicle> {
        let mut matched: Vec<&Vehicle> = vehicles.iter().filter(|v| self.matches(v)).collect();
        match self.sort {
            SortOrder::Relevance => {
                // Stable: keeps backend order within each group.
                matched.sort_by_key(|v| !v.featured);
            }
            SortOrder::PriceAsc => matched.sort_by(|a, b| a.price.cmp(&b.price)),
            SortOrder::PriceDesc => matched.sort_by(|a, b| b.price.cmp(&a.price)),
            SortOrder::YearDesc => matched.sort_by(|a, b| b.year.cmp(&a.year)),
        }
        matched
    }

    /// Whether any filter narrows the catalog.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.make.is_some()
            || self.fuel.is_some()
            || self.max_price.is_some()
            || self.min_year.is_some()
            || !self.text.is_empty()
    }
}

/// Distinct makes in the catalog, alphabetically, for the make select.
#[must_use]
pub fn makes(vehicles: &[Vehicle]) -> Vec<String> {
    let mut makes: Vec<String> = vehicles.iter().map(|v| v.make.trim().to_string()).collect();
    makes.sort_by_key(|m| m.to_lowercase());
    makes.dedup_by(|a, b| a.eq_ignore_ascii_case(b));
    makes
}

/// A `<select>` option.
#[derive(Debug, Clone)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

/// Filter form state echoed back into the page.
#[derive(Debug, Clone)]
pub struct FilterForm {
    pub makes: Vec<SelectOption>,
    pub fuels: Vec<SelectOption>,
    pub sorts: Vec<SelectOption>,
    pub max_price: String,
    pub min_year: String,
    pub q: String,
    pub active: bool,
}

impl FilterForm {
    fn new(filter: &CatalogFilter, makes: Vec<String>) -> Self {
        Self {
            makes: makes
                .into_iter()
                .map(|make| SelectOption {
                    selected: filter
                        .make
                        .as_deref()
                        .is_some_and(|m| m.eq_ignore_ascii_case(&make)),
                    label: make.clone(),
                    value: make,
                })
                .collect(),
            fuels: FuelType::ALL
                .iter()
                .map(|fuel| SelectOption {
                    value: fuel.as_str().to_string(),
                    label: fuel.label().to_string(),
                    selected: filter.fuel == Some(*fuel),
                })
                .collect(),
            sorts: SortOrder::ALL
                .iter()
                .map(|order| SelectOption {
                    value: order.as_str().to_string(),
                    label: order.label().to_string(),
                    selected: filter.sort == *order,
                })
                .collect(),
            max_price: filter.max_price.map(|p| p.normalize().to_string()).unwrap_or_default(),
            min_year: filter.min_year.map(|y| y.to_string()).unwrap_or_default(),
            q: filter.text.clone(),
            active: filter.is_active(),
        }
    }
}

/// Promotion tied to a vehicle, shown on its detail page.
#[derive(Debug, Clone)]
pub struct VehiclePromotion {
    pub title: String,
    pub discount: Option<String>,
}

/// Full vehicle view for the detail page.
#[derive(Debug, Clone)]
pub struct VehicleDetail {
    pub id: VehicleId,
    pub title: String,
    pub price: String,
    pub year: u16,
    pub mileage: String,
    pub fuel: &'static str,
    pub transmission: &'static str,
    pub color: String,
    pub description: String,
    pub images: Vec<String>,
    pub status: &'static str,
    pub available: bool,
}

impl VehicleDetail {
    fn new(vehicle: &Vehicle, state: &AppState) -> Self {
        Self {
            id: vehicle.id,
            title: vehicle.title(),
            price: money(state, vehicle.price),
            year: vehicle.year,
            mileage: mileage_label(vehicle.mileage_km),
            fuel: vehicle.fuel_type.label(),
            transmission: vehicle.transmission.label(),
            color: vehicle.color.clone(),
            description: vehicle.description.clone(),
            images: vehicle.image_urls.clone(),
            status: vehicle.status.label(),
            available: vehicle.is_available(),
        }
    }
}

/// Catalog page template.
#[derive(Template, WebTemplate)]
#[template(path = "vehicles/index.html")]
pub struct VehiclesIndexTemplate {
    pub site: SiteView,
    pub current_path: String,
    pub vehicles: Vec<VehicleCard>,
    pub total: usize,
    pub form: FilterForm,
}

/// Vehicle detail template.
#[derive(Template, WebTemplate)]
#[template(path = "vehicles/show.html")]
pub struct VehicleShowTemplate {
    pub site: SiteView,
    pub current_path: String,
    pub vehicle: VehicleDetail,
    pub promotions: Vec<VehiclePromotion>,
}

/// Create the vehicle routes router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(index))
        .route("/{id}", get(show))
}

/// Display the catalog.
///
/// GET /vehicles
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<CatalogQuery>,
) -> Result<VehiclesIndexTemplate> {
    let catalog = state.catalog().vehicles().await?;
    let filter = CatalogFilter::from(&query);

    let vehicles: Vec<VehicleCard> = filter
        .apply(&catalog)
        .into_iter()
        .map(|v| VehicleCard::new(v, &state))
        .collect();

    Ok(VehiclesIndexTemplate {
        site: SiteView::of(&state),
        current_path: "/vehicles".to_string(),
        total: catalog.len(),
        form: FilterForm::new(&filter, makes(&catalog)),
        vehicles,
    })
}

/// Display one vehicle.
///
/// GET /vehicles/{id}
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<VehicleId>,
) -> Result<VehicleShowTemplate> {
    let vehicle = state
        .catalog()
        .vehicle(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("vehicle {id}")))?;

    let today = Utc::now().date_naive();
    let promotions = match state.catalog().promotions().await {
        Ok(promotions) => promotions
            .iter()
            .filter(|p| p.vehicle_id == Some(id) && p.is_running(today))
            .map(|p| VehiclePromotion {
                title: p.title.clone(),
                discount: p.discount_label(),
            })
            .collect(),
        Err(e) => {
            tracing::warn!(error = %e, "Promotions unavailable for vehicle page");
            Vec::new()
        }
    };

    Ok(VehicleShowTemplate {
        site: SiteView::of(&state),
        current_path: "/vehicles".to_string(),
        vehicle: VehicleDetail::new(&vehicle, &state),
        promotions,
    })
}
