//! HTTP route handlers for the site.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                        - Home page
//! GET  /health                  - Health check
//! GET  /health/ready            - Readiness check
//!
//! # Catalog
//! GET  /vehicles                - Vehicle catalog (filters + sort in the query string)
//! GET  /vehicles/{id}           - Vehicle detail
//! GET  /promotions              - Running promotions
//!
//! # Testimonials
//! GET  /testimonials            - Approved testimonials + submission form
//! POST /testimonials            - Submit a testimonial (awaits approval)
//!
//! # Blog
//! GET  /blog                    - Published posts (optional ?tag=)
//! GET  /blog/{slug}             - Post with approved comments
//! POST /blog/{slug}/comments    - Add a comment (awaits approval)
//! POST /blog/{slug}/like        - Like a post (once per session)
//!
//! # Leads
//! GET  /contact                 - Contact form (optional ?vehicle=)
//! POST /contact                 - Submit a contact request
//! GET  /credit                  - Credit simulator (optional ?vehicle=)
//! POST /credit                  - Compute a payment and record the simulation
//! ```
//!
//! Every POST route is rate limited per client IP.

pub mod blog;
pub mod contact;
pub mod credit;
pub mod home;
pub mod promotions;
pub mod testimonials;
pub mod vehicles;

use axum::Router;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};
use tracing::warn;

use showroom_core::{Price, Vehicle, VehicleId};

use crate::config::DealerConfig;
use crate::state::AppState;

/// Dealership identity for the page chrome.
#[derive(Debug, Clone)]
pub struct SiteView {
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
}

impl From<&DealerConfig> for SiteView {
    fn from(dealer: &DealerConfig) -> Self {
        Self {
            name: dealer.name.clone(),
            phone: dealer.phone.clone(),
            email: dealer.email.clone(),
            address: dealer.address.clone(),
        }
    }
}

impl SiteView {
    #[must_use]
    pub fn of(state: &AppState) -> Self {
        Self::from(&state.config().dealer)
    }
}

/// Vehicle summary used by the catalog grid and the home page.
#[derive(Debug, Clone)]
pub struct VehicleCard {
    pub id: VehicleId,
    pub title: String,
    pub price: String,
    pub mileage: String,
    pub fuel: &'static str,
    pub transmission: &'static str,
    pub image: Option<String>,
    pub status: &'static str,
    pub available: bool,
}

impl VehicleCard {
    #[must_use]
    pub fn new(vehicle: &Vehicle, state: &AppState) -> Self {
        Self {
            id: vehicle.id,
            title: vehicle.title(),
            price: money(state, vehicle.price),
            mileage: mileage_label(vehicle.mileage_km),
            fuel: vehicle.fuel_type.label(),
            transmission: vehicle.transmission.label(),
            image: vehicle.cover_image().map(String::from),
            status: vehicle.status.label(),
            available: vehicle.is_available(),
        }
    }
}

/// Format an amount in the dealership's currency.
#[must_use]
pub fn money(state: &AppState, amount: Decimal) -> String {
    Price::new(amount, state.config().dealer.currency).display()
}

/// `32000` -> `32,000 km`.
#[must_use]
pub fn mileage_label(km: u32) -> String {
    let digits = km.to_string();
    let mut out = String::with_capacity(digits.len() + 4);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out.push_str(" km");
    out
}

/// Treat an empty query or form value as absent.
///
/// HTML forms submit untouched inputs as `field=`; this lets those map to
/// `None` instead of failing to parse.
pub fn empty_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value.parse().map(Some).map_err(serde::de::Error::custom),
    }
}

/// Optional `?vehicle=` reference on lead forms.
#[derive(Debug, Default, Deserialize)]
pub struct VehicleRef {
    #[serde(default, deserialize_with = "empty_as_none")]
    pub vehicle: Option<VehicleId>,
}

/// `?sent=1` after a form was accepted.
#[derive(Debug, Default, Deserialize)]
pub struct Sent {
    #[serde(default)]
    pub sent: Option<String>,
}

impl Sent {
    #[must_use]
    pub fn is_sent(&self) -> bool {
        self.sent.as_deref() == Some("1")
    }
}

/// Trimmed form value, `None` when blank.
#[must_use]
pub fn optional(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

/// Title of a referenced vehicle, when it is still in the catalog.
pub async fn vehicle_title(state: &AppState, id: Option<VehicleId>) -> Option<String> {
    let id = id?;
    match state.catalog().vehicle(id).await {
        Ok(vehicle) => vehicle.map(|v| v.title()),
        Err(e) => {
            warn!(error = %e, vehicle_id = %id, "Could not load referenced vehicle");
            None
        }
    }
}

/// Create all page and form routes for the site.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(home::router())
        .nest("/vehicles", vehicles::router())
        .merge(promotions::router())
        .merge(testimonials::router())
        .nest("/blog", blog::router())
        .merge(contact::router())
        .merge(credit::router())
}
