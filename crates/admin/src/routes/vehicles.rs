//! Vehicle catalog management route handlers.

use askama::Template;
use axum::{
    Form, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use chrono::Datelike;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::instrument;

use showroom_core::{FuelType, Transmission, Vehicle, VehicleId, VehicleInput, VehicleStatus};

use crate::{
    components::{DataTableConfig, ListQuery, data_table::vehicles_table_config},
    filters,
    middleware::{AdminContext, RequireAdmin},
    services::Flash,
    state::AppState,
};

use super::{checked, dashboard::AdminUserView, done, failure_message, load, render, settle};

const LIST_PATH: &str = "/admin/vehicles";

/// Oldest model year accepted by the form.
const MIN_YEAR: u16 = 1950;

/// Vehicle view for the list page.
#[derive(Debug, Clone)]
pub struct VehicleRow {
    pub id: VehicleId,
    pub title: String,
    pub color: String,
    pub price: String,
    pub mileage: String,
    pub fuel: &'static str,
    pub status: &'static str,
    pub status_class: &'static str,
    pub featured: bool,
    pub cover: Option<String>,
}

impl From<&Vehicle> for VehicleRow {
    fn from(vehicle: &Vehicle) -> Self {
        let status_class = match vehicle.status {
            VehicleStatus::Available => "badge badge-success",
            VehicleStatus::Reserved => "badge badge-warning",
            VehicleStatus::Sold => "badge badge-muted",
        };
        Self {
            id: vehicle.id,
            title: vehicle.title(),
            color: vehicle.color.clone(),
            price: format!("{:.2}", vehicle.price),
            mileage: vehicle.mileage_km.to_string(),
            fuel: vehicle.fuel_type.label(),
            status: vehicle.status.label(),
            status_class,
            featured: vehicle.featured,
            cover: vehicle.cover_image().map(ToString::to_string),
        }
    }
}

/// Raw form fields, kept as strings so a rejected form re-renders as typed.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VehicleForm {
    #[serde(default)]
    pub make: String,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub year: String,
    #[serde(default)]
    pub price: String,
    #[serde(default)]
    pub mileage_km: String,
    #[serde(default)]
    pub fuel_type: String,
    #[serde(default)]
    pub transmission: String,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub description: String,
    /// One URL per line.
    #[serde(default)]
    pub image_urls: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub featured: Option<String>,
}

impl From<&Vehicle> for VehicleForm {
    fn from(vehicle: &Vehicle) -> Self {
        Self {
            make: vehicle.make.clone(),
            model: vehicle.model.clone(),
            year: vehicle.year.to_string(),
            price: vehicle.price.to_string(),
            mileage_km: vehicle.mileage_km.to_string(),
            fuel_type: vehicle.fuel_type.as_str().to_string(),
            transmission: vehicle.transmission.as_str().to_string(),
            color: vehicle.color.clone(),
            description: vehicle.description.clone(),
            image_urls: vehicle.image_urls.join("\n"),
            status: vehicle.status.as_str().to_string(),
            featured: vehicle.featured.then(|| "on".to_string()),
        }
    }
}

impl VehicleForm {
    fn blank() -> Self {
        Self {
            year: chrono::Utc::now().year().to_string(),
            mileage_km: "0".to_string(),
            fuel_type: FuelType::Flex.as_str().to_string(),
            transmission: Transmission::Manual.as_str().to_string(),
            status: VehicleStatus::Available.as_str().to_string(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn is_featured(&self) -> bool {
        checked(self.featured.as_ref())
    }

    /// Validate and convert into the backend payload.
    ///
    /// # Errors
    ///
    /// Returns a message naming the first invalid field.
    pub fn parse(&self) -> Result<VehicleInput, String> {
        let make = self.make.trim();
        let model = self.model.trim();
        if make.is_empty() || model.is_empty() {
            return Err("Make and model are required.".to_string());
        }

        let max_year = u16::try_from(chrono::Utc::now().year() + 1).unwrap_or(u16::MAX);
        let year = self
            .year
            .trim()
            .parse::<u16>()
            .ok()
            .filter(|y| (MIN_YEAR..=max_year).contains(y))
            .ok_or_else(|| format!("Year must be between {MIN_YEAR} and {max_year}."))?;

        let price = self
            .price
            .trim()
            .parse::<Decimal>()
            .ok()
            .filter(|p| p.is_sign_positive() && !p.is_zero())
            .ok_or("Price must be a positive number.")?;

        let mileage_km = self
            .mileage_km
            .trim()
            .parse::<u32>()
            .map_err(|_| "Mileage must be a whole number of kilometers.")?;

        let fuel_type = self.fuel_type.parse::<FuelType>().map_err(|e| e.to_string())?;
        let transmission = self
            .transmission
            .parse::<Transmission>()
            .map_err(|e| e.to_string())?;
        let status = self.status.parse::<VehicleStatus>().map_err(|e| e.to_string())?;

        Ok(VehicleInput {
            make: make.to_string(),
            model: model.to_string(),
            year,
            price,
            mileage_km,
            fuel_type,
            transmission,
            color: self.color.trim().to_string(),
            description: self.description.trim().to_string(),
            image_urls: self
                .image_urls
                .lines()
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .map(ToString::to_string)
                .collect(),
            status,
            featured: self.is_featured(),
        })
    }
}

/// Vehicles list page template.
#[derive(Template)]
#[template(path = "vehicles/index.html")]
pub struct VehiclesIndexTemplate {
    pub admin_user: AdminUserView,
    pub current_path: String,
    pub flash: Option<Flash>,
    pub table: DataTableConfig,
    pub query: ListQuery,
    pub vehicles: Vec<VehicleRow>,
    pub total: usize,
    pub error: Option<String>,
}

/// Vehicle create/edit form template.
#[derive(Template)]
#[template(path = "vehicles/form.html")]
pub struct VehicleFormTemplate {
    pub admin_user: AdminUserView,
    pub current_path: String,
    pub flash: Option<Flash>,
    pub heading: String,
    pub action: String,
    pub form: VehicleForm,
    pub error: Option<String>,
    pub fuel_types: &'static [FuelType],
    pub transmissions: &'static [Transmission],
    pub statuses: &'static [VehicleStatus],
}

/// Build the vehicles router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/admin/vehicles", get(index).post(create))
        .route("/admin/vehicles/new", get(new_vehicle))
        .route("/admin/vehicles/{id}", post(update))
        .route("/admin/vehicles/{id}/edit", get(edit))
        .route("/admin/vehicles/{id}/delete", post(delete))
}

/// Apply the toolbar filters.
fn filter_vehicles(vehicles: &[Vehicle], query: &ListQuery) -> Vec<VehicleRow> {
    let status = query.status_as::<VehicleStatus>();
    vehicles
        .iter()
        .filter(|v| v.matches_text(query.search()))
        .filter(|v| status.is_none_or(|s| v.status == s))
        .map(VehicleRow::from)
        .collect()
}

async fn form_page(
    ctx: &AdminContext,
    heading: String,
    action: String,
    form: VehicleForm,
    error: Option<String>,
) -> Response {
    let status = if error.is_some() {
        StatusCode::UNPROCESSABLE_ENTITY
    } else {
        StatusCode::OK
    };
    let template = VehicleFormTemplate {
        admin_user: AdminUserView::from(ctx),
        current_path: LIST_PATH.to_string(),
        flash: Flash::take(ctx.store.session()).await,
        heading,
        action,
        form,
        error,
        fuel_types: FuelType::ALL,
        transmissions: Transmission::ALL,
        statuses: VehicleStatus::ALL,
    };
    (status, render(&template)).into_response()
}

/// Vehicles list page handler.
///
/// GET /admin/vehicles
#[instrument(skip(ctx, state))]
pub async fn index(
    RequireAdmin(ctx): RequireAdmin,
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Html<String>, Response> {
    let (vehicles, error) = load(&ctx, ctx.queries(&state).list::<Vehicle>().await).await?;

    let template = VehiclesIndexTemplate {
        admin_user: AdminUserView::from(&ctx),
        current_path: LIST_PATH.to_string(),
        flash: Flash::take(ctx.store.session()).await,
        table: vehicles_table_config(),
        vehicles: filter_vehicles(&vehicles, &query),
        total: vehicles.len(),
        query,
        error,
    };

    Ok(render(&template))
}

/// New vehicle form handler.
///
/// GET /admin/vehicles/new
#[instrument(skip_all)]
pub async fn new_vehicle(RequireAdmin(ctx): RequireAdmin) -> Response {
    form_page(
        &ctx,
        "New vehicle".to_string(),
        LIST_PATH.to_string(),
        VehicleForm::blank(),
        None,
    )
    .await
}

/// Create vehicle handler.
///
/// POST /admin/vehicles
#[instrument(skip_all)]
pub async fn create(
    RequireAdmin(ctx): RequireAdmin,
    State(state): State<AppState>,
    Form(form): Form<VehicleForm>,
) -> Result<Response, Response> {
    let heading = "New vehicle".to_string();
    let input = match form.parse() {
        Ok(input) => input,
        Err(message) => {
            return Ok(form_page(&ctx, heading, LIST_PATH.to_string(), form, Some(message)).await);
        }
    };

    match ctx.queries(&state).create::<Vehicle>(&input).await {
        Ok(vehicle) => {
            tracing::info!(vehicle_id = %vehicle.id, "Vehicle created");
            Ok(done(&ctx, &format!("{} added to the catalog.", vehicle.title()), LIST_PATH).await)
        }
        Err(err) => {
            let message = failure_message(&ctx, err).await?;
            Ok(form_page(&ctx, heading, LIST_PATH.to_string(), form, Some(message)).await)
        }
    }
}

/// Edit vehicle form handler.
///
/// GET /admin/vehicles/{id}/edit
#[instrument(skip(ctx, state))]
pub async fn edit(
    RequireAdmin(ctx): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<VehicleId>,
) -> Result<Response, Response> {
    let vehicle = settle(&ctx, ctx.queries(&state).get::<Vehicle>(id).await, LIST_PATH).await?;

    Ok(form_page(
        &ctx,
        format!("Edit {}", vehicle.title()),
        format!("{LIST_PATH}/{id}"),
        VehicleForm::from(&vehicle),
        None,
    )
    .await)
}

/// Update vehicle handler.
///
/// POST /admin/vehicles/{id}
#[instrument(skip(ctx, state, form))]
pub async fn update(
    RequireAdmin(ctx): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<VehicleId>,
    Form(form): Form<VehicleForm>,
) -> Result<Response, Response> {
    let heading = "Edit vehicle".to_string();
    let action = format!("{LIST_PATH}/{id}");
    let input = match form.parse() {
        Ok(input) => input,
        Err(message) => return Ok(form_page(&ctx, heading, action, form, Some(message)).await),
    };

    match ctx.queries(&state).update::<Vehicle>(id, &input).await {
        Ok(vehicle) => {
            tracing::info!(vehicle_id = %id, "Vehicle updated");
            Ok(done(&ctx, &format!("{} saved.", vehicle.title()), LIST_PATH).await)
        }
        Err(err) => {
            let message = failure_message(&ctx, err).await?;
            Ok(form_page(&ctx, heading, action, form, Some(message)).await)
        }
    }
}

/// Delete vehicle handler.
///
/// POST /admin/vehicles/{id}/delete
#[instrument(skip(ctx, state))]
pub async fn delete(
    RequireAdmin(ctx): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<VehicleId>,
) -> Result<Response, Response> {
    settle(&ctx, ctx.queries(&state).delete::<Vehicle>(id).await, LIST_PATH).await?;
    tracing::info!(vehicle_id = %id, "Vehicle deleted");
    Ok(done(&ctx, "Vehicle removed.", LIST_PATH).await)
}
