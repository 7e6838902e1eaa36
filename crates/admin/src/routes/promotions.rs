//! Promotion management route handlers.

use askama::Template;
use axum::{
    Form, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::instrument;

use showroom_core::{Promotion, PromotionId, PromotionInput, VehicleId};

use crate::{
    components::{DataTableConfig, ListQuery, Visibility, data_table::promotions_table_config},
    filters,
    middleware::{AdminContext, RequireAdmin},
    services::Flash,
    state::AppState,
};

use super::{
    checked, dashboard::AdminUserView, day_label, done, failure_message, load, optional, render,
    settle,
};

const LIST_PATH: &str = "/admin/promotions";

/// Promotion view for the list page.
#[derive(Debug, Clone)]
pub struct PromotionRow {
    pub id: PromotionId,
    pub title: String,
    pub discount: String,
    pub window: String,
    pub state: &'static str,
    pub state_class: &'static str,
}

impl PromotionRow {
    fn new(promotion: &Promotion, today: NaiveDate) -> Self {
        let (state, state_class) = if !promotion.active {
            ("Inactive", "badge badge-muted")
        } else if promotion.is_running(today) {
            ("Running", "badge badge-success")
        } else if promotion.starts_on.is_some_and(|start| start > today) {
            ("Scheduled", "badge badge-info")
        } else {
            ("Ended", "badge badge-muted")
        };

        let window = match (promotion.starts_on, promotion.ends_on) {
            (None, None) => "Always".to_string(),
            (start, end) => format!(
                "{} → {}",
                start.map_or_else(|| "…".to_string(), |d| day_label(Some(d))),
                end.map_or_else(|| "…".to_string(), |d| day_label(Some(d))),
            ),
        };

        Self {
            id: promotion.id,
            title: promotion.title.clone(),
            discount: promotion
                .discount_label()
                .unwrap_or_else(|| "—".to_string()),
            window,
            state,
            state_class,
        }
    }
}

/// Raw form fields.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PromotionForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub discount_percent: String,
    #[serde(default)]
    pub starts_on: String,
    #[serde(default)]
    pub ends_on: String,
    #[serde(default)]
    pub active: Option<String>,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub vehicle_id: String,
}

impl From<&Promotion> for PromotionForm {
    fn from(promotion: &Promotion) -> Self {
        Self {
            title: promotion.title.clone(),
            description: promotion.description.clone(),
            discount_percent: promotion
                .discount_percent
                .map(|d| d.normalize().to_string())
                .unwrap_or_default(),
            starts_on: day_label(promotion.starts_on),
            ends_on: day_label(promotion.ends_on),
            active: promotion.active.then(|| "on".to_string()),
            image_url: promotion.image_url.clone().unwrap_or_default(),
            vehicle_id: promotion
                .vehicle_id
                .map(|id| id.to_string())
                .unwrap_or_default(),
        }
    }
}

fn parse_day(value: &str, field: &str) -> Result<Option<NaiveDate>, String> {
    optional(value)
        .map(|v| {
            v.parse::<NaiveDate>()
                .map_err(|_| format!("{field} must be a date (YYYY-MM-DD)."))
        })
        .transpose()
}

impl PromotionForm {
    fn blank() -> Self {
        Self {
            active: Some("on".to_string()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        checked(self.active.as_ref())
    }

    /// Validate and convert into the backend payload.
    ///
    /// # Errors
    ///
    /// Returns a message naming the first invalid field.
    pub fn parse(&self) -> Result<PromotionInput, String> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err("Title is required.".to_string());
        }

        let discount_percent = optional(&self.discount_percent)
            .map(|v| {
                v.parse::<Decimal>()
                    .ok()
                    .filter(|d| !d.is_sign_negative() && *d <= Decimal::ONE_HUNDRED)
                    .ok_or("Discount must be a percentage between 0 and 100.")
            })
            .transpose()?;

        let starts_on = parse_day(&self.starts_on, "Start date")?;
        let ends_on = parse_day(&self.ends_on, "End date")?;
        if let (Some(start), Some(end)) = (starts_on, ends_on)
            && end < start
        {
            return Err("End date must not be before the start date.".to_string());
        }

        let vehicle_id = optional(&self.vehicle_id)
            .map(|v| {
                v.parse::<VehicleId>()
                    .map_err(|_| "Vehicle id must be a number.")
            })
            .transpose()?;

        Ok(PromotionInput {
            title: title.to_string(),
            description: self.description.trim().to_string(),
            discount_percent,
            starts_on,
            ends_on,
            active: self.is_active(),
            image_url: optional(&self.image_url),
            vehicle_id,
        })
    }
}

/// Promotions list page template.
#[derive(Template)]
#[template(path = "promotions/index.html")]
pub struct PromotionsIndexTemplate {
    pub admin_user: AdminUserView,
    pub current_path: String,
    pub flash: Option<Flash>,
    pub table: DataTableConfig,
    pub query: ListQuery,
    pub promotions: Vec<PromotionRow>,
    pub error: Option<String>,
}

/// Promotion create/edit form template.
#[derive(Template)]
#[template(path = "promotions/form.html")]
pub struct PromotionFormTemplate {
    pub admin_user: AdminUserView,
    pub current_path: String,
    pub flash: Option<Flash>,
    pub heading: String,
    pub action: String,
    pub form: PromotionForm,
    pub error: Option<String>,
}

/// Build the promotions router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/admin/promotions", get(index).post(create))
        .route("/admin/promotions/new", get(new_promotion))
        .route("/admin/promotions/{id}", post(update))
        .route("/admin/promotions/{id}/edit", get(edit))
        .route("/admin/promotions/{id}/delete", post(delete))
}

fn filter_promotions(
    promotions: &[Promotion],
    query: &ListQuery,
    today: NaiveDate,
) -> Vec<PromotionRow> {
    let needle = query.needle();
    let visibility = query.status_as::<Visibility>();
    promotions
        .iter()
        .filter(|p| {
            needle.is_empty()
                || p.title.to_lowercase().contains(&needle)
                || p.description.to_lowercase().contains(&needle)
        })
        .filter(|p| visibility.is_none_or(|v| v.allows(p.active)))
        .map(|p| PromotionRow::new(p, today))
        .collect()
}

async fn form_page(
    ctx: &AdminContext,
    heading: &str,
    action: String,
    form: PromotionForm,
    error: Option<String>,
) -> Response {
    let status = if error.is_some() {
        StatusCode::UNPROCESSABLE_ENTITY
    } else {
        StatusCode::OK
    };
    let template = PromotionFormTemplate {
        admin_user: AdminUserView::from(ctx),
        current_path: LIST_PATH.to_string(),
        flash: Flash::take(ctx.store.session()).await,
        heading: heading.to_string(),
        action,
        form,
        error,
    };
    (status, render(&template)).into_response()
}

/// Promotions list page handler.
///
/// GET /admin/promotions
#[instrument(skip(ctx, state))]
pub async fn index(
    RequireAdmin(ctx): RequireAdmin,
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Html<String>, Response> {
    let (promotions, error) = load(&ctx, ctx.queries(&state).list::<Promotion>().await).await?;

    let template = PromotionsIndexTemplate {
        admin_user: AdminUserView::from(&ctx),
        current_path: LIST_PATH.to_string(),
        flash: Flash::take(ctx.store.session()).await,
        table: promotions_table_config(),
        promotions: filter_promotions(&promotions, &query, Utc::now().date_naive()),
        query,
        error,
    };

    Ok(render(&template))
}

/// GET /admin/promotions/new
#[instrument(skip_all)]
pub async fn new_promotion(RequireAdmin(ctx): RequireAdmin) -> Response {
    form_page(&ctx, "New promotion", LIST_PATH.to_string(), PromotionForm::blank(), None).await
}

/// POST /admin/promotions
#[instrument(skip_all)]
pub async fn create(
    RequireAdmin(ctx): RequireAdmin,
    State(state): State<AppState>,
    Form(form): Form<PromotionForm>,
) -> Result<Response, Response> {
    let action = LIST_PATH.to_string();
    let input = match form.parse() {
        Ok(input) => input,
        Err(message) => return Ok(form_page(&ctx, "New promotion", action, form, Some(message)).await),
    };

    match ctx.queries(&state).create::<Promotion>(&input).await {
        Ok(promotion) => {
            tracing::info!(promotion_id = %promotion.id, "Promotion created");
            Ok(done(&ctx, "Promotion created.", LIST_PATH).await)
        }
        Err(err) => {
            let message = failure_message(&ctx, err).await?;
            Ok(form_page(&ctx, "New promotion", action, form, Some(message)).await)
        }
    }
}

/// GET /admin/promotions/{id}/edit
#[instrument(skip(ctx, state))]
pub async fn edit(
    RequireAdmin(ctx): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<PromotionId>,
) -> Result<Response, Response> {
    let promotion = settle(&ctx, ctx.queries(&state).get::<Promotion>(id).await, LIST_PATH).await?;
    Ok(form_page(
        &ctx,
        "Edit promotion",
        format!("{LIST_PATH}/{id}"),
        PromotionForm::from(&promotion),
        None,
    )
    .await)
}

/// POST /admin/promotions/{id}
#[instrument(skip(ctx, state, form))]
pub async fn update(
    RequireAdmin(ctx): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<PromotionId>,
    Form(form): Form<PromotionForm>,
) -> Result<Response, Response> {
    let action = format!("{LIST_PATH}/{id}");
    let input = match form.parse() {
        Ok(input) => input,
        Err(message) => return Ok(form_page(&ctx, "Edit promotion", action, form, Some(message)).await),
    };

    match ctx.queries(&state).update::<Promotion>(id, &input).await {
        Ok(_) => {
            tracing::info!(promotion_id = %id, "Promotion updated");
            Ok(done(&ctx, "Promotion saved.", LIST_PATH).await)
        }
        Err(err) => {
            let message = failure_message(&ctx, err).await?;
            Ok(form_page(&ctx, "Edit promotion", action, form, Some(message)).await)
        }
    }
}

/// POST /admin/promotions/{id}/delete
#[instrument(skip(ctx, state))]
pub async fn delete(
    RequireAdmin(ctx): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<PromotionId>,
) -> Result<Response, Response> {
    settle(&ctx, ctx.queries(&state).delete::<Promotion>(id).await, LIST_PATH).await?;
    tracing::info!(promotion_id = %id, "Promotion deleted");
    Ok(done(&ctx, "Promotion removed.", LIST_PATH).await)
}
