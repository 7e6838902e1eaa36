//! Testimonial management and approval route handlers.
//!
//! Testimonials submitted on the public site arrive unapproved and are
//! published from here.

use askama::Template;
use axum::{
    Form, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use serde::Deserialize;
use tracing::instrument;

use showroom_core::{Testimonial, TestimonialId, TestimonialInput, testimonial::MAX_RATING};

use crate::{
    components::{DataTableConfig, ListQuery, Visibility, data_table::testimonials_table_config},
    filters,
    middleware::{AdminContext, RequireAdmin},
    services::Flash,
    state::AppState,
};

use super::{
    checked, dashboard::AdminUserView, date_label, done, failure_message, load, optional, render,
    settle,
};

const LIST_PATH: &str = "/admin/testimonials";

/// Testimonial view for the list page.
#[derive(Debug, Clone)]
pub struct TestimonialRow {
    pub id: TestimonialId,
    pub customer: String,
    pub city: String,
    pub stars: String,
    pub content: String,
    pub received: String,
    pub approved: bool,
}

impl From<&Testimonial> for TestimonialRow {
    fn from(t: &Testimonial) -> Self {
        Self {
            id: t.id,
            customer: t.customer_name.clone(),
            city: t.city.clone().unwrap_or_default(),
            stars: t.stars(),
            content: t.content.clone(),
            received: date_label(t.created_at),
            approved: t.approved,
        }
    }
}

/// Raw form fields.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TestimonialForm {
    #[serde(default)]
    pub customer_name: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub rating: String,
    #[serde(default)]
    pub vehicle_label: String,
    #[serde(default)]
    pub approved: Option<String>,
}

impl From<&Testimonial> for TestimonialForm {
    fn from(t: &Testimonial) -> Self {
        Self {
            customer_name: t.customer_name.clone(),
            city: t.city.clone().unwrap_or_default(),
            content: t.content.clone(),
            rating: t.rating.to_string(),
            vehicle_label: t.vehicle_label.clone().unwrap_or_default(),
            approved: t.approved.then(|| "on".to_string()),
        }
    }
}

impl TestimonialForm {
    fn blank() -> Self {
        Self {
            rating: MAX_RATING.to_string(),
            approved: Some("on".to_string()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn is_approved(&self) -> bool {
        checked(self.approved.as_ref())
    }

    /// Ratings offered by the form, best first.
    #[must_use]
    pub fn ratings(&self) -> Vec<String> {
        (1..=MAX_RATING).rev().map(|r| r.to_string()).collect()
    }

    /// Validate and convert into the backend payload.
    ///
    /// # Errors
    ///
    /// Returns a message naming the first invalid field.
    pub fn parse(&self) -> Result<TestimonialInput, String> {
        let customer_name = self.customer_name.trim();
        let content = self.content.trim();
        if customer_name.is_empty() || content.is_empty() {
            return Err("Customer name and testimonial text are required.".to_string());
        }
        let rating = self
            .rating
            .trim()
            .parse::<u8>()
            .ok()
            .filter(|r| (1..=MAX_RATING).contains(r))
            .ok_or_else(|| format!("Rating must be between 1 and {MAX_RATING}."))?;

        Ok(TestimonialInput {
            customer_name: customer_name.to_string(),
            city: optional(&self.city),
            content: content.to_string(),
            rating,
            vehicle_label: optional(&self.vehicle_label),
            approved: self.is_approved(),
        })
    }
}

/// Testimonials list page template.
#[derive(Template)]
#[template(path = "testimonials/index.html")]
pub struct TestimonialsIndexTemplate {
    pub admin_user: AdminUserView,
    pub current_path: String,
    pub flash: Option<Flash>,
    pub table: DataTableConfig,
    pub query: ListQuery,
    pub testimonials: Vec<TestimonialRow>,
    pub pending: usize,
    pub error: Option<String>,
}

/// Testimonial create/edit form template.
#[derive(Template)]
#[template(path = "testimonials/form.html")]
pub struct TestimonialFormTemplate {
    pub admin_user: AdminUserView,
    pub current_path: String,
    pub flash: Option<Flash>,
    pub heading: String,
    pub action: String,
    pub form: TestimonialForm,
    pub error: Option<String>,
}

/// Build the testimonials router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/admin/testimonials", get(index).post(create))
        .route("/admin/testimonials/new", get(new_testimonial))
        .route("/admin/testimonials/{id}", post(update))
        .route("/admin/testimonials/{id}/edit", get(edit))
        .route("/admin/testimonials/{id}/approve", post(approve))
        .route("/admin/testimonials/{id}/delete", post(delete))
}

fn filter_testimonials(testimonials: &[Testimonial], query: &ListQuery) -> Vec<TestimonialRow> {
    let needle = query.needle();
    let visibility = query.status_as::<Visibility>();
    testimonials
        .iter()
        .filter(|t| {
            needle.is_empty()
                || t.customer_name.to_lowercase().contains(&needle)
                || t.content.to_lowercase().contains(&needle)
        })
        .filter(|t| visibility.is_none_or(|v| v.allows(t.approved)))
        .map(TestimonialRow::from)
        .collect()
}

async fn form_page(
    ctx: &AdminContext,
    heading: &str,
    action: String,
    form: TestimonialForm,
    error: Option<String>,
) -> Response {
    let status = if error.is_some() {
        StatusCode::UNPROCESSABLE_ENTITY
    } else {
        StatusCode::OK
    };
    let template = TestimonialFormTemplate {
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

/// Testimonials list page handler.
///
/// GET /admin/testimonials
#[instrument(skip(ctx, state))]
pub async fn index(
    RequireAdmin(ctx): RequireAdmin,
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Html<String>, Response> {
    let (testimonials, error) =
        load(&ctx, ctx.queries(&state).list::<Testimonial>().await).await?;

    let template = TestimonialsIndexTemplate {
        admin_user: AdminUserView::from(&ctx),
        current_path: LIST_PATH.to_string(),
        flash: Flash::take(ctx.store.session()).await,
        table: testimonials_table_config(),
        pending: testimonials.iter().filter(|t| !t.approved).count(),
        testimonials: filter_testimonials(&testimonials, &query),
        query,
        error,
    };

    Ok(render(&template))
}

/// GET /admin/testimonials/new
#[instrument(skip_all)]
pub async fn new_testimonial(RequireAdmin(ctx): RequireAdmin) -> Response {
    form_page(
        &ctx,
        "New testimonial",
        LIST_PATH.to_string(),
        TestimonialForm::blank(),
        None,
    )
    .await
}

/// POST /admin/testimonials
#[instrument(skip_all)]
pub async fn create(
    RequireAdmin(ctx): RequireAdmin,
    State(state): State<AppState>,
    Form(form): Form<TestimonialForm>,
) -> Result<Response, Response> {
    let action = LIST_PATH.to_string();
    let input = match form.parse() {
        Ok(input) => input,
        Err(message) => {
            return Ok(form_page(&ctx, "New testimonial", action, form, Some(message)).await);
        }
    };

    match ctx.queries(&state).create::<Testimonial>(&input).await {
        Ok(testimonial) => {
            tracing::info!(testimonial_id = %testimonial.id, "Testimonial created");
            Ok(done(&ctx, "Testimonial created.", LIST_PATH).await)
        }
        Err(err) => {
            let message = failure_message(&ctx, err).await?;
            Ok(form_page(&ctx, "New testimonial", action, form, Some(message)).await)
        }
    }
}

/// GET /admin/testimonials/{id}/edit
#[instrument(skip(ctx, state))]
pub async fn edit(
    RequireAdmin(ctx): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<TestimonialId>,
) -> Result<Response, Response> {
    let testimonial =
        settle(&ctx, ctx.queries(&state).get::<Testimonial>(id).await, LIST_PATH).await?;
    Ok(form_page(
        &ctx,
        "Edit testimonial",
        format!("{LIST_PATH}/{id}"),
        TestimonialForm::from(&testimonial),
        None,
    )
    .await)
}

/// POST /admin/testimonials/{id}
#[instrument(skip(ctx, state, form))]
pub async fn update(
    RequireAdmin(ctx): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<TestimonialId>,
    Form(form): Form<TestimonialForm>,
) -> Result<Response, Response> {
    let action = format!("{LIST_PATH}/{id}");
    let input = match form.parse() {
        Ok(input) => input,
        Err(message) => {
            return Ok(form_page(&ctx, "Edit testimonial", action, form, Some(message)).await);
        }
    };

    match ctx.queries(&state).update::<Testimonial>(id, &input).await {
        Ok(_) => {
            tracing::info!(testimonial_id = %id, "Testimonial updated");
            Ok(done(&ctx, "Testimonial saved.", LIST_PATH).await)
        }
        Err(err) => {
            let message = failure_message(&ctx, err).await?;
            Ok(form_page(&ctx, "Edit testimonial", action, form, Some(message)).await)
        }
    }
}

/// Publish a submitted testimonial.
///
/// POST /admin/testimonials/{id}/approve
#[instrument(skip(ctx, state))]
pub async fn approve(
    RequireAdmin(ctx): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<TestimonialId>,
) -> Result<Response, Response> {
    let queries = ctx.queries(&state);
    let testimonial = settle(&ctx, queries.get::<Testimonial>(id).await, LIST_PATH).await?;

    let mut input = testimonial.to_input();
    input.approved = true;
    settle(&ctx, queries.update::<Testimonial>(id, &input).await, LIST_PATH).await?;

    tracing::info!(testimonial_id = %id, "Testimonial approved");
    Ok(done(&ctx, "Testimonial published.", LIST_PATH).await)
}

/// POST /admin/testimonials/{id}/delete
#[instrument(skip(ctx, state))]
pub async fn delete(
    RequireAdmin(ctx): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<TestimonialId>,
) -> Result<Response, Response> {
    settle(&ctx, ctx.queries(&state).delete::<Testimonial>(id).await, LIST_PATH).await?;
    tracing::info!(testimonial_id = %id, "Testimonial deleted");
    Ok(done(&ctx, "Testimonial removed.", LIST_PATH).await)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rating_bounds() {
        let mut form = TestimonialForm {
            customer_name: "Ana".to_string(),
            content: "Great experience".to_string(),
            rating: "0".to_string(),
            ..TestimonialForm::default()
        };
        assert_eq!(form.parse().unwrap_err(), "Rating must be between 1 and 5.");

        form.rating = "4".to_string();
        let input = form.parse().unwrap();
        assert_eq!(input.rating, 4);
        assert!(!input.approved);
        assert_eq!(input.city, None);
    }

    #[test]
    fn test_ratings_best_first() {
        assert_eq!(
            TestimonialForm::blank().ratings(),
            vec!["5", "4", "3", "2", "1"]
        );
    }
}
