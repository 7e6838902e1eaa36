//! Testimonials page and public submission form.
//!
//! Submissions are sent with `approved = false` and only appear once staff
//! approve them in the admin panel.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form, Router,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
};
use serde::Deserialize;
use tracing::{error, info, instrument, warn};

use showroom_core::{Testimonial, TestimonialInput, testimonial::MAX_RATING};

use crate::error::{Result, add_breadcrumb};
use crate::filters;
use crate::middleware::form_rate_limiter;
use crate::state::AppState;

use super::{SiteView, Sent, optional};

const MAX_CONTENT_CHARS: usize = 2000;

/// Approved testimonial as shown to visitors.
#[derive(Debug, Clone)]
pub struct TestimonialCard {
    pub customer: String,
    pub city: Option<String>,
    pub stars: String,
    pub rating: u8,
    pub content: String,
    pub vehicle: Option<String>,
}

impl From<&Testimonial> for TestimonialCard {
    fn from(t: &Testimonial) -> Self {
        Self {
            customer: t.customer_name.clone(),
            city: t.city.clone(),
            stars: t.stars(),
            rating: t.rating,
            content: t.content.clone(),
            vehicle: t.vehicle_label.clone(),
        }
    }
}

/// Raw submission form fields.
#[derive(Debug, Clone, Deserialize)]
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
}

impl Default for TestimonialForm {
    fn default() -> Self {
        Self {
            customer_name: String::new(),
            city: String::new(),
            content: String::new(),
            rating: MAX_RATING.to_string(),
            vehicle_label: String::new(),
        }
    }
}

impl TestimonialForm {
    /// Ratings offered by the form, best first.
    #[must_use]
    pub fn ratings(&self) -> Vec<String> {
        (1..=MAX_RATING).rev().map(|r| r.to_string()).collect()
    }

    /// Validate and convert into an unapproved submission.
    ///
    /// # Errors
    ///
    /// Returns a message for the visitor naming the first invalid field.
    pub fn parse(&self) -> std::result::Result<TestimonialInput, String> {
        let customer_name = self.customer_name.trim();
        let content = self.content.trim();
        if customer_name.is_empty() {
            return Err("Please tell us your name.".to_string());
        }
        if content.is_empty() {
            return Err("Please write a few words about your experience.".to_string());
        }
        if content.chars().count() > MAX_CONTENT_CHARS {
            return Err(format!(
                "Testimonials are limited to {MAX_CONTENT_CHARS} characters."
            ));
        }
        let rating = self
            .rating
            .trim()
            .parse::<u8>()
            .ok()
            .filter(|r| (1..=MAX_RATING).contains(r))
            .ok_or_else(|| format!("Pick a rating from 1 to {MAX_RATING}."))?;

        Ok(TestimonialInput {
            customer_name: customer_name.to_string(),
            city: optional(&self.city),
            content: content.to_string(),
            rating,
            vehicle_label: optional(&self.vehicle_label),
            approved: false,
        })
    }
}

/// Testimonials page template.
#[derive(Template, WebTemplate)]
#[template(path = "testimonials.html")]
pub struct TestimonialsTemplate {
    pub site: SiteView,
    pub current_path: String,
    pub testimonials: Vec<TestimonialCard>,
    pub form: TestimonialForm,
    pub error: Option<String>,
    pub sent: bool,
}

/// Create the testimonials router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/testimonials", get(index))
        .route(
            "/testimonials",
            post(submit).layer(form_rate_limiter()),
        )
}

async fn page(
    state: &AppState,
    form: TestimonialForm,
    error: Option<String>,
    sent: bool,
) -> TestimonialsTemplate {
    let testimonials = match state.catalog().testimonials().await {
        Ok(list) => list.iter().map(TestimonialCard::from).collect(),
        Err(e) => {
            warn!(error = %e, "Testimonials unavailable");
            Vec::new()
        }
    };
    TestimonialsTemplate {
        site: SiteView::of(state),
        current_path: "/testimonials".to_string(),
        testimonials,
        form,
        error,
        sent,
    }
}

/// Display approved testimonials and the submission form.
///
/// GET /testimonials
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>, Query(sent): Query<Sent>) -> TestimonialsTemplate {
    page(&state, TestimonialForm::default(), None, sent.is_sent()).await
}

/// Submit a testimonial for moderation.
///
/// POST /testimonials
#[instrument(skip_all)]
pub async fn submit(
    State(state): State<AppState>,
    Form(form): Form<TestimonialForm>,
) -> Result<Response> {
    let input = match form.parse() {
        Ok(input) => input,
        Err(message) => {
            let page = page(&state, form, Some(message), false).await;
            return Ok((StatusCode::UNPROCESSABLE_ENTITY, page).into_response());
        }
    };

    if let Err(e) = state.backend().submit_testimonial(&input).await {
        error!(error = %e, "Failed to submit testimonial");
        let page = page(
            &state,
            form,
            Some("We could not send your testimonial right now. Please try again.".to_string()),
            false,
        )
        .await;
        return Ok((StatusCode::BAD_GATEWAY, page).into_response());
    }

    add_breadcrumb("testimonial", "Submitted testimonial", None);
    info!(rating = input.rating, "Testimonial submitted for approval");
    Ok(Redirect::to("/testimonials?sent=1").into_response())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn form(name: &str, content: &str, rating: &str) -> TestimonialForm {
        TestimonialForm {
            customer_name: name.to_string(),
            city: "  ".to_string(),
            content: content.to_string(),
            rating: rating.to_string(),
            vehicle_label: "2021 Jeep Compass".to_string(),
        }
    }

    #[test]
    fn test_parse_submits_unapproved() {
        let input = form(" Ana ", "Great service", "4").parse().unwrap();
        assert_eq!(input.customer_name, "Ana");
        assert_eq!(input.rating, 4);
        assert!(input.city.is_none());
        assert_eq!(input.vehicle_label.as_deref(), Some("2021 Jeep Compass"));
        assert!(!input.approved);
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!(form("", "Great", "5").parse().is_err());
        assert!(form("Ana", "   ", "5").parse().is_err());
        assert!(form("Ana", "Great", "0").parse().is_err());
        assert!(form("Ana", "Great", "6").parse().is_err());
        assert!(form("Ana", "Great", "five").parse().is_err());
        assert!(form("Ana", &"x".repeat(MAX_CONTENT_CHARS + 1), "5").parse().is_err());
    }

    #[test]
    fn test_default_form_rates_five() {
        let form = TestimonialForm::default();
        assert_eq!(form.rating, "5");
        assert_eq!(form.ratings().first().map(String::as_str), Some("5"));
    }
}
