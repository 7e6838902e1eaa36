//! Contact form route handlers.
//!
//! Every accepted submission becomes a lead in the backend, optionally tied
//! to the vehicle the visitor came from.

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
use tracing::{error, info, instrument};

use showroom_core::{ContactInput, Email, VehicleId};

use crate::error::{Result, add_breadcrumb};
use crate::filters;
use crate::middleware::form_rate_limiter;
use crate::state::AppState;

use super::{SiteView, empty_as_none, optional, vehicle_title};

const MAX_MESSAGE_CHARS: usize = 4000;

/// Raw contact form fields.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContactForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub vehicle_id: String,
}

impl ContactForm {
    /// Validate and convert into a lead.
    ///
    /// # Errors
    ///
    /// Returns a message for the visitor naming the first invalid field.
    pub fn parse(&self) -> std::result::Result<ContactInput, String> {
        let name = self.name.trim();
        let message = self.message.trim();
        if name.is_empty() {
            return Err("Please tell us your name.".to_string());
        }
        let email = Email::parse(&self.email).map_err(|e| format!("Email: {e}."))?;
        if message.is_empty() {
            return Err("Please write a message.".to_string());
        }
        if message.chars().count() > MAX_MESSAGE_CHARS {
            return Err(format!(
                "Messages are limited to {MAX_MESSAGE_CHARS} characters."
            ));
        }
        let vehicle_id = match self.vehicle_id.trim() {
            "" => None,
            raw => Some(
                raw.parse::<VehicleId>()
                    .map_err(|_| "The selected vehicle is not valid.".to_string())?,
            ),
        };

        Ok(ContactInput {
            name: name.to_string(),
            email,
            phone: optional(&self.phone),
            message: message.to_string(),
            vehicle_id,
        })
    }
}

/// Contact page template.
#[derive(Template, WebTemplate)]
#[template(path = "contact.html")]
pub struct ContactTemplate {
    pub site: SiteView,
    pub current_path: String,
    pub form: ContactForm,
    pub vehicle_title: Option<String>,
    pub error: Option<String>,
    pub sent: bool,
}

/// `?vehicle=` and `?sent=1` on the contact page.
#[derive(Debug, Default, Deserialize)]
pub struct ContactQuery {
    #[serde(default, deserialize_with = "empty_as_none")]
    pub vehicle: Option<VehicleId>,
    #[serde(default)]
    pub sent: Option<String>,
}

/// Create the contact router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/contact", get(show))
        .route("/contact", post(submit).layer(form_rate_limiter()))
}

async fn page(
    state: &AppState,
    form: ContactForm,
    error: Option<String>,
    sent: bool,
) -> ContactTemplate {
    let vehicle_id = form.vehicle_id.trim().parse::<VehicleId>().ok();
    ContactTemplate {
        site: SiteView::of(state),
        current_path: "/contact".to_string(),
        vehicle_title: vehicle_title(state, vehicle_id).await,
        form,
        error,
        sent,
    }
}

/// Display the contact form, prefilled with a vehicle reference.
///
/// GET /contact
#[instrument(skip(state))]
pub async fn show(State(state): State<AppState>, Query(query): Query<ContactQuery>) -> ContactTemplate {
    let vehicle = query.vehicle;
    let mut form = ContactForm {
        vehicle_id: vehicle.map(|id| id.to_string()).unwrap_or_default(),
        ..ContactForm::default()
    };
    let title = vehicle_title(&state, vehicle).await;
    if let Some(title) = &title {
        form.message = format!("I'm interested in the {title}.");
    }
    ContactTemplate {
        site: SiteView::of(&state),
        current_path: "/contact".to_string(),
        form,
        vehicle_title: title,
        error: None,
        sent: query.sent.is_some_and(|v| v == "1"),
    }
}

/// Submit a contact request.
///
/// POST /contact
#[instrument(skip_all)]
pub async fn submit(
    State(state): State<AppState>,
    Form(form): Form<ContactForm>,
) -> Result<Response> {
    let input = match form.parse() {
        Ok(input) => input,
        Err(message) => {
            let page = page(&state, form, Some(message), false).await;
            return Ok((StatusCode::UNPROCESSABLE_ENTITY, page).into_response());
        }
    };

    if let Err(e) = state.backend().submit_contact(&input).await {
        error!(error = %e, "Failed to submit contact request");
        let page = page(
            &state,
            form,
            Some("We could not send your message right now. Please try again or call us.".to_string()),
            false,
        )
        .await;
        return Ok((StatusCode::BAD_GATEWAY, page).into_response());
    }

    add_breadcrumb("lead", "Submitted contact form", None);
    info!(
        email_domain = input.email.domain(),
        vehicle_id = ?input.vehicle_id,
        "Contact request received"
    );
    Ok(Redirect::to("/contact?sent=1").into_response())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn form() -> ContactForm {
        ContactForm {
            name: " Joana ".to_string(),
            email: "Joana@Example.com".to_string(),
            phone: String::new(),
            message: "Is the Compass still available?".to_string(),
            vehicle_id: "7".to_string(),
        }
    }

    #[test]
    fn test_parse_valid_contact() {
        let input = form().parse().unwrap();
        assert_eq!(input.name, "Joana");
        assert_eq!(input.email.as_str(), "joana@example.com");
        assert!(input.phone.is_none());
        assert_eq!(input.vehicle_id, Some(VehicleId::new(7)));
    }

    #[test]
    fn test_parse_without_vehicle() {
        let input = ContactForm {
            vehicle_id: " ".to_string(),
            ..form()
        }
        .parse()
        .unwrap();
        assert!(input.vehicle_id.is_none());
    }

    #[test]
    fn test_parse_rejects_invalid_fields() {
        assert!(ContactForm { name: String::new(), ..form() }.parse().is_err());
        assert!(ContactForm { email: "nope".to_string(), ..form() }.parse().is_err());
        assert!(ContactForm { message: "  ".to_string(), ..form() }.parse().is_err());
        assert!(ContactForm { vehicle_id: "abc".to_string(), ..form() }.parse().is_err());
    }
}
