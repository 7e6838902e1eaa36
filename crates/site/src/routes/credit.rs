//! Credit simulator route handlers.
//!
//! The payment is a fixed-rate amortized installment computed locally with
//! the dealership's configured rate. Each simulation is also recorded in the
//! backend as a lead; if that fails the visitor still sees the result.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form, Router,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::{error, info, instrument, warn};

use showroom_core::{CreditSimulationInput, CreditTerms, Email, VehicleId};

use crate::config::CreditConfig;
use crate::error::add_breadcrumb;
use crate::filters;
use crate::middleware::form_rate_limiter;
use crate::state::AppState;

use super::{SiteView, VehicleRef, money, optional, vehicle_title};

/// Term preselected on a fresh form, when the dealership offers it.
const DEFAULT_TERM_MONTHS: u32 = 48;

/// Raw simulator form fields.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreditForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub vehicle_id: String,
    #[serde(default)]
    pub price: String,
    #[serde(default)]
    pub down_payment: String,
    #[serde(default)]
    pub term_months: String,
}

/// A validated simulation request.
#[derive(Debug, Clone)]
pub struct CreditRequest {
    pub name: String,
    pub email: Email,
    pub phone: Option<String>,
    pub vehicle_id: Option<VehicleId>,
    pub terms: CreditTerms,
}

impl CreditRequest {
    /// Lead payload carrying the computed installment.
    #[must_use]
    pub fn to_input(&self, monthly_payment: Decimal) -> CreditSimulationInput {
        CreditSimulationInput {
            name: self.name.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
            vehicle_id: self.vehicle_id,
            price: self.terms.price,
            down_payment: self.terms.down_payment,
            term_months: self.terms.term_months,
            monthly_payment,
        }
    }
}

/// Parse an amount typed by a visitor, ignoring thousands separators and a
/// leading currency symbol.
fn parse_amount(raw: &str) -> Option<Decimal> {
    let cleaned: String = raw
        .trim()
        .trim_start_matches(|c: char| !c.is_ascii_digit() && c != '.' && c != '-')
        .chars()
        .filter(|c| *c != ',' && !c.is_whitespace())
        .collect();
    cleaned.parse().ok()
}

impl CreditForm {
    /// Validate against the dealership's credit settings.
    ///
    /// # Errors
    ///
    /// Returns a message for the visitor naming the first invalid field.
    pub fn parse(&self, credit: CreditConfig) -> std::result::Result<CreditRequest, String> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err("Please tell us your name.".to_string());
        }
        let email = Email::parse(&self.email).map_err(|e| format!("Email: {e}."))?;

        let price = parse_amount(&self.price)
            .filter(|p| *p > Decimal::ZERO)
            .ok_or_else(|| "Enter the vehicle price.".to_string())?;
        let down_payment = if self.down_payment.trim().is_empty() {
            Decimal::ZERO
        } else {
            parse_amount(&self.down_payment)
                .filter(|d| *d >= Decimal::ZERO)
                .ok_or_else(|| "Enter a valid down payment.".to_string())?
        };
        if down_payment >= price {
            return Err("The down payment must be less than the price.".to_string());
        }

        let term_months = self
            .term_months
            .trim()
            .parse::<u32>()
            .ok()
            .filter(|t| (1..=credit.max_term_months).contains(t))
            .ok_or_else(|| {
                format!(
                    "Choose a term between 1 and {} months.",
                    credit.max_term_months
                )
            })?;

        let vehicle_id = match self.vehicle_id.trim() {
            "" => None,
            raw => Some(
                raw.parse::<VehicleId>()
                    .map_err(|_| "The selected vehicle is not valid.".to_string())?,
            ),
        };

        Ok(CreditRequest {
            name: name.to_string(),
            email,
            phone: optional(&self.phone),
            vehicle_id,
            terms: CreditTerms {
                price,
                down_payment,
                term_months,
                annual_rate: credit.annual_rate,
            },
        })
    }
}

/// A term option for the select.
#[derive(Debug, Clone)]
pub struct TermOption {
    pub months: u32,
    pub selected: bool,
}

/// Computed simulation shown after a POST.
#[derive(Debug, Clone)]
pub struct CreditResult {
    pub monthly_payment: String,
    pub principal: String,
    pub total_paid: String,
    pub term_months: u32,
    pub saved: bool,
}

/// Credit simulator template.
#[derive(Template, WebTemplate)]
#[template(path = "credit.html")]
pub struct CreditTemplate {
    pub site: SiteView,
    pub current_path: String,
    pub form: CreditForm,
    pub terms: Vec<TermOption>,
    pub rate_label: String,
    pub vehicle_title: Option<String>,
    pub result: Option<CreditResult>,
    pub error: Option<String>,
}

/// Create the credit router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/credit", get(show))
        .route("/credit", post(simulate).layer(form_rate_limiter()))
}

fn term_options(credit: CreditConfig, selected: &str) -> Vec<TermOption> {
    let selected = selected.trim().parse::<u32>().ok();
    credit
        .term_choices()
        .into_iter()
        .map(|months| TermOption {
            months,
            selected: selected == Some(months),
        })
        .collect()
}

fn default_term(credit: CreditConfig) -> u32 {
    let choices = credit.term_choices();
    if choices.contains(&DEFAULT_TERM_MONTHS) {
        DEFAULT_TERM_MONTHS
    } else {
        choices.last().copied().unwrap_or(credit.max_term_months)
    }
}

fn page(
    state: &AppState,
    form: CreditForm,
    vehicle_title: Option<String>,
    result: Option<CreditResult>,
    error: Option<String>,
) -> CreditTemplate {
    let credit = state.config().credit;
    CreditTemplate {
        site: SiteView::of(state),
        current_path: "/credit".to_string(),
        terms: term_options(credit, &form.term_months),
        rate_label: credit.rate_label(),
        form,
        vehicle_title,
        result,
        error,
    }
}

/// Display the simulator, with the price prefilled from a vehicle.
///
/// GET /credit
#[instrument(skip(state))]
pub async fn show(State(state): State<AppState>, Query(query): Query<VehicleRef>) -> CreditTemplate {
    let credit = state.config().credit;
    let mut form = CreditForm {
        term_months: default_term(credit).to_string(),
        ..CreditForm::default()
    };

    let mut title = None;
    if let Some(id) = query.vehicle {
        match state.catalog().vehicle(id).await {
            Ok(Some(vehicle)) => {
                form.vehicle_id = id.to_string();
                form.price = vehicle.price.normalize().to_string();
                title = Some(vehicle.title());
            }
            Ok(None) => {}
            Err(e) => warn!(error = %e, vehicle_id = %id, "Could not load vehicle for credit"),
        }
    }

    page(&state, form, title, None, None)
}

/// Compute a payment and record the simulation.
///
/// POST /credit
#[instrument(skip_all)]
pub async fn simulate(State(state): State<AppState>, Form(form): Form<CreditForm>) -> Response {
    let credit = state.config().credit;
    let request = form.parse(credit);
    let title = vehicle_title(
        &state,
        request.as_ref().ok().and_then(|r| r.vehicle_id),
    )
    .await;

    let request = match request {
        Ok(request) => request,
        Err(message) => {
            return (
                StatusCode::UNPROCESSABLE_ENTITY,
                page(&state, form, title, None, Some(message)),
            )
                .into_response();
        }
    };

    let (Some(monthly), Some(total)) = (request.terms.monthly_payment(), request.terms.total_paid())
    else {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            page(
                &state,
                form,
                title,
                None,
                Some("These terms cannot be financed. Try a smaller amount or a shorter term.".to_string()),
            ),
        )
            .into_response();
    };

    let saved = match state
        .backend()
        .submit_credit_simulation(&request.to_input(monthly))
        .await
    {
        Ok(_) => {
            add_breadcrumb("lead", "Submitted credit simulation", None);
            info!(
                term_months = request.terms.term_months,
                vehicle_id = ?request.vehicle_id,
                "Credit simulation recorded"
            );
            true
        }
        Err(e) => {
            error!(error = %e, "Failed to record credit simulation");
            false
        }
    };

    let result = CreditResult {
        monthly_payment: money(&state, monthly),
        principal: money(&state, request.terms.principal()),
        total_paid: money(&state, total),
        term_months: request.terms.term_months,
        saved,
    };
    page(&state, form, title, Some(result), None).into_response()
}
