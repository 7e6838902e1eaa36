//! Leads route handlers: contact requests and credit simulations.

use askama::Template;
use axum::{
    Form, Router,
    extract::{Path, Query, State},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use serde::Deserialize;
use tracing::instrument;

use showroom_core::{Contact, ContactId, CreditSimulation, CreditSimulationId, LeadStatus};

use crate::{
    components::{DataTableConfig, ListQuery, data_table::contacts_table_config},
    error::AppError,
    filters,
    middleware::RequireAdmin,
    services::Flash,
    state::AppState,
};

use super::{dashboard::AdminUserView, date_label, done, load, render, settle};

const LIST_PATH: &str = "/admin/leads";

/// Contact view for the leads page.
#[derive(Debug, Clone)]
pub struct ContactRow {
    pub id: ContactId,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub message: String,
    pub vehicle: Option<String>,
    pub received: String,
    pub status: &'static str,
}

impl From<&Contact> for ContactRow {
    fn from(contact: &Contact) -> Self {
        Self {
            id: contact.id,
            name: contact.name.clone(),
            email: contact.email.clone(),
            phone: contact.phone.clone().unwrap_or_default(),
            message: contact.message.clone(),
            vehicle: contact.vehicle_id.map(|id| id.to_string()),
            received: date_label(contact.created_at),
            status: contact.status.as_str(),
        }
    }
}

/// Credit simulation view for the leads page.
#[derive(Debug, Clone)]
pub struct SimulationRow {
    pub id: CreditSimulationId,
    pub name: String,
    pub email: String,
    pub vehicle: Option<String>,
    pub price: String,
    pub down_payment: String,
    pub term_months: u32,
    pub monthly_payment: String,
    pub received: String,
}

impl From<&CreditSimulation> for SimulationRow {
    fn from(sim: &CreditSimulation) -> Self {
        Self {
            id: sim.id,
            name: sim.name.clone(),
            email: sim.email.clone(),
            vehicle: sim.vehicle_id.map(|id| id.to_string()),
            price: format!("{:.2}", sim.price),
            down_payment: format!("{:.2}", sim.down_payment),
            term_months: sim.term_months,
            monthly_payment: format!("{:.2}", sim.monthly_payment),
            received: date_label(sim.created_at),
        }
    }
}

/// Status change form.
#[derive(Debug, Deserialize)]
pub struct StatusForm {
    pub status: String,
}

/// Status choice for the per-row select.
#[derive(Debug, Clone)]
pub struct StatusChoice {
    pub value: &'static str,
    pub label: &'static str,
}

/// Leads page template.
#[derive(Template)]
#[template(path = "leads/index.html")]
pub struct LeadsTemplate {
    pub admin_user: AdminUserView,
    pub current_path: String,
    pub flash: Option<Flash>,
    pub table: DataTableConfig,
    pub query: ListQuery,
    pub contacts: Vec<ContactRow>,
    pub simulations: Vec<SimulationRow>,
    pub statuses: Vec<StatusChoice>,
    pub error: Option<String>,
}

/// Build the leads router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/admin/leads", get(index))
        .route("/admin/leads/contacts/{id}/status", post(update_status))
        .route("/admin/leads/contacts/{id}/delete", post(delete_contact))
        .route("/admin/leads/simulations/{id}/delete", post(delete_simulation))
}

fn filter_contacts(contacts: &[Contact], query: &ListQuery) -> Vec<ContactRow> {
    let needle = query.needle();
    let status = query.status_as::<LeadStatus>();
    let mut rows: Vec<&Contact> = contacts
        .iter()
        .filter(|c| {
            needle.is_empty()
                || c.name.to_lowercase().contains(&needle)
                || c.email.to_lowercase().contains(&needle)
                || c.message.to_lowercase().contains(&needle)
        })
        .filter(|c| status.is_none_or(|s| c.status == s))
        .collect();
    rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    rows.into_iter().map(ContactRow::from).collect()
}

/// Leads page handler.
///
/// GET /admin/leads
#[instrument(skip(ctx, state))]
pub async fn index(
    RequireAdmin(ctx): RequireAdmin,
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Html<String>, Response> {
    let queries = ctx.queries(&state);
    let (contacts, contacts_error) = load(&ctx, queries.list::<Contact>().await).await?;
    let (mut simulations, simulations_error) =
        load(&ctx, queries.list::<CreditSimulation>().await).await?;
    simulations.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    let template = LeadsTemplate {
        admin_user: AdminUserView::from(&ctx),
        current_path: LIST_PATH.to_string(),
        flash: Flash::take(ctx.store.session()).await,
        table: contacts_table_config(),
        contacts: filter_contacts(&contacts, &query),
        simulations: simulations.iter().map(SimulationRow::from).collect(),
        statuses: LeadStatus::ALL
            .iter()
            .map(|s| StatusChoice {
                value: s.as_str(),
                label: s.label(),
            })
            .collect(),
        query,
        error: contacts_error.or(simulations_error),
    };

    Ok(render(&template))
}

/// POST /admin/leads/contacts/{id}/status
#[instrument(skip(ctx, state, form))]
pub async fn update_status(
    RequireAdmin(ctx): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<ContactId>,
    Form(form): Form<StatusForm>,
) -> Result<Response, Response> {
    let status = form
        .status
        .parse::<LeadStatus>()
        .map_err(|e| AppError::BadRequest(e.to_string()).into_response())?;

    settle(
        &ctx,
        ctx.queries(&state).update_contact_status(id, status).await,
        LIST_PATH,
    )
    .await?;
    tracing::info!(contact_id = %id, status = status.as_str(), "Lead status updated");
    Ok(done(&ctx, &format!("Lead marked {}.", status.label().to_lowercase()), LIST_PATH).await)
}

/// POST /admin/leads/contacts/{id}/delete
#[instrument(skip(ctx, state))]
pub async fn delete_contact(
    RequireAdmin(ctx): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<ContactId>,
) -> Result<Response, Response> {
    settle(&ctx, ctx.queries(&state).delete::<Contact>(id).await, LIST_PATH).await?;
    tracing::info!(contact_id = %id, "Contact deleted");
    Ok(done(&ctx, "Contact deleted.", LIST_PATH).await)
}

/// POST /admin/leads/simulations/{id}/delete
#[instrument(skip(ctx, state))]
pub async fn delete_simulation(
    RequireAdmin(ctx): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<CreditSimulationId>,
) -> Result<Response, Response> {
    settle(
        &ctx,
        ctx.queries(&state).delete::<CreditSimulation>(id).await,
        LIST_PATH,
    )
    .await?;
    tracing::info!(simulation_id = %id, "Credit simulation deleted");
    Ok(done(&ctx, "Simulation deleted.", LIST_PATH).await)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn contact(id: u64, name: &str, status: LeadStatus, day: u32) -> Contact {
        Contact {
            id: ContactId::new(id),
            name: name.to_string(),
            email: format!("{}@example.com", name.to_lowercase()),
            phone: None,
            message: "Is it still available?".to_string(),
            vehicle_id: None,
            status,
            created_at: Utc.with_ymd_and_hms(2026, 3, day, 10, 0, 0).single(),
        }
    }

    #[test]
    fn test_filter_contacts_newest_first_by_status() {
        let contacts = vec![
            contact(1, "Ana", LeadStatus::New, 1),
            contact(2, "Bruno", LeadStatus::Contacted, 2),
            contact(3, "Carla", LeadStatus::New, 3),
        ];

        let all = filter_contacts(&contacts, &ListQuery::default());
        assert_eq!(all[0].name, "Carla");
        assert_eq!(all.len(), 3);

        let query = ListQuery {
            q: None,
            status: Some("new".to_string()),
        };
        let fresh = filter_contacts(&contacts, &query);
        assert_eq!(fresh.len(), 2);
        assert!(fresh.iter().all(|r| r.status == "new"));

        let query = ListQuery {
            q: Some("bruno@".to_string()),
            status: None,
        };
        assert_eq!(filter_contacts(&contacts, &query)[0].id, ContactId::new(2));
    }
}
