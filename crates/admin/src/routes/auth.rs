//! Authentication route handlers for admin.
//!
//! Provides the login form, its submission, and logout. These are the only
//! admin pages without the route guard.

use askama::Template;
use axum::{
    Form, Router,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
};
use serde::Deserialize;
use tracing::instrument;

use crate::{
    filters,
    services::{AdminAuthService, Flash, LoginError, SessionStore},
    state::AppState,
};

use super::render;

/// Login page template.
#[derive(Template)]
#[template(path = "auth/login.html")]
pub struct LoginPageTemplate {
    pub email: String,
    pub error: Option<String>,
    pub expired: bool,
    pub flash: Option<Flash>,
}

/// Query string of the login page.
#[derive(Debug, Default, Deserialize)]
pub struct LoginQuery {
    #[serde(default)]
    pub expired: Option<String>,
}

/// Login form fields.
#[derive(Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

/// Build the auth router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/admin/login", get(login_page).post(login))
        .route("/admin/logout", post(logout))
}

/// Render the login page.
///
/// GET /admin/login
#[instrument(skip_all)]
async fn login_page(store: SessionStore, Query(query): Query<LoginQuery>) -> Response {
    if store.get().await.is_some() {
        return Redirect::to("/admin").into_response();
    }

    let template = LoginPageTemplate {
        email: String::new(),
        error: None,
        expired: query.expired.is_some(),
        flash: Flash::take(store.session()).await,
    };
    render(&template).into_response()
}

/// Submit credentials.
///
/// POST /admin/login
#[instrument(skip_all)]
async fn login(
    State(state): State<AppState>,
    store: SessionStore,
    Form(form): Form<LoginForm>,
) -> Response {
    let auth = AdminAuthService::new(state.backend(), state.auth_mode(), &store);

    match auth.login(form.email.trim(), &form.password).await {
        Ok(_) => {
            Flash::success("Signed in.").push(store.session()).await;
            Redirect::to("/admin").into_response()
        }
        Err(err) => {
            let status = match &err {
                LoginError::InvalidCredentials => StatusCode::UNAUTHORIZED,
                LoginError::ConnectionNotReady => StatusCode::SERVICE_UNAVAILABLE,
                LoginError::Backend(e) => {
                    tracing::error!(error = %e, "Admin login failed");
                    StatusCode::BAD_GATEWAY
                }
            };
            let template = LoginPageTemplate {
                email: form.email,
                error: Some(err.user_message()),
                expired: false,
                flash: None,
            };
            (status, render(&template)).into_response()
        }
    }
}

/// Logout and clear the session.
///
/// POST /admin/logout
#[instrument(skip_all)]
async fn logout(State(state): State<AppState>, store: SessionStore) -> impl IntoResponse {
    AdminAuthService::new(state.backend(), state.auth_mode(), &store)
        .logout()
        .await;
    Flash::success("Signed out.").push(store.session()).await;
    Redirect::to("/admin/login")
}
