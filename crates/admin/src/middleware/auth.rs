//! Route guard for the admin area.
//!
//! [`RequireAdmin`] resolves the session lifecycle for the request and maps the
//! result through [`guard_outcome`]:
//!
//! | Mode   | State                              | Outcome        |
//! |--------|------------------------------------|----------------|
//! | any    | `Validating`                       | loading page   |
//! | normal | `Unauthenticated`                  | redirect       |
//! | normal | `Authenticated`, blank role        | access denied  |
//! | normal | `Authenticated`                    | render         |
//! | bypass | `Authenticated`/`Unauthenticated`  | render         |
//!
//! The last row is the bypass hazard: the handler runs even when nobody is
//! signed in.

use askama::Template;
use axum::{
    extract::FromRequestParts,
    http::{HeaderValue, StatusCode, header, request::Parts},
    response::{Html, IntoResponse, Redirect, Response},
};

use showroom_core::AdminSession;

use crate::error::set_sentry_role;
use crate::services::{AdminAuthService, AdminQueries, AuthMode, AuthState, SessionStore};
use crate::state::AppState;

/// Seconds before the loading page retries.
const LOADING_REFRESH_SECS: &str = "2";

/// Login route guarded pages redirect to.
pub const LOGIN_PATH: &str = "/admin/login";

/// Request context handed to guarded handlers.
#[derive(Debug, Clone)]
pub struct AdminContext {
    /// `None` only when bypass mode renders without a session.
    pub session: Option<AdminSession>,
    pub store: SessionStore,
    pub bypass: bool,
}

impl AdminContext {
    /// Query layer bound to this request's token.
    #[must_use]
    pub fn queries<'a>(&'a self, state: &'a AppState) -> AdminQueries<'a> {
        AdminQueries::new(
            state.backend(),
            state.cache(),
            self.session.as_ref().map(AdminSession::token),
        )
    }

    #[must_use]
    pub fn role(&self) -> &str {
        self.session.as_ref().map_or("", AdminSession::role)
    }
}

/// What the guard does with a resolved state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardOutcome {
    Loading,
    Redirect,
    AccessDenied,
    Render(Option<AdminSession>),
}

/// Map a mode and a resolved state to the guard's response.
#[must_use]
pub fn guard_outcome(mode: &AuthMode, state: AuthState) -> GuardOutcome {
    match (mode, state) {
        (_, AuthState::Validating) => GuardOutcome::Loading,
        (AuthMode::Bypass(_), AuthState::Authenticated(session)) => {
            GuardOutcome::Render(Some(session))
        }
        (AuthMode::Bypass(_), AuthState::Unauthenticated) => GuardOutcome::Render(None),
        (AuthMode::Normal, AuthState::Unauthenticated) => GuardOutcome::Redirect,
        (AuthMode::Normal, AuthState::Authenticated(session)) => {
            if session.role().trim().is_empty() {
                GuardOutcome::AccessDenied
            } else {
                GuardOutcome::Render(Some(session))
            }
        }
    }
}

#[derive(Template)]
#[template(path = "guard/loading.html")]
struct LoadingTemplate;

#[derive(Template)]
#[template(path = "guard/access_denied.html")]
struct AccessDeniedTemplate;

/// Extractor that runs the route guard.
///
/// # Example
///
/// ```rust,ignore
/// async fn dashboard(RequireAdmin(ctx): RequireAdmin) -> impl IntoResponse {
///     format!("Signed in as {}", ctx.role())
/// }
/// ```
pub struct RequireAdmin(pub AdminContext);

/// Response when the guard does not render the page.
#[derive(Debug)]
pub enum GuardRejection {
    /// The session layer did not run.
    MissingSession,
    Loading,
    RedirectToLogin,
    AccessDenied,
}

impl IntoResponse for GuardRejection {
    fn into_response(self) -> Response {
        match self {
            Self::MissingSession => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Session layer missing").into_response()
            }
            Self::Loading => {
                let body = LoadingTemplate
                    .render()
                    .unwrap_or_else(|_| String::from("Loading…"));
                let mut response = (StatusCode::SERVICE_UNAVAILABLE, Html(body)).into_response();
                response.headers_mut().insert(
                    header::REFRESH,
                    HeaderValue::from_static(LOADING_REFRESH_SECS),
                );
                response
            }
            Self::RedirectToLogin => Redirect::to(LOGIN_PATH).into_response(),
            Self::AccessDenied => {
                let body = AccessDeniedTemplate
                    .render()
                    .unwrap_or_else(|_| String::from("Access denied"));
                (StatusCode::FORBIDDEN, Html(body)).into_response()
            }
        }
    }
}

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = GuardRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let store = SessionStore::from_request_parts(parts, state)
            .await
            .map_err(|_| GuardRejection::MissingSession)?;

        let auth_state = AdminAuthService::new(state.backend(), state.auth_mode(), &store)
            .resolve()
            .await;

        match guard_outcome(state.auth_mode(), auth_state) {
            GuardOutcome::Loading => Err(GuardRejection::Loading),
            GuardOutcome::Redirect => Err(GuardRejection::RedirectToLogin),
            GuardOutcome::AccessDenied => Err(GuardRejection::AccessDenied),
            GuardOutcome::Render(session) => {
                if let Some(session) = &session {
                    set_sentry_role(session.role());
                    tracing::Span::current().record("admin_role", session.role());
                }
                Ok(Self(AdminContext {
                    session,
                    store,
                    bypass: state.auth_mode().is_bypass(),
                }))
            }
        }
    }
}
