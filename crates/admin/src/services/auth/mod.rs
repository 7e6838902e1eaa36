//! Admin session lifecycle.
//!
//! Every guarded request resolves the stored session into an [`AuthState`].
//! In normal mode a stored session is checked against the backend with a
//! privileged read before it is trusted. In bypass mode (local debugging only,
//! see [`crate::config::resolve_bypass`]) a stored session is adopted as-is and
//! a missing one is provisioned with fixed credentials.

mod error;

pub use error::LoginError;

use secrecy::{ExposeSecret, SecretString};
use tracing::{error, info, instrument, warn};

use showroom_backend::BackendClient;
use showroom_core::{AdminSession, Email};

use crate::services::SessionStore;

/// Credentials used by the bypass to provision sessions.
#[derive(Clone)]
pub struct BypassCredentials {
    pub email: String,
    pub password: SecretString,
}

impl std::fmt::Debug for BypassCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BypassCredentials")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// How guarded requests are authenticated.
#[derive(Debug, Clone, Default)]
pub enum AuthMode {
    /// Sessions come from the login form and are validated on every request.
    #[default]
    Normal,
    /// Every visitor is signed in with fixed credentials.
    Bypass(BypassCredentials),
}

impl AuthMode {
    #[must_use]
    pub const fn is_bypass(&self) -> bool {
        matches!(self, Self::Bypass(_))
    }
}

/// Outcome of resolving the stored session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthState {
    /// The backend is not ready, so the session cannot be settled yet.
    Validating,
    Authenticated(AdminSession),
    Unauthenticated,
}

/// Session lifecycle operations for one request.
pub struct AdminAuthService<'a> {
    backend: &'a BackendClient,
    mode: &'a AuthMode,
    store: &'a SessionStore,
}

impl<'a> AdminAuthService<'a> {
    #[must_use]
    pub const fn new(backend: &'a BackendClient, mode: &'a AuthMode, store: &'a SessionStore) -> Self {
        Self {
            backend,
            mode,
            store,
        }
    }

    /// Settle the stored session into an [`AuthState`].
    pub async fn resolve(&self) -> AuthState {
        match self.mode {
            AuthMode::Bypass(credentials) => self.resolve_bypass(credentials).await,
            AuthMode::Normal => self.resolve_normal().await,
        }
    }

    async fn resolve_normal(&self) -> AuthState {
        let Some(session) = self.store.get().await else {
            return AuthState::Unauthenticated;
        };
        if !self.backend.is_ready() {
            return AuthState::Validating;
        }

        match self.backend.session_probe(session.token()).await {
            Ok(true) => AuthState::Authenticated(session),
            Ok(false) => {
                info!("Stored admin session expired");
                self.store.clear().await;
                AuthState::Unauthenticated
            }
            Err(e) => {
                warn!(error = %e, "Admin session probe failed");
                self.store.clear().await;
                AuthState::Unauthenticated
            }
        }
    }

    async fn resolve_bypass(&self, credentials: &BypassCredentials) -> AuthState {
        // Stored sessions are not re-validated in bypass mode.
        if let Some(session) = self.store.get().await {
            return AuthState::Authenticated(session);
        }
        if !self.backend.is_ready() {
            return AuthState::Validating;
        }

        match self
            .backend
            .admin_login(&credentials.email, credentials.password.expose_secret())
            .await
        {
            Ok(Some(session)) => {
                warn!(
                    email = %credentials.email,
                    role = session.role(),
                    "AUTH BYPASS: provisioned admin session without user credentials"
                );
                self.store.set(&session).await;
                AuthState::Authenticated(session)
            }
            Ok(None) => {
                error!(email = %credentials.email, "AUTH BYPASS: backend rejected bypass credentials");
                AuthState::Unauthenticated
            }
            Err(e) => {
                error!(error = %e, "AUTH BYPASS: login failed");
                AuthState::Unauthenticated
            }
        }
    }

    /// Sign in and persist the session.
    ///
    /// # Errors
    ///
    /// Returns `LoginError::InvalidCredentials` for a malformed email or a
    /// refused login, `ConnectionNotReady` before the backend is reachable,
    /// and `Backend` for transport failures.
    #[instrument(skip(self, password), fields(email = %email))]
    pub async fn login(&self, email: &str, password: &str) -> Result<AdminSession, LoginError> {
        let email = Email::parse(email).map_err(|_| LoginError::InvalidCredentials)?;
        if !self.backend.is_ready() {
            return Err(LoginError::ConnectionNotReady);
        }

        let session = self
            .backend
            .admin_login(email.as_str(), password)
            .await?
            .ok_or(LoginError::InvalidCredentials)?;

        self.store.set(&session).await;
        info!(role = session.role(), "Admin signed in");
        Ok(session)
    }

    /// Sign out. The backend call is best effort; the local session is
    /// always cleared.
    #[instrument(skip(self))]
    pub async fn logout(&self) {
        if let Some(session) = self.store.get().await
            && self.backend.is_ready()
            && let Err(e) = self.backend.admin_logout(session.token()).await
        {
            warn!(error = %e, "Backend logout failed");
        }
        self.store.clear().await;
        info!("Admin signed out");
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::test_support::{backend_for, memory_store, ready_backend};
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn bypass() -> AuthMode {
        AuthMode::Bypass(BypassCredentials {
            email: "debug@dealer.test".to_string(),
            password: SecretString::from("pw"),
        })
    }

    fn sample() -> AdminSession {
        AdminSession::new("T1", "R1").unwrap()
    }

    async fn mount_login(server: &MockServer, result: serde_json::Value) {
        Mock::given(method("POST"))
            .and(path("/rpc/adminLogin"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "result": result })))
            .mount(server)
            .await;
    }

    async fn mount_probe(server: &MockServer, result: serde_json::Value) {
        Mock::given(method("POST"))
            .and(path("/rpc/getContacts"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "result": result })))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_normal_without_session_is_unauthenticated() {
        let server = MockServer::start().await;
        let backend = backend_for(&server);
        let store = memory_store();
        let mode = AuthMode::Normal;

        let state = AdminAuthService::new(&backend, &mode, &store).resolve().await;
        assert_eq!(state, AuthState::Unauthenticated);
    }

    #[tokio::test]
    async fn test_normal_waits_for_backend() {
        let server = MockServer::start().await;
        let backend = backend_for(&server);
        let store = memory_store();
        store.set(&sample()).await;
        let mode = AuthMode::Normal;

        let state = AdminAuthService::new(&backend, &mode, &store).resolve().await;
        assert_eq!(state, AuthState::Validating);
        assert_eq!(store.get().await, Some(sample()));
    }

    #[tokio::test]
    async fn test_normal_valid_probe_authenticates() {
        let server = MockServer::start().await;
        let backend = ready_backend(&server).await;
        mount_probe(&server, json!([])).await;
        let store = memory_store();
        store.set(&sample()).await;
        let mode = AuthMode::Normal;

        let state = AdminAuthService::new(&backend, &mode, &store).resolve().await;
        assert_eq!(state, AuthState::Authenticated(sample()));
    }

    #[tokio::test]
    async fn test_normal_null_probe_clears_session() {
        let server = MockServer::start().await;
        let backend = ready_backend(&server).await;
        mount_probe(&server, json!(null)).await;
        let store = memory_store();
        store.set(&sample()).await;
        let mode = AuthMode::Normal;

        let state = AdminAuthService::new(&backend, &mode, &store).resolve().await;
        assert_eq!(state, AuthState::Unauthenticated);
        assert!(store.get().await.is_none());
    }

    #[tokio::test]
    async fn test_normal_probe_error_clears_session() {
        let server = MockServer::start().await;
        let backend = ready_backend(&server).await;
        Mock::given(method("POST"))
            .and(path("/rpc/getContacts"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;
        let store = memory_store();
        store.set(&sample()).await;
        let mode = AuthMode::Normal;

        let state = AdminAuthService::new(&backend, &mode, &store).resolve().await;
        assert_eq!(state, AuthState::Unauthenticated);
        assert!(store.get().await.is_none());
    }

    #[tokio::test]
    async fn test_bypass_adopts_stored_session_without_probe() {
        let server = MockServer::start().await;
        let backend = ready_backend(&server).await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(&server)
            .await;
        let store = memory_store();
        store.set(&sample()).await;
        let mode = bypass();

        let state = AdminAuthService::new(&backend, &mode, &store).resolve().await;
        assert_eq!(state, AuthState::Authenticated(sample()));
    }

    #[tokio::test]
    async fn test_bypass_waits_for_backend() {
        let server = MockServer::start().await;
        let backend = backend_for(&server);
        let store = memory_store();
        let mode = bypass();

        let state = AdminAuthService::new(&backend, &mode, &store).resolve().await;
        assert_eq!(state, AuthState::Validating);
    }

    #[tokio::test]
    async fn test_bypass_provisions_session() {
        let server = MockServer::start().await;
        let backend = ready_backend(&server).await;
        Mock::given(method("POST"))
            .and(path("/rpc/adminLogin"))
            .and(body_json(json!({"email": "debug@dealer.test", "password": "pw"})))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"result": {"token": "T1", "role": "R1"}})),
            )
            .expect(1)
            .mount(&server)
            .await;
        let store = memory_store();
        let mode = bypass();

        let state = AdminAuthService::new(&backend, &mode, &store).resolve().await;
        assert_eq!(state, AuthState::Authenticated(sample()));
        assert_eq!(store.get().await, Some(sample()));
    }

    #[tokio::test]
    async fn test_bypass_rejected_is_unauthenticated() {
        let server = MockServer::start().await;
        let backend = ready_backend(&server).await;
        mount_login(&server, json!(null)).await;
        let store = memory_store();
        let mode = bypass();

        let state = AdminAuthService::new(&backend, &mode, &store).resolve().await;
        assert_eq!(state, AuthState::Unauthenticated);
    }

    #[tokio::test]
    async fn test_login_persists_session() {
        let server = MockServer::start().await;
        let backend = ready_backend(&server).await;
        mount_login(&server, json!({"token": "T1", "role": "R1"})).await;
        let store = memory_store();
        let mode = AuthMode::Normal;

        let session = AdminAuthService::new(&backend, &mode, &store)
            .login("Staff@Dealer.com", "pw")
            .await
            .unwrap();
        assert_eq!(session, sample());
        assert_eq!(store.get().await, Some(sample()));
    }

    #[tokio::test]
    async fn test_login_refused() {
        let server = MockServer::start().await;
        let backend = ready_backend(&server).await;
        mount_login(&server, json!(null)).await;
        let store = memory_store();
        let mode = AuthMode::Normal;

        let err = AdminAuthService::new(&backend, &mode, &store)
            .login("staff@dealer.com", "wrong")
            .await
            .unwrap_err();
        assert!(matches!(err, LoginError::InvalidCredentials));
        assert_eq!(err.user_message(), "Invalid email or password.");
        assert!(store.get().await.is_none());
    }

    #[tokio::test]
    async fn test_login_rejects_malformed_email_without_network() {
        let server = MockServer::start().await;
        let backend = ready_backend(&server).await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;
        let store = memory_store();
        let mode = AuthMode::Normal;

        let err = AdminAuthService::new(&backend, &mode, &store)
            .login("not-an-email", "pw")
            .await
            .unwrap_err();
        assert!(matches!(err, LoginError::InvalidCredentials));
    }

    #[tokio::test]
    async fn test_login_before_ready() {
        let server = MockServer::start().await;
        let backend = backend_for(&server);
        let store = memory_store();
        let mode = AuthMode::Normal;

        let err = AdminAuthService::new(&backend, &mode, &store)
            .login("staff@dealer.com", "pw")
            .await
            .unwrap_err();
        assert!(matches!(err, LoginError::ConnectionNotReady));
    }

    #[tokio::test]
    async fn test_logout_swallows_backend_errors() {
        let server = MockServer::start().await;
        let backend = ready_backend(&server).await;
        Mock::given(method("POST"))
            .and(path("/rpc/adminLogout"))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&server)
            .await;
        let store = memory_store();
        store.set(&sample()).await;
        let mode = AuthMode::Normal;

        AdminAuthService::new(&backend, &mode, &store).logout().await;
        assert!(store.get().await.is_none());
    }
}
