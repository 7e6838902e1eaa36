//! Persistence of the admin session across the tower session and a mirror cookie.
//!
//! The canonical record lives under a single key in the tower session. A
//! mirror cookie carries the same record so that a client whose server-side
//! session has expired can still be recognised. Older clients stored token and
//! role under two separate keys.
//!
//! Promotion of those fallbacks into the canonical key is a one-time
//! [`SessionStore::migrate`] step, stamped with a schema version, rather than
//! something every read repeats. Storage problems never leave this module:
//! malformed data reads as "no session" and write failures are logged.

use axum::{extract::FromRequestParts, http::StatusCode, http::request::Parts};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use tower_sessions::Session;
use tower_sessions::cookie::time::Duration;
use tower_sessions::cookie::{Cookie, SameSite};
use tracing::{debug, warn};

use showroom_core::AdminSession;

use crate::middleware::cookies::SessionCookies;
use crate::models::{SESSION_SCHEMA_VERSION, cookie_names, session_keys};
use crate::models::session::MIRROR_COOKIE_MAX_AGE_SECS;

/// Request-scoped access to the stored admin session.
#[derive(Clone, Debug)]
pub struct SessionStore {
    session: Session,
    cookies: SessionCookies,
    secure_cookies: bool,
}

impl SessionStore {
    /// Wrap the request's tower session and cookie jar.
    #[must_use]
    pub const fn new(session: Session, cookies: SessionCookies, secure_cookies: bool) -> Self {
        Self {
            session,
            cookies,
            secure_cookies,
        }
    }

    /// The underlying tower session (used for flash messages).
    #[must_use]
    pub const fn session(&self) -> &Session {
        &self.session
    }

    /// Read the stored session, running [`Self::migrate`] first.
    pub async fn get(&self) -> Option<AdminSession> {
        self.migrate().await;
        self.read_primary().await
    }

    /// Persist a session to the canonical key and the mirror cookie, and
    /// delete every legacy key and cookie.
    pub async fn set(&self, admin: &AdminSession) {
        if let Err(e) = self.session.insert(session_keys::ADMIN_SESSION, admin).await {
            warn!(error = %e, "Failed to write admin session");
        }
        self.remove_legacy_keys().await;

        match serde_json::to_vec(admin) {
            Ok(json) => self.cookies.add(self.mirror_cookie(URL_SAFE_NO_PAD.encode(json))),
            Err(e) => warn!(error = %e, "Failed to encode admin session cookie"),
        }
        self.remove_legacy_cookies();
    }

    /// Delete the canonical key, the mirror cookie and every legacy key and cookie.
    pub async fn clear(&self) {
        if let Err(e) = self
            .session
            .remove::<serde_json::Value>(session_keys::ADMIN_SESSION)
            .await
        {
            warn!(error = %e, "Failed to remove admin session");
        }
        self.remove_legacy_keys().await;
        self.cookies.remove(cookie_names::ADMIN_SESSION, "/");
        self.remove_legacy_cookies();
    }

    /// Promote legacy keys or the mirror cookie into the canonical key.
    ///
    /// Runs once per client session; later calls see the version stamp and
    /// return immediately. Legacy keys are always deleted.
    pub async fn migrate(&self) {
        let version = match self.session.get::<u32>(session_keys::SCHEMA_VERSION).await {
            Ok(version) => version.unwrap_or(0),
            Err(e) => {
                warn!(error = %e, "Unreadable session schema version");
                0
            }
        };
        if version >= SESSION_SCHEMA_VERSION {
            return;
        }

        if self.read_primary().await.is_none() {
            if let Some(admin) = self.read_legacy().await {
                debug!("Promoting legacy admin session keys");
                self.set(&admin).await;
            } else if let Some(admin) = self.read_cookie() {
                debug!("Promoting admin session cookie");
                self.set(&admin).await;
            }
        }
        self.remove_legacy_keys().await;

        if let Err(e) = self
            .session
            .insert(session_keys::SCHEMA_VERSION, SESSION_SCHEMA_VERSION)
            .await
        {
            warn!(error = %e, "Failed to stamp session schema version");
        }
    }

    async fn read_primary(&self) -> Option<AdminSession> {
        match self
            .session
            .get::<AdminSession>(session_keys::ADMIN_SESSION)
            .await
        {
            Ok(admin) => admin,
            Err(e) => {
                warn!(error = %e, "Ignoring malformed stored admin session");
                None
            }
        }
    }

    async fn read_legacy(&self) -> Option<AdminSession> {
        let token = self.read_string(session_keys::LEGACY_TOKEN).await?;
        let role = self.read_string(session_keys::LEGACY_ROLE).await?;
        AdminSession::new(token, role)
    }

    async fn read_string(&self, key: &str) -> Option<String> {
        match self.session.get::<String>(key).await {
            Ok(value) => value,
            Err(e) => {
                warn!(key, error = %e, "Ignoring malformed legacy session value");
                None
            }
        }
    }

    fn read_cookie(&self) -> Option<AdminSession> {
        let raw = self.cookies.get(cookie_names::ADMIN_SESSION)?;
        let decoded = URL_SAFE_NO_PAD
            .decode(raw.as_bytes())
            .map_err(|e| warn!(error = %e, "Ignoring undecodable admin session cookie"))
            .ok()?;
        serde_json::from_slice::<AdminSession>(&decoded)
            .map_err(|e| warn!(error = %e, "Ignoring malformed admin session cookie"))
            .ok()
    }

    async fn remove_legacy_keys(&self) {
        for key in [session_keys::LEGACY_TOKEN, session_keys::LEGACY_ROLE] {
            if let Err(e) = self.session.remove::<serde_json::Value>(key).await {
                warn!(key, error = %e, "Failed to remove legacy session key");
            }
        }
    }

    fn remove_legacy_cookies(&self) {
        for name in cookie_names::LEGACY {
            self.cookies.remove(name, "/");
        }
    }

    fn mirror_cookie(&self, value: String) -> Cookie<'static> {
        Cookie::build((cookie_names::ADMIN_SESSION, value))
            .path("/")
            .max_age(Duration::seconds(MIRROR_COOKIE_MAX_AGE_SECS))
            .same_site(SameSite::Strict)
            .http_only(true)
            .secure(self.secure_cookies)
            .build()
    }
}

impl FromRequestParts<crate::state::AppState> for SessionStore {
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(
        parts: &mut Parts,
        state: &crate::state::AppState,
    ) -> Result<Self, Self::Rejection> {
        let session = parts
            .extensions
            .get::<Session>()
            .cloned()
            .ok_or((StatusCode::INTERNAL_SERVER_ERROR, "Session layer missing"))?;
        let cookies = parts
            .extensions
            .get::<SessionCookies>()
            .cloned()
            .ok_or((StatusCode::INTERNAL_SERVER_ERROR, "Cookie layer missing"))?;
        Ok(Self::new(session, cookies, state.config().secure_cookies()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tower_sessions::MemoryStore;

    fn store_with_cookies(header: &str) -> SessionStore {
        let session = Session::new(None, Arc::new(MemoryStore::default()), None);
        SessionStore::new(session, SessionCookies::from_header(header), false)
    }

    fn sample() -> AdminSession {
        AdminSession::new("T1", "R1").unwrap()
    }

    fn cookie_value(admin: &AdminSession) -> String {
        URL_SAFE_NO_PAD.encode(serde_json::to_vec(admin).unwrap())
    }

    #[tokio::test]
    async fn test_malformed_primary_reads_as_absent() {
        let malformed = [
            serde_json::json!("garbage"),
            serde_json::json!(42),
            serde_json::json!({"token": "T1"}),
            serde_json::json!({"role": "R1"}),
            serde_json::json!({"token": "", "role": "R1"}),
            serde_json::json!({"token": ["T1"], "role": "R1"}),
            serde_json::json!(null),
        ];
        for value in malformed {
            let store = store_with_cookies("");
            store
                .session()
                .insert(session_keys::ADMIN_SESSION, value.clone())
                .await
                .unwrap();
            assert!(store.get().await.is_none(), "value {value} should read as absent");
        }
    }

    #[tokio::test]
    async fn test_set_then_get_round_trips_without_legacy_keys() {
        let store = store_with_cookies("adminToken=old; adminRole=old");
        store
            .session()
            .insert(session_keys::LEGACY_TOKEN, "old")
            .await
            .unwrap();

        store.set(&sample()).await;

        assert_eq!(store.get().await, Some(sample()));
        let session = store.session();
        assert!(session.get::<String>(session_keys::LEGACY_TOKEN).await.unwrap().is_none());
        assert!(session.get::<String>(session_keys::LEGACY_ROLE).await.unwrap().is_none());

        let headers = store.cookies.set_cookie_headers();
        let mirror = headers
            .iter()
            .find(|h| h.starts_with("admin_session="))
            .unwrap();
        assert!(mirror.contains("Path=/"));
        assert!(mirror.contains("Max-Age=86400"));
        assert!(mirror.contains("SameSite=Strict"));
        assert!(mirror.contains("HttpOnly"));
        assert!(headers.iter().any(|h| h.starts_with("adminToken=") && h.contains("Max-Age=0")));
        assert!(headers.iter().any(|h| h.starts_with("adminRole=") && h.contains("Max-Age=0")));
    }

    #[tokio::test]
    async fn test_legacy_keys_are_migrated() {
        let store = store_with_cookies("");
        let session = store.session();
        session.insert(session_keys::LEGACY_TOKEN, "T1").await.unwrap();
        session.insert(session_keys::LEGACY_ROLE, "R1").await.unwrap();

        assert_eq!(store.get().await, Some(sample()));
        assert!(session.get::<String>(session_keys::LEGACY_TOKEN).await.unwrap().is_none());
        assert!(session.get::<String>(session_keys::LEGACY_ROLE).await.unwrap().is_none());
        assert_eq!(
            session
                .get::<AdminSession>(session_keys::ADMIN_SESSION)
                .await
                .unwrap(),
            Some(sample())
        );
        assert_eq!(
            session.get::<u32>(session_keys::SCHEMA_VERSION).await.unwrap(),
            Some(SESSION_SCHEMA_VERSION)
        );
    }

    #[tokio::test]
    async fn test_half_legacy_session_is_absent_and_removed() {
        let store = store_with_cookies("");
        let session = store.session();
        session.insert(session_keys::LEGACY_TOKEN, "T1").await.unwrap();

        assert!(store.get().await.is_none());
        assert!(session.get::<String>(session_keys::LEGACY_TOKEN).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_cookie_only_session_is_migrated() {
        let header = format!("admin_session={}", cookie_value(&sample()));
        let store = store_with_cookies(&header);

        assert_eq!(store.get().await, Some(sample()));
        assert_eq!(
            store
                .session()
                .get::<AdminSession>(session_keys::ADMIN_SESSION)
                .await
                .unwrap(),
            Some(sample())
        );
    }

    #[tokio::test]
    async fn test_malformed_cookie_is_absent() {
        let store = store_with_cookies("admin_session=%%%not-base64");
        assert!(store.get().await.is_none());

        let half = URL_SAFE_NO_PAD.encode(br#"{"token":"T1"}"#);
        let store = store_with_cookies(&format!("admin_session={half}"));
        assert!(store.get().await.is_none());
    }

    #[tokio::test]
    async fn test_migration_runs_once() {
        let store = store_with_cookies("");
        assert!(store.get().await.is_none());

        // Keys written after the stamp are not promoted.
        let session = store.session();
        session.insert(session_keys::LEGACY_TOKEN, "T1").await.unwrap();
        session.insert(session_keys::LEGACY_ROLE, "R1").await.unwrap();
        assert!(store.get().await.is_none());
    }

    #[tokio::test]
    async fn test_clear_removes_everything() {
        let header = format!("admin_session={}", cookie_value(&sample()));
        let store = store_with_cookies(&header);
        store.set(&sample()).await;

        store.clear().await;

        assert!(store.get().await.is_none());
        assert!(store.cookies.get(cookie_names::ADMIN_SESSION).is_none());
        let headers = store.cookies.set_cookie_headers();
        assert!(
            headers
                .iter()
                .any(|h| h.starts_with("admin_session=") && h.contains("Max-Age=0"))
        );
    }
}
