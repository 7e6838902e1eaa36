//! Helpers shared by the unit tests of this crate.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use tower_sessions::{MemoryStore, Session};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use showroom_backend::{BackendClient, BackendConfig};

use crate::middleware::cookies::SessionCookies;
use crate::services::SessionStore;

/// A backend client pointed at `server`, not yet probed.
pub fn backend_for(server: &MockServer) -> BackendClient {
    BackendClient::new(&BackendConfig {
        url: server.uri(),
        service_key: None,
    })
    .unwrap()
}

/// A backend client pointed at `server` that has passed its health check.
pub async fn ready_backend(server: &MockServer) -> BackendClient {
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(200))
        .mount(server)
        .await;
    let backend = backend_for(server);
    backend.probe().await.unwrap();
    backend
}

/// A session store backed by memory with no incoming cookies.
pub fn memory_store() -> SessionStore {
    let session = Session::new(None, Arc::new(MemoryStore::default()), None);
    SessionStore::new(session, SessionCookies::default(), false)
}
