//! Application state shared across handlers.

use std::sync::Arc;

use showroom_backend::{BackendClient, BackendError};
use sqlx::PgPool;

use crate::config::AdminConfig;
use crate::services::{AuthMode, QueryCache};

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AdminConfig,
    backend: BackendClient,
    cache: QueryCache,
    /// Session database, checked by the readiness probe.
    pool: Option<PgPool>,
}

impl AppState {
    /// Create a new application state with a fresh (not yet ready) backend client.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend HTTP client cannot be built.
    pub fn new(config: AdminConfig, pool: PgPool) -> Result<Self, BackendError> {
        let backend = BackendClient::new(&config.backend)?;
        Ok(Self::build(config, backend, Some(pool)))
    }

    /// Create state around an existing backend client, without a database.
    #[must_use]
    pub fn with_backend(config: AdminConfig, backend: BackendClient) -> Self {
        Self::build(config, backend, None)
    }

    fn build(config: AdminConfig, backend: BackendClient, pool: Option<PgPool>) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                backend,
                cache: QueryCache::default(),
                pool,
            }),
        }
    }

    #[must_use]
    pub fn config(&self) -> &AdminConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn backend(&self) -> &BackendClient {
        &self.inner.backend
    }

    /// Cache shared by every request's query layer.
    #[must_use]
    pub fn cache(&self) -> &QueryCache {
        &self.inner.cache
    }

    #[must_use]
    pub fn pool(&self) -> Option<&PgPool> {
        self.inner.pool.as_ref()
    }

    #[must_use]
    pub fn auth_mode(&self) -> &AuthMode {
        &self.inner.config.auth_mode
    }
}
