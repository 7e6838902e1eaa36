//! Application state shared across handlers.

use std::sync::Arc;

use showroom_backend::{BackendClient, BackendError};
use sqlx::PgPool;

use crate::config::SiteConfig;
use crate::services::{Catalog, VisitTracker};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like the backend client and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: SiteConfig,
    backend: BackendClient,
    catalog: Catalog,
    visits: VisitTracker,
    pool: Option<PgPool>,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend HTTP client cannot be built.
    pub fn new(config: SiteConfig, pool: PgPool) -> Result<Self, BackendError> {
        let backend = BackendClient::new(&config.backend)?;
        Ok(Self::build(config, backend, Some(pool)))
    }

    /// Create state around an existing backend client, without a database.
    #[must_use]
    pub fn with_backend(config: SiteConfig, backend: BackendClient) -> Self {
        Self::build(config, backend, None)
    }

    fn build(config: SiteConfig, backend: BackendClient, pool: Option<PgPool>) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                catalog: Catalog::new(backend.clone()),
                visits: VisitTracker::new(backend.clone()),
                config,
                backend,
                pool,
            }),
        }
    }

    /// Get a reference to the site configuration.
    #[must_use]
    pub fn config(&self) -> &SiteConfig {
        &self.inner.config
    }

    /// Uncached backend access, used for submissions.
    #[must_use]
    pub fn backend(&self) -> &BackendClient {
        &self.inner.backend
    }

    /// Cached public reads.
    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.inner.catalog
    }

    #[must_use]
    pub fn visits(&self) -> &VisitTracker {
        &self.inner.visits
    }

    /// Session database, checked by the readiness probe.
    #[must_use]
    pub fn pool(&self) -> Option<&PgPool> {
        self.inner.pool.as_ref()
    }
}
