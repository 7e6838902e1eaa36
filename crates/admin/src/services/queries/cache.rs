//! Short-lived cache of admin list reads.

use std::time::Duration;

use moka::future::Cache;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use showroom_backend::ResourceKind;

/// Lists are cached for a minute; mutations invalidate them sooner.
const LIST_TTL: Duration = Duration::from_secs(60);

/// Cached list results keyed by resource.
///
/// Values are held as JSON so one cache serves every resource type.
#[derive(Clone)]
pub struct QueryCache {
    inner: Cache<ResourceKind, serde_json::Value>,
}

impl Default for QueryCache {
    fn default() -> Self {
        Self::new(LIST_TTL)
    }
}

impl std::fmt::Debug for QueryCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryCache")
            .field("entries", &self.inner.entry_count())
            .finish()
    }
}

impl QueryCache {
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        let inner = Cache::builder()
            .max_capacity(64)
            .time_to_live(ttl)
            .build();
        Self { inner }
    }

    /// Cached value for `kind`, if present and decodable.
    pub async fn get<T: DeserializeOwned>(&self, kind: ResourceKind) -> Option<T> {
        let value = self.inner.get(&kind).await?;
        match serde_json::from_value(value) {
            Ok(decoded) => {
                debug!(%kind, "Cache hit");
                Some(decoded)
            }
            Err(e) => {
                warn!(%kind, error = %e, "Dropping undecodable cache entry");
                self.inner.invalidate(&kind).await;
                None
            }
        }
    }

    pub async fn insert<T: Serialize>(&self, kind: ResourceKind, value: &T) {
        match serde_json::to_value(value) {
            Ok(json) => self.inner.insert(kind, json).await,
            Err(e) => warn!(%kind, error = %e, "Not caching unencodable value"),
        }
    }

    /// Drop every listed entry.
    pub async fn invalidate(&self, kinds: &[ResourceKind]) {
        for kind in kinds {
            self.inner.invalidate(kind).await;
        }
    }

    pub async fn contains(&self, kind: ResourceKind) -> bool {
        self.inner.get(&kind).await.is_some()
    }
}
