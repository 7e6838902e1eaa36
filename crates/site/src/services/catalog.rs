//! Cached public reads from the backend.
//!
//! Every list the site renders is cached for five minutes with `moka`.
//! Single vehicles and posts are looked up in the cached lists first and
//! only fetched individually when missing, so a record published after the
//! list was cached still resolves.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use tracing::{debug, instrument};

use showroom_backend::{BackendClient, BackendError};
use showroom_core::{BlogComment, BlogPost, BlogPostId, Promotion, Testimonial, Vehicle, VehicleId};

/// How long public reads are served from memory.
pub const CATALOG_TTL: Duration = Duration::from_secs(300);

/// Cache key for public reads.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
enum CacheKey {
    Vehicles,
    Promotions,
    Testimonials,
    Posts,
    Comments(BlogPostId),
}

/// Cached value types.
#[derive(Debug, Clone)]
enum CacheValue {
    Vehicles(Arc<Vec<Vehicle>>),
    Promotions(Arc<Vec<Promotion>>),
    Testimonials(Arc<Vec<Testimonial>>),
    Posts(Arc<Vec<BlogPost>>),
    Comments(Arc<Vec<BlogComment>>),
}

/// Read-through cache over the backend's public operations.
///
/// Cheap to clone; clones share the cache.
#[derive(Clone)]
pub struct Catalog {
    backend: BackendClient,
    cache: Cache<CacheKey, CacheValue>,
}

impl std::fmt::Debug for Catalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Catalog")
            .field("entries", &self.cache.entry_count())
            .finish_non_exhaustive()
    }
}

impl Catalog {
    #[must_use]
    pub fn new(backend: BackendClient) -> Self {
        Self::with_ttl(backend, CATALOG_TTL)
    }

    #[must_use]
    pub fn with_ttl(backend: BackendClient, ttl: Duration) -> Self {
        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(ttl)
            .build();
        Self { backend, cache }
    }

    /// Serve `key` from the cache, or run `fetch` and remember its result.
    async fn load<T, Fut>(
        &self,
        key: CacheKey,
        unpack: impl FnOnce(CacheValue) -> Option<T>,
        pack: impl FnOnce(T) -> CacheValue,
        fetch: Fut,
    ) -> Result<T, BackendError>
    where
        T: Clone,
        Fut: Future<Output = Result<T, BackendError>>,
    {
        if let Some(hit) = self.cache.get(&key).await.and_then(unpack) {
            debug!(?key, "Cache hit");
            return Ok(hit);
        }

        let value = fetch.await?;
        self.cache.insert(key, pack(value.clone())).await;
        Ok(value)
    }

    /// Vehicles in the public catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend call fails.
    pub async fn vehicles(&self) -> Result<Arc<Vec<Vehicle>>, BackendError> {
        self.load(
            CacheKey::Vehicles,
            |v| match v {
                CacheValue::Vehicles(list) => Some(list),
                _ => None,
            },
            CacheValue::Vehicles,
            async { Ok(Arc::new(self.backend.published_vehicles().await?)) },
        )
        .await
    }

    /// One catalog vehicle.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend call fails.
    #[instrument(skip(self), fields(id = %id))]
    pub async fn vehicle(&self, id: VehicleId) -> Result<Option<Vehicle>, BackendError> {
        if let Some(vehicle) = self.vehicles().await?.iter().find(|v| v.id == id) {
            return Ok(Some(vehicle.clone()));
        }
        self.backend.public_vehicle(id).await
    }

    /// Promotions currently running.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend call fails.
    pub async fn promotions(&self) -> Result<Arc<Vec<Promotion>>, BackendError> {
        self.load(
            CacheKey::Promotions,
            |v| match v {
                CacheValue::Promotions(list) => Some(list),
                _ => None,
            },
            CacheValue::Promotions,
            async { Ok(Arc::new(self.backend.active_promotions().await?)) },
        )
        .await
    }

    /// Approved testimonials.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend call fails.
    pub async fn testimonials(&self) -> Result<Arc<Vec<Testimonial>>, BackendError> {
        self.load(
            CacheKey::Testimonials,
            |v| match v {
                CacheValue::Testimonials(list) => Some(list),
                _ => None,
            },
            CacheValue::Testimonials,
            async { Ok(Arc::new(self.backend.approved_testimonials().await?)) },
        )
        .await
    }

    /// Published posts, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend call fails.
    pub async fn posts(&self) -> Result<Arc<Vec<BlogPost>>, BackendError> {
        self.load(
            CacheKey::Posts,
            |v| match v {
                CacheValue::Posts(list) => Some(list),
                _ => None,
            },
            CacheValue::Posts,
            async {
                let mut posts = self.backend.published_posts().await?;
                posts.sort_by(|a, b| b.published_at.cmp(&a.published_at));
                Ok(Arc::new(posts))
            },
        )
        .await
    }

    /// A published post by slug.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend call fails.
    #[instrument(skip(self), fields(slug = %slug))]
    pub async fn post(&self, slug: &str) -> Result<Option<BlogPost>, BackendError> {
        if let Some(post) = self.posts().await?.iter().find(|p| p.slug == slug) {
            return Ok(Some(post.clone()));
        }
        self.backend.post_by_slug(slug).await
    }

    /// Approved comments on a post, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend call fails.
    pub async fn comments(&self, post_id: BlogPostId) -> Result<Arc<Vec<BlogComment>>, BackendError> {
        self.load(
            CacheKey::Comments(post_id),
            |v| match v {
                CacheValue::Comments(list) => Some(list),
                _ => None,
            },
            CacheValue::Comments,
            async {
                let mut comments = self.backend.approved_comments(post_id).await?;
                comments.sort_by(|a, b| a.created_at.cmp(&b.created_at));
                Ok(Arc::new(comments))
            },
        )
        .await
    }

    /// Like a post and drop the cached posts so the new count shows.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend call fails.
    pub async fn like(&self, post_id: BlogPostId) -> Result<Option<u64>, BackendError> {
        let likes = self.backend.like_post(post_id).await?;
        self.cache.invalidate(&CacheKey::Posts).await;
        Ok(likes)
    }
}
