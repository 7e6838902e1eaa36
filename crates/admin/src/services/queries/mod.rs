//! Token-gated CRUD over the backend, with list caching.
//!
//! Every operation checks, in order, that the backend is ready and that a
//! token is present before any network call. A gate failure leaves the cache
//! untouched. A `null`/`false` answer to a token-gated call is
//! [`QueryError::SessionExpired`].

mod cache;
mod error;

pub use cache::QueryCache;
pub use error::{ErrorKind, QueryError};

use chrono::NaiveDate;
use tracing::{debug, instrument};

use showroom_backend::{BackendClient, Editable, Resource, ResourceKind};
use showroom_core::{
    BlogComment, CommentId, Contact, ContactId, InteractionSummary, LeadStatus, Promotion,
    SessionToken, Testimonial, Vehicle, VisitorStats,
};

/// Headline numbers for the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DashboardSummary {
    pub vehicles: usize,
    pub available_vehicles: usize,
    pub active_promotions: usize,
    pub new_leads: usize,
    pub pending_comments: usize,
    pub pending_testimonials: usize,
    pub total_visits: u64,
}

/// Query layer bound to one request's token.
pub struct AdminQueries<'a> {
    backend: &'a BackendClient,
    cache: &'a QueryCache,
    token: Option<&'a SessionToken>,
}

impl<'a> AdminQueries<'a> {
    #[must_use]
    pub const fn new(
        backend: &'a BackendClient,
        cache: &'a QueryCache,
        token: Option<&'a SessionToken>,
    ) -> Self {
        Self {
            backend,
            cache,
            token,
        }
    }

    fn gate(&self) -> Result<&'a SessionToken, QueryError> {
        if !self.backend.is_ready() {
            return Err(QueryError::ConnectionNotReady);
        }
        self.token.ok_or(QueryError::MissingSession)
    }

    async fn invalidate_for<R: Resource>(&self) {
        let mut kinds = Vec::with_capacity(1 + R::RELATED.len());
        kinds.push(R::KIND);
        kinds.extend_from_slice(R::RELATED);
        debug!(?kinds, "Invalidating cached lists");
        self.cache.invalidate(&kinds).await;
    }

    // =========================================================================
    // Generic CRUD
    // =========================================================================

    /// Every record of `R`, served from cache when fresh.
    ///
    /// # Errors
    ///
    /// Returns a gate error, `SessionExpired`, or the mapped backend error.
    #[instrument(skip(self), fields(kind = %R::KIND))]
    pub async fn list<R: Resource>(&self) -> Result<Vec<R>, QueryError> {
        let token = self.gate()?;
        if let Some(cached) = self.cache.get::<Vec<R>>(R::KIND).await {
            return Ok(cached);
        }

        let records = self
            .backend
            .list::<R>(token)
            .await?
            .ok_or(QueryError::SessionExpired)?;
        self.cache.insert(R::KIND, &records).await;
        Ok(records)
    }

    /// One record of `R`.
    ///
    /// # Errors
    ///
    /// Returns a gate error, `SessionExpired`, `NotFound`, or the mapped
    /// backend error.
    #[instrument(skip(self), fields(kind = %R::KIND, id = %id))]
    pub async fn get<R: Resource>(&self, id: R::Id) -> Result<R, QueryError> {
        let token = self.gate()?;
        self.backend
            .get::<R>(token, id)
            .await?
            .ok_or(QueryError::SessionExpired)
    }

    /// Create a record and invalidate the affected lists.
    ///
    /// # Errors
    ///
    /// Returns a gate error, `SessionExpired`, `Rejected`, or the mapped
    /// backend error.
    #[instrument(skip_all, fields(kind = %R::KIND))]
    pub async fn create<R: Editable>(&self, input: &R::Input) -> Result<R, QueryError> {
        let token = self.gate()?;
        let created = self
            .backend
            .create::<R>(token, input)
            .await?
            .ok_or(QueryError::SessionExpired)?;
        self.invalidate_for::<R>().await;
        Ok(created)
    }

    /// Update a record and invalidate the affected lists.
    ///
    /// # Errors
    ///
    /// Returns a gate error, `SessionExpired`, `Rejected`, `NotFound`, or the
    /// mapped backend error.
    #[instrument(skip(self, input), fields(kind = %R::KIND, id = %id))]
    pub async fn update<R: Editable>(&self, id: R::Id, input: &R::Input) -> Result<R, QueryError> {
        let token = self.gate()?;
        let updated = self
            .backend
            .update::<R>(token, id, input)
            .await?
            .ok_or(QueryError::SessionExpired)?;
        self.invalidate_for::<R>().await;
        Ok(updated)
    }

    /// Delete a record and invalidate the affected lists.
    ///
    /// # Errors
    ///
    /// Returns a gate error, `SessionExpired` (also for a `false` reply), or
    /// the mapped backend error.
    #[instrument(skip(self), fields(kind = %R::KIND, id = %id))]
    pub async fn delete<R: Resource>(&self, id: R::Id) -> Result<(), QueryError> {
        let token = self.gate()?;
        match self.backend.delete::<R>(token, id).await? {
            Some(true) => {
                self.invalidate_for::<R>().await;
                Ok(())
            }
            Some(false) | None => Err(QueryError::SessionExpired),
        }
    }

    // =========================================================================
    // Entity-specific operations
    // =========================================================================

    /// Move a lead to another follow-up state.
    ///
    /// # Errors
    ///
    /// Returns a gate error, `SessionExpired`, or the mapped backend error.
    #[instrument(skip(self), fields(id = %id, status = %status))]
    pub async fn update_contact_status(
        &self,
        id: ContactId,
        status: LeadStatus,
    ) -> Result<Contact, QueryError> {
        let token = self.gate()?;
        let contact = self
            .backend
            .update_contact_status(token, id, status)
            .await?
            .ok_or(QueryError::SessionExpired)?;
        self.invalidate_for::<Contact>().await;
        Ok(contact)
    }

    /// Publish a pending comment.
    ///
    /// # Errors
    ///
    /// Returns a gate error, `SessionExpired`, or the mapped backend error.
    #[instrument(skip(self), fields(id = %id))]
    pub async fn approve_comment(&self, id: CommentId) -> Result<BlogComment, QueryError> {
        let token = self.gate()?;
        let comment = self
            .backend
            .approve_comment(token, id)
            .await?
            .ok_or(QueryError::SessionExpired)?;
        self.invalidate_for::<BlogComment>().await;
        Ok(comment)
    }

    /// Site-wide visitor statistics.
    ///
    /// # Errors
    ///
    /// Returns a gate error, `SessionExpired`, or the mapped backend error.
    #[instrument(skip(self))]
    pub async fn visitor_stats(&self) -> Result<VisitorStats, QueryError> {
        let token = self.gate()?;
        if let Some(cached) = self.cache.get(ResourceKind::VisitorStats).await {
            return Ok(cached);
        }
        let stats = self
            .backend
            .visitor_stats(token)
            .await?
            .ok_or(QueryError::SessionExpired)?;
        self.cache.insert(ResourceKind::VisitorStats, &stats).await;
        Ok(stats)
    }

    /// Likes and comment counts per post.
    ///
    /// # Errors
    ///
    /// Returns a gate error, `SessionExpired`, or the mapped backend error.
    #[instrument(skip(self))]
    pub async fn interaction_summaries(&self) -> Result<Vec<InteractionSummary>, QueryError> {
        let token = self.gate()?;
        if let Some(cached) = self.cache.get(ResourceKind::Interactions).await {
            return Ok(cached);
        }
        let summaries = self
            .backend
            .interaction_summaries(token)
            .await?
            .ok_or(QueryError::SessionExpired)?;
        self.cache.insert(ResourceKind::Interactions, &summaries).await;
        Ok(summaries)
    }

    /// Counts shown on the dashboard, fetched concurrently.
    ///
    /// # Errors
    ///
    /// Returns the first failure among the underlying reads.
    #[instrument(skip(self))]
    pub async fn dashboard_summary(&self, today: NaiveDate) -> Result<DashboardSummary, QueryError> {
        let (vehicles, promotions, contacts, comments, testimonials, stats) = tokio::try_join!(
            self.list::<Vehicle>(),
            self.list::<Promotion>(),
            self.list::<Contact>(),
            self.list::<BlogComment>(),
            self.list::<Testimonial>(),
            self.visitor_stats(),
        )?;

        Ok(DashboardSummary {
            vehicles: vehicles.len(),
            available_vehicles: vehicles.iter().filter(|v| v.is_available()).count(),
            active_promotions: promotions.iter().filter(|p| p.is_running(today)).count(),
            new_leads: contacts
                .iter()
                .filter(|c| c.status == LeadStatus::New)
                .count(),
            pending_comments: comments.iter().filter(|c| !c.approved).count(),
            pending_testimonials: testimonials.iter().filter(|t| !t.approved).count(),
            total_visits: stats.total_visits,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::test_support::{backend_for, ready_backend};
    use serde_json::json;
    use showroom_core::VehicleId;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn token() -> SessionToken {
        SessionToken::new("T1").unwrap()
    }

    fn vehicle_json(id: u64) -> serde_json::Value {
        json!({
            "id": id,
            "make": "Honda",
            "model": "Civic",
            "year": 2020,
            "price": "81000.00",
            "mileageKm": 40000,
            "fuelType": "flex",
            "transmission": "manual"
        })
    }

    fn vehicle(id: u64) -> Vehicle {
        serde_json::from_value(vehicle_json(id)).unwrap()
    }

    async fn mount_rpc(server: &MockServer, rpc: &str, result: serde_json::Value) {
        Mock::given(method("POST"))
            .and(path(format!("/rpc/{rpc}")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "result": result })))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_mutation_without_token_fails_before_network() {
        let server = MockServer::start().await;
        let backend = ready_backend(&server).await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;
        let cache = QueryCache::default();
        cache.insert(ResourceKind::Vehicles, &vec![vehicle(1)]).await;

        let queries = AdminQueries::new(&backend, &cache, None);
        let err = queries
            .create::<Vehicle>(&vehicle(2).to_input())
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::MissingSession);
        assert_eq!(err.to_string(), "Admin session required.");
        assert!(cache.contains(ResourceKind::Vehicles).await);
    }

    #[tokio::test]
    async fn test_unready_backend_fails_before_network() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;
        let backend = backend_for(&server);
        let cache = QueryCache::default();
        let token = token();

        let queries = AdminQueries::new(&backend, &cache, Some(&token));
        let err = queries.list::<Vehicle>().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ConnectionNotReady);
    }

    #[tokio::test]
    async fn test_null_read_is_session_failure() {
        let server = MockServer::start().await;
        let backend = ready_backend(&server).await;
        mount_rpc(&server, "getContacts", json!(null)).await;
        let cache = QueryCache::default();
        let token = token();

        let queries = AdminQueries::new(&backend, &cache, Some(&token));
        let err = queries.list::<Contact>().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SessionExpired);
        assert!(err.is_session_failure());
        assert!(!cache.contains(ResourceKind::Contacts).await);
    }

    #[tokio::test]
    async fn test_mutation_invalidates_list() {
        let server = MockServer::start().await;
        let backend = ready_backend(&server).await;
        Mock::given(method("POST"))
            .and(path("/rpc/getAllVehicles"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"result": [vehicle_json(1)]})),
            )
            .expect(2)
            .mount(&server)
            .await;
        mount_rpc(&server, "createVehicle", vehicle_json(2)).await;
        let cache = QueryCache::default();
        let token = token();
        let queries = AdminQueries::new(&backend, &cache, Some(&token));

        assert_eq!(queries.list::<Vehicle>().await.unwrap().len(), 1);
        // Served from cache.
        assert_eq!(queries.list::<Vehicle>().await.unwrap().len(), 1);

        let created = queries
            .create::<Vehicle>(&vehicle(2).to_input())
            .await
            .unwrap();
        assert_eq!(created.id, VehicleId::new(2));
        assert!(!cache.contains(ResourceKind::Vehicles).await);

        queries.list::<Vehicle>().await.unwrap();
    }

    #[tokio::test]
    async fn test_approving_comment_invalidates_related() {
        let server = MockServer::start().await;
        let backend = ready_backend(&server).await;
        mount_rpc(
            &server,
            "approveComment",
            json!({"id": 4, "postId": 1, "authorName": "Rui", "content": "Nice", "approved": true}),
        )
        .await;
        let cache = QueryCache::default();
        for kind in [
            ResourceKind::BlogComments,
            ResourceKind::BlogPosts,
            ResourceKind::Interactions,
            ResourceKind::Vehicles,
        ] {
            cache.insert(kind, &Vec::<u64>::new()).await;
        }
        let token = token();
        let queries = AdminQueries::new(&backend, &cache, Some(&token));

        let comment = queries.approve_comment(CommentId::new(4)).await.unwrap();
        assert!(comment.approved);
        assert!(!cache.contains(ResourceKind::BlogComments).await);
        assert!(!cache.contains(ResourceKind::BlogPosts).await);
        assert!(!cache.contains(ResourceKind::Interactions).await);
        assert!(cache.contains(ResourceKind::Vehicles).await);
    }

    #[tokio::test]
    async fn test_delete_false_is_session_expired() {
        let server = MockServer::start().await;
        let backend = ready_backend(&server).await;
        mount_rpc(&server, "deleteVehicle", json!(false)).await;
        let cache = QueryCache::default();
        cache.insert(ResourceKind::Vehicles, &vec![vehicle(1)]).await;
        let token = token();
        let queries = AdminQueries::new(&backend, &cache, Some(&token));

        let err = queries.delete::<Vehicle>(VehicleId::new(1)).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SessionExpired);
        assert!(cache.contains(ResourceKind::Vehicles).await);
    }

    #[tokio::test]
    async fn test_rpc_error_is_rejected() {
        let server = MockServer::start().await;
        let backend = ready_backend(&server).await;
        Mock::given(method("POST"))
            .and(path("/rpc/updateVehicle"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error": {"code": "invalid_input", "message": "Year is out of range"}
            })))
            .mount(&server)
            .await;
        let cache = QueryCache::default();
        let token = token();
        let queries = AdminQueries::new(&backend, &cache, Some(&token));

        let err = queries
            .update::<Vehicle>(VehicleId::new(1), &vehicle(1).to_input())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Rejected);
        assert_eq!(err.to_string(), "Year is out of range");
    }

    #[tokio::test]
    async fn test_dashboard_summary_counts() {
        let server = MockServer::start().await;
        let backend = ready_backend(&server).await;
        let mut sold = vehicle_json(2);
        sold["status"] = json!("sold");
        mount_rpc(&server, "getAllVehicles", json!([vehicle_json(1), sold])).await;
        mount_rpc(
            &server,
            "getAllPromotions",
            json!([
                {"id": 1, "title": "Spring", "active": true},
                {"id": 2, "title": "Old", "active": true, "endsOn": "2020-01-31"}
            ]),
        )
        .await;
        mount_rpc(
            &server,
            "getContacts",
            json!([
                {"id": 1, "name": "Ana", "email": "ana@mail.com", "message": "Hi"},
                {"id": 2, "name": "Rui", "email": "rui@mail.com", "message": "Hi", "status": "closed"}
            ]),
        )
        .await;
        mount_rpc(
            &server,
            "getAllComments",
            json!([{"id": 1, "postId": 1, "authorName": "Rui", "content": "?"}]),
        )
        .await;
        mount_rpc(&server, "getAllTestimonials", json!([])).await;
        mount_rpc(
            &server,
            "getVisitorStats",
            json!({"totalVisits": 120, "pages": [{"page": "/", "visits": 120}]}),
        )
        .await;
        let cache = QueryCache::default();
        let token = token();
        let queries = AdminQueries::new(&backend, &cache, Some(&token));

        let today = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
        let summary = queries.dashboard_summary(today).await.unwrap();
        assert_eq!(
            summary,
            DashboardSummary {
                vehicles: 2,
                available_vehicles: 1,
                active_promotions: 1,
                new_leads: 1,
                pending_comments: 1,
                pending_testimonials: 0,
                total_visits: 120,
            }
        );
    }
}
