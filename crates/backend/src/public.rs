//! Public operations used by the marketing site. No token required.

use serde_json::json;
use tracing::instrument;

use showroom_core::{
    BlogComment, BlogPost, BlogPostId, CommentInput, Contact, ContactInput, CreditSimulation,
    CreditSimulationInput, Promotion, Testimonial, TestimonialInput, Vehicle, VehicleId,
};

use crate::client::BackendClient;
use crate::error::BackendError;

impl BackendClient {
    /// Vehicles visible in the public catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn published_vehicles(&self) -> Result<Vec<Vehicle>, BackendError> {
        Ok(self
            .call("getPublishedVehicles", json!({}))
            .await?
            .unwrap_or_default())
    }

    /// One catalog vehicle.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self), fields(id = %id))]
    pub async fn public_vehicle(&self, id: VehicleId) -> Result<Option<Vehicle>, BackendError> {
        self.call("getPublicVehicle", json!({ "id": id })).await
    }

    /// Promotions currently running.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn active_promotions(&self) -> Result<Vec<Promotion>, BackendError> {
        Ok(self
            .call("getActivePromotions", json!({}))
            .await?
            .unwrap_or_default())
    }

    /// Testimonials approved for display.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn approved_testimonials(&self) -> Result<Vec<Testimonial>, BackendError> {
        Ok(self
            .call("getApprovedTestimonials", json!({}))
            .await?
            .unwrap_or_default())
    }

    /// Submit a testimonial for moderation.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the input is rejected.
    #[instrument(skip_all)]
    pub async fn submit_testimonial(
        &self,
        input: &TestimonialInput,
    ) -> Result<Option<Testimonial>, BackendError> {
        self.call("submitTestimonial", json!({ "input": input }))
            .await
    }

    /// Published blog posts, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn published_posts(&self) -> Result<Vec<BlogPost>, BackendError> {
        Ok(self
            .call("getPublishedPosts", json!({}))
            .await?
            .unwrap_or_default())
    }

    /// A published post by slug.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self), fields(slug = %slug))]
    pub async fn post_by_slug(&self, slug: &str) -> Result<Option<BlogPost>, BackendError> {
        self.call("getPostBySlug", json!({ "slug": slug })).await
    }

    /// Approved comments on a post.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self), fields(post_id = %post_id))]
    pub async fn approved_comments(
        &self,
        post_id: BlogPostId,
    ) -> Result<Vec<BlogComment>, BackendError> {
        Ok(self
            .call("getApprovedComments", json!({ "postId": post_id }))
            .await?
            .unwrap_or_default())
    }

    /// Add a comment; it stays hidden until approved.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the input is rejected.
    #[instrument(skip_all, fields(post_id = %input.post_id))]
    pub async fn add_comment(
        &self,
        input: &CommentInput,
    ) -> Result<Option<BlogComment>, BackendError> {
        self.call("addComment", json!({ "input": input })).await
    }

    /// Increment a post's like counter, returning the new count.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self), fields(post_id = %post_id))]
    pub async fn like_post(&self, post_id: BlogPostId) -> Result<Option<u64>, BackendError> {
        self.call("likePost", json!({ "postId": post_id })).await
    }

    /// Record a contact request as a lead.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the input is rejected.
    #[instrument(skip_all)]
    pub async fn submit_contact(
        &self,
        input: &ContactInput,
    ) -> Result<Option<Contact>, BackendError> {
        self.call("submitContact", json!({ "input": input })).await
    }

    /// Record a credit simulation as a lead.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the input is rejected.
    #[instrument(skip_all)]
    pub async fn submit_credit_simulation(
        &self,
        input: &CreditSimulationInput,
    ) -> Result<Option<CreditSimulation>, BackendError> {
        self.call("submitCreditSimulation", json!({ "input": input }))
            .await
    }

    /// Increment the visit counter for a page.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self), fields(page = %page))]
    pub async fn record_visit(&self, page: &str) -> Result<(), BackendError> {
        self.call::<serde_json::Value>("recordVisit", json!({ "page": page }))
            .await?;
        Ok(())
    }
}
