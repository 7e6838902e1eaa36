//! Admin authentication and token-gated operations.
//!
//! Token-gated calls return `Ok(None)` (or `Ok(Some(false))`) when the
//! backend rejects the token. Interpreting that as an expired session is the
//! caller's job.

use serde::Deserialize;
use serde_json::json;
use tracing::instrument;

use showroom_core::{
    AdminSession, BlogComment, CommentId, Contact, ContactId, InteractionSummary, LeadStatus,
    SessionToken, VisitorStats,
};

use crate::client::BackendClient;
use crate::error::BackendError;
use crate::resource::{Editable, Resource};

/// RPC method used as a session liveness probe.
pub const SESSION_PROBE_METHOD: &str = "getContacts";

#[derive(Deserialize)]
struct LoginReply {
    #[serde(default)]
    token: String,
    #[serde(default)]
    role: String,
}

impl BackendClient {
    /// Exchange credentials for a session.
    ///
    /// Returns `Ok(None)` when the backend refuses the credentials or replies
    /// with an empty token or role.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, password), fields(email = %email))]
    pub async fn admin_login(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Option<AdminSession>, BackendError> {
        let reply: Option<LoginReply> = self
            .call("adminLogin", json!({ "email": email, "password": password }))
            .await?;
        Ok(reply.and_then(|r| AdminSession::new(r.token, r.role)))
    }

    /// Invalidate a session on the backend.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip_all)]
    pub async fn admin_logout(&self, token: &SessionToken) -> Result<Option<bool>, BackendError> {
        self.call("adminLogout", json!({ "token": token.expose() }))
            .await
    }

    /// Privileged read used to check that a token is still accepted.
    ///
    /// `Ok(false)` means the backend answered `null`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip_all)]
    pub async fn session_probe(&self, token: &SessionToken) -> Result<bool, BackendError> {
        let reply: Option<serde_json::Value> = self
            .call(SESSION_PROBE_METHOD, json!({ "token": token.expose() }))
            .await?;
        Ok(reply.is_some())
    }

    // =========================================================================
    // Generic resource operations
    // =========================================================================

    /// List every record of a resource.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip_all, fields(method = R::LIST))]
    pub async fn list<R: Resource>(
        &self,
        token: &SessionToken,
    ) -> Result<Option<Vec<R>>, BackendError> {
        self.call(R::LIST, json!({ "token": token.expose() })).await
    }

    /// Fetch one record.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip_all, fields(method = R::GET, id = %id))]
    pub async fn get<R: Resource>(
        &self,
        token: &SessionToken,
        id: R::Id,
    ) -> Result<Option<R>, BackendError> {
        self.call(R::GET, json!({ "token": token.expose(), "id": id }))
            .await
    }

    /// Create a record, returning it as stored.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the input is rejected.
    #[instrument(skip_all, fields(method = R::CREATE))]
    pub async fn create<R: Editable>(
        &self,
        token: &SessionToken,
        input: &R::Input,
    ) -> Result<Option<R>, BackendError> {
        self.call(
            R::CREATE,
            json!({ "token": token.expose(), "input": input }),
        )
        .await
    }

    /// Replace a record's editable fields, returning it as stored.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the input is rejected.
    #[instrument(skip_all, fields(method = R::UPDATE, id = %id))]
    pub async fn update<R: Editable>(
        &self,
        token: &SessionToken,
        id: R::Id,
        input: &R::Input,
    ) -> Result<Option<R>, BackendError> {
        self.call(
            R::UPDATE,
            json!({ "token": token.expose(), "id": id, "input": input }),
        )
        .await
    }

    /// Delete a record.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip_all, fields(method = R::DELETE, id = %id))]
    pub async fn delete<R: Resource>(
        &self,
        token: &SessionToken,
        id: R::Id,
    ) -> Result<Option<bool>, BackendError> {
        self.call(R::DELETE, json!({ "token": token.expose(), "id": id }))
            .await
    }

    // =========================================================================
    // Entity-specific operations
    // =========================================================================

    /// Move a lead through its follow-up states.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, token), fields(id = %id, status = %status))]
    pub async fn update_contact_status(
        &self,
        token: &SessionToken,
        id: ContactId,
        status: LeadStatus,
    ) -> Result<Option<Contact>, BackendError> {
        self.call(
            "updateContactStatus",
            json!({ "token": token.expose(), "id": id, "status": status }),
        )
        .await
    }

    /// Publish a pending comment.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, token), fields(id = %id))]
    pub async fn approve_comment(
        &self,
        token: &SessionToken,
        id: CommentId,
    ) -> Result<Option<BlogComment>, BackendError> {
        self.call(
            "approveComment",
            json!({ "token": token.expose(), "id": id }),
        )
        .await
    }

    /// Site-wide visitor statistics.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip_all)]
    pub async fn visitor_stats(
        &self,
        token: &SessionToken,
    ) -> Result<Option<VisitorStats>, BackendError> {
        self.call("getVisitorStats", json!({ "token": token.expose() }))
            .await
    }

    /// Likes and comment counts per post.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip_all)]
    pub async fn interaction_summaries(
        &self,
        token: &SessionToken,
    ) -> Result<Option<Vec<InteractionSummary>>, BackendError> {
        self.call(
            "getInteractionSummaries",
            json!({ "token": token.expose() }),
        )
        .await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::client::BackendConfig;
    use showroom_core::{Vehicle, VehicleId};
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> BackendClient {
        BackendClient::new(&BackendConfig {
            url: server.uri(),
            service_key: None,
        })
        .unwrap()
    }

    fn token() -> SessionToken {
        SessionToken::new("T1").unwrap()
    }

    #[tokio::test]
    async fn test_admin_login_returns_session() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/rpc/adminLogin"))
            .and(body_json(json!({"email": "a@dealer.com", "password": "pw"})))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"result": {"token": "T1", "role": "R1"}})),
            )
            .mount(&server)
            .await;

        let session = client_for(&server)
            .admin_login("a@dealer.com", "pw")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(session.token().expose(), "T1");
        assert_eq!(session.role(), "R1");
    }

    #[tokio::test]
    async fn test_admin_login_partial_reply_is_none() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/rpc/adminLogin"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"result": {"token": "T1"}})),
            )
            .mount(&server)
            .await;

        let session = client_for(&server).admin_login("a@dealer.com", "pw").await.unwrap();
        assert!(session.is_none());
    }

    #[tokio::test]
    async fn test_session_probe_null_is_false() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/rpc/getContacts"))
            .and(body_json(json!({"token": "T1"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"result": null})))
            .mount(&server)
            .await;

        assert!(!client_for(&server).session_probe(&token()).await.unwrap());
    }

    #[tokio::test]
    async fn test_generic_update_sends_id_and_input() {
        let server = MockServer::start().await;
        let stored = json!({
            "id": 5,
            "make": "Honda",
            "model": "Civic",
            "year": 2020,
            "price": "81000.00",
            "mileageKm": 40000,
            "fuelType": "flex",
            "transmission": "manual"
        });
        Mock::given(method("POST"))
            .and(path("/rpc/updateVehicle"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"result": stored})))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let vehicle: Vehicle = serde_json::from_value(stored).unwrap();
        let updated = client
            .update::<Vehicle>(&token(), VehicleId::new(5), &vehicle.to_input())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.model, "Civic");

        let requests = server.received_requests().await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
        assert_eq!(body["token"], "T1");
        assert_eq!(body["id"], 5);
        assert_eq!(body["input"]["mileageKm"], 40000);
    }

    #[tokio::test]
    async fn test_delete_false_is_some_false() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/rpc/deleteVehicle"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"result": false})))
            .mount(&server)
            .await;

        let deleted = client_for(&server)
            .delete::<Vehicle>(&token(), VehicleId::new(1))
            .await
            .unwrap();
        assert_eq!(deleted, Some(false));
    }
}
