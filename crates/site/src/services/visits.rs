//! Visitor counting.
//!
//! Each page is counted at most once per visitor session. The pages already
//! counted live in the session under [`TRACKED_PAGES_KEY`]; the backend call
//! runs in the background so a slow or failing backend never delays a page.

use std::collections::BTreeSet;

use tokio::task::JoinHandle;
use tower_sessions::Session;
use tracing::{debug, warn};

use showroom_backend::BackendClient;

/// Session key holding the set of pages already counted.
pub const TRACKED_PAGES_KEY: &str = "tracked_pages";

/// Records page visits with the backend.
#[derive(Debug, Clone)]
pub struct VisitTracker {
    backend: BackendClient,
}

impl VisitTracker {
    #[must_use]
    pub const fn new(backend: BackendClient) -> Self {
        Self { backend }
    }

    /// Count `page` for this session unless it was counted already.
    ///
    /// Returns the handle of the background backend call, or `None` when
    /// nothing was sent.
    pub async fn track(&self, session: &Session, page: &str) -> Option<JoinHandle<()>> {
        let mut tracked = match session.get::<BTreeSet<String>>(TRACKED_PAGES_KEY).await {
            Ok(pages) => pages.unwrap_or_default(),
            Err(e) => {
                warn!(error = %e, page, "Could not read tracked pages");
                return None;
            }
        };

        if !tracked.insert(page.to_string()) {
            debug!(page, "Visit already counted");
            return None;
        }

        if let Err(e) = session.insert(TRACKED_PAGES_KEY, &tracked).await {
            warn!(error = %e, page, "Could not store tracked pages");
            return None;
        }

        let backend = self.backend.clone();
        let page = page.to_string();
        Some(tokio::spawn(async move {
            if let Err(e) = backend.record_visit(&page).await {
                warn!(error = %e, page = %page, "Failed to record visit");
            }
        }))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use serde_json::json;
    use showroom_backend::BackendConfig;
    use tower_sessions::MemoryStore;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn tracker_for(server: &MockServer) -> VisitTracker {
        VisitTracker::new(
            BackendClient::new(&BackendConfig {
                url: server.uri(),
                service_key: None,
            })
            .unwrap(),
        )
    }

    fn session() -> Session {
        Session::new(None, Arc::new(MemoryStore::default()), None)
    }

    #[tokio::test]
    async fn test_each_page_counted_once_per_session() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/rpc/recordVisit"))
            .and(body_json(json!({"page": "/vehicles"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"result": 1})))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/rpc/recordVisit"))
            .and(body_json(json!({"page": "/blog"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"result": 1})))
            .expect(1)
            .mount(&server)
            .await;

        let tracker = tracker_for(&server);
        let session = session();

        tracker.track(&session, "/vehicles").await.unwrap().await.unwrap();
        assert!(tracker.track(&session, "/vehicles").await.is_none());
        tracker.track(&session, "/blog").await.unwrap().await.unwrap();

        let tracked: BTreeSet<String> = session.get(TRACKED_PAGES_KEY).await.unwrap().unwrap();
        assert_eq!(tracked.len(), 2);
    }

    #[tokio::test]
    async fn test_backend_failure_is_swallowed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/rpc/recordVisit"))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&server)
            .await;

        let tracker = tracker_for(&server);
        let session = session();

        tracker.track(&session, "/").await.unwrap().await.unwrap();
        // Counted as attempted; not retried within the session.
        assert!(tracker.track(&session, "/").await.is_none());
    }

    #[tokio::test]
    async fn test_new_session_counts_again() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/rpc/recordVisit"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"result": 1})))
            .expect(2)
            .mount(&server)
            .await;

        let tracker = tracker_for(&server);
        tracker.track(&session(), "/").await.unwrap().await.unwrap();
        tracker.track(&session(), "/").await.unwrap().await.unwrap();
    }
}
