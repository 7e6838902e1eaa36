//! RPC transport and readiness tracking.
//!
//! Every backend operation is a `POST {endpoint}/rpc/{method}` whose body is a
//! JSON object of named arguments. The reply is an envelope holding either a
//! `result` (which may be `null`) or an `error`.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

use crate::error::BackendError;

/// Header carrying the optional service key.
const SERVICE_KEY_HEADER: &str = "X-Service-Key";

/// First delay between readiness probes.
const PROBE_INITIAL_DELAY: Duration = Duration::from_millis(500);

/// Upper bound on the delay between readiness probes.
const PROBE_MAX_DELAY: Duration = Duration::from_secs(30);

/// Per-request timeout.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Connection settings for the backend service.
#[derive(Clone)]
pub struct BackendConfig {
    /// Base URL, e.g. `https://api.dealer.example`.
    pub url: String,
    /// Optional shared key sent on every request.
    pub service_key: Option<SecretString>,
}

impl std::fmt::Debug for BackendConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendConfig")
            .field("url", &self.url)
            .field(
                "service_key",
                &self.service_key.as_ref().map(|_| "[REDACTED]"),
            )
            .finish()
    }
}

// =============================================================================
// BackendClient
// =============================================================================

/// Client for the backend RPC service.
///
/// Cheap to clone; clones share the HTTP connection pool and the readiness
/// flag.
#[derive(Clone)]
pub struct BackendClient {
    inner: Arc<BackendClientInner>,
}

struct BackendClientInner {
    client: reqwest::Client,
    endpoint: String,
    service_key: Option<SecretString>,
    ready: AtomicBool,
}

impl std::fmt::Debug for BackendClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendClient")
            .field("endpoint", &self.inner.endpoint)
            .field("ready", &self.is_ready())
            .finish_non_exhaustive()
    }
}

#[derive(Deserialize)]
struct Envelope<R> {
    result: Option<R>,
    error: Option<RpcErrorBody>,
}

#[derive(Deserialize)]
struct RpcErrorBody {
    code: String,
    #[serde(default)]
    message: String,
}

impl BackendClient {
    /// Create a client. It starts out not ready; see [`Self::probe`].
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &BackendConfig) -> Result<Self, BackendError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            inner: Arc::new(BackendClientInner {
                client,
                endpoint: config.url.trim_end_matches('/').to_string(),
                service_key: config.service_key.clone(),
                ready: AtomicBool::new(false),
            }),
        })
    }

    /// Base URL of the backend.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.inner.endpoint
    }

    /// Whether a health check has succeeded.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.inner.ready.load(Ordering::Acquire)
    }

    /// Check `GET /health` and mark the client ready on success.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the status is not 2xx.
    #[instrument(skip(self), fields(endpoint = %self.inner.endpoint))]
    pub async fn probe(&self) -> Result<(), BackendError> {
        let mut request = self
            .inner
            .client
            .get(format!("{}/health", self.inner.endpoint));
        if let Some(key) = &self.inner.service_key {
            request = request.header(SERVICE_KEY_HEADER, key.expose_secret());
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(BackendError::Status(status.as_u16()));
        }

        if !self.inner.ready.swap(true, Ordering::AcqRel) {
            info!("Backend connection ready");
        }
        Ok(())
    }

    /// Probe in the background until the backend answers, backing off
    /// exponentially between attempts.
    #[must_use]
    pub fn spawn_readiness_probe(&self) -> JoinHandle<()> {
        let client = self.clone();
        tokio::spawn(async move {
            let mut delay = PROBE_INITIAL_DELAY;
            loop {
                match client.probe().await {
                    Ok(()) => break,
                    Err(e) => {
                        warn!(error = %e, retry_in_ms = delay.as_millis(), "Backend not ready");
                    }
                }
                tokio::time::sleep(delay).await;
                delay = next_delay(delay);
            }
        })
    }

    /// Invoke an RPC method.
    ///
    /// A `null` result is `Ok(None)`. An error envelope with code
    /// `not_found` becomes [`BackendError::NotFound`].
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, non-2xx status, an error
    /// envelope, or an undecodable body.
    #[instrument(skip(self, args), fields(method = %method))]
    pub async fn call<R: DeserializeOwned>(
        &self,
        method: &str,
        args: serde_json::Value,
    ) -> Result<Option<R>, BackendError> {
        let mut request = self
            .inner
            .client
            .post(format!("{}/rpc/{method}", self.inner.endpoint))
            .json(&args);
        if let Some(key) = &self.inner.service_key {
            request = request.header(SERVICE_KEY_HEADER, key.expose_secret());
        }

        let response = request.send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(BackendError::RateLimited(retry_after));
        }

        let body = response.text().await?;

        let envelope: Envelope<R> = match serde_json::from_str(&body) {
            Ok(envelope) => envelope,
            Err(e) if status.is_success() => {
                tracing::error!(
                    error = %e,
                    body = %body.chars().take(500).collect::<String>(),
                    "Failed to parse backend response"
                );
                return Err(BackendError::Parse(e));
            }
            Err(_) => return Err(BackendError::Status(status.as_u16())),
        };

        if let Some(error) = envelope.error {
            debug!(code = %error.code, "Backend returned error envelope");
            return Err(if error.code == "not_found" {
                BackendError::NotFound(error.message)
            } else {
                BackendError::Rpc {
                    code: error.code,
                    message: error.message,
                }
            });
        }

        if !status.is_success() {
            return Err(BackendError::Status(status.as_u16()));
        }

        Ok(envelope.result)
    }
}

fn next_delay(current: Duration) -> Duration {
    (current * 2).min(PROBE_MAX_DELAY)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer, key: Option<&str>) -> BackendClient {
        BackendClient::new(&BackendConfig {
            url: format!("{}/", server.uri()),
            service_key: key.map(|k| SecretString::from(k.to_string())),
        })
        .unwrap()
    }

    #[test]
    fn test_backoff_doubles_and_caps() {
        assert_eq!(next_delay(Duration::from_millis(500)), Duration::from_secs(1));
        assert_eq!(next_delay(Duration::from_secs(20)), PROBE_MAX_DELAY);
        assert_eq!(next_delay(PROBE_MAX_DELAY), PROBE_MAX_DELAY);
    }

    #[tokio::test]
    async fn test_probe_marks_ready() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/health"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let client = client_for(&server, None);
        assert!(!client.is_ready());
        client.probe().await.unwrap();
        assert!(client.is_ready());
        assert!(client.clone().is_ready());
    }

    #[tokio::test]
    async fn test_probe_failure_stays_not_ready() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/health"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let client = client_for(&server, None);
        assert!(matches!(client.probe().await, Err(BackendError::Status(503))));
        assert!(!client.is_ready());
    }

    #[tokio::test]
    async fn test_call_sends_named_args_and_key() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/rpc/getVehicle"))
            .and(header("X-Service-Key", "svc-key"))
            .and(body_json(json!({"token": "T1", "id": 4})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"result": {"n": 1}})))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server, Some("svc-key"));
        let value: Option<serde_json::Value> = client
            .call("getVehicle", json!({"token": "T1", "id": 4}))
            .await
            .unwrap();
        assert_eq!(value, Some(json!({"n": 1})));
    }

    #[tokio::test]
    async fn test_call_null_result_is_none() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/rpc/getContacts"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"result": null})))
            .mount(&server)
            .await;

        let client = client_for(&server, None);
        let value: Option<Vec<serde_json::Value>> =
            client.call("getContacts", json!({})).await.unwrap();
        assert!(value.is_none());
    }

    #[tokio::test]
    async fn test_call_error_envelopes() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/rpc/getPost"))
            .respond_with(ResponseTemplate::new(200).set_body_json(
                json!({"error": {"code": "not_found", "message": "post 9"}}),
            ))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/rpc/createPost"))
            .respond_with(ResponseTemplate::new(400).set_body_json(
                json!({"error": {"code": "invalid_input", "message": "slug taken"}}),
            ))
            .mount(&server)
            .await;

        let client = client_for(&server, None);
        let not_found = client
            .call::<serde_json::Value>("getPost", json!({}))
            .await
            .unwrap_err();
        assert!(matches!(not_found, BackendError::NotFound(ref m) if m == "post 9"));

        let rejected = client
            .call::<serde_json::Value>("createPost", json!({}))
            .await
            .unwrap_err();
        assert!(matches!(rejected, BackendError::Rpc { ref code, .. } if code == "invalid_input"));
    }

    #[tokio::test]
    async fn test_call_rate_limited_and_bad_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/rpc/likePost"))
            .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "7"))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/rpc/recordVisit"))
            .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
            .mount(&server)
            .await;

        let client = client_for(&server, None);
        assert!(matches!(
            client.call::<bool>("likePost", json!({})).await,
            Err(BackendError::RateLimited(7))
        ));
        assert!(matches!(
            client.call::<bool>("recordVisit", json!({})).await,
            Err(BackendError::Status(502))
        ));
    }
}
