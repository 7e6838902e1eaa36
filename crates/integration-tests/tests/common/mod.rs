//! Shared helpers for router tests.

#![allow(dead_code, clippy::unwrap_used)]

use axum::body::{Body, to_bytes};
use axum::http::{HeaderMap, Request, Response, header};
use serde_json::{Value, json};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use showroom_backend::{BackendClient, BackendConfig};
use showroom_core::{
    BlogPost, BlogPostId, FuelType, Transmission, Vehicle, VehicleId, VehicleStatus,
};

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

/// Answer `rpc_method` with `result` wrapped in the success envelope.
pub fn rpc(rpc_method: &str, result: Value) -> Mock {
    Mock::given(method("POST"))
        .and(path(format!("/rpc/{rpc_method}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "result": result })))
}

/// Fold every `Set-Cookie` of `response` into `jar` (name to `name=value`).
pub fn collect_cookies(jar: &mut Vec<(String, String)>, headers: &HeaderMap) {
    for value in headers.get_all(header::SET_COOKIE) {
        let Ok(raw) = value.to_str() else { continue };
        let pair = raw.split(';').next().unwrap_or_default().trim();
        let Some((name, _)) = pair.split_once('=') else { continue };
        jar.retain(|(existing, _)| existing != name);
        let cleared = raw.contains("Max-Age=0");
        if !cleared {
            jar.push((name.to_string(), pair.to_string()));
        }
    }
}

/// `Cookie` header value for the jar.
pub fn cookie_header(jar: &[(String, String)]) -> String {
    jar.iter()
        .map(|(_, pair)| pair.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

/// GET request carrying the jar's cookies.
pub fn get(uri: &str, jar: &[(String, String)]) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(header::COOKIE, cookie_header(jar))
        .body(Body::empty())
        .unwrap()
}

/// Form POST carrying the jar's cookies and a client IP for the rate limiter.
pub fn post_form(uri: &str, body: &str, jar: &[(String, String)]) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .header(header::COOKIE, cookie_header(jar))
        .header("x-real-ip", "203.0.113.7")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Response body as text.
pub async fn body_text(response: Response<Body>) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// `Location` header of a redirect.
pub fn location(response: &Response<Body>) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}

/// A published vehicle as the backend returns it.
pub fn vehicle_json(id: u64, make: &str, model: &str, price: &str) -> Value {
    let vehicle = Vehicle {
        id: VehicleId::from(id),
        make: make.to_string(),
        model: model.to_string(),
        year: 2021,
        price: price.parse().unwrap(),
        mileage_km: 42_000,
        fuel_type: FuelType::Flex,
        transmission: Transmission::Automatic,
        color: "Silver".to_string(),
        description: "One owner.".to_string(),
        image_urls: Vec::new(),
        status: VehicleStatus::Available,
        featured: id == 1,
        created_at: None,
    };
    serde_json::to_value(vehicle).unwrap()
}

/// A published blog post as the backend returns it.
pub fn post_json(id: u64, slug: &str, likes: u64) -> Value {
    let post = BlogPost {
        id: BlogPostId::from(id),
        title: "Choosing your first car".to_string(),
        slug: slug.to_string(),
        excerpt: "A short guide.".to_string(),
        body: "Start with **your budget**.".to_string(),
        cover_image_url: None,
        author: "Sales team".to_string(),
        tags: vec!["guides".to_string()],
        published: true,
        published_at: None,
        likes,
    };
    serde_json::to_value(post).unwrap()
}
