//! Public site router against a mocked backend.
//!
//! Run with: cargo test -p showroom-integration-tests --test site_routes

#![allow(clippy::unwrap_used)]

mod common;

use std::time::Duration;

use axum::Router;
use axum::http::StatusCode;
use secrecy::SecretString;
use serde_json::json;
use tower::ServiceExt;
use tower_sessions::MemoryStore;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use showroom_backend::BackendConfig;
use showroom_site::config::{CreditConfig, DealerConfig, SiteConfig};
use showroom_site::middleware::session_layer;
use showroom_site::state::AppState;

use common::{body_text, collect_cookies, get, location, post_form, post_json, rpc, vehicle_json};

fn site_config(server: &MockServer) -> SiteConfig {
    SiteConfig {
        database_url: SecretString::from("postgres://localhost/unused"),
        host: "127.0.0.1".parse().unwrap(),
        port: 3000,
        base_url: "http://localhost:3000".to_string(),
        backend: BackendConfig {
            url: server.uri(),
            service_key: None,
        },
        dealer: DealerConfig::default(),
        credit: CreditConfig {
            annual_rate: "0.12".parse().unwrap(),
            max_term_months: 72,
        },
        sentry_dsn: None,
        sentry_environment: None,
        sentry_sample_rate: 1.0,
        sentry_traces_sample_rate: 0.0,
    }
}

fn site(server: &MockServer) -> Router {
    let state = AppState::with_backend(site_config(server), common::backend_for(server));
    showroom_site::build_app(state, session_layer(MemoryStore::default(), false))
}

/// Let background visit recording reach the mock before it verifies.
async fn settle() {
    tokio::time::sleep(Duration::from_millis(200)).await;
}

#[tokio::test]
async fn test_health_is_ok_without_backend() {
    let server = MockServer::start().await;
    let response = site(&server).oneshot(get("/health", &[])).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "ok");
}

#[tokio::test]
async fn test_readiness_waits_for_backend_probe() {
    let server = MockServer::start().await;
    let response = site(&server)
        .oneshot(get("/health/ready", &[]))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_unknown_path_is_not_counted() {
    let server = MockServer::start().await;
    rpc("recordVisit", json!(null))
        .expect(0)
        .mount(&server)
        .await;

    let response = site(&server).oneshot(get("/nope", &[])).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    settle().await;
}

#[tokio::test]
async fn test_unknown_vehicle_is_not_found() {
    let server = MockServer::start().await;
    rpc("getPublishedVehicles", json!([vehicle_json(1, "Toyota", "Corolla", "95000")]))
        .mount(&server)
        .await;
    rpc("getPublicVehicle", json!(null)).mount(&server).await;

    let response = site(&server)
        .oneshot(get("/vehicles/99", &[]))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_catalog_filters_by_make() {
    let server = MockServer::start().await;
    rpc(
        "getPublishedVehicles",
        json!([
            vehicle_json(1, "Toyota", "Corolla", "95000"),
            vehicle_json(2, "Honda", "Civic", "88000"),
        ]),
    )
    .mount(&server)
    .await;

    let response = site(&server)
        .oneshot(get("/vehicles?make=honda&fuel=&max_price=", &[]))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains("Civic"));
    assert!(!body.contains("Corolla"));
}

#[tokio::test]
async fn test_visit_counted_once_per_session() {
    let server = MockServer::start().await;
    rpc("getActivePromotions", json!([])).mount(&server).await;
    Mock::given(method("POST"))
        .and(path("/rpc/recordVisit"))
        .and(body_partial_json(json!({ "page": "/promotions" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "result": null })))
        .expect(1)
        .mount(&server)
        .await;

    let app = site(&server);
    let mut jar = Vec::new();

    let first = app.clone().oneshot(get("/promotions", &jar)).await.unwrap();
    assert_eq!(first.status(), StatusCode::OK);
    collect_cookies(&mut jar, first.headers());
    assert!(!jar.is_empty(), "first visit should start a session");

    let second = app.oneshot(get("/promotions", &jar)).await.unwrap();
    assert_eq!(second.status(), StatusCode::OK);
    settle().await;
}

#[tokio::test]
async fn test_contact_submission_redirects() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/rpc/submitContact"))
        .and(body_partial_json(json!({ "input": { "name": "Ana", "email": "ana@example.com" } })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "result": null })))
        .expect(1)
        .mount(&server)
        .await;

    let response = site(&server)
        .oneshot(post_form(
            "/contact",
            "name=Ana&email=ana%40example.com&phone=&message=Is+it+still+available%3F&vehicle_id=",
            &[],
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/contact?sent=1");
}

#[tokio::test]
async fn test_contact_rejects_invalid_email() {
    let server = MockServer::start().await;
    rpc("submitContact", json!(null))
        .expect(0)
        .mount(&server)
        .await;

    let response = site(&server)
        .oneshot(post_form(
            "/contact",
            "name=Ana&email=not-an-email&message=Hello",
            &[],
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body_text(response).await.contains("not-an-email"));
}

#[tokio::test]
async fn test_contact_backend_failure_keeps_input() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/rpc/submitContact"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let response = site(&server)
        .oneshot(post_form(
            "/contact",
            "name=Ana&email=ana%40example.com&message=Call+me+after+six",
            &[],
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    assert!(body_text(response).await.contains("Call me after six"));
}

#[tokio::test]
async fn test_credit_simulation_shows_payment() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/rpc/submitCreditSimulation"))
        .and(body_partial_json(json!({ "input": { "termMonths": 36 } })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "result": null })))
        .expect(1)
        .mount(&server)
        .await;

    let response = site(&server)
        .oneshot(post_form(
            "/credit",
            "name=Ana&email=ana%40example.com&price=20%2C000&down_payment=&term_months=36&vehicle_id=",
            &[],
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("$664.29"));
}

#[tokio::test]
async fn test_credit_rejects_down_payment_over_price() {
    let server = MockServer::start().await;
    rpc("submitCreditSimulation", json!(null))
        .expect(0)
        .mount(&server)
        .await;

    let response = site(&server)
        .oneshot(post_form(
            "/credit",
            "name=Ana&email=ana%40example.com&price=20000&down_payment=25000&term_months=36",
            &[],
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_credit_rejects_amounts_too_large_to_finance() {
    let server = MockServer::start().await;
    rpc("submitCreditSimulation", json!(null))
        .expect(0)
        .mount(&server)
        .await;

    let response = site(&server)
        .oneshot(post_form(
            "/credit",
            "name=Ana&email=ana%40example.com&price=79228162514264337593543950335&down_payment=0&term_months=1",
            &[],
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body_text(response).await.contains("cannot be financed"));
}

#[tokio::test]
async fn test_like_counts_once_per_session() {
    let server = MockServer::start().await;
    rpc("getPublishedPosts", json!([post_json(7, "first-car", 3)]))
        .mount(&server)
        .await;
    rpc("likePost", json!(4)).expect(1).mount(&server).await;

    let app = site(&server);
    let mut jar = Vec::new();

    let first = app
        .clone()
        .oneshot(post_form("/blog/first-car/like", "", &jar))
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&first), "/blog/first-car#likes");
    collect_cookies(&mut jar, first.headers());

    let second = app
        .oneshot(post_form("/blog/first-car/like", "", &jar))
        .await
        .unwrap();
    assert_eq!(second.status(), StatusCode::SEE_OTHER);
}

#[tokio::test]
async fn test_like_unknown_post_is_not_found() {
    let server = MockServer::start().await;
    rpc("getPublishedPosts", json!([])).mount(&server).await;
    rpc("getPostBySlug", json!(null)).mount(&server).await;
    rpc("likePost", json!(1)).expect(0).mount(&server).await;

    let response = site(&server)
        .oneshot(post_form("/blog/missing/like", "", &[]))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_static_assets_are_not_counted() {
    let server = MockServer::start().await;
    rpc("recordVisit", json!(null))
        .expect(0)
        .mount(&server)
        .await;

    let _ = site(&server)
        .oneshot(get("/static/css/main.css", &[]))
        .await
        .unwrap();
    settle().await;
}
