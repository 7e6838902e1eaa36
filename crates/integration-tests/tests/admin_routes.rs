//! Admin router, route guard and session lifecycle against a mocked backend.
//!
//! Run with: cargo test -p showroom-integration-tests --test admin_routes

#![allow(clippy::unwrap_used)]

mod common;

use axum::Router;
use axum::http::{StatusCode, header};
use secrecy::SecretString;
use serde_json::json;
use tower::ServiceExt;
use tower_sessions::MemoryStore;
use wiremock::MockServer;

use showroom_admin::config::AdminConfig;
use showroom_admin::middleware::session_layer;
use showroom_admin::services::{AuthMode, BypassCredentials};
use showroom_admin::state::AppState;
use showroom_backend::{BackendClient, BackendConfig, SESSION_PROBE_METHOD};

use common::{body_text, collect_cookies, get, location, post_form, rpc, vehicle_json};

fn admin_config(server: &MockServer, auth_mode: AuthMode) -> AdminConfig {
    AdminConfig {
        database_url: SecretString::from("postgres://localhost/unused"),
        host: "127.0.0.1".parse().unwrap(),
        port: 3001,
        base_url: "http://localhost:3001".to_string(),
        backend: BackendConfig {
            url: server.uri(),
            service_key: None,
        },
        auth_mode,
        sentry_dsn: None,
        sentry_environment: None,
        sentry_sample_rate: 1.0,
        sentry_traces_sample_rate: 0.0,
        tls: None,
    }
}

fn admin(server: &MockServer, backend: BackendClient, auth_mode: AuthMode) -> Router {
    let state = AppState::with_backend(admin_config(server, auth_mode), backend);
    showroom_admin::build_app(state, session_layer(MemoryStore::default(), false))
}

/// Sign in through the form and return the cookie jar.
async fn sign_in(app: &Router) -> Vec<(String, String)> {
    let mut jar = Vec::new();
    let response = app
        .clone()
        .oneshot(post_form(
            "/admin/login",
            "email=staff%40dealer.test&password=hunter22",
            &jar,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/admin");
    collect_cookies(&mut jar, response.headers());
    jar
}

#[tokio::test]
async fn test_guard_redirects_anonymous_visitors() {
    let server = MockServer::start().await;
    let app = admin(&server, common::ready_backend(&server).await, AuthMode::Normal);

    let response = app.oneshot(get("/admin/vehicles", &[])).await.unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/admin/login");
}

#[tokio::test]
async fn test_login_page_is_public() {
    let server = MockServer::start().await;
    let app = admin(&server, common::backend_for(&server), AuthMode::Normal);

    let response = app.oneshot(get("/admin/login", &[])).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_login_rejects_wrong_credentials() {
    let server = MockServer::start().await;
    rpc("adminLogin", json!(null)).mount(&server).await;
    let app = admin(&server, common::ready_backend(&server).await, AuthMode::Normal);

    let response = app
        .oneshot(post_form(
            "/admin/login",
            "email=staff%40dealer.test&password=wrong",
            &[],
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(body_text(response).await.contains("staff@dealer.test"));
}

#[tokio::test]
async fn test_login_before_backend_ready() {
    let server = MockServer::start().await;
    rpc("adminLogin", json!({ "token": "T1", "role": "admin" }))
        .expect(0)
        .mount(&server)
        .await;
    let app = admin(&server, common::backend_for(&server), AuthMode::Normal);

    let response = app
        .oneshot(post_form(
            "/admin/login",
            "email=staff%40dealer.test&password=hunter22",
            &[],
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_list_is_cached_between_pages() {
    let server = MockServer::start().await;
    rpc("adminLogin", json!({ "token": "T1", "role": "admin" }))
        .mount(&server)
        .await;
    rpc(SESSION_PROBE_METHOD, json!([])).mount(&server).await;
    rpc(
        "getAllVehicles",
        json!([vehicle_json(1, "Toyota", "Corolla", "95000")]),
    )
    .expect(1)
    .mount(&server)
    .await;

    let app = admin(&server, common::ready_backend(&server).await, AuthMode::Normal);
    let mut jar = sign_in(&app).await;

    let first = app.clone().oneshot(get("/admin/vehicles", &jar)).await.unwrap();
    assert_eq!(first.status(), StatusCode::OK);
    collect_cookies(&mut jar, first.headers());
    assert!(body_text(first).await.contains("Corolla"));

    let second = app.oneshot(get("/admin/vehicles", &jar)).await.unwrap();
    assert_eq!(second.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_expired_session_returns_to_login() {
    let server = MockServer::start().await;
    rpc("adminLogin", json!({ "token": "T1", "role": "admin" }))
        .mount(&server)
        .await;
    rpc(SESSION_PROBE_METHOD, json!(null)).mount(&server).await;
    rpc("getAllVehicles", json!([])).expect(0).mount(&server).await;

    let app = admin(&server, common::ready_backend(&server).await, AuthMode::Normal);
    let mut jar = sign_in(&app).await;

    let response = app.clone().oneshot(get("/admin/vehicles", &jar)).await.unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/admin/login");
    collect_cookies(&mut jar, response.headers());

    // The cleared session stays cleared.
    let again = app.oneshot(get("/admin/login", &jar)).await.unwrap();
    assert_eq!(again.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_guard_shows_loading_until_backend_ready() {
    let server = MockServer::start().await;
    rpc("adminLogin", json!({ "token": "T1", "role": "admin" }))
        .mount(&server)
        .await;

    // Bypass mode with an unprobed backend cannot settle yet.
    let mode = AuthMode::Bypass(BypassCredentials {
        email: "debug@dealer.test".to_string(),
        password: SecretString::from("pw"),
    });
    let app = admin(&server, common::backend_for(&server), mode);

    let response = app.oneshot(get("/admin/vehicles", &[])).await.unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert!(response.headers().contains_key(header::REFRESH));
}

#[tokio::test]
async fn test_logout_clears_session() {
    let server = MockServer::start().await;
    rpc("adminLogin", json!({ "token": "T1", "role": "admin" }))
        .mount(&server)
        .await;
    rpc("adminLogout", json!(true)).expect(1).mount(&server).await;
    rpc(SESSION_PROBE_METHOD, json!([])).mount(&server).await;

    let app = admin(&server, common::ready_backend(&server).await, AuthMode::Normal);
    let mut jar = sign_in(&app).await;

    let response = app
        .clone()
        .oneshot(post_form("/admin/logout", "", &jar))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/admin/login");
    collect_cookies(&mut jar, response.headers());

    let after = app.oneshot(get("/admin/vehicles", &jar)).await.unwrap();
    assert_eq!(after.status(), StatusCode::SEE_OTHER);
}

#[tokio::test]
async fn test_bypass_renders_dashboard_without_login() {
    let server = MockServer::start().await;
    rpc("adminLogin", json!({ "token": "T-debug", "role": "admin" }))
        .expect(1)
        .mount(&server)
        .await;
    rpc(SESSION_PROBE_METHOD, json!([])).mount(&server).await;
    for list in [
        "getAllVehicles",
        "getAllPromotions",
        "getAllComments",
        "getAllTestimonials",
    ] {
        rpc(list, json!([])).mount(&server).await;
    }
    rpc("getVisitorStats", json!({ "totalVisits": 0, "pages": [] }))
        .mount(&server)
        .await;

    let mode = AuthMode::Bypass(BypassCredentials {
        email: "debug@dealer.test".to_string(),
        password: SecretString::from("pw"),
    });
    let app = admin(&server, common::ready_backend(&server).await, mode);

    let response = app.oneshot(get("/admin", &[])).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
