// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # HTTP Integration Tests
//!
//! Full router tests: requests go through CORS, the auth middleware and the
//! handlers in-process.
//!
//! ## Test Categories
//!
//! - `test_login_*`: login outcomes and issued credentials
//! - `test_scenario_*`: end-to-end request flows
//! - `test_logout_*`: session teardown
//! - `test_route_*`: route groups and handlers
//! - `test_cors_*`: preflight handling
//! - `test_disabled_*`: the auth switch

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use serde_json::json;

use gatehouse_api::{ApiServerBuilder, AuthSettings, CorsConfig, AUTH_HEADER};
use gatehouse_core::{Argon2Verifier, MemoryCredentialStore, MemoryUserDirectory};
use gatehouse_tests::prelude::*;

const ME: &str = "/api/private/user/me";
const LOGOUT: &str = "/api/private/user/logout";

// =============================================================================
// Login
// =============================================================================

#[tokio::test]
async fn test_login_issues_full_credentials() {
    let app = TestApp::new();
    let response = app
        .login("alice@example.com", UserFixtures::PASSWORD)
        .await;

    let tokens = response.assert_ok();
    assert!(!tokens.csrf_token.is_empty());
    assert_eq!(response.body["status"], 200);
    assert_eq!(response.body["data"]["firstname"], "Alice");

    let cookie = response.refresh_cookie().unwrap();
    assert_eq!(cookie.http_only(), Some(true));
    assert_eq!(app.store.session_count(), 1);
}

#[tokio::test]
async fn test_login_email_is_case_insensitive() {
    let app = TestApp::new();
    app.login("Alice@Example.COM", UserFixtures::PASSWORD)
        .await
        .assert_ok();
}

#[tokio::test]
async fn test_login_unknown_email() {
    let app = TestApp::new();
    let response = app
        .login("nobody@example.com", UserFixtures::PASSWORD)
        .await;

    response.assert_bad_request("EMAIL_NOT_FOUND");
    assert!(response.tokens().is_none());
    assert_eq!(app.store.session_count(), 0);
}

#[tokio::test]
async fn test_login_wrong_password() {
    let app = TestApp::new();
    let response = app.login("alice@example.com", "hunter2").await;

    response.assert_bad_request("WRONG_PASSWORD");
    assert_eq!(app.store.session_count(), 0);
}

#[tokio::test]
async fn test_login_malformed_body() {
    let app = TestApp::new();

    let response = app
        .send(
            Request::builder()
                .method(Method::POST)
                .uri("/api/user/login")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"email":"alice@example.com"}"#))
                .unwrap(),
        )
        .await;
    response.assert_bad_request("EMAIL_OR_PASSWORD");

    let response = app.login("", "").await;
    response.assert_bad_request("EMAIL_OR_PASSWORD");
}

#[tokio::test]
async fn test_login_twice_supersedes_first_session() {
    let app = TestApp::new();
    let user = UserFixtures::standard();

    let first = app.login_as(&user).await;
    let second = app.login_as(&user).await;
    assert_eq!(app.store.session_count(), 1);

    app.get(ME, &GateRequest::from_pair(&first))
        .await
        .assert_rejected(RejectReason::InvalidIdentifier);
    app.get(ME, &GateRequest::from_pair(&second))
        .await
        .assert_ok();
}

#[tokio::test]
async fn test_login_with_argon2_hash() {
    let user = UserFixtures::hashed(UserFixtures::standard());
    let server = ApiServerBuilder::new()
        .config(ConfigFixtures::api_config())
        .credential_store(Arc::new(MemoryCredentialStore::new()))
        .user_directory(Arc::new(MemoryUserDirectory::with_users([user])))
        .password_verifier(Arc::new(Argon2Verifier::new()))
        .build()
        .unwrap();
    let app = TestApp::from_router(server.router());

    app.login("alice@example.com", UserFixtures::PASSWORD)
        .await
        .assert_ok();
    app.login("alice@example.com", "not the password")
        .await
        .assert_bad_request("WRONG_PASSWORD");
}

#[tokio::test]
async fn test_login_store_failure() {
    let app = TestApp::new();
    app.store.fail_create(true);

    let response = app
        .login("alice@example.com", UserFixtures::PASSWORD)
        .await;
    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(response.tokens().is_none());
}

// =============================================================================
// Scenarios
// =============================================================================

#[tokio::test]
async fn test_scenario_a_immediate_request_rotates() {
    let app = TestApp::new();
    let login = app.login_as(&UserFixtures::standard()).await;

    let response = app.get(ME, &GateRequest::from_pair(&login)).await;
    let rotated = response.assert_ok();

    assert_rotated(&login, &rotated);
    assert_eq!(response.body["data"]["user_id"], 1);
    assert_eq!(app.store.session_count(), 1);
}

#[tokio::test]
async fn test_scenario_b_expired_access_falls_back_to_refresh() {
    let app = TestApp::with_config(ConfigFixtures::api_config_with(
        ConfigFixtures::short_lived_token_config(),
    ));
    let login = app.login_as(&UserFixtures::standard()).await;

    tokio::time::sleep(Duration::from_millis(2100)).await;

    // The stale access header is still presented; the refresh cookie carries
    // the request.
    let response = app.get(ME, &GateRequest::from_pair(&login)).await;
    let rotated = response.assert_ok();
    assert_rotated(&login, &rotated);

    // Without the header the request is rejected before any token is read.
    let fresh = app.login_as(&UserFixtures::standard()).await;
    let response = app
        .get(
            ME,
            &GateRequest::new()
                .with_refresh_token(&fresh.refresh_token)
                .with_csrf(&fresh.csrf_token),
        )
        .await;
    response.assert_rejected(RejectReason::AuthCookieMissing);
}

#[tokio::test]
async fn test_scenario_c_replay_after_logout() {
    let app = TestApp::new();
    let login = app.login_as(&UserFixtures::standard()).await;

    let logout = app.post(LOGOUT, &GateRequest::from_pair(&login)).await;
    assert_eq!(logout.status, StatusCode::OK);
    assert_eq!(app.store.session_count(), 0);

    let replay = app.get(ME, &GateRequest::from_pair(&login)).await;
    assert_ne!(replay.status, StatusCode::OK);
    replay.assert_rejected(RejectReason::InvalidIdentifier);
    assert!(replay.clears_refresh_cookie());
}

#[tokio::test]
async fn test_scenario_d_standard_user_on_elevated_route() {
    let app = TestApp::new();
    let login = app.login_as(&UserFixtures::standard()).await;

    let response = app
        .get("/api/protected/user/1", &GateRequest::from_pair(&login))
        .await;
    response.assert_rejected(RejectReason::ProtectedRouted);
    assert_eq!(response.status, StatusCode::FORBIDDEN);
}

// =============================================================================
// Rejections Through The Router
// =============================================================================

#[tokio::test]
async fn test_route_missing_credentials() {
    let app = TestApp::new();
    let login = app.login_as(&UserFixtures::standard()).await;

    app.get(ME, &GateRequest::new())
        .await
        .assert_rejected(RejectReason::AuthCookieMissing);

    app.get(
        ME,
        &GateRequest::new()
            .with_access_token(&login.access_token)
            .with_csrf(&login.csrf_token),
    )
    .await
    .assert_rejected(RejectReason::RefreshCookieMissing);
}

#[tokio::test]
async fn test_route_csrf_mismatch() {
    let app = TestApp::new();
    let login = app.login_as(&UserFixtures::standard()).await;

    let response = app
        .get(ME, &GateRequest::from_pair(&login).with_csrf("wrong"))
        .await;
    response.assert_rejected(RejectReason::CsrfTokenInvalid);
    assert!(!response.clears_refresh_cookie());
}

#[tokio::test]
async fn test_route_csrf_disabled() {
    let settings = AuthSettings::new(ConfigFixtures::token_config()).with_csrf(false);
    let app = TestApp::with_config(gatehouse_api::ApiConfig::default().with_auth(settings));
    let login = app.login_as(&UserFixtures::standard()).await;

    app.get(ME, &GateRequest::from_pair(&login).with_csrf("wrong"))
        .await
        .assert_ok();
}

#[tokio::test]
async fn test_route_garbage_tokens() {
    let app = TestApp::new();
    let credentials = GateRequest::new()
        .with_access_token("garbage")
        .with_refresh_token("garbage")
        .with_csrf("garbage");

    let response = app.get(ME, &credentials).await;
    response.assert_rejected(RejectReason::TokenInvalid);
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_route_store_outage() {
    let app = TestApp::new();
    let login = app.login_as(&UserFixtures::standard()).await;

    app.store.fail_find(true);
    app.get(ME, &GateRequest::from_pair(&login))
        .await
        .assert_rejected(RejectReason::InternalServerError);
}

#[tokio::test]
async fn test_route_rejection_body_shape() {
    let app = TestApp::new();
    let response = app.get(ME, &GateRequest::new()).await;

    assert_eq!(response.body["status"], 401);
    assert_eq!(response.body["code"], "AUTH_COOKIE_MISSING");
    assert!(response.body["title"].is_string());
    assert!(response.body["detail"].is_string());
}

// =============================================================================
// Logout
// =============================================================================

#[tokio::test]
async fn test_logout_clears_cookie_and_issues_nothing() {
    let app = TestApp::new();
    let login = app.login_as(&UserFixtures::standard()).await;

    let response = app.post(LOGOUT, &GateRequest::from_pair(&login)).await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.clears_refresh_cookie());
    assert!(response.headers.get(AUTH_HEADER).is_none());
    assert!(response.tokens().is_none());
}

#[tokio::test]
async fn test_logout_requires_authentication() {
    let app = TestApp::new();
    app.login_as(&UserFixtures::standard()).await;

    app.post(LOGOUT, &GateRequest::new())
        .await
        .assert_rejected(RejectReason::AuthCookieMissing);
    assert_eq!(app.store.session_count(), 1);
}

// =============================================================================
// Route Groups
// =============================================================================

#[tokio::test]
async fn test_route_health_is_public() {
    let app = TestApp::new();
    let response = app.get("/health", &GateRequest::new()).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["status"], "ok");
}

#[tokio::test]
async fn test_route_protected_user_lookup() {
    let app = TestApp::new();
    let login = app.login_as(&UserFixtures::elevated()).await;

    let response = app
        .get("/api/protected/user/1", &GateRequest::from_pair(&login))
        .await;
    let rotated = response.assert_ok();
    assert_eq!(response.body["data"]["email"], "alice@example.com");
    assert!(response.body["data"].get("password_hash").is_none());

    let response = app
        .get("/api/protected/user/999", &GateRequest::from_pair(&rotated))
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.code(), Some("NOT_FOUND"));
}

#[tokio::test]
async fn test_route_protected_directory_outage() {
    let app = TestApp::new();
    let login = app.login_as(&UserFixtures::elevated()).await;

    app.directory.fail_lookups(true);
    app.get("/api/protected/user/1", &GateRequest::from_pair(&login))
        .await
        .assert_rejected(RejectReason::InternalServerError);
}

#[tokio::test]
async fn test_route_unknown_path() {
    let app = TestApp::new();
    let response = app.get("/api/nowhere", &GateRequest::new()).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

// =============================================================================
// CORS
// =============================================================================

#[tokio::test]
async fn test_cors_preflight_allows_token_headers() {
    let config = ConfigFixtures::api_config().with_cors(CorsConfig {
        allowed_origins: vec!["https://app.example.com".to_string()],
        max_age: 600,
    });
    let app = TestApp::with_config(config);

    let response = app
        .send(
            Request::builder()
                .method(Method::OPTIONS)
                .uri(ME)
                .header(header::ORIGIN, "https://app.example.com")
                .header(header::ACCESS_CONTROL_REQUEST_METHOD, "GET")
                .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "x-auth-token,x-csrf-token")
                .body(Body::empty())
                .unwrap(),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        response.headers[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "https://app.example.com"
    );
    assert_eq!(
        response.headers[header::ACCESS_CONTROL_ALLOW_CREDENTIALS],
        "true"
    );
}

#[tokio::test]
async fn test_cors_exposes_rotated_headers() {
    let app = TestApp::new();
    let login = app.login_as(&UserFixtures::standard()).await;

    let mut request = request(Method::GET, ME, &GateRequest::from_pair(&login));
    request.headers_mut().insert(
        header::ORIGIN,
        "https://app.example.com".parse().unwrap(),
    );
    let response = app.send(request).await;
    response.assert_ok();

    let exposed = response.headers[header::ACCESS_CONTROL_EXPOSE_HEADERS]
        .to_str()
        .unwrap()
        .to_ascii_lowercase();
    assert!(exposed.contains("x-auth-token"));
    assert!(exposed.contains("x-csrf-token"));
}

// =============================================================================
// Auth Switch
// =============================================================================

#[tokio::test]
async fn test_disabled_gate_passes_requests_through() {
    let settings = AuthSettings::new(ConfigFixtures::token_config()).with_enabled(false);
    let app = TestApp::with_config(gatehouse_api::ApiConfig::default().with_auth(settings));

    let response = app
        .get("/api/protected/user/2", &GateRequest::new())
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["email"], "root@example.com");
    assert!(response.tokens().is_none());
    assert_eq!(app.store.find_calls(), 0);
}

#[tokio::test]
async fn test_disabled_gate_has_no_principal() {
    let settings = AuthSettings::new(ConfigFixtures::token_config()).with_enabled(false);
    let app = TestApp::with_config(gatehouse_api::ApiConfig::default().with_auth(settings));

    // Handlers that need a principal still refuse without one.
    app.get(ME, &GateRequest::new())
        .await
        .assert_rejected(RejectReason::AuthCookieMissing);
}

#[tokio::test]
async fn test_disabled_login_still_works() {
    let settings = AuthSettings::new(ConfigFixtures::token_config()).with_enabled(false);
    let app = TestApp::with_config(gatehouse_api::ApiConfig::default().with_auth(settings));

    let response = app
        .login("root@example.com", UserFixtures::PASSWORD)
        .await;
    response.assert_ok();
    assert_eq!(response.body, json!({"status": 200, "data": {"firstname": "Root"}}));
}
