// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Test Harness
//!
//! Two harnesses share the same fault-injecting collaborators:
//!
//! - [`GateHarness`] drives [`AuthGate`] directly.
//! - [`TestApp`] drives the full router in-process with `oneshot`, so
//!   headers, cookies, and status codes go through the real middleware.

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, HeaderMap, HeaderName, Method, Request, StatusCode};
use axum::Router;
use axum_extra::extract::cookie::Cookie;
use serde_json::Value;
use tower::ServiceExt;

use gatehouse_api::{
    ApiConfig, ApiServerBuilder, AuthGate, AuthorizationPolicy, Claims, GateRequest,
    SessionManager, TokenCodec, TokenConfig, TokenKind, TokenPair, AUTH_HEADER, CSRF_HEADER,
    REFRESH_COOKIE,
};
use gatehouse_core::{UserId, UserRecord};

use super::fixtures::{ConfigFixtures, UserFixtures};
use super::mocks::{FaultyDirectory, FaultyStore, PlainTextVerifier};

// =============================================================================
// GateHarness
// =============================================================================

/// An [`AuthGate`] over fault-injecting collaborators seeded with the
/// fixture users.
pub struct GateHarness {
    /// The gate under test.
    pub gate: AuthGate,
    /// The codec the gate uses, for minting test tokens.
    pub codec: TokenCodec,
    /// Session manager over `store`.
    pub sessions: SessionManager,
    /// Backing credential store.
    pub store: Arc<FaultyStore>,
    /// Backing user directory.
    pub directory: Arc<FaultyDirectory>,
}

impl GateHarness {
    /// Create a harness with CSRF enforcement on.
    pub fn new() -> Self {
        Self::with_tokens(ConfigFixtures::token_config())
    }

    /// Create a harness around `tokens`.
    pub fn with_tokens(tokens: TokenConfig) -> Self {
        let codec = TokenCodec::new(tokens).expect("Failed to create codec");
        let store = Arc::new(FaultyStore::new());
        let directory = Arc::new(FaultyDirectory::with_users(UserFixtures::all()));
        let sessions = SessionManager::new(store.clone());
        let policy = AuthorizationPolicy::new(directory.clone());
        let gate = AuthGate::new(codec.clone(), sessions.clone(), policy);

        Self {
            gate,
            codec,
            sessions,
            store,
            directory,
        }
    }

    /// Toggle CSRF enforcement.
    pub fn with_csrf(mut self, enabled: bool) -> Self {
        self.gate = self.gate.with_csrf(enabled);
        self
    }

    /// Open a session for `user_id` the way login does and return its pair.
    pub async fn login(&self, user_id: UserId) -> TokenPair {
        let session = self
            .sessions
            .create_or_rotate(user_id)
            .await
            .expect("Failed to create session");
        self.codec.issue(&session).expect("Failed to issue tokens")
    }

    /// An access token for the live session of `user_id` that expired an
    /// hour ago, carrying `csrf`.
    pub fn expired_access_token(&self, user_id: UserId, csrf: &str) -> String {
        let session = self
            .store
            .session_for(user_id)
            .expect("No live session to mint a token for");
        let claims = Claims::for_session(&session, csrf, TokenKind::Access, 60, self.codec.issuer())
            .with_expiration(chrono::Utc::now().timestamp() - 3600);
        self.codec.encode(&claims).expect("Failed to encode claims")
    }
}

impl Default for GateHarness {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// TestApp
// =============================================================================

/// The full router over fault-injecting collaborators.
pub struct TestApp {
    router: Router,
    /// Backing credential store.
    pub store: Arc<FaultyStore>,
    /// Backing user directory.
    pub directory: Arc<FaultyDirectory>,
}

impl TestApp {
    /// Create an app with auth and CSRF enforcement on.
    pub fn new() -> Self {
        Self::with_config(ConfigFixtures::api_config())
    }

    /// Create an app from `config`, seeded with the fixture users.
    pub fn with_config(config: ApiConfig) -> Self {
        Self::with_users(config, UserFixtures::all())
    }

    /// Create an app from `config`, seeded with `users`.
    pub fn with_users(config: ApiConfig, users: Vec<UserRecord>) -> Self {
        let store = Arc::new(FaultyStore::new());
        let directory = Arc::new(FaultyDirectory::with_users(users));

        let server = ApiServerBuilder::new()
            .config(config)
            .credential_store(store.clone())
            .user_directory(directory.clone())
            .password_verifier(Arc::new(PlainTextVerifier))
            .build()
            .expect("Failed to build server");

        Self {
            router: server.router(),
            store,
            directory,
        }
    }

    /// Wrap an already-built router. Collaborators are fresh and unused.
    pub fn from_router(router: Router) -> Self {
        Self {
            router,
            store: Arc::new(FaultyStore::new()),
            directory: Arc::new(FaultyDirectory::default()),
        }
    }

    /// Send a request through the router.
    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Router is infallible");

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Failed to read body");
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };

        TestResponse {
            status,
            headers,
            body,
        }
    }

    /// POST /api/user/login.
    pub async fn login(&self, email: &str, password: &str) -> TestResponse {
        let body = serde_json::json!({ "email": email, "password": password });
        self.send(
            Request::builder()
                .method(Method::POST)
                .uri("/api/user/login")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .expect("Failed to build request"),
        )
        .await
    }

    /// Log `user` in with the fixture password and return the issued pair.
    pub async fn login_as(&self, user: &UserRecord) -> TokenPair {
        let response = self.login(&user.email, UserFixtures::PASSWORD).await;
        assert_eq!(response.status, StatusCode::OK, "login failed: {}", response.body);
        response.tokens().expect("login response carried no tokens")
    }

    /// GET `uri` presenting `credentials`.
    pub async fn get(&self, uri: &str, credentials: &GateRequest) -> TestResponse {
        self.send(request(Method::GET, uri, credentials)).await
    }

    /// POST `uri` presenting `credentials`.
    pub async fn post(&self, uri: &str, credentials: &GateRequest) -> TestResponse {
        self.send(request(Method::POST, uri, credentials)).await
    }
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}

/// Build a request carrying whichever credentials are present.
pub fn request(method: Method, uri: &str, credentials: &GateRequest) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);

    if let Some(access) = &credentials.access_token {
        builder = builder.header(AUTH_HEADER, access);
    }
    if let Some(refresh) = &credentials.refresh_token {
        builder = builder.header(header::COOKIE, format!("{}={}", REFRESH_COOKIE, refresh));
    }
    if let Some(csrf) = &credentials.csrf_header {
        builder = builder.header(CSRF_HEADER, csrf);
    }

    builder.body(Body::empty()).expect("Failed to build request")
}

// =============================================================================
// TestResponse
// =============================================================================

/// A buffered response.
#[derive(Debug)]
pub struct TestResponse {
    /// Status code.
    pub status: StatusCode,
    /// Response headers.
    pub headers: HeaderMap,
    /// JSON body, or `Null` if empty or not JSON.
    pub body: Value,
}

impl TestResponse {
    /// The `code` field of an error body.
    pub fn code(&self) -> Option<&str> {
        self.body.get("code").and_then(Value::as_str)
    }

    /// The token pair this response issued, if it issued a complete one.
    pub fn tokens(&self) -> Option<TokenPair> {
        let header = |name: HeaderName| {
            self.headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };

        Some(TokenPair {
            access_token: header(AUTH_HEADER)?,
            csrf_token: header(CSRF_HEADER)?,
            refresh_token: self.refresh_cookie()?.value().to_string(),
        })
    }

    /// The refresh cookie set by this response.
    pub fn refresh_cookie(&self) -> Option<Cookie<'static>> {
        self.headers
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .filter_map(|v| Cookie::parse(v.to_string()).ok())
            .find(|c| c.name() == REFRESH_COOKIE)
    }

    /// Returns `true` if this response expires the refresh cookie.
    pub fn clears_refresh_cookie(&self) -> bool {
        self.refresh_cookie()
            .and_then(|c| c.max_age())
            .is_some_and(|age| age.is_zero())
    }
}
