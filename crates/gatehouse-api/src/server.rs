// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! API server implementation.
//!
//! Routes are split into three groups, each with its own gate:
//!
//! | Prefix           | Gate                 |
//! |------------------|----------------------|
//! | `/api`           | none                 |
//! | `/api/private`   | standard privilege   |
//! | `/api/protected` | elevated privilege   |

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    http::{header, HeaderValue, Method, StatusCode},
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::info;

use gatehouse_core::{CredentialStore, PasswordVerifier, UserDirectory};

use crate::auth::Privilege;
use crate::config::ApiConfig;
use crate::cookies::{AUTH_HEADER, CSRF_HEADER};
use crate::error::{ApiError, ApiResult};
use crate::handlers;
use crate::middleware::AuthLayer;
use crate::state::{AppState, AppStateBuilder};

// =============================================================================
// ApiServer
// =============================================================================

/// The API server.
///
/// This is the main entry point for creating and running the HTTP server.
pub struct ApiServer {
    state: AppState,
    config: Arc<ApiConfig>,
}

impl ApiServer {
    /// Creates a new API server with the given state.
    pub fn new(state: AppState) -> Self {
        let config = state.config.clone();
        Self { state, config }
    }

    /// Returns the shared state.
    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Creates the router with all routes and middleware.
    pub fn router(&self) -> Router {
        let public = Router::new().route("/user/login", post(handlers::login));

        let private = Router::new()
            .route("/user/logout", post(handlers::logout))
            .route("/user/me", get(handlers::current_user))
            .route_layer(self.auth_layer(Privilege::Standard));

        let protected = Router::new()
            .route("/user/{id}", get(handlers::get_user))
            .route_layer(self.auth_layer(Privilege::Elevated));

        let api = public
            .nest("/private", private)
            .nest("/protected", protected);

        let middleware_stack = ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(TimeoutLayer::with_status_code(
                StatusCode::REQUEST_TIMEOUT,
                self.config.request_timeout,
            ))
            .layer(create_cors_layer(&self.config));

        Router::new()
            .route("/health", get(handlers::health))
            .nest("/api", api)
            .layer(middleware_stack)
            .with_state(self.state.clone())
    }

    fn auth_layer(&self, required: Privilege) -> AuthLayer {
        AuthLayer::new(self.state.gate.clone(), self.state.cookies.clone())
            .with_privilege(required)
            .with_enabled(self.config.auth.enabled)
    }

    /// Runs the server.
    pub async fn run(self) -> ApiResult<()> {
        self.run_with_shutdown(std::future::pending()).await
    }

    /// Runs the server with graceful shutdown.
    pub async fn run_with_shutdown(
        self,
        shutdown_signal: impl std::future::Future<Output = ()> + Send + 'static,
    ) -> ApiResult<()> {
        let addr = self.config.socket_addr();
        let router = self.router();

        info!(
            addr = %addr,
            auth_enabled = self.config.auth.enabled,
            csrf_enabled = self.config.auth.csrf_enabled,
            "Starting API server"
        );

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| ApiError::internal(format!("Failed to bind {}: {}", addr, e)))?;

        axum::serve(
            listener,
            router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown_signal)
        .await
        .map_err(|e| ApiError::internal(format!("Server error: {}", e)))?;

        info!("API server shutdown complete");

        Ok(())
    }

    /// Returns the server address.
    pub fn addr(&self) -> SocketAddr {
        self.config.socket_addr()
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Creates the CORS layer from configuration.
///
/// Credentials are allowed, and the token headers are both accepted and
/// exposed to browser scripts.
fn create_cors_layer(config: &ApiConfig) -> CorsLayer {
    let cors = &config.cors;

    let origins = if cors.allows_any_origin() {
        AllowOrigin::mirror_request()
    } else {
        let origins: Vec<HeaderValue> = cors
            .allowed_origins
            .iter()
            .filter_map(|origin| match HeaderValue::from_str(origin) {
                Ok(value) => Some(value),
                Err(_) => {
                    tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                    None
                }
            })
            .collect();
        AllowOrigin::list(origins)
    };

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            header::CONTENT_TYPE,
            header::ACCEPT,
            AUTH_HEADER,
            CSRF_HEADER,
        ])
        .expose_headers([AUTH_HEADER, CSRF_HEADER])
        .allow_credentials(true)
        .max_age(Duration::from_secs(cors.max_age))
}

// =============================================================================
// Server Builder
// =============================================================================

/// Builder for creating the API server.
#[derive(Default)]
pub struct ApiServerBuilder {
    state_builder: AppStateBuilder,
}

impl ApiServerBuilder {
    /// Creates a new server builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the configuration.
    pub fn config(mut self, config: ApiConfig) -> Self {
        self.state_builder = self.state_builder.config(config);
        self
    }

    /// Sets the credential store.
    pub fn credential_store(mut self, store: Arc<dyn CredentialStore>) -> Self {
        self.state_builder = self.state_builder.credential_store(store);
        self
    }

    /// Sets the user directory.
    pub fn user_directory(mut self, directory: Arc<dyn UserDirectory>) -> Self {
        self.state_builder = self.state_builder.user_directory(directory);
        self
    }

    /// Sets the password verifier.
    pub fn password_verifier(mut self, verifier: Arc<dyn PasswordVerifier>) -> Self {
        self.state_builder = self.state_builder.password_verifier(verifier);
        self
    }

    /// Builds the server.
    pub fn build(self) -> ApiResult<ApiServer> {
        let state = self.state_builder.build()?;
        Ok(ApiServer::new(state))
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::TokenConfig;
    use crate::config::{AuthSettings, CorsConfig};
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    fn test_config() -> ApiConfig {
        ApiConfig::default().with_auth(AuthSettings::new(TokenConfig::new(
            "test-secret-key-that-is-long-enough",
        )))
    }

    #[test]
    fn test_server_builder() {
        let server = ApiServerBuilder::new()
            .config(test_config())
            .build()
            .unwrap();

        assert_eq!(server.addr().port(), 8080);
    }

    #[tokio::test]
    async fn test_health_route() {
        let server = ApiServerBuilder::new().config(test_config()).build().unwrap();

        let response = server
            .router()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_private_route_is_gated() {
        let server = ApiServerBuilder::new().config(test_config()).build().unwrap();

        let response = server
            .router()
            .oneshot(Request::get("/api/private/user/me").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_cors_preflight_exposes_token_headers() {
        let config = test_config().with_cors(CorsConfig::strict(vec![
            "https://app.example.com".to_string(),
        ]));
        let server = ApiServerBuilder::new().config(config).build().unwrap();

        let response = server
            .router()
            .oneshot(
                Request::builder()
                    .method(Method::OPTIONS)
                    .uri("/api/user/login")
                    .header(header::ORIGIN, "https://app.example.com")
                    .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        let headers = response.headers();
        assert_eq!(
            headers.get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
            "https://app.example.com"
        );
        assert_eq!(
            headers.get(header::ACCESS_CONTROL_ALLOW_CREDENTIALS).unwrap(),
            "true"
        );
    }
}
