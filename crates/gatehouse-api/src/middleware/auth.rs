// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Auth gate middleware.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use axum::{
    body::Body,
    http::Request,
    response::{IntoResponse, Response},
};
use tower::{Layer, Service};
use tracing::Instrument;

use crate::auth::{AuthGate, Privilege, RejectReason};
use crate::cookies::{self, CookieConfig, SessionEnded};
use crate::error::ApiError;

// =============================================================================
// AuthLayer
// =============================================================================

/// Layer that runs the auth gate in front of a route group.
///
/// On success the principal is inserted into request extensions and the
/// rotated tokens are written onto the response. On rejection the inner
/// service is never called.
#[derive(Clone)]
pub struct AuthLayer {
    gate: Arc<AuthGate>,
    cookies: Arc<CookieConfig>,
    required: Privilege,
    enabled: bool,
}

impl AuthLayer {
    /// Creates a new auth layer requiring standard privilege.
    pub fn new(gate: Arc<AuthGate>, cookies: Arc<CookieConfig>) -> Self {
        Self {
            gate,
            cookies,
            required: Privilege::Standard,
            enabled: true,
        }
    }

    /// Sets the privilege the wrapped routes require.
    pub fn with_privilege(mut self, required: Privilege) -> Self {
        self.required = required;
        self
    }

    /// Enables or disables the gate. Disabled layers pass every request through.
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }
}

impl<S> Layer<S> for AuthLayer {
    type Service = AuthMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        AuthMiddleware {
            inner,
            gate: self.gate.clone(),
            cookies: self.cookies.clone(),
            required: self.required,
            enabled: self.enabled,
        }
    }
}

// =============================================================================
// AuthMiddleware
// =============================================================================

/// Middleware that authenticates, authorizes and rotates per request.
#[derive(Clone)]
pub struct AuthMiddleware<S> {
    inner: S,
    gate: Arc<AuthGate>,
    cookies: Arc<CookieConfig>,
    required: Privilege,
    enabled: bool,
}

impl<S> Service<Request<Body>> for AuthMiddleware<S>
where
    S: Service<Request<Body>, Response = Response> + Clone + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<Body>) -> Self::Future {
        let gate = self.gate.clone();
        let cookies = self.cookies.clone();
        let required = self.required;
        let enabled = self.enabled;
        let mut inner = self.inner.clone();

        Box::pin(async move {
            if !enabled {
                return inner.call(req).await;
            }

            let credentials = cookies::gate_request(req.headers());

            let authenticated = match gate.authenticate(&credentials, required).await {
                Ok(authenticated) => authenticated,
                Err(reason) => return Ok(rejection(reason, &cookies)),
            };

            let span = tracing::info_span!(
                "authenticated",
                request_id = %authenticated.principal.request_id,
                user_id = %authenticated.principal.user_id,
            );
            req.extensions_mut().insert(authenticated.principal);

            let mut response = inner.call(req).instrument(span).await?;

            if response.extensions().get::<SessionEnded>().is_none() {
                if let Err(e) =
                    cookies::attach_tokens(response.headers_mut(), &authenticated.tokens, &cookies)
                {
                    tracing::error!(error = %e, "Rotated tokens are not valid header values");
                    return Ok(ApiError::rejected(RejectReason::InternalServerError).into_response());
                }
            }

            Ok(response)
        })
    }
}

/// Builds the response for a rejected request.
fn rejection(reason: RejectReason, cookies: &CookieConfig) -> Response {
    let mut response = ApiError::rejected(reason).into_response();

    if reason.clears_refresh_cookie() {
        if let Err(e) = cookies::attach_clear_cookie(response.headers_mut(), cookies) {
            tracing::warn!(error = %e, "Failed to attach cookie removal");
        }
    }

    response
}

// =============================================================================
// Tests
// =============================================================================
