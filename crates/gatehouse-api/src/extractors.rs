// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Custom extractors for API handlers.

use axum::{
    extract::{FromRequest, FromRequestParts, Path, Request},
    http::request::Parts,
    Json,
};
use serde::de::DeserializeOwned;

use crate::auth::{Principal, RejectReason};
use crate::error::ApiError;

// =============================================================================
// Auth Extractor
// =============================================================================

/// Extractor for authenticated requests.
///
/// Reads the [`Principal`] the auth middleware attached. Handlers mounted
/// outside a gated group (or with the gate disabled) see a 401.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(Auth(principal): Auth) -> impl IntoResponse {
///     format!("Hello, {}", principal.user_id)
/// }
/// ```
pub struct Auth(pub Principal);

impl<S> FromRequestParts<S> for Auth
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Principal>()
            .cloned()
            .map(Auth)
            .ok_or(ApiError::Rejected(RejectReason::AuthCookieMissing))
    }
}

// =============================================================================
// Credentials Extractor
// =============================================================================

/// Extractor for login payloads.
///
/// Any body that does not deserialize into `T` is a 400 `EMAIL_OR_PASSWORD`.
pub struct CredentialsJson<T>(pub T);

impl<S, T> FromRequest<S> for CredentialsJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await.map_err(|e| {
            tracing::debug!(error = %e, code = "EMAIL_OR_PASSWORD", "Login body rejected");
            ApiError::bad_request("EMAIL_OR_PASSWORD", "An email and password are required.")
        })?;

        Ok(CredentialsJson(value))
    }
}

// =============================================================================
// User ID Extractor
// =============================================================================

/// Extractor for a numeric user ID path segment.
pub struct UserIdPath(pub gatehouse_core::UserId);

impl<S> FromRequestParts<S> for UserIdPath
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(id) = Path::<u64>::from_request_parts(parts, state)
            .await
            .map_err(|e| {
                ApiError::bad_request("INVALID_USER_ID", format!("Invalid user ID: {}", e))
            })?;

        Ok(UserIdPath(gatehouse_core::UserId::new(id)))
    }
}
