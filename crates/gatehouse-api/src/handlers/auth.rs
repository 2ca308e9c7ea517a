// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Authentication handlers.

use axum::{
    extract::State,
    response::{IntoResponse, Response},
};
use serde::Deserialize;

use crate::cookies::{self, SessionEnded};
use crate::error::{ApiError, ApiResult};
use crate::extractors::{Auth, CredentialsJson};
use crate::response::{ApiResponse, Empty, LoginData};
use crate::state::AppState;

// =============================================================================
// Login
// =============================================================================

/// Login request body.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Email address.
    pub email: String,
    /// Password.
    pub password: String,
}

/// POST /api/user/login
///
/// Verifies the password, opens a fresh session and returns its token pair
/// in the `X-Auth-Token` and `X-CSRF-Token` headers and the refresh cookie.
pub async fn login(
    State(state): State<AppState>,
    CredentialsJson(request): CredentialsJson<LoginRequest>,
) -> ApiResult<Response> {
    if request.email.is_empty() || request.password.is_empty() {
        return Err(ApiError::bad_request(
            "EMAIL_OR_PASSWORD",
            "An email and password are required.",
        ));
    }

    let user = state
        .directory()
        .find_by_email(&request.email)
        .await
        .map_err(|e| ApiError::internal(format!("User lookup failed: {}", e)))?
        .ok_or_else(|| {
            tracing::debug!(code = "EMAIL_NOT_FOUND", "Login for unknown email");
            ApiError::bad_request("EMAIL_NOT_FOUND", "No account uses this email address.")
        })?;

    if !state.verifier().verify(&request.password, &user.password_hash) {
        tracing::debug!(user_id = %user.id, code = "WRONG_PASSWORD", "Login with wrong password");
        return Err(ApiError::bad_request(
            "WRONG_PASSWORD",
            "The password is incorrect.",
        ));
    }

    let session = state
        .sessions()
        .create_or_rotate(user.id)
        .await
        .map_err(|e| ApiError::internal(format!("Failed to create session: {}", e)))?;
    let tokens = state.codec().issue(&session)?;

    let mut response = ApiResponse::ok(LoginData {
        firstname: user.first_name,
    })
    .into_response();
    cookies::attach_tokens(response.headers_mut(), &tokens, state.cookies())
        .map_err(|e| ApiError::internal(format!("Failed to attach tokens: {}", e)))?;

    tracing::info!(user_id = %user.id, "User logged in");

    Ok(response)
}

// =============================================================================
// Logout
// =============================================================================

/// POST /api/private/user/logout
///
/// Destroys the caller's session and clears the refresh cookie. The tokens
/// the gate rotated for this request are not returned.
pub async fn logout(
    State(state): State<AppState>,
    Auth(principal): Auth,
) -> ApiResult<Response> {
    state
        .sessions()
        .destroy(principal.user_id)
        .await
        .map_err(|e| ApiError::internal(format!("Failed to destroy session: {}", e)))?;

    let mut response = ApiResponse::ok(Empty::default()).into_response();
    response.extensions_mut().insert(SessionEnded);
    cookies::attach_clear_cookie(response.headers_mut(), state.cookies())
        .map_err(|e| ApiError::internal(format!("Failed to clear cookie: {}", e)))?;

    tracing::info!(user_id = %principal.user_id, "User logged out");

    Ok(response)
}
