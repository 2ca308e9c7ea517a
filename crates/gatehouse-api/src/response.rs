// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! API response types.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use gatehouse_core::UserId;

// =============================================================================
// ApiResponse
// =============================================================================

/// Success envelope: `{"status": 200, "data": ...}`.
///
/// Errors use [`ErrorResponseBody`](crate::error::ErrorResponseBody) instead.
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// HTTP status code.
    pub status: u16,
    /// Response payload.
    pub data: T,
}

impl<T> ApiResponse<T> {
    /// Creates a 200 response with data.
    pub fn ok(data: T) -> Self {
        Self {
            status: StatusCode::OK.as_u16(),
            data,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::OK);
        (status, Json(self)).into_response()
    }
}

// =============================================================================
// Typed Responses
// =============================================================================

/// Health check response.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Overall status.
    pub status: String,
    /// Version string.
    pub version: String,
}

impl HealthResponse {
    /// Creates a healthy response.
    pub fn healthy() -> Self {
        Self {
            status: "ok".to_string(),
            version: crate::VERSION.to_string(),
        }
    }
}

/// Payload returned by a successful login.
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginData {
    /// The user's first name.
    pub firstname: String,
}

/// Payload identifying the current principal.
#[derive(Debug, Serialize, Deserialize)]
pub struct PrincipalData {
    /// User ID.
    pub user_id: UserId,
}

/// Empty payload, serialized as `{}`.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Empty {}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_response_shape() {
        let value = serde_json::to_value(ApiResponse::ok(LoginData {
            firstname: "Ada".to_string(),
        }))
        .unwrap();

        assert_eq!(
            value,
            serde_json::json!({ "status": 200, "data": { "firstname": "Ada" } })
        );
    }

    #[test]
    fn test_empty_payload() {
        let value = serde_json::to_value(ApiResponse::ok(Empty::default())).unwrap();
        assert_eq!(value["data"], serde_json::json!({}));
    }
}
