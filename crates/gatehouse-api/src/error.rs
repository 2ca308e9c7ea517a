// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! API error types and handling.
//!
//! Every error leaves the server as the same JSON shape:
//!
//! ```json
//! { "status": 401, "code": "TOKEN_INVALID", "title": "...", "detail": "..." }
//! ```
//!
//! The underlying cause is logged, never serialized.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::auth::RejectReason;

/// Result type alias for API operations.
pub type ApiResult<T> = Result<T, ApiError>;

// =============================================================================
// ApiError
// =============================================================================

/// API error type with HTTP status code mapping.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The auth gate refused the request.
    #[error("Request rejected: {0}")]
    Rejected(RejectReason),

    /// Bad request (400) with a machine-readable code.
    #[error("Bad request ({code}): {message}")]
    BadRequest {
        /// Error code, e.g. `EMAIL_NOT_FOUND`.
        code: &'static str,
        /// Error message.
        message: String,
    },

    /// Resource not found (404).
    #[error("Resource not found: {resource}")]
    NotFound {
        /// The resource that was not found.
        resource: String,
    },

    /// Internal server error (500).
    #[error("Internal error: {message}")]
    Internal {
        /// Error message (for logging, not user-facing).
        message: String,
    },
}

impl ApiError {
    // =========================================================================
    // Constructors
    // =========================================================================

    /// Creates a rejection error.
    pub fn rejected(reason: RejectReason) -> Self {
        Self::Rejected(reason)
    }

    /// Creates a bad request error.
    pub fn bad_request(code: &'static str, message: impl Into<String>) -> Self {
        Self::BadRequest {
            code,
            message: message.into(),
        }
    }

    /// Creates a not found error.
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    // =========================================================================
    // Properties
    // =========================================================================

    /// Returns the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Rejected(reason) => reason.status_code(),
            ApiError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns the error code for categorization.
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::Rejected(reason) => reason.code(),
            ApiError::BadRequest { code, .. } => code,
            ApiError::NotFound { .. } => "NOT_FOUND",
            ApiError::Internal { .. } => "INTERNAL_SERVER_ERROR",
        }
    }

    /// Returns a short title.
    pub fn title(&self) -> &'static str {
        match self {
            ApiError::Rejected(reason) => reason.title(),
            ApiError::BadRequest { .. } => "Bad request",
            ApiError::NotFound { .. } => "Not found",
            ApiError::Internal { .. } => RejectReason::InternalServerError.title(),
        }
    }

    /// Returns a user-facing explanation.
    ///
    /// Safe to show to end users; internal messages are replaced.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Rejected(reason) => reason.detail().to_string(),
            ApiError::BadRequest { message, .. } => message.clone(),
            ApiError::NotFound { resource } => format!("{} was not found.", resource),
            ApiError::Internal { .. } => RejectReason::InternalServerError.detail().to_string(),
        }
    }

    /// Returns `true` if this error should be logged at error level.
    pub fn is_server_error(&self) -> bool {
        self.status_code().is_server_error()
    }

    /// Returns the response body for this error.
    pub fn body(&self) -> ErrorResponseBody {
        ErrorResponseBody {
            status: self.status_code().as_u16(),
            code: self.error_code().to_string(),
            title: self.title().to_string(),
            detail: self.user_message(),
        }
    }
}

impl From<RejectReason> for ApiError {
    fn from(reason: RejectReason) -> Self {
        ApiError::Rejected(reason)
    }
}

// =============================================================================
// IntoResponse Implementation
// =============================================================================

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.error_code();

        if self.is_server_error() {
            tracing::error!(error = %self, code, status = %status, "Server error occurred");
        } else {
            tracing::debug!(error = %self, code, status = %status, "Client error occurred");
        }

        (status, Json(self.body())).into_response()
    }
}

// =============================================================================
// Error Response Body
// =============================================================================

/// Error response body structure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponseBody {
    /// HTTP status code.
    pub status: u16,
    /// Error code for programmatic handling.
    pub code: String,
    /// Short title.
    pub title: String,
    /// Human-readable explanation.
    pub detail: String,
}

// =============================================================================
// Tests
// =============================================================================
