// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Custom Test Assertions
//!
//! Assertions on [`TestResponse`] with failure messages that include the body.

use axum::http::StatusCode;

use gatehouse_api::{RejectReason, TokenPair};

use super::harness::TestResponse;

impl TestResponse {
    /// Assert a 200 that issued a full token pair, and return the pair.
    #[track_caller]
    pub fn assert_ok(&self) -> TokenPair {
        assert_eq!(
            self.status,
            StatusCode::OK,
            "Expected 200, got {} with body {}",
            self.status,
            self.body
        );
        self.tokens()
            .unwrap_or_else(|| panic!("200 response carried no token pair: {:?}", self.headers))
    }

    /// Assert a rejection with `reason`'s status and code, and no new tokens.
    #[track_caller]
    pub fn assert_rejected(&self, reason: RejectReason) {
        assert_eq!(
            self.status,
            reason.status_code(),
            "Expected {} ({}), got {} with body {}",
            reason,
            reason.status_code(),
            self.status,
            self.body
        );
        assert_eq!(self.code(), Some(reason.code()), "body: {}", self.body);
        assert!(
            self.tokens().is_none(),
            "Rejected response must not issue tokens"
        );
    }

    /// Assert a 400 with the given error code.
    #[track_caller]
    pub fn assert_bad_request(&self, code: &str) {
        assert_eq!(
            self.status,
            StatusCode::BAD_REQUEST,
            "Expected 400 {}, got {} with body {}",
            code,
            self.status,
            self.body
        );
        assert_eq!(self.code(), Some(code), "body: {}", self.body);
    }
}

/// Assert that `next` shares no credential with `previous`.
#[track_caller]
pub fn assert_rotated(previous: &TokenPair, next: &TokenPair) {
    assert_ne!(previous.access_token, next.access_token, "access token was not rotated");
    assert_ne!(previous.refresh_token, next.refresh_token, "refresh token was not rotated");
    assert_ne!(previous.csrf_token, next.csrf_token, "CSRF secret was not rotated");
}
