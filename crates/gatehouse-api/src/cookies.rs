// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Credential transport: the headers and cookie tokens travel in.

use axum::http::header::{InvalidHeaderValue, SET_COOKIE};
use axum::http::{HeaderMap, HeaderName, HeaderValue};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};

use crate::auth::{GateRequest, TokenPair};

/// Cookie carrying the refresh token.
pub const REFRESH_COOKIE: &str = "refreshToken";

/// `X-Auth-Token`: carries the access token, inbound and outbound.
pub const AUTH_HEADER: HeaderName = HeaderName::from_static("x-auth-token");

/// `X-CSRF-Token`: carries the CSRF secret, inbound and outbound.
pub const CSRF_HEADER: HeaderName = HeaderName::from_static("x-csrf-token");

/// Response extension marking that the handler ended the session.
///
/// The auth middleware does not attach rotated tokens to such responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionEnded;

// =============================================================================
// CookieConfig
// =============================================================================

/// Attributes of the refresh cookie.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookieConfig {
    /// Cookie domain. Host-only when `None`.
    pub domain: Option<String>,
    /// Cookie path.
    pub path: String,
    /// Whether the cookie is HTTPS-only.
    pub secure: bool,
    /// Max-Age in seconds.
    pub max_age_secs: i64,
}

impl Default for CookieConfig {
    fn default() -> Self {
        Self {
            domain: None,
            path: "/".to_string(),
            secure: false,
            max_age_secs: 24 * 60 * 60,
        }
    }
}

impl CookieConfig {
    /// Creates a configuration with default attributes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the domain.
    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    /// Sets the path.
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    /// Sets the secure flag.
    pub fn with_secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    /// Sets the Max-Age.
    pub fn with_max_age(mut self, secs: i64) -> Self {
        self.max_age_secs = secs;
        self
    }

    /// Builds the refresh cookie carrying `token`.
    pub fn refresh_cookie(&self, token: impl Into<String>) -> Cookie<'static> {
        self.build(token.into(), self.max_age_secs)
    }

    /// Builds a cookie that removes the refresh cookie.
    pub fn clear_refresh_cookie(&self) -> Cookie<'static> {
        self.build(String::new(), 0)
    }

    fn build(&self, value: String, max_age_secs: i64) -> Cookie<'static> {
        let mut builder = Cookie::build((REFRESH_COOKIE, value))
            .http_only(true)
            .secure(self.secure)
            .same_site(SameSite::Lax)
            .path(self.path.clone())
            .max_age(time::Duration::seconds(max_age_secs));

        if let Some(domain) = &self.domain {
            builder = builder.domain(domain.clone());
        }

        builder.build()
    }
}

// =============================================================================
// Request / Response helpers
// =============================================================================

/// Reads the presented credentials from request headers.
pub fn gate_request(headers: &HeaderMap) -> GateRequest {
    let header = |name: HeaderName| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };

    GateRequest {
        access_token: header(AUTH_HEADER),
        refresh_token: CookieJar::from_headers(headers)
            .get(REFRESH_COOKIE)
            .map(|c| c.value().to_string()),
        csrf_header: header(CSRF_HEADER),
    }
}

/// Writes a token pair onto response headers.
pub fn attach_tokens(
    headers: &mut HeaderMap,
    tokens: &TokenPair,
    cookies: &CookieConfig,
) -> Result<(), InvalidHeaderValue> {
    headers.insert(AUTH_HEADER, HeaderValue::from_str(&tokens.access_token)?);
    headers.insert(CSRF_HEADER, HeaderValue::from_str(&tokens.csrf_token)?);
    let cookie = cookies.refresh_cookie(tokens.refresh_token.clone());
    headers.append(SET_COOKIE, HeaderValue::from_str(&cookie.to_string())?);
    Ok(())
}

/// Appends a `Set-Cookie` that clears the refresh cookie.
pub fn attach_clear_cookie(
    headers: &mut HeaderMap,
    cookies: &CookieConfig,
) -> Result<(), InvalidHeaderValue> {
    let cookie = cookies.clear_refresh_cookie();
    headers.append(SET_COOKIE, HeaderValue::from_str(&cookie.to_string())?);
    Ok(())
}
