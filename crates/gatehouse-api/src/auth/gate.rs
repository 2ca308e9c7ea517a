// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! The per-request authentication decision.
//!
//! [`AuthGate::authenticate`] is a linear chain. Each step either rejects
//! with exactly one [`RejectReason`] or hands its claims to the next step;
//! the last step rotates the session and returns the new token pair.
//!
//! ```text
//! access header? ─no─▶ AuthCookieMissing
//! refresh cookie? ─no─▶ RefreshCookieMissing
//! access token valid? ─no─▶ refresh token valid? ─no─▶ TokenInvalid
//!        │                          │
//!        └──────────┬───────────────┘
//!                   ▼
//! session live? ─no─▶ InvalidIdentifier (clears cookie)
//! CSRF matches? ─no─▶ CSRFTokenInvalid
//! privilege ok? ─no─▶ ProtectedRouted / InternalServerError
//! rotate + issue ─err─▶ InternalServerError
//!                   ▼
//!             Authenticated
//! ```

use axum::http::StatusCode;
use serde::Serialize;
use tracing::{debug, error, warn};

use super::claims::{Claims, TokenKind};
use super::codec::{TokenCodec, TokenPair};
use super::policy::{AuthorizationPolicy, PolicyDenial, Privilege};
use super::principal::Principal;
use super::session::{SessionLookupError, SessionManager};

// =============================================================================
// RejectReason
// =============================================================================

/// The coarse reason a request was refused.
///
/// This is all a client ever learns. The precise cause is logged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum RejectReason {
    /// No `X-Auth-Token` header.
    AuthCookieMissing,
    /// No `refreshToken` cookie.
    RefreshCookieMissing,
    /// Neither token validated.
    TokenInvalid,
    /// The token's session has been rotated away or destroyed.
    InvalidIdentifier,
    /// The CSRF header does not match the token's secret.
    #[serde(rename = "CSRFTokenInvalid")]
    CsrfTokenInvalid,
    /// The principal may not use an elevated route.
    ProtectedRouted,
    /// A collaborator failed.
    InternalServerError,
}

impl RejectReason {
    /// Returns the HTTP status for this reason.
    pub fn status_code(&self) -> StatusCode {
        match self {
            RejectReason::AuthCookieMissing
            | RejectReason::RefreshCookieMissing
            | RejectReason::TokenInvalid
            | RejectReason::InvalidIdentifier => StatusCode::UNAUTHORIZED,
            RejectReason::CsrfTokenInvalid | RejectReason::ProtectedRouted => StatusCode::FORBIDDEN,
            RejectReason::InternalServerError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns the machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            RejectReason::AuthCookieMissing => "AUTH_COOKIE_MISSING",
            RejectReason::RefreshCookieMissing => "REFRESH_COOKIE_MISSING",
            RejectReason::TokenInvalid => "TOKEN_INVALID",
            RejectReason::InvalidIdentifier => "INVALID_IDENTIFIER",
            RejectReason::CsrfTokenInvalid => "CSRF_TOKEN_INVALID",
            RejectReason::ProtectedRouted => "PROTECTED_ROUTED",
            RejectReason::InternalServerError => "INTERNAL_SERVER_ERROR",
        }
    }

    /// Returns a short title.
    pub fn title(&self) -> &'static str {
        match self {
            RejectReason::AuthCookieMissing => "Authentication token missing",
            RejectReason::RefreshCookieMissing => "Refresh token missing",
            RejectReason::TokenInvalid => "Invalid token",
            RejectReason::InvalidIdentifier => "Session expired",
            RejectReason::CsrfTokenInvalid => "Invalid CSRF token",
            RejectReason::ProtectedRouted => "Forbidden",
            RejectReason::InternalServerError => "Internal server error",
        }
    }

    /// Returns a client-safe explanation.
    pub fn detail(&self) -> &'static str {
        match self {
            RejectReason::AuthCookieMissing => "The X-Auth-Token header is required.",
            RejectReason::RefreshCookieMissing => "The refreshToken cookie is required.",
            RejectReason::TokenInvalid => {
                "The supplied credentials are invalid or expired. Please log in again."
            }
            RejectReason::InvalidIdentifier => {
                "This session is no longer valid. Please log in again."
            }
            RejectReason::CsrfTokenInvalid => {
                "The X-CSRF-Token header does not match this session."
            }
            RejectReason::ProtectedRouted => "You do not have permission to access this resource.",
            RejectReason::InternalServerError => "Something went wrong. Please try again later.",
        }
    }

    /// Returns `true` if the response must also clear the refresh cookie.
    pub fn clears_refresh_cookie(&self) -> bool {
        matches!(self, RejectReason::InvalidIdentifier)
    }
}

impl std::fmt::Display for RejectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

// =============================================================================
// GateRequest / Authenticated
// =============================================================================

/// The credentials a request presented.
///
/// Empty strings count as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GateRequest {
    /// `X-Auth-Token` header value.
    pub access_token: Option<String>,
    /// `refreshToken` cookie value.
    pub refresh_token: Option<String>,
    /// `X-CSRF-Token` header value.
    pub csrf_header: Option<String>,
}

impl GateRequest {
    /// Creates an empty request.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the access token.
    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    /// Sets the refresh token.
    pub fn with_refresh_token(mut self, token: impl Into<String>) -> Self {
        self.refresh_token = Some(token.into());
        self
    }

    /// Sets the CSRF header.
    pub fn with_csrf(mut self, csrf: impl Into<String>) -> Self {
        self.csrf_header = Some(csrf.into());
        self
    }

    /// Builds a request from a token pair, echoing its CSRF secret.
    pub fn from_pair(pair: &TokenPair) -> Self {
        Self::new()
            .with_access_token(&pair.access_token)
            .with_refresh_token(&pair.refresh_token)
            .with_csrf(&pair.csrf_token)
    }
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

/// Which credential the request was authenticated with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialSource {
    /// The access token validated.
    AccessToken,
    /// The access token failed and the refresh token was used.
    RefreshToken,
}

/// A successful authentication.
#[derive(Debug, Clone)]
pub struct Authenticated {
    /// The principal for downstream handlers.
    pub principal: Principal,
    /// The rotated token pair to return to the client.
    pub tokens: TokenPair,
    /// Which credential was accepted.
    pub source: CredentialSource,
}

// =============================================================================
// AuthGate
// =============================================================================

/// Authenticates, authorizes and rotates per request.
#[derive(Debug, Clone)]
pub struct AuthGate {
    codec: TokenCodec,
    sessions: SessionManager,
    policy: AuthorizationPolicy,
    csrf_enabled: bool,
}

impl AuthGate {
    /// Creates a gate with CSRF enforcement enabled.
    pub fn new(codec: TokenCodec, sessions: SessionManager, policy: AuthorizationPolicy) -> Self {
        Self {
            codec,
            sessions,
            policy,
            csrf_enabled: true,
        }
    }

    /// Enables or disables the CSRF check.
    pub fn with_csrf(mut self, enabled: bool) -> Self {
        self.csrf_enabled = enabled;
        self
    }

    /// Returns `true` if the CSRF check runs.
    pub fn csrf_enabled(&self) -> bool {
        self.csrf_enabled
    }

    /// Runs the full decision chain for one request.
    pub async fn authenticate(
        &self,
        request: &GateRequest,
        required: Privilege,
    ) -> Result<Authenticated, RejectReason> {
        let access_token = present(&request.access_token).ok_or_else(|| {
            debug!(reason = "AuthCookieMissing", "X-Auth-Token header missing");
            RejectReason::AuthCookieMissing
        })?;

        let refresh_token = present(&request.refresh_token).ok_or_else(|| {
            debug!(reason = "RefreshCookieMissing", "refreshToken cookie missing");
            RejectReason::RefreshCookieMissing
        })?;

        let (claims, source) = self.resolve_claims(access_token, refresh_token).await?;

        if self.csrf_enabled {
            check_csrf(&claims, present(&request.csrf_header))?;
        }

        let user_id = claims.user_id;
        self.policy
            .check(user_id, required)
            .await
            .map_err(|denial| match denial {
                PolicyDenial::Insufficient { .. } => {
                    warn!(user_id = %user_id, required = %required, reason = "ProtectedRouted", "Privilege check failed");
                    RejectReason::ProtectedRouted
                }
                PolicyDenial::LookupFailed { reason, .. } => {
                    error!(user_id = %user_id, error = %reason, "User lookup failed during privilege check");
                    RejectReason::InternalServerError
                }
            })?;

        let session = self.sessions.create_or_rotate(user_id).await.map_err(|e| {
            error!(user_id = %user_id, error = %e, "Session rotation failed");
            RejectReason::InternalServerError
        })?;

        let tokens = self.codec.issue(&session).map_err(|e| {
            error!(user_id = %user_id, error = %e, "Token issuance failed");
            RejectReason::InternalServerError
        })?;

        debug!(user_id = %user_id, source = ?source, "Request authenticated");

        Ok(Authenticated {
            principal: Principal::new(user_id, session.identifier),
            tokens,
            source,
        })
    }

    /// Validates the access token, falling back to the refresh token, and
    /// confirms the resolved claims still name the live session.
    async fn resolve_claims(
        &self,
        access_token: &str,
        refresh_token: &str,
    ) -> Result<(Claims, CredentialSource), RejectReason> {
        let (claims, source) = match self.codec.validate_kind(access_token, TokenKind::Access) {
            Ok(claims) => (claims, CredentialSource::AccessToken),
            Err(access_err) => {
                debug!(cause = access_err.error_type(), "Access token rejected, trying refresh token");
                let claims = self
                    .codec
                    .validate_kind(refresh_token, TokenKind::Refresh)
                    .map_err(|e| {
                        debug!(
                            reason = "TokenInvalid",
                            access = access_err.error_type(),
                            refresh = e.error_type(),
                            error = %e,
                            "Both tokens rejected"
                        );
                        RejectReason::TokenInvalid
                    })?;
                (claims, CredentialSource::RefreshToken)
            }
        };

        match self
            .sessions
            .find_by_identity(claims.user_id, &claims.session_identifier)
            .await
        {
            Ok(_) => Ok((claims, source)),
            Err(SessionLookupError::NotFound) => {
                debug!(
                    user_id = %claims.user_id,
                    source = ?source,
                    reason = "InvalidIdentifier",
                    "Token is bound to a superseded session"
                );
                Err(RejectReason::InvalidIdentifier)
            }
            Err(SessionLookupError::Store(e)) => {
                error!(user_id = %claims.user_id, error = %e, "Session lookup failed");
                Err(RejectReason::InternalServerError)
            }
        }
    }
}

/// Compares the claims' CSRF secret with the echoed header.
fn check_csrf(claims: &Claims, header: Option<&str>) -> Result<(), RejectReason> {
    let cause = if claims.csrf.is_empty() {
        "CSRF token is missing from claims"
    } else {
        match header {
            None => "CSRF token is missing from header",
            Some(header) if !constant_time_eq(header.as_bytes(), claims.csrf.as_bytes()) => {
                "CSRF token does not match"
            }
            Some(_) => return Ok(()),
        }
    };

    warn!(user_id = %claims.user_id, reason = "CSRFTokenInvalid", cause, "CSRF check failed");
    Err(RejectReason::CsrfTokenInvalid)
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::codec::TokenConfig;
    use chrono::Utc;
    use gatehouse_core::{
        CredentialStore, MemoryCredentialStore, MemoryUserDirectory, PrivilegeTier, UserId,
        UserRecord,
    };
    use std::sync::Arc;

    struct Fixture {
        gate: AuthGate,
        codec: TokenCodec,
        store: Arc<MemoryCredentialStore>,
    }

    fn fixture() -> Fixture {
        let codec =
            TokenCodec::new(TokenConfig::new("gate-test-secret-that-is-long-enough-xx")).unwrap();
        let store = Arc::new(MemoryCredentialStore::new());
        let directory = Arc::new(MemoryUserDirectory::with_users([
            UserRecord::new(UserId::new(1), "user@example.com", "h"),
            UserRecord::new(UserId::new(2), "admin@example.com", "h")
                .with_tier(PrivilegeTier::Elevated),
        ]));
        let gate = AuthGate::new(
            codec.clone(),
            SessionManager::new(store.clone()),
            AuthorizationPolicy::new(directory),
        );
        Fixture { gate, codec, store }
    }

    async fn login(f: &Fixture, user: u64) -> TokenPair {
        let session = f.store.create(UserId::new(user)).await.unwrap();
        f.codec.issue(&session).unwrap()
    }

    fn expire(codec: &TokenCodec, token: &str) -> String {
        let past = Utc::now().timestamp() - 60;
        let claims = codec.validate(token).unwrap().with_expiration(past);
        codec.encode(&claims).unwrap()
    }

    #[test]
    fn test_reason_table() {
        assert_eq!(RejectReason::AuthCookieMissing.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(RejectReason::RefreshCookieMissing.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(RejectReason::TokenInvalid.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(RejectReason::InvalidIdentifier.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(RejectReason::CsrfTokenInvalid.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(RejectReason::ProtectedRouted.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(
            RejectReason::InternalServerError.status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert!(RejectReason::InvalidIdentifier.clears_refresh_cookie());
        assert!(!RejectReason::TokenInvalid.clears_refresh_cookie());
    }

    #[tokio::test]
    async fn test_missing_credentials() {
        let f = fixture();
        let pair = login(&f, 1).await;

        let req = GateRequest::new().with_refresh_token(&pair.refresh_token);
        assert_eq!(
            f.gate.authenticate(&req, Privilege::Standard).await.unwrap_err(),
            RejectReason::AuthCookieMissing
        );

        let req = GateRequest::new()
            .with_access_token("")
            .with_refresh_token(&pair.refresh_token);
        assert_eq!(
            f.gate.authenticate(&req, Privilege::Standard).await.unwrap_err(),
            RejectReason::AuthCookieMissing
        );

        let req = GateRequest::new().with_access_token(&pair.access_token);
        assert_eq!(
            f.gate.authenticate(&req, Privilege::Standard).await.unwrap_err(),
            RejectReason::RefreshCookieMissing
        );
    }

    #[tokio::test]
    async fn test_valid_access_token_rotates() {
        let f = fixture();
        let pair = login(&f, 1).await;

        let auth = f
            .gate
            .authenticate(&GateRequest::from_pair(&pair), Privilege::Standard)
            .await
            .unwrap();

        assert_eq!(auth.source, CredentialSource::AccessToken);
        assert_eq!(auth.principal.user_id, UserId::new(1));
        assert_ne!(auth.tokens, pair);
        assert_eq!(
            f.store.session_for(UserId::new(1)).unwrap().identifier,
            auth.principal.session_identifier
        );
    }

    #[tokio::test]
    async fn test_expired_access_falls_back_to_refresh() {
        let f = fixture();
        let pair = login(&f, 1).await;

        let req = GateRequest::new()
            .with_access_token(expire(&f.codec, &pair.access_token))
            .with_refresh_token(&pair.refresh_token)
            .with_csrf(&pair.csrf_token);

        let auth = f.gate.authenticate(&req, Privilege::Standard).await.unwrap();
        assert_eq!(auth.source, CredentialSource::RefreshToken);
    }

    #[tokio::test]
    async fn test_both_tokens_invalid() {
        let f = fixture();
        let pair = login(&f, 1).await;

        let req = GateRequest::new()
            .with_access_token(expire(&f.codec, &pair.access_token))
            .with_refresh_token(expire(&f.codec, &pair.refresh_token))
            .with_csrf(&pair.csrf_token);

        assert_eq!(
            f.gate.authenticate(&req, Privilege::Standard).await.unwrap_err(),
            RejectReason::TokenInvalid
        );
    }

    #[tokio::test]
    async fn test_swapped_tokens_are_invalid() {
        let f = fixture();
        let pair = login(&f, 1).await;

        let req = GateRequest::new()
            .with_access_token(&pair.refresh_token)
            .with_refresh_token(&pair.access_token)
            .with_csrf(&pair.csrf_token);

        assert_eq!(
            f.gate.authenticate(&req, Privilege::Standard).await.unwrap_err(),
            RejectReason::TokenInvalid
        );
    }

    #[tokio::test]
    async fn test_superseded_session_rejected() {
        let f = fixture();
        let old = login(&f, 1).await;
        let _new = login(&f, 1).await;

        assert_eq!(
            f.gate
                .authenticate(&GateRequest::from_pair(&old), Privilege::Standard)
                .await
                .unwrap_err(),
            RejectReason::InvalidIdentifier
        );
    }

    #[tokio::test]
    async fn test_csrf_mismatch() {
        let f = fixture();
        let pair = login(&f, 1).await;

        let req = GateRequest::from_pair(&pair).with_csrf("not-the-secret");
        assert_eq!(
            f.gate.authenticate(&req, Privilege::Standard).await.unwrap_err(),
            RejectReason::CsrfTokenInvalid
        );

        let req = GateRequest::new()
            .with_access_token(&pair.access_token)
            .with_refresh_token(&pair.refresh_token);
        assert_eq!(
            f.gate.authenticate(&req, Privilege::Standard).await.unwrap_err(),
            RejectReason::CsrfTokenInvalid
        );
    }

    #[tokio::test]
    async fn test_empty_claim_secret_rejected() {
        let f = fixture();
        let session = f.store.create(UserId::new(1)).await.unwrap();
        let pair = f.codec.issue(&session).unwrap();

        let mut claims = f.codec.validate(&pair.access_token).unwrap();
        claims.csrf.clear();
        let forged = f.codec.encode(&claims).unwrap();

        let req = GateRequest::new()
            .with_access_token(forged)
            .with_refresh_token(&pair.refresh_token)
            .with_csrf("");
        assert_eq!(
            f.gate.authenticate(&req, Privilege::Standard).await.unwrap_err(),
            RejectReason::CsrfTokenInvalid
        );
    }

    #[test]
    fn test_check_csrf_outcomes() {
        let session = gatehouse_core::Session::new(UserId::new(1));
        let claims = Claims::for_session(&session, "secret", TokenKind::Access, 60, "gatehouse");
        assert_eq!(check_csrf(&claims, Some("secret")), Ok(()));
        assert_eq!(check_csrf(&claims, Some("other")), Err(RejectReason::CsrfTokenInvalid));
        assert_eq!(check_csrf(&claims, None), Err(RejectReason::CsrfTokenInvalid));

        // A claim without a secret matches nothing, not even an empty header.
        let blank = Claims::for_session(&session, "", TokenKind::Access, 60, "gatehouse");
        assert_eq!(check_csrf(&blank, Some("")), Err(RejectReason::CsrfTokenInvalid));
        assert_eq!(check_csrf(&blank, Some("secret")), Err(RejectReason::CsrfTokenInvalid));
        assert_eq!(check_csrf(&blank, None), Err(RejectReason::CsrfTokenInvalid));
    }

    #[tokio::test]
    async fn test_csrf_disabled() {
        let f = fixture();
        let gate = f.gate.clone().with_csrf(false);
        let pair = login(&f, 1).await;

        let req = GateRequest::from_pair(&pair).with_csrf("wrong");
        assert!(gate.authenticate(&req, Privilege::Standard).await.is_ok());
    }

    #[tokio::test]
    async fn test_elevation() {
        let f = fixture();

        let user = login(&f, 1).await;
        assert_eq!(
            f.gate
                .authenticate(&GateRequest::from_pair(&user), Privilege::Elevated)
                .await
                .unwrap_err(),
            RejectReason::ProtectedRouted
        );

        let admin = login(&f, 2).await;
        assert!(f
            .gate
            .authenticate(&GateRequest::from_pair(&admin), Privilege::Elevated)
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_elevated_unknown_user_is_internal_error() {
        let f = fixture();
        let pair = login(&f, 77).await;

        assert_eq!(
            f.gate
                .authenticate(&GateRequest::from_pair(&pair), Privilege::Elevated)
                .await
                .unwrap_err(),
            RejectReason::InternalServerError
        );
    }

    #[test]
    fn test_constant_time_eq() {
        assert!(constant_time_eq(b"abc", b"abc"));
        assert!(!constant_time_eq(b"abc", b"abd"));
        assert!(!constant_time_eq(b"abc", b"ab"));
    }
}
