// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Token claims structure.

use chrono::Utc;
use gatehouse_core::{Session, SessionIdentifier, UserId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// =============================================================================
// TokenKind
// =============================================================================

/// Which half of a token pair a token is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    /// Short-lived, carried in the `X-Auth-Token` header.
    Access,
    /// Long-lived, carried in the `refreshToken` cookie.
    Refresh,
}

impl TokenKind {
    /// Returns the kind name.
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenKind::Access => "access",
            TokenKind::Refresh => "refresh",
        }
    }
}

// =============================================================================
// Claims
// =============================================================================

/// Claims carried by both access and refresh tokens.
///
/// Both halves of a pair share the same user, session identifier and CSRF
/// secret. Only `kind`, `exp` and `jti` differ.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    // =========================================================================
    // Standard JWT Claims (RFC 7519)
    // =========================================================================
    /// Subject - the user ID as a string.
    pub sub: String,

    /// Expiration time (Unix timestamp).
    pub exp: i64,

    /// Issued at time (Unix timestamp).
    pub iat: i64,

    /// Issuer.
    pub iss: String,

    /// JWT ID.
    pub jti: String,

    // =========================================================================
    // Session Claims
    // =========================================================================
    /// The authenticated user.
    pub user_id: UserId,

    /// Identifier of the session row this token is bound to.
    pub session_identifier: SessionIdentifier,

    /// CSRF secret the client must echo in `X-CSRF-Token`.
    #[serde(default)]
    pub csrf: String,

    /// Access or refresh.
    pub kind: TokenKind,
}

impl Claims {
    /// Creates claims for `session` that expire `ttl_secs` from now.
    pub fn for_session(
        session: &Session,
        csrf: impl Into<String>,
        kind: TokenKind,
        ttl_secs: i64,
        issuer: impl Into<String>,
    ) -> Self {
        let now = Utc::now().timestamp();

        Self {
            sub: session.user_id.to_string(),
            exp: now + ttl_secs,
            iat: now,
            iss: issuer.into(),
            jti: Uuid::now_v7().to_string(),
            user_id: session.user_id,
            session_identifier: session.identifier.clone(),
            csrf: csrf.into(),
            kind,
        }
    }

    /// Returns `true` if the token has expired.
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() > self.exp
    }

    /// Sets the expiration to an absolute Unix timestamp.
    pub fn with_expiration(mut self, exp: i64) -> Self {
        self.exp = exp;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claims_for_session() {
        let session = Session::new(UserId::new(12));
        let claims = Claims::for_session(&session, "csrf", TokenKind::Access, 900, "gatehouse");

        assert_eq!(claims.sub, "12");
        assert_eq!(claims.user_id, UserId::new(12));
        assert_eq!(claims.session_identifier, session.identifier);
        assert_eq!(claims.exp - claims.iat, 900);
        assert!(!claims.is_expired());
    }

    #[test]
    fn test_claims_expired() {
        let session = Session::new(UserId::new(1));
        let claims = Claims::for_session(&session, "csrf", TokenKind::Refresh, 60, "gatehouse")
            .with_expiration(Utc::now().timestamp() - 10);
        assert!(claims.is_expired());
    }

    #[test]
    fn test_kind_serialization() {
        assert_eq!(serde_json::to_string(&TokenKind::Refresh).unwrap(), "\"refresh\"");
        assert_eq!(TokenKind::Access.as_str(), "access");
    }
}
