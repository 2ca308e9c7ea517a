// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Token codec: issues and validates signed token pairs.
//!
//! The codec is pure. It holds the process-wide signing key and performs no
//! I/O, so a single instance is shared by every request.

use std::sync::Arc;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rand::RngCore;
use thiserror::Error;

use gatehouse_core::Session;

use super::claims::{Claims, TokenKind};
use crate::error::{ApiError, ApiResult};

/// Number of random bytes in a CSRF secret.
const CSRF_SECRET_BYTES: usize = 32;

// =============================================================================
// TokenConfig
// =============================================================================

/// Signing and lifetime settings for issued tokens.
#[derive(Clone)]
pub struct TokenConfig {
    /// Secret key for signing tokens.
    pub secret: String,
    /// Token issuer.
    pub issuer: String,
    /// HMAC algorithm to sign with.
    pub algorithm: Algorithm,
    /// Access token lifetime in seconds.
    pub access_ttl_secs: i64,
    /// Refresh token lifetime in seconds.
    pub refresh_ttl_secs: i64,
    /// Clock skew tolerance in seconds.
    pub leeway_secs: u64,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            secret: String::new(),
            issuer: "gatehouse".to_string(),
            algorithm: Algorithm::HS256,
            access_ttl_secs: 15 * 60,
            refresh_ttl_secs: 24 * 60 * 60,
            leeway_secs: 0,
        }
    }
}

impl TokenConfig {
    /// Creates a new configuration with the given secret.
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            ..Default::default()
        }
    }

    /// Sets the issuer.
    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = issuer.into();
        self
    }

    /// Sets the signing algorithm.
    pub fn with_algorithm(mut self, algorithm: Algorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    /// Sets the access and refresh token lifetimes.
    pub fn with_ttls(mut self, access_ttl_secs: i64, refresh_ttl_secs: i64) -> Self {
        self.access_ttl_secs = access_ttl_secs;
        self.refresh_ttl_secs = refresh_ttl_secs;
        self
    }

    /// Sets the clock skew tolerance.
    pub fn with_leeway(mut self, leeway_secs: u64) -> Self {
        self.leeway_secs = leeway_secs;
        self
    }

    /// Validates the configuration.
    ///
    /// A missing key is a startup error, never a per-request one.
    pub fn validate(&self) -> ApiResult<()> {
        if self.secret.is_empty() {
            return Err(ApiError::internal("Token signing secret is not configured"));
        }
        if !matches!(
            self.algorithm,
            Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512
        ) {
            return Err(ApiError::internal(format!(
                "Unsupported signing algorithm: {:?}",
                self.algorithm
            )));
        }
        if self.access_ttl_secs <= 0 || self.refresh_ttl_secs <= 0 {
            return Err(ApiError::internal("Token lifetimes must be positive"));
        }
        if self.secret.len() < 32 {
            tracing::warn!("Token signing secret is shorter than recommended (32 bytes)");
        }
        Ok(())
    }
}

impl std::fmt::Debug for TokenConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenConfig")
            .field("issuer", &self.issuer)
            .field("algorithm", &self.algorithm)
            .field("access_ttl_secs", &self.access_ttl_secs)
            .field("refresh_ttl_secs", &self.refresh_ttl_secs)
            .field("leeway_secs", &self.leeway_secs)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// TokenPair / TokenError
// =============================================================================

/// A freshly issued access/refresh pair and its CSRF secret.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenPair {
    /// Access token, returned in `X-Auth-Token`.
    pub access_token: String,
    /// Refresh token, returned in the `refreshToken` cookie.
    pub refresh_token: String,
    /// CSRF secret, returned in `X-CSRF-Token`.
    pub csrf_token: String,
}

/// Why a token failed validation.
///
/// Callers report every variant to clients as the same "invalid" outcome.
/// The distinction exists for logs only.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TokenError {
    /// The expiry has elapsed.
    #[error("token has expired")]
    Expired,

    /// Signature, structure, or issuer verification failed.
    #[error("token is malformed: {reason}")]
    Malformed {
        /// What failed.
        reason: String,
    },

    /// A valid token presented in the wrong place.
    #[error("expected {expected} token, found {found}")]
    WrongKind {
        /// Kind required at this position.
        expected: &'static str,
        /// Kind carried by the token.
        found: &'static str,
    },
}

impl TokenError {
    /// Returns the error type as a string for logging.
    pub fn error_type(&self) -> &'static str {
        match self {
            TokenError::Expired => "expired",
            TokenError::Malformed { .. } => "malformed",
            TokenError::WrongKind { .. } => "wrong_kind",
        }
    }
}

// =============================================================================
// TokenCodec
// =============================================================================

/// Encodes and validates signed session tokens.
#[derive(Clone)]
pub struct TokenCodec {
    config: Arc<TokenConfig>,
    encoding_key: Arc<EncodingKey>,
    decoding_key: Arc<DecodingKey>,
    validation: Arc<Validation>,
}

impl TokenCodec {
    /// Creates a new codec with the given configuration.
    pub fn new(config: TokenConfig) -> ApiResult<Self> {
        config.validate()?;

        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());

        let mut validation = Validation::new(config.algorithm);
        validation.set_issuer(&[&config.issuer]);
        validation.set_required_spec_claims(&["exp", "iss", "sub"]);
        validation.validate_aud = false;
        validation.leeway = config.leeway_secs;

        Ok(Self {
            config: Arc::new(config),
            encoding_key: Arc::new(encoding_key),
            decoding_key: Arc::new(decoding_key),
            validation: Arc::new(validation),
        })
    }

    /// Issues a new token pair bound to `session`.
    ///
    /// Both tokens carry the same freshly generated CSRF secret.
    pub fn issue(&self, session: &Session) -> ApiResult<TokenPair> {
        let csrf_token = generate_csrf_secret();

        let access = Claims::for_session(
            session,
            &csrf_token,
            TokenKind::Access,
            self.config.access_ttl_secs,
            &self.config.issuer,
        );
        let refresh = Claims::for_session(
            session,
            &csrf_token,
            TokenKind::Refresh,
            self.config.refresh_ttl_secs,
            &self.config.issuer,
        );

        Ok(TokenPair {
            access_token: self.encode(&access)?,
            refresh_token: self.encode(&refresh)?,
            csrf_token,
        })
    }

    /// Signs arbitrary claims.
    pub fn encode(&self, claims: &Claims) -> ApiResult<String> {
        let header = Header::new(self.config.algorithm);

        encode(&header, claims, &self.encoding_key)
            .map_err(|e| ApiError::internal(format!("Failed to sign token: {}", e)))
    }

    /// Verifies signature, issuer and expiry, and returns the claims.
    pub fn validate(&self, token: &str) -> Result<Claims, TokenError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Malformed {
                    reason: e.to_string(),
                },
            })
    }

    /// Validates `token` and requires it to be of the `expected` kind.
    pub fn validate_kind(&self, token: &str, expected: TokenKind) -> Result<Claims, TokenError> {
        let claims = self.validate(token)?;
        if claims.kind != expected {
            return Err(TokenError::WrongKind {
                expected: expected.as_str(),
                found: claims.kind.as_str(),
            });
        }
        Ok(claims)
    }

    /// Returns the configured issuer.
    pub fn issuer(&self) -> &str {
        &self.config.issuer
    }
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCodec")
            .field("issuer", &self.config.issuer)
            .field("algorithm", &self.config.algorithm)
            .field("access_ttl_secs", &self.config.access_ttl_secs)
            .finish()
    }
}

/// Generates a random URL-safe CSRF secret.
fn generate_csrf_secret() -> String {
    let mut bytes = [0u8; CSRF_SECRET_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use gatehouse_core::UserId;

    fn test_codec() -> TokenCodec {
        TokenCodec::new(TokenConfig::new("test-secret-key-that-is-long-enough-for-testing"))
            .unwrap()
    }

    #[test]
    fn test_issue_and_validate_pair() {
        let codec = test_codec();
        let session = Session::new(UserId::new(7));

        let pair = codec.issue(&session).unwrap();
        assert_ne!(pair.access_token, pair.refresh_token);
        assert!(!pair.csrf_token.is_empty());

        let access = codec.validate_kind(&pair.access_token, TokenKind::Access).unwrap();
        let refresh = codec.validate_kind(&pair.refresh_token, TokenKind::Refresh).unwrap();

        assert_eq!(access.user_id, UserId::new(7));
        assert_eq!(access.session_identifier, session.identifier);
        assert_eq!(access.csrf, pair.csrf_token);
        assert_eq!(refresh.csrf, pair.csrf_token);
        assert!(refresh.exp > access.exp);
    }

    #[test]
    fn test_issue_uses_configured_lifetimes() {
        let codec = TokenCodec::new(
            TokenConfig::new("test-secret-key-that-is-long-enough-for-testing").with_ttls(60, 600),
        )
        .unwrap();
        let pair = codec.issue(&Session::new(UserId::new(7))).unwrap();

        let access = codec.validate(&pair.access_token).unwrap();
        let refresh = codec.validate(&pair.refresh_token).unwrap();
        assert_eq!(access.exp - access.iat, 60);
        assert_eq!(refresh.exp - refresh.iat, 600);
    }

    #[test]
    fn test_each_issue_has_new_csrf() {
        let codec = test_codec();
        let session = Session::new(UserId::new(1));
        let a = codec.issue(&session).unwrap();
        let b = codec.issue(&session).unwrap();
        assert_ne!(a.csrf_token, b.csrf_token);
    }

    #[test]
    fn test_expired_token() {
        let codec = test_codec();
        let session = Session::new(UserId::new(1));
        let claims = Claims::for_session(&session, "c", TokenKind::Access, 900, codec.issuer())
            .with_expiration(Utc::now().timestamp() - 3600);
        let token = codec.encode(&claims).unwrap();

        assert_eq!(codec.validate(&token), Err(TokenError::Expired));
    }

    #[test]
    fn test_malformed_token() {
        let codec = test_codec();
        let err = codec.validate("invalid.token.here").unwrap_err();
        assert_eq!(err.error_type(), "malformed");
    }

    #[test]
    fn test_wrong_secret() {
        let one = TokenCodec::new(TokenConfig::new("secret-one-for-testing-purposes-xx")).unwrap();
        let two = TokenCodec::new(TokenConfig::new("secret-two-for-testing-purposes-xx")).unwrap();

        let pair = one.issue(&Session::new(UserId::new(1))).unwrap();
        assert!(matches!(
            two.validate(&pair.access_token),
            Err(TokenError::Malformed { .. })
        ));
    }

    #[test]
    fn test_wrong_issuer() {
        let one = TokenCodec::new(
            TokenConfig::new("shared-secret-for-testing-purposes").with_issuer("a"),
        )
        .unwrap();
        let two = TokenCodec::new(
            TokenConfig::new("shared-secret-for-testing-purposes").with_issuer("b"),
        )
        .unwrap();

        let pair = one.issue(&Session::new(UserId::new(1))).unwrap();
        assert!(two.validate(&pair.access_token).is_err());
    }

    #[test]
    fn test_kind_mismatch() {
        let codec = test_codec();
        let pair = codec.issue(&Session::new(UserId::new(1))).unwrap();

        let err = codec
            .validate_kind(&pair.refresh_token, TokenKind::Access)
            .unwrap_err();
        assert_eq!(
            err,
            TokenError::WrongKind {
                expected: "access",
                found: "refresh"
            }
        );
    }

    #[test]
    fn test_missing_secret_rejected() {
        assert!(TokenCodec::new(TokenConfig::default()).is_err());
        assert!(TokenCodec::new(
            TokenConfig::new("secret").with_algorithm(Algorithm::RS256)
        )
        .is_err());
    }
}
