// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Configuration schema definitions for gatehouse.
//!
//! # Schema Structure
//!
//! ```text
//! GatehouseConfig
//! ├── server: ServerConfig
//! ├── auth: AuthConfig
//! ├── logging: LoggingConfig
//! └── users: Vec<UserSeed>
//! ```

use crate::error::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

// =============================================================================
// Constants
// =============================================================================

/// Default listen port.
pub const DEFAULT_PORT: u16 = 8080;

/// Default access token lifetime (15 minutes).
pub const DEFAULT_ACCESS_TTL_SECS: u64 = 900;

/// Default refresh token lifetime (24 hours).
pub const DEFAULT_REFRESH_TTL_SECS: u64 = 86_400;

/// Longest allowed refresh token lifetime (30 days).
pub const MAX_REFRESH_TTL_SECS: u64 = 30 * 86_400;

/// Signing secrets shorter than this are accepted with a warning.
pub const RECOMMENDED_SECRET_LEN: usize = 32;

// =============================================================================
// Top-Level Configuration
// =============================================================================

/// The root configuration structure for gatehouse.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GatehouseConfig {
    /// HTTP server configuration.
    #[serde(default)]
    pub server: ServerConfig,

    /// Authentication configuration.
    #[serde(default)]
    pub auth: AuthConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Users seeded into the in-memory user directory.
    #[serde(default)]
    pub users: Vec<UserSeed>,
}

impl GatehouseConfig {
    /// Validates the entire configuration.
    ///
    /// # Returns
    ///
    /// * `Ok(())` if the configuration is valid
    /// * `Err(ConfigError)` if validation fails
    pub fn validate(&self) -> ConfigResult<()> {
        self.server.validate()?;
        self.auth.validate()?;

        let mut ids = HashSet::new();
        let mut emails = HashSet::new();
        for user in &self.users {
            user.validate()?;
            if !ids.insert(user.id) {
                return Err(ConfigError::duplicate_user("id", user.id.to_string()));
            }
            if !emails.insert(user.email.to_ascii_lowercase()) {
                return Err(ConfigError::duplicate_user("email", &user.email));
            }
        }

        Ok(())
    }

    /// Returns non-fatal findings worth logging at startup.
    pub fn warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        if !self.auth.enabled {
            warnings.push("auth.enabled is false: every route is served without authentication".to_string());
        } else if self.auth.signing_secret.len() < RECOMMENDED_SECRET_LEN {
            warnings.push(format!(
                "auth.signing_secret is shorter than {} bytes",
                RECOMMENDED_SECRET_LEN
            ));
        }
        if !self.auth.csrf_enabled {
            warnings.push("auth.csrf_enabled is false: CSRF header is not checked".to_string());
        }
        if self.auth.enabled && !self.auth.cookie_secure {
            warnings.push("auth.cookie_secure is false: refresh cookie is sent over plain HTTP".to_string());
        }
        warnings
    }
}

// =============================================================================
// Server Configuration
// =============================================================================

/// HTTP server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Bind address.
    #[serde(default = "default_host")]
    pub host: IpAddr,

    /// Listen port.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Request timeout in seconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Allowed CORS origins ("*" for any).
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0))
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_request_timeout() -> u64 {
    30
}

impl ServerConfig {
    /// Validates the server configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::validation(
                "server.request_timeout_secs",
                "cannot be zero",
            ));
        }
        Ok(())
    }

    /// Returns the request timeout as a Duration.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Returns the socket address.
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: DEFAULT_PORT,
            request_timeout_secs: default_request_timeout(),
            allowed_origins: Vec::new(),
        }
    }
}

// =============================================================================
// Auth Configuration
// =============================================================================

/// Token, session and cookie settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuthConfig {
    /// Whether the auth gate runs at all.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Whether the CSRF header is checked.
    #[serde(default = "default_true")]
    pub csrf_enabled: bool,

    /// HMAC signing secret.
    #[serde(default)]
    pub signing_secret: SecretValue,

    /// Token issuer claim.
    #[serde(default = "default_issuer")]
    pub issuer: String,

    /// Signing algorithm.
    #[serde(default)]
    pub algorithm: SigningAlgorithm,

    /// Access token lifetime in seconds.
    #[serde(default = "default_access_ttl")]
    pub access_ttl_secs: u64,

    /// Refresh token lifetime in seconds.
    #[serde(default = "default_refresh_ttl")]
    pub refresh_ttl_secs: u64,

    /// Clock skew tolerated on expiry, in seconds.
    #[serde(default)]
    pub leeway_secs: u64,

    /// Domain attribute for the refresh cookie.
    #[serde(default)]
    pub cookie_domain: Option<String>,

    /// Path attribute for the refresh cookie.
    #[serde(default = "default_cookie_path")]
    pub cookie_path: String,

    /// Whether the refresh cookie is marked `Secure`.
    #[serde(default)]
    pub cookie_secure: bool,
}

fn default_true() -> bool {
    true
}

fn default_issuer() -> String {
    "gatehouse".to_string()
}

fn default_access_ttl() -> u64 {
    DEFAULT_ACCESS_TTL_SECS
}

fn default_refresh_ttl() -> u64 {
    DEFAULT_REFRESH_TTL_SECS
}

fn default_cookie_path() -> String {
    "/".to_string()
}

impl AuthConfig {
    /// Validates the auth configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.enabled && self.signing_secret.is_empty() {
            return Err(ConfigError::missing_field("auth.signing_secret"));
        }
        if self.access_ttl_secs == 0 {
            return Err(ConfigError::out_of_range(
                "auth.access_ttl_secs",
                0,
                1,
                MAX_REFRESH_TTL_SECS,
            ));
        }
        if self.refresh_ttl_secs == 0 || self.refresh_ttl_secs > MAX_REFRESH_TTL_SECS {
            return Err(ConfigError::out_of_range(
                "auth.refresh_ttl_secs",
                self.refresh_ttl_secs,
                1,
                MAX_REFRESH_TTL_SECS,
            ));
        }
        if self.access_ttl_secs > self.refresh_ttl_secs {
            return Err(ConfigError::validation(
                "auth.access_ttl_secs",
                "must not exceed auth.refresh_ttl_secs",
            ));
        }
        if !self.cookie_path.starts_with('/') {
            return Err(ConfigError::validation(
                "auth.cookie_path",
                "must start with '/'",
            ));
        }
        Ok(())
    }

    /// Returns the access token lifetime.
    pub fn access_ttl(&self) -> Duration {
        Duration::from_secs(self.access_ttl_secs)
    }

    /// Returns the refresh token lifetime.
    pub fn refresh_ttl(&self) -> Duration {
        Duration::from_secs(self.refresh_ttl_secs)
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            csrf_enabled: true,
            signing_secret: SecretValue::default(),
            issuer: default_issuer(),
            algorithm: SigningAlgorithm::default(),
            access_ttl_secs: DEFAULT_ACCESS_TTL_SECS,
            refresh_ttl_secs: DEFAULT_REFRESH_TTL_SECS,
            leeway_secs: 0,
            cookie_domain: None,
            cookie_path: default_cookie_path(),
            cookie_secure: false,
        }
    }
}

/// Token signing algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SigningAlgorithm {
    /// HMAC using SHA-256.
    #[default]
    HS256,
    /// HMAC using SHA-384.
    HS384,
    /// HMAC using SHA-512.
    HS512,
}

// =============================================================================
// Logging Configuration
// =============================================================================

/// Logging configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Log level.
    #[serde(default)]
    pub level: LogLevel,

    /// Log format.
    #[serde(default)]
    pub format: LogFormat,
}

/// Log level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Trace level.
    Trace,
    /// Debug level.
    Debug,
    /// Info level.
    #[default]
    Info,
    /// Warning level.
    Warn,
    /// Error level.
    Error,
}

impl LogLevel {
    /// Returns the level as a filter directive.
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }

    /// Parses a level name, case-insensitively.
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "trace" => Some(LogLevel::Trace),
            "debug" => Some(LogLevel::Debug),
            "info" => Some(LogLevel::Info),
            "warn" | "warning" => Some(LogLevel::Warn),
            "error" => Some(LogLevel::Error),
            _ => None,
        }
    }
}

/// Log format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable text.
    #[default]
    #[serde(alias = "pretty")]
    Text,
    /// Compact single-line text.
    Compact,
    /// JSON for log aggregation.
    Json,
}

// =============================================================================
// User Seeds
// =============================================================================

/// A user loaded into the in-memory user directory at startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UserSeed {
    /// User ID.
    pub id: u64,

    /// Login email.
    pub email: String,

    /// Display first name.
    #[serde(default)]
    pub first_name: String,

    /// Argon2 PHC hash of the password.
    pub password_hash: SecretValue,

    /// Privilege tier (`standard` or `elevated`).
    #[serde(default)]
    pub tier: UserTier,
}

impl UserSeed {
    /// Validates the seed entry.
    pub fn validate(&self) -> ConfigResult<()> {
        if !self.email.contains('@') {
            return Err(ConfigError::validation(
                format!("users[{}].email", self.id),
                "must be an email address",
            ));
        }
        if !self.password_hash.raw().starts_with("$argon2") {
            return Err(ConfigError::validation(
                format!("users[{}].password_hash", self.id),
                "must be an Argon2 PHC string",
            ));
        }
        Ok(())
    }
}

/// Privilege tier as written in configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserTier {
    /// Standard user.
    #[default]
    #[serde(alias = "normal")]
    Standard,
    /// Elevated (admin) user.
    #[serde(alias = "admin")]
    Elevated,
}

// =============================================================================
// Secret Value
// =============================================================================

/// A secret configuration value that never prints its contents.
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SecretValue(String);

impl SecretValue {
    /// Creates a new secret value.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the raw value.
    pub fn raw(&self) -> &str {
        &self.0
    }

    /// Returns the value as bytes.
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    /// Returns the length in bytes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if no secret is set.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Display for SecretValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "***")
    }
}

impl std::fmt::Debug for SecretValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SecretValue(***)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn enabled_auth() -> AuthConfig {
        AuthConfig {
            signing_secret: SecretValue::new("0123456789abcdef0123456789abcdef"),
            ..Default::default()
        }
    }

    #[test]
    fn test_defaults() {
        let config = GatehouseConfig::default();
        assert_eq!(config.server.port, 8080);
        assert!(config.auth.enabled);
        assert!(config.auth.csrf_enabled);
        assert_eq!(config.auth.access_ttl_secs, 900);
        assert_eq!(config.auth.refresh_ttl_secs, 86_400);
        assert_eq!(config.auth.cookie_path, "/");
        assert!(config.users.is_empty());
    }

    #[test]
    fn test_auth_requires_secret_when_enabled() {
        let mut auth = AuthConfig::default();
        assert!(matches!(
            auth.validate(),
            Err(ConfigError::MissingField { .. })
        ));

        auth.enabled = false;
        assert!(auth.validate().is_ok());

        assert!(enabled_auth().validate().is_ok());
    }

    #[test]
    fn test_auth_ttl_bounds() {
        let mut auth = enabled_auth();
        auth.access_ttl_secs = 0;
        assert!(auth.validate().is_err());

        let mut auth = enabled_auth();
        auth.access_ttl_secs = 7200;
        auth.refresh_ttl_secs = 3600;
        assert!(auth.validate().is_err());

        let mut auth = enabled_auth();
        auth.refresh_ttl_secs = MAX_REFRESH_TTL_SECS + 1;
        assert!(matches!(auth.validate(), Err(ConfigError::OutOfRange { .. })));
    }

    #[test]
    fn test_duplicate_user_email_rejected() {
        let seed = |id: u64, email: &str| UserSeed {
            id,
            email: email.to_string(),
            first_name: String::new(),
            password_hash: SecretValue::new("$argon2id$v=19$m=19456,t=2,p=1$c2FsdA$aGFzaA"),
            tier: UserTier::Standard,
        };
        let config = GatehouseConfig {
            auth: enabled_auth(),
            users: vec![seed(1, "a@example.com"), seed(2, "A@example.com")],
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::DuplicateUser { kind: "email", .. })
        ));
    }

    #[test]
    fn test_secret_value_is_redacted() {
        let secret = SecretValue::new("hunter2");
        assert_eq!(secret.to_string(), "***");
        assert!(!format!("{:?}", secret).contains("hunter2"));
        assert_eq!(secret.raw(), "hunter2");
    }

    #[test]
    fn test_warnings() {
        let mut config = GatehouseConfig {
            auth: AuthConfig {
                signing_secret: SecretValue::new("short"),
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(config.warnings().iter().any(|w| w.contains("shorter")));

        config.auth.enabled = false;
        assert!(config.warnings().iter().any(|w| w.contains("auth.enabled")));
    }

    #[test]
    fn test_log_level_parse() {
        assert_eq!(LogLevel::parse("DEBUG"), Some(LogLevel::Debug));
        assert_eq!(LogLevel::parse("warning"), Some(LogLevel::Warn));
        assert_eq!(LogLevel::parse("loud"), None);
        assert_eq!(LogLevel::Info.as_str(), "info");
    }
}
