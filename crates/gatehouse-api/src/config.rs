// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! API server configuration.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use crate::auth::TokenConfig;
use crate::cookies::CookieConfig;

// =============================================================================
// ApiConfig
// =============================================================================

/// Configuration for the API server.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Server host address.
    pub host: IpAddr,
    /// Server port.
    pub port: u16,
    /// CORS configuration.
    pub cors: CorsConfig,
    /// Auth gate configuration.
    pub auth: AuthSettings,
    /// Request timeout.
    pub request_timeout: Duration,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0)),
            port: 8080,
            cors: CorsConfig::default(),
            auth: AuthSettings::default(),
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl ApiConfig {
    /// Creates a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the socket address to bind to.
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Sets the host address.
    pub fn with_host(mut self, host: IpAddr) -> Self {
        self.host = host;
        self
    }

    /// Sets the port.
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Sets the auth settings.
    pub fn with_auth(mut self, auth: AuthSettings) -> Self {
        self.auth = auth;
        self
    }

    /// Sets the CORS configuration.
    pub fn with_cors(mut self, cors: CorsConfig) -> Self {
        self.cors = cors;
        self
    }

    /// Sets the request timeout.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

// =============================================================================
// AuthSettings
// =============================================================================

/// Auth gate settings.
#[derive(Debug, Clone)]
pub struct AuthSettings {
    /// When `false`, gated routes pass every request through.
    pub enabled: bool,
    /// Whether the CSRF echo is enforced.
    pub csrf_enabled: bool,
    /// Token signing and lifetimes.
    pub tokens: TokenConfig,
    /// Refresh cookie attributes.
    pub cookies: CookieConfig,
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            csrf_enabled: true,
            tokens: TokenConfig::default(),
            cookies: CookieConfig::default(),
        }
    }
}

impl AuthSettings {
    /// Creates settings around `tokens`.
    ///
    /// The cookie Max-Age follows the refresh token lifetime.
    pub fn new(tokens: TokenConfig) -> Self {
        let cookies = CookieConfig::default().with_max_age(tokens.refresh_ttl_secs);
        Self {
            tokens,
            cookies,
            ..Default::default()
        }
    }

    /// Sets the cookie attributes.
    pub fn with_cookies(mut self, cookies: CookieConfig) -> Self {
        self.cookies = cookies;
        self
    }

    /// Enables or disables the gate.
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Enables or disables CSRF enforcement.
    pub fn with_csrf(mut self, enabled: bool) -> Self {
        self.csrf_enabled = enabled;
        self
    }
}

// =============================================================================
// CorsConfig
// =============================================================================

/// CORS (Cross-Origin Resource Sharing) configuration.
///
/// Credentials are always allowed, so a `*` origin is answered by echoing
/// the request origin.
#[derive(Debug, Clone)]
pub struct CorsConfig {
    /// Allowed origins.
    pub allowed_origins: Vec<String>,
    /// Max age for preflight cache (seconds).
    pub max_age: u64,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec!["*".to_string()],
            max_age: 3600,
        }
    }
}

impl CorsConfig {
    /// Creates a configuration limited to `origins`.
    pub fn strict(origins: Vec<String>) -> Self {
        Self {
            allowed_origins: origins,
            ..Default::default()
        }
    }

    /// Returns `true` if any origin is allowed.
    pub fn allows_any_origin(&self) -> bool {
        self.allowed_origins.is_empty() || self.allowed_origins.iter().any(|o| o == "*")
    }
}

// =============================================================================
// Tests
// =============================================================================
