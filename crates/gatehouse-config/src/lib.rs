// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # gatehouse-config
//!
//! Configuration management for the gatehouse session core.
//!
//! ## Features
//!
//! - **Schema Definition**: server, auth, logging and user seed sections with validation
//! - **Multi-Format Support**: YAML, TOML, and JSON configuration files
//! - **Environment Overrides**: Override config values via `GATEHOUSE_*` variables
//! - **Placeholders**: `${VAR}` and `${VAR:default}` inside config files
//!
//! ## Quick Start
//!
//! ```no_run
//! use gatehouse_config::loader::load_config;
//!
//! let config = load_config("gatehouse.yaml").unwrap();
//!
//! println!("Listening on {}", config.server.socket_addr());
//! println!("CSRF enforced: {}", config.auth.csrf_enabled);
//! ```
//!
//! ## Configuration Schema
//!
//! - `server` - Bind address, port, timeout, CORS origins
//! - `auth` - Signing secret, token lifetimes, CSRF switch, cookie attributes
//! - `logging` - Logging configuration
//! - `users` - Users seeded into the in-memory directory
//!
//! ## Environment Variables
//!
//! ```text
//! GATEHOUSE_SERVER_PORT=9090
//! GATEHOUSE_AUTH_SECRET=...
//! GATEHOUSE_AUTH_ENABLED=true
//! GATEHOUSE_CSRF_ENABLED=true
//! GATEHOUSE_COOKIE_DOMAIN=example.com
//! GATEHOUSE_LOG_LEVEL=debug
//! ```
//!
//! Values in config files can reference environment variables:
//!
//! ```yaml
//! auth:
//!   signing_secret: "${GATEHOUSE_SECRET}"
//!   cookie_domain: "${COOKIE_DOMAIN:localhost}"
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

// =============================================================================
// Modules
// =============================================================================

pub mod error;
pub mod loader;
pub mod schema;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{ConfigError, ConfigResult};
pub use schema::{
    AuthConfig, GatehouseConfig, LogFormat, LogLevel, LoggingConfig, SecretValue, ServerConfig,
    SigningAlgorithm, UserSeed, UserTier,
};

pub use loader::{load_config, load_config_str, ConfigFormat, ConfigLoader, ConfigLoaderBuilder};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");

// =============================================================================
// Prelude
// =============================================================================

/// Convenience re-exports for common use cases.
pub mod prelude {
    pub use crate::error::{ConfigError, ConfigResult};
    pub use crate::loader::{load_config, ConfigLoader};
    pub use crate::schema::{AuthConfig, GatehouseConfig, SecretValue};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name() {
        assert_eq!(NAME, "gatehouse-config");
        assert!(!VERSION.is_empty());
    }
}
