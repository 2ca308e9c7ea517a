// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # gatehouse-api
//!
//! HTTP surface of the gatehouse session core.
//!
//! Every request to a gated route goes through [`AuthGate`]: the access
//! token is validated (falling back to the refresh cookie), the session is
//! confirmed live, the CSRF echo is checked, privilege is enforced, and the
//! session is rotated so each response carries a brand-new token pair.
//!
//! ## Example
//!
//! ```rust,ignore
//! use gatehouse_api::{ApiConfig, ApiServerBuilder, AuthSettings, TokenConfig};
//!
//! let config = ApiConfig::default()
//!     .with_auth(AuthSettings::new(TokenConfig::new(secret)));
//! let server = ApiServerBuilder::new().config(config).build()?;
//! server.run().await?;
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod auth;
pub mod config;
pub mod cookies;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod response;
pub mod server;
pub mod state;

pub use auth::{
    AuthGate, Authenticated, AuthorizationPolicy, Claims, CredentialSource, GateRequest,
    Principal, Privilege, RejectReason, SessionManager, TokenCodec, TokenConfig, TokenKind,
    TokenPair,
};
pub use config::{ApiConfig, AuthSettings, CorsConfig};
pub use cookies::{CookieConfig, AUTH_HEADER, CSRF_HEADER, REFRESH_COOKIE};
pub use error::{ApiError, ApiResult, ErrorResponseBody};
pub use middleware::AuthLayer;
pub use server::{ApiServer, ApiServerBuilder};
pub use state::{AppState, AppStateBuilder};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
