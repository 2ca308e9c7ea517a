// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # gatehouse Integration Tests
//!
//! Shared test utilities plus the integration suites under `tests/`.
//!
//! ## Module Structure
//!
//! - [`common`]: Shared test utilities
//!   - `fixtures`: Users, secrets, and configurations
//!   - `mocks`: Fault-injecting store and directory, a plain-text verifier
//!   - `harness`: Gate and HTTP harnesses driving the real router in-process
//!   - `assertions`: Response assertions keyed on reject reasons
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p gatehouse-tests
//! cargo test -p gatehouse-tests --test integration_gate
//! cargo test -p gatehouse-tests --test integration_http
//! cargo test -p gatehouse-tests --test integration_config
//! ```
//!
//! ## Test Categories
//!
//! ### Gate Tests (`integration_gate.rs`)
//! - Single live session per user under sequential and concurrent rotation
//! - Rotation invalidating previously issued tokens
//! - CSRF binding, fallback order, elevation
//!
//! ### HTTP Tests (`integration_http.rs`)
//! - Login, logout, and the end-to-end request scenarios
//! - Cookie and header handling through the router
//!
//! ### Config Tests (`integration_config.rs`)
//! - Config files on disk mapped onto a running router
//!
//! ## Writing New Tests
//!
//! ```rust,ignore
//! use gatehouse_tests::prelude::*;
//!
//! #[tokio::test]
//! async fn test_something() {
//!     let app = TestApp::new();
//!     let tokens = app.login_as(&UserFixtures::standard()).await;
//!     let response = app.get("/api/private/user/me", &GateRequest::from_pair(&tokens)).await;
//!     response.assert_ok();
//! }
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod common;

/// Re-export commonly used items for convenience.
pub mod prelude {
    pub use crate::common::assertions::*;
    pub use crate::common::fixtures::*;
    pub use crate::common::harness::*;
    pub use crate::common::mocks::*;
    pub use crate::common::{init_test_logging, temp_test_dir};
    pub use gatehouse_api::{GateRequest, Privilege, RejectReason, TokenPair};
}
