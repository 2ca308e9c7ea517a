// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Middleware implementations for the API server.
//!
//! - [`AuthMiddleware`]: runs the auth gate and rotates credentials

mod auth;

pub use auth::{AuthLayer, AuthMiddleware};
