// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! API handlers for all endpoints.
//!
//! - [`health`]: liveness
//! - [`login`], [`logout`]: session open and close
//! - [`current_user`], [`get_user`]: principal and user lookups

mod auth;
mod health;
mod users;

pub use auth::*;
pub use health::*;
pub use users::*;
