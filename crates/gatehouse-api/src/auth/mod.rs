// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Authentication and authorization module.
//!
//! This module provides:
//! - Token issuance and validation ([`TokenCodec`])
//! - Session rotation over the credential store ([`SessionManager`])
//! - The two-tier privilege check ([`AuthorizationPolicy`])
//! - The per-request decision chain ([`AuthGate`])

mod claims;
mod codec;
mod gate;
mod policy;
mod principal;
mod session;

pub use claims::{Claims, TokenKind};
pub use codec::{TokenCodec, TokenConfig, TokenError, TokenPair};
pub use gate::{AuthGate, Authenticated, CredentialSource, GateRequest, RejectReason};
pub use policy::{AuthorizationPolicy, PolicyDenial, Privilege};
pub use principal::Principal;
pub use session::{SessionLookupError, SessionManager};
