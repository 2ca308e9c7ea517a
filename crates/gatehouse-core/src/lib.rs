// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # gatehouse-core
//!
//! Core abstractions and shared types for the gatehouse session core.
//!
//! This crate provides the foundational pieces the API layer builds on:
//!
//! - **Types**: `UserId`, `SessionIdentifier`, `Session`, `PrivilegeTier`, `UserRecord`
//! - **Store**: the `CredentialStore` collaborator that persists one session per user
//! - **Directory**: the `UserDirectory` collaborator used for login and elevation checks
//! - **Memory**: lock-protected in-memory implementations of both collaborators
//! - **Password**: opaque one-way password verification (Argon2)
//! - **Error**: storage and password error types
//!
//! ## Example
//!
//! ```rust,ignore
//! use gatehouse_core::{CredentialStore, MemoryCredentialStore, UserId};
//!
//! let store = MemoryCredentialStore::new();
//! let session = store.create(UserId::new(7)).await?;
//! assert!(store.find(session.user_id, &session.identifier).await?.is_some());
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod directory;
pub mod error;
pub mod memory;
pub mod password;
pub mod store;
pub mod types;

pub use directory::UserDirectory;
pub use error::{PasswordError, StoreError, StoreResult};
pub use memory::{MemoryCredentialStore, MemoryUserDirectory, StoreStats};
pub use password::{hash_password, Argon2Verifier, PasswordVerifier};
pub use store::CredentialStore;
pub use types::{PrivilegeTier, Session, SessionIdentifier, UserId, UserRecord};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
