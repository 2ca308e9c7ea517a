// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Password verification.
//!
//! The authentication core treats password checking as an opaque one-way
//! comparison behind [`PasswordVerifier`]. The bundled implementation
//! verifies Argon2 PHC strings.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, SaltString};
use argon2::Argon2;

use crate::error::PasswordError;

/// One-way password comparison.
pub trait PasswordVerifier: Send + Sync {
    /// Returns `true` if `password` matches the stored `hash`.
    ///
    /// An unparseable hash never matches.
    fn verify(&self, password: &str, hash: &str) -> bool;
}

/// Verifies Argon2 PHC strings with default parameters.
#[derive(Debug, Clone, Copy, Default)]
pub struct Argon2Verifier;

impl Argon2Verifier {
    /// Creates a new verifier.
    pub fn new() -> Self {
        Self
    }
}

impl PasswordVerifier for Argon2Verifier {
    fn verify(&self, password: &str, hash: &str) -> bool {
        match PasswordHash::new(hash) {
            Ok(parsed) => {
                use argon2::PasswordVerifier as _;
                Argon2::default()
                    .verify_password(password.as_bytes(), &parsed)
                    .is_ok()
            }
            Err(_) => false,
        }
    }
}

/// Hashes `password` into an Argon2id PHC string with a random salt.
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| PasswordError::Hash(e.to_string()))
}
