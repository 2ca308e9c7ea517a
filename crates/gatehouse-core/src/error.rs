// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Error types for the storage collaborators.
//!
//! Store and directory failures are infrastructure errors. Callers surface
//! them to clients as a single generic internal error and record the
//! specific cause here for operators. None of them are retried.

use thiserror::Error;

/// Result type alias for store and directory operations.
pub type StoreResult<T> = Result<T, StoreError>;

// =============================================================================
// StoreError
// =============================================================================

/// Errors raised by a `CredentialStore` or `UserDirectory`.
///
/// "Not found" is not an error: lookups return `Ok(None)`.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing store could not be reached.
    #[error("Store unavailable: {message}")]
    Unavailable {
        /// Error message.
        message: String,
    },

    /// The store was reached but the operation failed.
    #[error("Store operation '{operation}' failed: {message}")]
    Backend {
        /// The operation that failed (e.g. `create`, `find`).
        operation: &'static str,
        /// Error message.
        message: String,
    },
}

impl StoreError {
    /// Creates an unavailable error.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    /// Creates a backend error for the given operation.
    pub fn backend(operation: &'static str, message: impl Into<String>) -> Self {
        Self::Backend {
            operation,
            message: message.into(),
        }
    }

    /// Returns the error type as a string for logging.
    pub fn error_type(&self) -> &'static str {
        match self {
            StoreError::Unavailable { .. } => "unavailable",
            StoreError::Backend { .. } => "backend",
        }
    }
}

// =============================================================================
// PasswordError
// =============================================================================

/// Password hashing errors.
///
/// Verification never errors; a hash that cannot be parsed simply does not
/// match. Only producing a new hash can fail.
#[derive(Debug, Error)]
pub enum PasswordError {
    /// Hashing the password failed.
    #[error("Failed to hash password: {0}")]
    Hash(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_error_display() {
        let err = StoreError::backend("create", "disk full");
        assert_eq!(err.to_string(), "Store operation 'create' failed: disk full");
        assert_eq!(err.error_type(), "backend");

        let err = StoreError::unavailable("connection refused");
        assert_eq!(err.error_type(), "unavailable");
    }
}
