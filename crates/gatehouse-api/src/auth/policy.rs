// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Two-tier authorization policy.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use gatehouse_core::{StoreError, UserDirectory, UserId};

// =============================================================================
// Privilege
// =============================================================================

/// The privilege a route requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Privilege {
    /// Any authenticated principal.
    #[default]
    Standard,
    /// The principal's stored tier must be elevated.
    Elevated,
}

impl Privilege {
    /// Returns the privilege name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Privilege::Standard => "standard",
            Privilege::Elevated => "elevated",
        }
    }
}

impl std::fmt::Display for Privilege {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// =============================================================================
// PolicyDenial
// =============================================================================

/// Why the policy refused a principal.
#[derive(Debug, Error)]
pub enum PolicyDenial {
    /// The user's stored tier is below the requirement.
    #[error("user {user_id} lacks {required} privilege")]
    Insufficient {
        /// The user checked.
        user_id: UserId,
        /// The privilege required.
        required: Privilege,
    },

    /// The user record could not be loaded.
    #[error("user {user_id} could not be loaded: {reason}")]
    LookupFailed {
        /// The user checked.
        user_id: UserId,
        /// What went wrong.
        reason: String,
    },
}

impl PolicyDenial {
    fn lookup_failed(user_id: UserId, err: &StoreError) -> Self {
        Self::LookupFailed {
            user_id,
            reason: err.to_string(),
        }
    }
}

// =============================================================================
// AuthorizationPolicy
// =============================================================================

/// Decides whether a principal satisfies a route's privilege requirement.
///
/// Standard routes admit every authenticated principal without touching the
/// directory. Elevated routes load the user and compare the stored tier.
#[derive(Clone)]
pub struct AuthorizationPolicy {
    directory: Arc<dyn UserDirectory>,
}

impl AuthorizationPolicy {
    /// Creates a policy over `directory`.
    pub fn new(directory: Arc<dyn UserDirectory>) -> Self {
        Self { directory }
    }

    /// Checks `user_id` against `required`.
    pub async fn check(&self, user_id: UserId, required: Privilege) -> Result<(), PolicyDenial> {
        if required == Privilege::Standard {
            return Ok(());
        }

        let user = self
            .directory
            .find_by_id(user_id)
            .await
            .map_err(|e| PolicyDenial::lookup_failed(user_id, &e))?
            .ok_or_else(|| PolicyDenial::LookupFailed {
                user_id,
                reason: "user not found".to_string(),
            })?;

        if user.tier.is_elevated() {
            Ok(())
        } else {
            Err(PolicyDenial::Insufficient { user_id, required })
        }
    }
}

impl std::fmt::Debug for AuthorizationPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthorizationPolicy").finish_non_exhaustive()
    }
}
