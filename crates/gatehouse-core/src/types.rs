// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Core data types for gatehouse.
//!
//! This module provides the identity and session types shared by the
//! storage collaborators and the API layer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

// =============================================================================
// Identifiers
// =============================================================================

/// A unique identifier for a user.
///
/// User IDs are assigned by the user directory and never change.
///
/// # Examples
///
/// ```
/// use gatehouse_core::types::UserId;
///
/// let id = UserId::new(42);
/// assert_eq!(id.get(), 42);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(u64);

impl UserId {
    /// Creates a new user ID.
    #[inline]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw numeric ID.
    #[inline]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for UserId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

/// An opaque random value binding issued tokens to one persisted session.
///
/// A new identifier is generated on every login and every rotation, so
/// tokens carrying an older identifier stop matching the live session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionIdentifier(String);

impl SessionIdentifier {
    /// Wraps an existing identifier value.
    #[inline]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generates a fresh random identifier.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    /// Returns the identifier as a string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` if the identifier is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for SessionIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for SessionIdentifier {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl AsRef<str> for SessionIdentifier {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// =============================================================================
// Session
// =============================================================================

/// One live session record.
///
/// At most one session exists per user at any time. Rotation replaces the
/// whole record rather than mutating it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// The authenticated user.
    pub user_id: UserId,

    /// The random identifier bound into issued tokens.
    pub identifier: SessionIdentifier,

    /// When this record was created.
    pub created_at: DateTime<Utc>,
}

impl Session {
    /// Creates a new session for `user_id` with a freshly generated identifier.
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            identifier: SessionIdentifier::generate(),
            created_at: Utc::now(),
        }
    }

    /// Returns `true` if this session belongs to `user_id` and carries `identifier`.
    pub fn matches(&self, user_id: UserId, identifier: &SessionIdentifier) -> bool {
        self.user_id == user_id && &self.identifier == identifier
    }
}

impl fmt::Display for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "session(user={}, id={})", self.user_id, self.identifier)
    }
}

// =============================================================================
// Users
// =============================================================================

/// A user's stored privilege tier.
///
/// There are exactly two tiers. `Elevated` unlocks administrative routes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrivilegeTier {
    /// Any authenticated user.
    #[default]
    #[serde(alias = "normal", alias = "user")]
    Standard,

    /// Administrative user.
    #[serde(alias = "admin")]
    Elevated,
}

impl PrivilegeTier {
    /// Returns the tier name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::Elevated => "elevated",
        }
    }

    /// Returns `true` for the elevated tier.
    #[inline]
    pub fn is_elevated(&self) -> bool {
        matches!(self, Self::Elevated)
    }
}

impl fmt::Display for PrivilegeTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A user as stored in the user directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    /// User ID.
    pub id: UserId,

    /// Login email.
    pub email: String,

    /// Display first name.
    #[serde(default)]
    pub first_name: String,

    /// One-way password hash (PHC string).
    #[serde(skip_serializing)]
    pub password_hash: String,

    /// Privilege tier.
    #[serde(default)]
    pub tier: PrivilegeTier,
}

impl UserRecord {
    /// Creates a standard-tier user.
    pub fn new(id: UserId, email: impl Into<String>, password_hash: impl Into<String>) -> Self {
        Self {
            id,
            email: email.into(),
            first_name: String::new(),
            password_hash: password_hash.into(),
            tier: PrivilegeTier::Standard,
        }
    }

    /// Sets the first name.
    pub fn with_first_name(mut self, first_name: impl Into<String>) -> Self {
        self.first_name = first_name.into();
        self
    }

    /// Sets the privilege tier.
    pub fn with_tier(mut self, tier: PrivilegeTier) -> Self {
        self.tier = tier;
        self
    }
}
