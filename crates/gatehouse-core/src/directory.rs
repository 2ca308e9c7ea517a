// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! The user directory collaborator.

use async_trait::async_trait;

use crate::error::StoreResult;
use crate::types::{UserId, UserRecord};

/// Read access to stored users.
///
/// The authentication core uses `find_by_id` for elevation checks and
/// `find_by_email` for login. Missing users are `Ok(None)`.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Looks up a user by ID.
    async fn find_by_id(&self, id: UserId) -> StoreResult<Option<UserRecord>>;

    /// Looks up a user by login email.
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<UserRecord>>;
}
