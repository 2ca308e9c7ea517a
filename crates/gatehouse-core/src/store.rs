// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! The credential store collaborator.
//!
//! A credential store persists at most one session per user. It is the only
//! shared mutable state in the authentication path, so implementations must
//! make [`CredentialStore::create`] atomic per user: no observer may ever see
//! two live sessions for one user, or a user with their old row deleted and
//! the new one not yet inserted.

use async_trait::async_trait;

use crate::error::StoreResult;
use crate::types::{Session, SessionIdentifier, UserId};

/// Persistence for session records.
///
/// # Implementors
///
/// - [`MemoryCredentialStore`](crate::memory::MemoryCredentialStore): in-process store
///
/// Relational backends should implement `create` as a transactional
/// delete+insert or a single upsert keyed by `user_id`.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Replaces any session for `user_id` with a new one carrying a freshly
    /// generated identifier, and returns it.
    async fn create(&self, user_id: UserId) -> StoreResult<Session>;

    /// Finds the live session matching both `user_id` and `identifier`.
    ///
    /// Returns `Ok(None)` when no such row exists.
    async fn find(
        &self,
        user_id: UserId,
        identifier: &SessionIdentifier,
    ) -> StoreResult<Option<Session>>;

    /// Deletes the session for `user_id`. Deleting a missing row succeeds.
    async fn delete(&self, user_id: UserId) -> StoreResult<()>;

    /// Returns the store name for logging.
    fn name(&self) -> &str {
        "credential-store"
    }
}
