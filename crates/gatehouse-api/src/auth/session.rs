// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Session lifecycle over an injected credential store.

use std::sync::Arc;

use thiserror::Error;
use tracing::debug;

use gatehouse_core::{CredentialStore, Session, SessionIdentifier, StoreError, UserId};

/// Why a session lookup did not produce a live session.
#[derive(Debug, Error)]
pub enum SessionLookupError {
    /// No live row matches the user and identifier.
    #[error("no live session matches the presented identifier")]
    NotFound,

    /// The store failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Owns session creation, rotation, lookup and destruction.
///
/// Rotation is destroy-and-recreate: every call to
/// [`create_or_rotate`](Self::create_or_rotate) mints a new identifier, so
/// tokens bound to the previous one stop resolving immediately.
#[derive(Clone)]
pub struct SessionManager {
    store: Arc<dyn CredentialStore>,
}

impl SessionManager {
    /// Creates a manager over `store`.
    pub fn new(store: Arc<dyn CredentialStore>) -> Self {
        Self { store }
    }

    /// Replaces any session for `user_id` with a fresh one.
    ///
    /// Used at login and on every successful authentication.
    pub async fn create_or_rotate(&self, user_id: UserId) -> Result<Session, StoreError> {
        let session = self.store.create(user_id).await?;
        debug!(user_id = %user_id, store = self.store.name(), "Session rotated");
        Ok(session)
    }

    /// Confirms that `identifier` is still the live session for `user_id`.
    pub async fn find_by_identity(
        &self,
        user_id: UserId,
        identifier: &SessionIdentifier,
    ) -> Result<Session, SessionLookupError> {
        self.store
            .find(user_id, identifier)
            .await?
            .ok_or(SessionLookupError::NotFound)
    }

    /// Deletes the session for `user_id`.
    pub async fn destroy(&self, user_id: UserId) -> Result<(), StoreError> {
        self.store.delete(user_id).await?;
        debug!(user_id = %user_id, "Session destroyed");
        Ok(())
    }
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("store", &self.store.name())
            .finish()
    }
}
