// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! In-memory collaborator implementations.
//!
//! These back the binary when no external database is configured and are
//! used throughout the test suite.
//!
//! # Features
//!
//! - **Atomic Rotation**: `create` swaps the user's row under a single write lock
//! - **Thread-Safe**: Uses `parking_lot::RwLock` for minimal contention
//! - **Lock-Free Stats**: Operation counters use atomics
//! - **No Persistence**: Data is lost when the store is dropped
//!
//! # Example
//!
//! ```rust,ignore
//! use gatehouse_core::{CredentialStore, MemoryCredentialStore, UserId};
//!
//! let store = MemoryCredentialStore::new();
//! let first = store.create(UserId::new(1)).await?;
//! let second = store.create(UserId::new(1)).await?;
//!
//! // Last login wins.
//! assert_eq!(store.session_count(), 1);
//! assert!(store.find(UserId::new(1), &first.identifier).await?.is_none());
//! ```

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use parking_lot::RwLock;
use tracing::debug;

use crate::directory::UserDirectory;
use crate::error::StoreResult;
use crate::store::CredentialStore;
use crate::types::{Session, SessionIdentifier, UserId, UserRecord};

// =============================================================================
// Statistics
// =============================================================================

/// A snapshot of store operation counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreStats {
    /// Sessions created (logins and rotations).
    pub creates: u64,
    /// Sessions that replaced an existing row.
    pub replacements: u64,
    /// Lookups performed.
    pub lookups: u64,
    /// Lookups that found a matching row.
    pub hits: u64,
    /// Explicit deletions that removed a row.
    pub deletes: u64,
}

#[derive(Debug, Default)]
struct StoreStatsInner {
    creates: AtomicU64,
    replacements: AtomicU64,
    lookups: AtomicU64,
    hits: AtomicU64,
    deletes: AtomicU64,
}

impl StoreStatsInner {
    fn snapshot(&self) -> StoreStats {
        StoreStats {
            creates: self.creates.load(Ordering::Relaxed),
            replacements: self.replacements.load(Ordering::Relaxed),
            lookups: self.lookups.load(Ordering::Relaxed),
            hits: self.hits.load(Ordering::Relaxed),
            deletes: self.deletes.load(Ordering::Relaxed),
        }
    }
}

// =============================================================================
// MemoryCredentialStore
// =============================================================================

/// An in-memory credential store.
///
/// Sessions are keyed by user ID, so the single-live-session rule is a
/// property of the map itself. `create` inserts under the write lock, which
/// replaces the previous row in one step.
///
/// # Thread Safety
///
/// This struct is `Send + Sync`. Different users still share one lock; the
/// critical sections are a single map operation.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    sessions: RwLock<HashMap<UserId, Session>>,
    stats: StoreStatsInner,
}

impl MemoryCredentialStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of live sessions.
    pub fn session_count(&self) -> usize {
        self.sessions.read().len()
    }

    /// Returns the live session for `user_id`, if any.
    pub fn session_for(&self, user_id: UserId) -> Option<Session> {
        self.sessions.read().get(&user_id).cloned()
    }

    /// Returns a snapshot of the operation counters.
    pub fn stats(&self) -> StoreStats {
        self.stats.snapshot()
    }

    /// Removes every session.
    pub fn clear(&self) {
        self.sessions.write().clear();
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn create(&self, user_id: UserId) -> StoreResult<Session> {
        let session = Session::new(user_id);
        let previous = self.sessions.write().insert(user_id, session.clone());

        self.stats.creates.fetch_add(1, Ordering::Relaxed);
        if previous.is_some() {
            self.stats.replacements.fetch_add(1, Ordering::Relaxed);
        }

        debug!(
            user_id = %user_id,
            replaced = previous.is_some(),
            "Session created"
        );
        Ok(session)
    }

    async fn find(
        &self,
        user_id: UserId,
        identifier: &SessionIdentifier,
    ) -> StoreResult<Option<Session>> {
        self.stats.lookups.fetch_add(1, Ordering::Relaxed);

        let found = self
            .sessions
            .read()
            .get(&user_id)
            .filter(|s| s.matches(user_id, identifier))
            .cloned();

        if found.is_some() {
            self.stats.hits.fetch_add(1, Ordering::Relaxed);
        }
        Ok(found)
    }

    async fn delete(&self, user_id: UserId) -> StoreResult<()> {
        if self.sessions.write().remove(&user_id).is_some() {
            self.stats.deletes.fetch_add(1, Ordering::Relaxed);
            debug!(user_id = %user_id, "Session deleted");
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "memory"
    }
}

// =============================================================================
// MemoryUserDirectory
// =============================================================================

/// An in-memory user directory.
#[derive(Debug, Default)]
pub struct MemoryUserDirectory {
    users: RwLock<HashMap<UserId, UserRecord>>,
}

impl MemoryUserDirectory {
    /// Creates an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a directory seeded with `users`.
    pub fn with_users(users: impl IntoIterator<Item = UserRecord>) -> Self {
        let directory = Self::new();
        for user in users {
            directory.insert(user);
        }
        directory
    }

    /// Inserts or replaces a user.
    pub fn insert(&self, user: UserRecord) {
        self.users.write().insert(user.id, user);
    }

    /// Returns the number of users.
    pub fn len(&self) -> usize {
        self.users.read().len()
    }

    /// Returns `true` if the directory has no users.
    pub fn is_empty(&self) -> bool {
        self.users.read().is_empty()
    }
}

#[async_trait]
impl UserDirectory for MemoryUserDirectory {
    async fn find_by_id(&self, id: UserId) -> StoreResult<Option<UserRecord>> {
        Ok(self.users.read().get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<UserRecord>> {
        Ok(self
            .users
            .read()
            .values()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PrivilegeTier;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_create_replaces_previous_session() {
        let store = MemoryCredentialStore::new();
        let user = UserId::new(1);

        let first = store.create(user).await.unwrap();
        let second = store.create(user).await.unwrap();

        assert_ne!(first.identifier, second.identifier);
        assert_eq!(store.session_count(), 1);
        assert!(store.find(user, &first.identifier).await.unwrap().is_none());
        assert_eq!(
            store.find(user, &second.identifier).await.unwrap(),
            Some(second)
        );

        let stats = store.stats();
        assert_eq!(stats.creates, 2);
        assert_eq!(stats.replacements, 1);
        assert_eq!(stats.lookups, 2);
        assert_eq!(stats.hits, 1);
    }

    #[tokio::test]
    async fn test_find_requires_matching_user() {
        let store = MemoryCredentialStore::new();
        let session = store.create(UserId::new(1)).await.unwrap();

        let found = store
            .find(UserId::new(2), &session.identifier)
            .await
            .unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let store = MemoryCredentialStore::new();
        let user = UserId::new(5);
        let session = store.create(user).await.unwrap();

        store.delete(user).await.unwrap();
        store.delete(user).await.unwrap();

        assert!(store.find(user, &session.identifier).await.unwrap().is_none());
        assert_eq!(store.session_count(), 0);
        assert_eq!(store.stats().deletes, 1);
    }

    #[tokio::test]
    async fn test_users_do_not_interfere() {
        let store = MemoryCredentialStore::new();
        let a = store.create(UserId::new(1)).await.unwrap();
        let b = store.create(UserId::new(2)).await.unwrap();

        store.create(UserId::new(1)).await.unwrap();

        assert!(store.find(b.user_id, &b.identifier).await.unwrap().is_some());
        assert!(store.find(a.user_id, &a.identifier).await.unwrap().is_none());
        assert_eq!(store.session_count(), 2);
    }

    #[tokio::test]
    async fn test_concurrent_rotations_leave_one_session() {
        let store = Arc::new(MemoryCredentialStore::new());
        let user = UserId::new(9);

        let mut handles = Vec::new();
        for _ in 0..32 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move { store.create(user).await }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(store.session_count(), 1);
        let live = store.session_for(user).unwrap();
        assert!(store.find(user, &live.identifier).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_directory_lookup() {
        let directory = MemoryUserDirectory::with_users([
            UserRecord::new(UserId::new(1), "ada@example.com", "hash"),
            UserRecord::new(UserId::new(2), "root@example.com", "hash")
                .with_tier(PrivilegeTier::Elevated),
        ]);

        assert_eq!(directory.len(), 2);
        let admin = directory.find_by_id(UserId::new(2)).await.unwrap().unwrap();
        assert!(admin.tier.is_elevated());

        let ada = directory
            .find_by_email("ADA@example.com")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(ada.id, UserId::new(1));

        assert!(directory.find_by_id(UserId::new(3)).await.unwrap().is_none());
        assert!(directory
            .find_by_email("nobody@example.com")
            .await
            .unwrap()
            .is_none());
    }
}
