// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Mock Implementations
//!
//! Collaborators wrapping the in-memory implementations with switchable
//! failure injection, so tests can reach the infrastructure-error paths.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use async_trait::async_trait;

use gatehouse_core::{
    CredentialStore, MemoryCredentialStore, MemoryUserDirectory, PasswordVerifier, Session,
    SessionIdentifier, StoreError, StoreResult, UserDirectory, UserId, UserRecord,
};

// =============================================================================
// FaultyStore
// =============================================================================

/// A credential store whose operations can be made to fail.
#[derive(Debug, Default)]
pub struct FaultyStore {
    inner: MemoryCredentialStore,
    fail_create: AtomicBool,
    fail_find: AtomicBool,
    fail_delete: AtomicBool,
    find_calls: AtomicU64,
}

impl FaultyStore {
    /// Create a store that does not fail.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `create` fail.
    pub fn fail_create(&self, fail: bool) {
        self.fail_create.store(fail, Ordering::SeqCst);
    }

    /// Make `find` fail.
    pub fn fail_find(&self, fail: bool) {
        self.fail_find.store(fail, Ordering::SeqCst);
    }

    /// Make `delete` fail.
    pub fn fail_delete(&self, fail: bool) {
        self.fail_delete.store(fail, Ordering::SeqCst);
    }

    /// Number of `find` calls, failed ones included.
    pub fn find_calls(&self) -> u64 {
        self.find_calls.load(Ordering::SeqCst)
    }

    /// Number of live sessions.
    pub fn session_count(&self) -> usize {
        self.inner.session_count()
    }

    /// The live session for `user_id`, if any.
    pub fn session_for(&self, user_id: UserId) -> Option<Session> {
        self.inner.session_for(user_id)
    }
}

#[async_trait]
impl CredentialStore for FaultyStore {
    async fn create(&self, user_id: UserId) -> StoreResult<Session> {
        if self.fail_create.load(Ordering::SeqCst) {
            return Err(StoreError::backend("create", "injected failure"));
        }
        self.inner.create(user_id).await
    }

    async fn find(
        &self,
        user_id: UserId,
        identifier: &SessionIdentifier,
    ) -> StoreResult<Option<Session>> {
        self.find_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_find.load(Ordering::SeqCst) {
            return Err(StoreError::unavailable("injected failure"));
        }
        self.inner.find(user_id, identifier).await
    }

    async fn delete(&self, user_id: UserId) -> StoreResult<()> {
        if self.fail_delete.load(Ordering::SeqCst) {
            return Err(StoreError::backend("delete", "injected failure"));
        }
        self.inner.delete(user_id).await
    }

    fn name(&self) -> &str {
        "faulty-store"
    }
}

// =============================================================================
// FaultyDirectory
// =============================================================================

/// A user directory whose lookups can be made to fail.
#[derive(Debug, Default)]
pub struct FaultyDirectory {
    inner: MemoryUserDirectory,
    fail_lookups: AtomicBool,
}

impl FaultyDirectory {
    /// Create a directory seeded with `users`.
    pub fn with_users(users: impl IntoIterator<Item = UserRecord>) -> Self {
        Self {
            inner: MemoryUserDirectory::with_users(users),
            fail_lookups: AtomicBool::new(false),
        }
    }

    /// Make every lookup fail.
    pub fn fail_lookups(&self, fail: bool) {
        self.fail_lookups.store(fail, Ordering::SeqCst);
    }

    /// Insert or replace a user.
    pub fn insert(&self, user: UserRecord) {
        self.inner.insert(user);
    }

    fn check(&self) -> StoreResult<()> {
        if self.fail_lookups.load(Ordering::SeqCst) {
            return Err(StoreError::unavailable("injected failure"));
        }
        Ok(())
    }
}

#[async_trait]
impl UserDirectory for FaultyDirectory {
    async fn find_by_id(&self, id: UserId) -> StoreResult<Option<UserRecord>> {
        self.check()?;
        self.inner.find_by_id(id).await
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<UserRecord>> {
        self.check()?;
        self.inner.find_by_email(email).await
    }
}

// =============================================================================
// PlainTextVerifier
// =============================================================================

/// Compares passwords to stored values verbatim. Keeps tests off Argon2.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainTextVerifier;

impl PasswordVerifier for PlainTextVerifier {
    fn verify(&self, password: &str, hash: &str) -> bool {
        password == hash
    }
}
