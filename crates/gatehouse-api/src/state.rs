// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Application state shared across handlers.

use std::sync::Arc;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::RngCore;

use gatehouse_core::{
    Argon2Verifier, CredentialStore, MemoryCredentialStore, MemoryUserDirectory,
    PasswordVerifier, UserDirectory,
};

use crate::auth::{AuthGate, AuthorizationPolicy, SessionManager, TokenCodec};
use crate::config::ApiConfig;
use crate::cookies::CookieConfig;

// =============================================================================
// AppState
// =============================================================================

/// Application state shared across all handlers.
///
/// Every collaborator is injected here; nothing is process-global.
#[derive(Clone)]
pub struct AppState {
    /// API configuration.
    pub config: Arc<ApiConfig>,
    /// Token codec.
    pub codec: TokenCodec,
    /// Session lifecycle.
    pub sessions: SessionManager,
    /// The per-request auth gate.
    pub gate: Arc<AuthGate>,
    /// User lookups for login and the elevated routes.
    pub directory: Arc<dyn UserDirectory>,
    /// Password verification for login.
    pub verifier: Arc<dyn PasswordVerifier>,
    /// Refresh cookie attributes.
    pub cookies: Arc<CookieConfig>,
}

impl AppState {
    /// Creates a new app state builder.
    pub fn builder() -> AppStateBuilder {
        AppStateBuilder::new()
    }

    /// Returns the token codec.
    pub fn codec(&self) -> &TokenCodec {
        &self.codec
    }

    /// Returns the session manager.
    pub fn sessions(&self) -> &SessionManager {
        &self.sessions
    }

    /// Returns the user directory.
    pub fn directory(&self) -> &Arc<dyn UserDirectory> {
        &self.directory
    }

    /// Returns the password verifier.
    pub fn verifier(&self) -> &Arc<dyn PasswordVerifier> {
        &self.verifier
    }

    /// Returns the refresh cookie attributes.
    pub fn cookies(&self) -> &CookieConfig {
        &self.cookies
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.config)
            .field("gate", &self.gate)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// AppStateBuilder
// =============================================================================

/// Builder for constructing AppState.
#[derive(Default)]
pub struct AppStateBuilder {
    config: Option<ApiConfig>,
    store: Option<Arc<dyn CredentialStore>>,
    directory: Option<Arc<dyn UserDirectory>>,
    verifier: Option<Arc<dyn PasswordVerifier>>,
}

impl AppStateBuilder {
    /// Creates a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the configuration.
    pub fn config(mut self, config: ApiConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Sets the credential store.
    pub fn credential_store(mut self, store: Arc<dyn CredentialStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Sets the user directory.
    pub fn user_directory(mut self, directory: Arc<dyn UserDirectory>) -> Self {
        self.directory = Some(directory);
        self
    }

    /// Sets the password verifier.
    pub fn password_verifier(mut self, verifier: Arc<dyn PasswordVerifier>) -> Self {
        self.verifier = Some(verifier);
        self
    }

    /// Builds the AppState.
    ///
    /// Unset collaborators default to the in-memory store and directory and
    /// the Argon2 verifier. Fails if the token configuration is invalid.
    pub fn build(self) -> crate::error::ApiResult<AppState> {
        let mut config = self.config.unwrap_or_default();

        if config.auth.tokens.secret.is_empty() && !config.auth.enabled {
            tracing::warn!("Auth is disabled and no signing secret is set; using an ephemeral secret");
            config.auth.tokens.secret = ephemeral_secret();
        }

        let codec = TokenCodec::new(config.auth.tokens.clone())?;

        let store = self
            .store
            .unwrap_or_else(|| Arc::new(MemoryCredentialStore::new()));
        let directory = self
            .directory
            .unwrap_or_else(|| Arc::new(MemoryUserDirectory::new()));
        let verifier = self
            .verifier
            .unwrap_or_else(|| Arc::new(Argon2Verifier::new()));

        let sessions = SessionManager::new(store);
        let gate = AuthGate::new(
            codec.clone(),
            sessions.clone(),
            AuthorizationPolicy::new(directory.clone()),
        )
        .with_csrf(config.auth.csrf_enabled);

        Ok(AppState {
            cookies: Arc::new(config.auth.cookies.clone()),
            config: Arc::new(config),
            codec,
            sessions,
            gate: Arc::new(gate),
            directory,
            verifier,
        })
    }
}

fn ephemeral_secret() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

// =============================================================================
// FromRef implementations for extracting parts of state
// =============================================================================

impl axum::extract::FromRef<AppState> for Arc<ApiConfig> {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}

impl axum::extract::FromRef<AppState> for Arc<dyn UserDirectory> {
    fn from_ref(state: &AppState) -> Self {
        state.directory.clone()
    }
}

// =============================================================================
// Tests
// =============================================================================
