// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Server runtime orchestration.
//!
//! Turns a loaded [`GatehouseConfig`] into a running [`ApiServer`]: token and
//! cookie settings, the seeded user directory, and graceful shutdown.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use jsonwebtoken::Algorithm;
use tracing::{info, warn};

use gatehouse_api::{ApiConfig, ApiServer, ApiServerBuilder, AuthSettings, CookieConfig, CorsConfig, TokenConfig};
use gatehouse_config::{load_config, GatehouseConfig, SigningAlgorithm, UserSeed, UserTier};
use gatehouse_core::{MemoryUserDirectory, PrivilegeTier, UserId, UserRecord};

use crate::error::{BinError, BinResult};
use crate::shutdown::ShutdownCoordinator;

// =============================================================================
// GatehouseRuntime
// =============================================================================

/// The runtime that owns the server and its shutdown coordinator.
pub struct GatehouseRuntime {
    config: Arc<GatehouseConfig>,
    shutdown: ShutdownCoordinator,
}

impl GatehouseRuntime {
    /// Creates a new runtime.
    pub fn new(config: GatehouseConfig) -> Self {
        Self {
            config: Arc::new(config),
            shutdown: ShutdownCoordinator::new(),
        }
    }

    /// Returns the loaded configuration.
    pub fn config(&self) -> &GatehouseConfig {
        &self.config
    }

    /// Returns the shutdown coordinator.
    pub fn shutdown(&self) -> &ShutdownCoordinator {
        &self.shutdown
    }

    /// Builds the API server without starting it.
    pub fn build_server(&self) -> BinResult<ApiServer> {
        for warning in self.config.warnings() {
            warn!("{}", warning);
        }

        let directory = seed_directory(&self.config.users);
        info!(users = directory.len(), "User directory seeded");

        let server = ApiServerBuilder::new()
            .config(api_config(&self.config))
            .user_directory(Arc::new(directory))
            .build()?;

        Ok(server)
    }

    /// Runs the server until a shutdown signal arrives.
    pub async fn run(self) -> BinResult<()> {
        info!("Starting gatehouse v{}", gatehouse_core::VERSION);

        let server = self.build_server()?;
        let signal = self.shutdown.shutdown_signal();

        let coordinator = self.shutdown.clone();
        let signals = tokio::spawn(async move { coordinator.wait_for_shutdown().await });

        let result = server.run_with_shutdown(signal).await;
        signals.abort();

        result.map_err(|e| BinError::from(e).with_context("API server failed"))?;

        info!("gatehouse shutdown complete");
        Ok(())
    }
}

// =============================================================================
// Config Mapping
// =============================================================================

/// Maps the file configuration onto the API server configuration.
pub fn api_config(config: &GatehouseConfig) -> ApiConfig {
    let auth = &config.auth;

    let tokens = TokenConfig::new(auth.signing_secret.raw())
        .with_issuer(auth.issuer.clone())
        .with_algorithm(signing_algorithm(auth.algorithm))
        .with_ttls(
            saturating_secs(auth.access_ttl_secs),
            saturating_secs(auth.refresh_ttl_secs),
        )
        .with_leeway(auth.leeway_secs);

    let mut cookies = CookieConfig::new()
        .with_path(auth.cookie_path.clone())
        .with_secure(auth.cookie_secure)
        .with_max_age(tokens.refresh_ttl_secs);
    if let Some(domain) = &auth.cookie_domain {
        cookies = cookies.with_domain(domain.clone());
    }

    let settings = AuthSettings::new(tokens)
        .with_cookies(cookies)
        .with_enabled(auth.enabled)
        .with_csrf(auth.csrf_enabled);

    let cors = CorsConfig {
        allowed_origins: config.server.allowed_origins.clone(),
        ..CorsConfig::default()
    };

    ApiConfig::new()
        .with_host(config.server.host)
        .with_port(config.server.port)
        .with_request_timeout(config.server.request_timeout())
        .with_cors(cors)
        .with_auth(settings)
}

/// Builds the in-memory directory from the `users` section.
pub fn seed_directory(users: &[UserSeed]) -> MemoryUserDirectory {
    MemoryUserDirectory::with_users(users.iter().map(|seed| {
        let tier = match seed.tier {
            UserTier::Standard => PrivilegeTier::Standard,
            UserTier::Elevated => PrivilegeTier::Elevated,
        };
        UserRecord::new(UserId::new(seed.id), &seed.email, seed.password_hash.raw())
            .with_first_name(&seed.first_name)
            .with_tier(tier)
    }))
}

fn signing_algorithm(algorithm: SigningAlgorithm) -> Algorithm {
    match algorithm {
        SigningAlgorithm::HS256 => Algorithm::HS256,
        SigningAlgorithm::HS384 => Algorithm::HS384,
        SigningAlgorithm::HS512 => Algorithm::HS512,
    }
}

fn saturating_secs(secs: u64) -> i64 {
    i64::try_from(secs).unwrap_or(i64::MAX)
}

// =============================================================================
// RuntimeBuilder
// =============================================================================

/// Builder for constructing the runtime.
#[derive(Default)]
pub struct RuntimeBuilder {
    config_path: Option<PathBuf>,
    config: Option<GatehouseConfig>,
    port: Option<u16>,
}

impl RuntimeBuilder {
    /// Creates a new runtime builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the configuration file path.
    pub fn config_path(mut self, path: impl AsRef<Path>) -> Self {
        self.config_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Sets the configuration directly.
    pub fn config(mut self, config: GatehouseConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Overrides the listen port.
    pub fn port(mut self, port: Option<u16>) -> Self {
        self.port = port;
        self
    }

    /// Builds the runtime.
    pub fn build(self) -> BinResult<GatehouseRuntime> {
        let mut config = match self.config {
            Some(cfg) => cfg,
            None => {
                let path = self
                    .config_path
                    .ok_or_else(|| BinError::config("No configuration provided"))?;

                load_config(&path).map_err(|e| {
                    BinError::from(e).with_context(format!("Failed to load {}", path.display()))
                })?
            }
        };

        if let Some(port) = self.port {
            config.server.port = port;
        }

        Ok(GatehouseRuntime::new(config))
    }
}

// =============================================================================
// Tests
// =============================================================================
