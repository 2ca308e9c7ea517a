// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Test Fixtures
//!
//! Pre-built users, secrets, and configurations.
//!
//! Fixture users store their password in the clear and are meant to be used
//! with [`PlainTextVerifier`](super::mocks::PlainTextVerifier). Use
//! [`UserFixtures::hashed`] when a test needs the real Argon2 path.

use gatehouse_api::{ApiConfig, AuthSettings, TokenConfig};
use gatehouse_core::{hash_password, PrivilegeTier, UserId, UserRecord};

/// Signing secret shared by every fixture configuration.
pub const TEST_SECRET: &str = "integration-test-secret-0123456789abcdef";

/// Issuer used by fixture token configurations.
pub const TEST_ISSUER: &str = "gatehouse-tests";

// =============================================================================
// User Fixtures
// =============================================================================

/// Fixture providing standard users.
pub struct UserFixtures;

impl UserFixtures {
    /// Password shared by every fixture user.
    pub const PASSWORD: &'static str = "correct horse battery staple";

    /// A standard-tier user.
    pub fn standard() -> UserRecord {
        UserRecord::new(UserId::new(1), "alice@example.com", Self::PASSWORD)
            .with_first_name("Alice")
            .with_tier(PrivilegeTier::Standard)
    }

    /// An elevated-tier user.
    pub fn elevated() -> UserRecord {
        UserRecord::new(UserId::new(2), "root@example.com", Self::PASSWORD)
            .with_first_name("Root")
            .with_tier(PrivilegeTier::Elevated)
    }

    /// A second standard user, for cross-user isolation checks.
    pub fn other_standard() -> UserRecord {
        UserRecord::new(UserId::new(3), "bob@example.com", Self::PASSWORD)
            .with_first_name("Bob")
            .with_tier(PrivilegeTier::Standard)
    }

    /// All fixture users.
    pub fn all() -> Vec<UserRecord> {
        vec![Self::standard(), Self::elevated(), Self::other_standard()]
    }

    /// `user` with its password replaced by a real Argon2 hash.
    pub fn hashed(mut user: UserRecord) -> UserRecord {
        user.password_hash =
            hash_password(Self::PASSWORD).expect("Failed to hash fixture password");
        user
    }
}

// =============================================================================
// Config Fixtures
// =============================================================================

/// Fixture providing configurations.
pub struct ConfigFixtures;

impl ConfigFixtures {
    /// Token configuration with the default lifetimes.
    pub fn token_config() -> TokenConfig {
        TokenConfig::new(TEST_SECRET).with_issuer(TEST_ISSUER)
    }

    /// Token configuration whose access tokens expire after one second.
    pub fn short_lived_token_config() -> TokenConfig {
        Self::token_config().with_ttls(1, 3600)
    }

    /// API configuration with auth and CSRF enforcement on.
    pub fn api_config() -> ApiConfig {
        Self::api_config_with(Self::token_config())
    }

    /// API configuration around `tokens`.
    pub fn api_config_with(tokens: TokenConfig) -> ApiConfig {
        ApiConfig::default().with_auth(AuthSettings::new(tokens))
    }

    /// A well-formed Argon2id PHC string that matches no password.
    ///
    /// Passes seed validation without paying for a real hash.
    pub const SEED_HASH: &'static str = "$argon2id$v=19$m=19456,t=2,p=1$c2FsdA$aGFzaA";

    /// A complete YAML config file with one user of each tier.
    ///
    /// `hash` is written as the password hash of both users.
    pub fn yaml(port: u16, hash: &str) -> String {
        format!(
            r#"
server:
  host: 127.0.0.1
  port: {port}
  request_timeout_secs: 10
  allowed_origins:
    - "https://app.example.com"

auth:
  signing_secret: "{secret}"
  issuer: "{issuer}"
  access_ttl_secs: 300
  refresh_ttl_secs: 3600
  cookie_domain: example.com
  cookie_secure: true

logging:
  level: debug
  format: json

users:
  - id: 1
    email: alice@example.com
    first_name: Alice
    password_hash: '{hash}'
  - id: 2
    email: root@example.com
    first_name: Root
    password_hash: '{hash}'
    tier: admin
"#,
            port = port,
            secret = TEST_SECRET,
            issuer = TEST_ISSUER,
            hash = hash,
        )
    }
}
