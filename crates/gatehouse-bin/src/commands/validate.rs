// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Implementation of the `validate` command.

use serde_json::Value;

use gatehouse_config::GatehouseConfig;

use crate::cli::{Cli, OutputFormat, ValidateArgs};
use crate::error::{BinError, BinResult};

const REDACTED: &str = "***";

/// Executes the `validate` command to validate configuration.
pub fn validate(cli: &Cli, args: ValidateArgs) -> BinResult<()> {
    let config_path = &cli.config;

    if !config_path.exists() {
        return Err(BinError::config(format!(
            "Configuration file not found: {}",
            config_path.display()
        )));
    }

    let config = gatehouse_config::load_config(config_path)
        .map_err(|e| BinError::from(e).with_context("Configuration validation failed"))?;

    let warnings = config.warnings();

    match args.format {
        OutputFormat::Text => {
            println!("✓ Configuration is valid: {}", config_path.display());
            println!();
            println!("Summary:");
            println!("  Listen:        {}", config.server.socket_addr());
            println!("  Auth:          {}", enabled(config.auth.enabled));
            println!("  CSRF:          {}", enabled(config.auth.csrf_enabled));
            println!("  Algorithm:     {:?}", config.auth.algorithm);
            println!("  Access TTL:    {}s", config.auth.access_ttl_secs);
            println!("  Refresh TTL:   {}s", config.auth.refresh_ttl_secs);
            println!("  Seeded users:  {}", config.users.len());

            if !warnings.is_empty() {
                println!();
                println!("Warnings:");
                for warning in &warnings {
                    println!("  ⚠ {}", warning);
                }
            }

            if args.show_config {
                println!();
                println!("Parsed configuration:");
                println!("{}", pretty(&redacted(&config)));
            }
        }
        OutputFormat::Json => {
            let output = serde_json::json!({
                "valid": true,
                "config_path": config_path.display().to_string(),
                "summary": {
                    "listen": config.server.socket_addr().to_string(),
                    "auth_enabled": config.auth.enabled,
                    "csrf_enabled": config.auth.csrf_enabled,
                    "access_ttl_secs": config.auth.access_ttl_secs,
                    "refresh_ttl_secs": config.auth.refresh_ttl_secs,
                    "user_count": config.users.len(),
                },
                "warnings": warnings,
                "config": if args.show_config { Some(redacted(&config)) } else { None },
            });
            println!("{}", pretty(&output));
        }
    }

    if args.strict && !warnings.is_empty() {
        return Err(BinError::config(format!(
            "Strict mode: {} warning(s) found",
            warnings.len()
        )));
    }

    Ok(())
}

fn enabled(flag: bool) -> &'static str {
    if flag {
        "enabled"
    } else {
        "disabled"
    }
}

fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| "(serialization error)".to_string())
}

/// Serializes the config with the signing secret and password hashes masked.
fn redacted(config: &GatehouseConfig) -> Value {
    let mut value = serde_json::to_value(config).unwrap_or(Value::Null);

    if let Some(secret) = value.pointer_mut("/auth/signing_secret") {
        *secret = Value::from(REDACTED);
    }
    if let Some(Value::Array(users)) = value.get_mut("users") {
        for user in users {
            if let Some(hash) = user.get_mut("password_hash") {
                *hash = Value::from(REDACTED);
            }
        }
    }

    value
}

#[cfg(test)]
mod tests {
    use super::*;
    use gatehouse_config::{SecretValue, UserSeed, UserTier};

    #[test]
    fn test_redacted_masks_secrets() {
        let mut config = GatehouseConfig::default();
        config.auth.signing_secret = SecretValue::new("top-secret-signing-key");
        config.users.push(UserSeed {
            id: 1,
            email: "a@example.com".to_string(),
            first_name: String::new(),
            password_hash: SecretValue::new("$argon2id$v=19$secret-hash"),
            tier: UserTier::Standard,
        });

        let rendered = redacted(&config).to_string();
        assert!(!rendered.contains("top-secret-signing-key"));
        assert!(!rendered.contains("secret-hash"));
        assert!(rendered.contains("a@example.com"));
    }
}
