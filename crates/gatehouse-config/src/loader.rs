// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Configuration loading and processing for gatehouse.
//!
//! # Loading Pipeline
//!
//! 1. Read the YAML/TOML/JSON file
//! 2. Resolve `${VAR}` / `${VAR:default}` placeholders in the raw text
//! 3. Parse into [`GatehouseConfig`]
//! 4. Apply `GATEHOUSE_*` environment overrides
//! 5. Validate
//!
//! # Environment Variable Override
//!
//! ```text
//! GATEHOUSE_SERVER_PORT=9090
//! GATEHOUSE_AUTH_SECRET=...
//! GATEHOUSE_AUTH_ENABLED=false
//! GATEHOUSE_CSRF_ENABLED=false
//! GATEHOUSE_COOKIE_DOMAIN=example.com
//! GATEHOUSE_LOG_LEVEL=debug
//! ```

use crate::error::{ConfigError, ConfigResult};
use crate::schema::{GatehouseConfig, LogLevel, SecretValue};
use serde::de::DeserializeOwned;
use std::env;
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

/// Default prefix for override variables.
pub const DEFAULT_ENV_PREFIX: &str = "GATEHOUSE";

// =============================================================================
// ConfigLoader
// =============================================================================

/// Configuration loader for gatehouse.
///
/// # Examples
///
/// ```no_run
/// use gatehouse_config::loader::ConfigLoader;
///
/// let loader = ConfigLoader::new();
/// let config = loader.load("gatehouse.yaml").unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    /// Environment variable prefix.
    env_prefix: String,

    /// Whether to resolve placeholders and apply overrides.
    resolve_env_vars: bool,

    /// Whether to run validation after loading.
    validate: bool,
}

impl ConfigLoader {
    /// Creates a new configuration loader with default settings.
    pub fn new() -> Self {
        Self {
            env_prefix: DEFAULT_ENV_PREFIX.to_string(),
            resolve_env_vars: true,
            validate: true,
        }
    }

    /// Creates a builder for configuring the loader.
    pub fn builder() -> ConfigLoaderBuilder {
        ConfigLoaderBuilder::new()
    }

    /// Sets the environment variable prefix.
    pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    /// Enables or disables environment variable resolution.
    pub fn with_env_vars(mut self, enabled: bool) -> Self {
        self.resolve_env_vars = enabled;
        self
    }

    /// Enables or disables validation.
    pub fn with_validation(mut self, enabled: bool) -> Self {
        self.validate = enabled;
        self
    }

    /// Loads configuration from a file.
    ///
    /// The file format is determined by the file extension:
    /// - `.yaml` or `.yml` - YAML format
    /// - `.toml` - TOML format
    /// - `.json` - JSON format
    pub fn load(&self, path: impl AsRef<Path>) -> ConfigResult<GatehouseConfig> {
        let path = path.as_ref();
        info!(path = %path.display(), "Loading configuration");

        let content = self.read_file(path)?;
        let format = ConfigFormat::from_path(path)?;

        let content = if self.resolve_env_vars {
            self.resolve_env_placeholders(&content)?
        } else {
            content
        };

        let config = parse_str(&content, format).map_err(|e| match e {
            ConfigError::Parse { message, .. } => ConfigError::parse(path, message),
            other => other,
        })?;

        let config = self.finish(config)?;
        info!(
            users = config.users.len(),
            auth_enabled = config.auth.enabled,
            "Configuration loaded successfully"
        );
        Ok(config)
    }

    /// Loads configuration from a string.
    pub fn load_from_str(
        &self,
        content: &str,
        format: ConfigFormat,
    ) -> ConfigResult<GatehouseConfig> {
        let content = if self.resolve_env_vars {
            self.resolve_env_placeholders(content)?
        } else {
            content.to_string()
        };
        let config = parse_str(&content, format)?;
        self.finish(config)
    }

    fn finish(&self, mut config: GatehouseConfig) -> ConfigResult<GatehouseConfig> {
        if self.resolve_env_vars {
            self.apply_env_overrides(&mut config)?;
        }
        if self.validate {
            config.validate()?;
        }
        Ok(config)
    }

    fn read_file(&self, path: &Path) -> ConfigResult<String> {
        if !path.exists() {
            return Err(ConfigError::file_not_found(path));
        }
        fs::read_to_string(path).map_err(|e| ConfigError::io(path, e))
    }

    /// Resolves environment variable placeholders in content.
    ///
    /// Supports `${VAR_NAME}` and `${VAR_NAME:default}`. A placeholder with
    /// no default whose variable is unset is an error.
    fn resolve_env_placeholders(&self, content: &str) -> ConfigResult<String> {
        let mut result = String::with_capacity(content.len());
        let mut rest = content;

        while let Some(start) = rest.find("${") {
            result.push_str(&rest[..start]);
            let after = &rest[start + 2..];

            let Some(end) = after.find('}') else {
                // Unterminated, keep as-is.
                result.push_str(&rest[start..]);
                return Ok(result);
            };

            let inner = &after[..end];
            let (name, default) = match inner.split_once(':') {
                Some((name, default)) => (name, Some(default)),
                None => (inner, None),
            };

            match (env::var(name), default) {
                (Ok(value), _) => result.push_str(&value),
                (Err(_), Some(default)) => result.push_str(default),
                (Err(_), None) => {
                    warn!(variable = name, "Environment variable not found");
                    return Err(ConfigError::env_var_not_found(name));
                }
            }

            rest = &after[end + 1..];
        }

        result.push_str(rest);
        Ok(result)
    }

    /// Applies `<PREFIX>_*` environment variable overrides.
    fn apply_env_overrides(&self, config: &mut GatehouseConfig) -> ConfigResult<()> {
        let var = |suffix: &str| {
            let name = format!("{}_{}", self.env_prefix, suffix);
            env::var(&name).ok().map(|value| (name, value))
        };

        if let Some((name, value)) = var("SERVER_PORT") {
            config.server.port = value
                .parse()
                .map_err(|_| ConfigError::invalid_env_var(&name, "expected valid port number"))?;
            debug!(variable = %name, "Override applied");
        }
        if let Some((name, value)) = var("AUTH_SECRET") {
            config.auth.signing_secret = SecretValue::new(value);
            debug!(variable = %name, "Override applied");
        }
        if let Some((name, value)) = var("AUTH_ENABLED") {
            config.auth.enabled = parse_bool(&name, &value)?;
            debug!(variable = %name, "Override applied");
        }
        if let Some((name, value)) = var("CSRF_ENABLED") {
            config.auth.csrf_enabled = parse_bool(&name, &value)?;
            debug!(variable = %name, "Override applied");
        }
        if let Some((name, value)) = var("COOKIE_DOMAIN") {
            config.auth.cookie_domain = (!value.is_empty()).then_some(value);
            debug!(variable = %name, "Override applied");
        }
        if let Some((name, value)) = var("LOG_LEVEL") {
            config.logging.level = LogLevel::parse(&value)
                .ok_or_else(|| ConfigError::invalid_env_var(&name, "expected a log level"))?;
            debug!(variable = %name, "Override applied");
        }

        Ok(())
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// ConfigLoaderBuilder
// =============================================================================

/// Builder for ConfigLoader.
#[derive(Debug, Default)]
pub struct ConfigLoaderBuilder {
    env_prefix: Option<String>,
    resolve_env_vars: Option<bool>,
    validate: Option<bool>,
}

impl ConfigLoaderBuilder {
    /// Creates a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the environment prefix.
    pub fn env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = Some(prefix.into());
        self
    }

    /// Enables or disables environment variable resolution.
    pub fn resolve_env_vars(mut self, enabled: bool) -> Self {
        self.resolve_env_vars = Some(enabled);
        self
    }

    /// Enables or disables validation.
    pub fn validate(mut self, enabled: bool) -> Self {
        self.validate = Some(enabled);
        self
    }

    /// Builds the ConfigLoader.
    pub fn build(self) -> ConfigLoader {
        let mut loader = ConfigLoader::new();

        if let Some(prefix) = self.env_prefix {
            loader.env_prefix = prefix;
        }
        if let Some(resolve_env_vars) = self.resolve_env_vars {
            loader.resolve_env_vars = resolve_env_vars;
        }
        if let Some(validate) = self.validate {
            loader.validate = validate;
        }

        loader
    }
}

// =============================================================================
// ConfigFormat
// =============================================================================

/// Supported configuration file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// YAML format.
    Yaml,
    /// TOML format.
    Toml,
    /// JSON format.
    Json,
}

impl ConfigFormat {
    /// Determines the format from a file path.
    pub fn from_path(path: &Path) -> ConfigResult<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase());

        match ext.as_deref() {
            Some("yaml") | Some("yml") => Ok(ConfigFormat::Yaml),
            Some("toml") => Ok(ConfigFormat::Toml),
            Some("json") => Ok(ConfigFormat::Json),
            Some(other) => Err(ConfigError::unsupported_format(other)),
            None => Err(ConfigError::unsupported_format("(no extension)")),
        }
    }

    /// Returns the file extension for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            ConfigFormat::Yaml => "yaml",
            ConfigFormat::Toml => "toml",
            ConfigFormat::Json => "json",
        }
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

fn parse_str(content: &str, format: ConfigFormat) -> ConfigResult<GatehouseConfig> {
    match format {
        ConfigFormat::Yaml => yaml_parse(content),
        ConfigFormat::Toml => {
            toml::from_str(content).map_err(|e| ConfigError::parse("<toml>", e.to_string()))
        }
        ConfigFormat::Json => {
            serde_json::from_str(content).map_err(|e| ConfigError::parse("<json>", e.to_string()))
        }
    }
}

/// YAML parsing through the config crate.
fn yaml_parse<T: DeserializeOwned>(content: &str) -> ConfigResult<T> {
    let config = config::Config::builder()
        .add_source(config::File::from_str(content, config::FileFormat::Yaml))
        .build()
        .map_err(|e| ConfigError::parse("<yaml>", e.to_string()))?;

    config
        .try_deserialize()
        .map_err(|e| ConfigError::parse("<yaml>", e.to_string()))
}

fn parse_bool(name: &str, value: &str) -> ConfigResult<bool> {
    match value.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" | "enabled" => Ok(true),
        "false" | "0" | "no" | "off" | "disabled" => Ok(false),
        _ => Err(ConfigError::invalid_env_var(name, "expected a boolean")),
    }
}

// =============================================================================
// Convenience Functions
// =============================================================================

/// Loads configuration from a file with default settings.
///
/// # Examples
///
/// ```no_run
/// use gatehouse_config::loader::load_config;
///
/// let config = load_config("gatehouse.yaml").unwrap();
/// ```
pub fn load_config(path: impl AsRef<Path>) -> ConfigResult<GatehouseConfig> {
    ConfigLoader::new().load(path)
}

/// Loads configuration from a string with the specified format.
pub fn load_config_str(content: &str, format: ConfigFormat) -> ConfigResult<GatehouseConfig> {
    ConfigLoader::new().load_from_str(content, format)
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::SigningAlgorithm;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn test_yaml() -> String {
        r#"
server:
  port: 9000
  allowed_origins:
    - "http://localhost:3000"

auth:
  signing_secret: "0123456789abcdef0123456789abcdef"
  algorithm: HS384
  access_ttl_secs: 600
  cookie_domain: example.com

logging:
  level: debug
"#
        .to_string()
    }

    fn isolated(prefix: &str) -> ConfigLoader {
        ConfigLoader::new().with_env_prefix(prefix)
    }

    #[test]
    fn test_load_yaml() {
        let mut file = NamedTempFile::with_suffix(".yaml").unwrap();
        file.write_all(test_yaml().as_bytes()).unwrap();

        let config = isolated("GH_LOADER_YAML").load(file.path()).unwrap();

        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.allowed_origins, vec!["http://localhost:3000"]);
        assert_eq!(config.auth.algorithm, SigningAlgorithm::HS384);
        assert_eq!(config.auth.access_ttl_secs, 600);
        assert_eq!(config.auth.refresh_ttl_secs, 86_400);
        assert_eq!(config.auth.cookie_domain.as_deref(), Some("example.com"));
        assert_eq!(config.logging.level, LogLevel::Debug);
    }

    #[test]
    fn test_load_toml() {
        let toml = r#"
[server]
port = 7000

[auth]
signing_secret = "0123456789abcdef0123456789abcdef"
csrf_enabled = false
"#;
        let mut file = NamedTempFile::with_suffix(".toml").unwrap();
        file.write_all(toml.as_bytes()).unwrap();

        let config = isolated("GH_LOADER_TOML").load(file.path()).unwrap();
        assert_eq!(config.server.port, 7000);
        assert!(!config.auth.csrf_enabled);
    }

    #[test]
    fn test_config_format_from_path() {
        assert_eq!(
            ConfigFormat::from_path(Path::new("gatehouse.yml")).unwrap(),
            ConfigFormat::Yaml
        );
        assert_eq!(
            ConfigFormat::from_path(Path::new("gatehouse.toml")).unwrap(),
            ConfigFormat::Toml
        );
        assert_eq!(
            ConfigFormat::from_path(Path::new("gatehouse.json")).unwrap(),
            ConfigFormat::Json
        );
        assert!(ConfigFormat::from_path(Path::new("gatehouse.txt")).is_err());
    }

    #[test]
    fn test_env_placeholder_resolution() {
        env::set_var("GH_LOADER_PLACEHOLDER_SECRET", "from-env");
        let loader = ConfigLoader::new();

        let result = loader
            .resolve_env_placeholders("secret: ${GH_LOADER_PLACEHOLDER_SECRET}")
            .unwrap();
        assert_eq!(result, "secret: from-env");
    }

    #[test]
    fn test_env_placeholder_with_default() {
        let loader = ConfigLoader::new();
        let result = loader
            .resolve_env_placeholders("port: ${GH_LOADER_NONEXISTENT:8081} # ok")
            .unwrap();
        assert_eq!(result, "port: 8081 # ok");
    }

    #[test]
    fn test_env_placeholder_missing_is_error() {
        let loader = ConfigLoader::new();
        let result = loader.resolve_env_placeholders("secret: ${GH_LOADER_NEVER_SET}");
        assert!(matches!(result, Err(ConfigError::EnvVarNotFound { .. })));
    }

    #[test]
    fn test_argon2_hash_is_not_a_placeholder() {
        let loader = ConfigLoader::new();
        let hash = "$argon2id$v=19$m=19456,t=2,p=1$c2FsdA$aGFzaA";
        assert_eq!(loader.resolve_env_placeholders(hash).unwrap(), hash);
    }

    #[test]
    fn test_env_overrides() {
        env::set_var("GH_LOADER_OVR_SERVER_PORT", "9443");
        env::set_var("GH_LOADER_OVR_AUTH_SECRET", "override-secret");
        env::set_var("GH_LOADER_OVR_CSRF_ENABLED", "off");
        env::set_var("GH_LOADER_OVR_LOG_LEVEL", "warn");

        let config = isolated("GH_LOADER_OVR")
            .load_from_str(&test_yaml(), ConfigFormat::Yaml)
            .unwrap();

        assert_eq!(config.server.port, 9443);
        assert_eq!(config.auth.signing_secret.raw(), "override-secret");
        assert!(!config.auth.csrf_enabled);
        assert_eq!(config.logging.level, LogLevel::Warn);
    }

    #[test]
    fn test_invalid_env_override() {
        env::set_var("GH_LOADER_BAD_AUTH_ENABLED", "maybe");
        let result = isolated("GH_LOADER_BAD").load_from_str(&test_yaml(), ConfigFormat::Yaml);
        assert!(matches!(result, Err(ConfigError::InvalidEnvVar { .. })));
    }

    #[test]
    fn test_validation_runs() {
        let yaml = "auth:\n  enabled: true\n";
        let result = isolated("GH_LOADER_VALIDATE").load_from_str(yaml, ConfigFormat::Yaml);
        assert!(matches!(result, Err(ConfigError::MissingField { .. })));

        let config = ConfigLoader::builder()
            .env_prefix("GH_LOADER_VALIDATE")
            .validate(false)
            .build()
            .load_from_str(yaml, ConfigFormat::Yaml)
            .unwrap();
        assert!(config.auth.signing_secret.is_empty());
    }

    #[test]
    fn test_loader_builder() {
        let loader = ConfigLoader::builder()
            .env_prefix("MYAPP")
            .resolve_env_vars(false)
            .build();

        assert_eq!(loader.env_prefix, "MYAPP");
        assert!(!loader.resolve_env_vars);
        assert!(loader.validate);
    }

    #[test]
    fn test_file_not_found() {
        let result = ConfigLoader::new().load("/nonexistent/path/gatehouse.yaml");
        assert!(matches!(result, Err(ConfigError::FileNotFound { .. })));
    }
}
