// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Configuration error types for gatehouse-config.
//!
//! This module provides the error type hierarchy for configuration
//! operations including parsing, validation, and loading.

use std::path::PathBuf;
use thiserror::Error;

/// Configuration-related errors.
///
/// This error type covers all possible failures during configuration
/// loading, parsing, placeholder resolution, and validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to parse configuration file.
    #[error("Failed to parse config file '{path}': {message}")]
    Parse {
        /// Path to the configuration file.
        path: PathBuf,
        /// Error message.
        message: String,
    },

    /// Configuration validation failed.
    #[error("Validation failed for '{field}': {message}")]
    Validation {
        /// The field that failed validation.
        field: String,
        /// Error message.
        message: String,
    },

    /// Required field is missing.
    #[error("Missing required field: {field}")]
    MissingField {
        /// The missing field name.
        field: String,
    },

    /// File I/O error.
    #[error("Failed to read config file '{path}': {source}")]
    Io {
        /// Path to the file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Environment variable referenced by a placeholder was not set.
    #[error("Environment variable not found: {name}")]
    EnvVarNotFound {
        /// The environment variable name.
        name: String,
    },

    /// Invalid environment variable value.
    #[error("Invalid environment variable value for '{name}': {message}")]
    InvalidEnvVar {
        /// The environment variable name.
        name: String,
        /// Error message.
        message: String,
    },

    /// File not found.
    #[error("File not found: {path}")]
    FileNotFound {
        /// The path that was not found.
        path: PathBuf,
    },

    /// Value out of range.
    #[error("Value out of range for '{field}': {value} (expected {min}..{max})")]
    OutOfRange {
        /// The field name.
        field: String,
        /// The actual value.
        value: String,
        /// Minimum value.
        min: String,
        /// Maximum value.
        max: String,
    },

    /// Duplicate seeded user.
    #[error("Duplicate user {kind}: {value}")]
    DuplicateUser {
        /// Which key collided (`id` or `email`).
        kind: &'static str,
        /// The duplicated value.
        value: String,
    },

    /// Unsupported configuration format.
    #[error("Unsupported configuration format: {format}")]
    UnsupportedFormat {
        /// The unsupported format.
        format: String,
    },
}

impl ConfigError {
    /// Creates a parse error.
    pub fn parse(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Parse {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Creates a validation error.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Creates a missing field error.
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingField { field: field.into() }
    }

    /// Creates an I/O error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Creates an environment variable not found error.
    pub fn env_var_not_found(name: impl Into<String>) -> Self {
        Self::EnvVarNotFound { name: name.into() }
    }

    /// Creates an invalid environment variable error.
    pub fn invalid_env_var(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidEnvVar {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Creates a file not found error.
    pub fn file_not_found(path: impl Into<PathBuf>) -> Self {
        Self::FileNotFound { path: path.into() }
    }

    /// Creates an out of range error.
    pub fn out_of_range<T: std::fmt::Display>(
        field: impl Into<String>,
        value: T,
        min: T,
        max: T,
    ) -> Self {
        Self::OutOfRange {
            field: field.into(),
            value: value.to_string(),
            min: min.to_string(),
            max: max.to_string(),
        }
    }

    /// Creates a duplicate user error.
    pub fn duplicate_user(kind: &'static str, value: impl Into<String>) -> Self {
        Self::DuplicateUser {
            kind,
            value: value.into(),
        }
    }

    /// Creates an unsupported format error.
    pub fn unsupported_format(format: impl Into<String>) -> Self {
        Self::UnsupportedFormat {
            format: format.into(),
        }
    }

    /// Returns a message suitable for an operator fixing the file.
    pub fn user_message(&self) -> String {
        match self {
            ConfigError::Parse { path, message } => {
                format!("{} could not be parsed: {}", path.display(), message)
            }
            ConfigError::Validation { field, message } => {
                format!("`{}` is invalid: {}", field, message)
            }
            ConfigError::MissingField { field } => {
                format!("`{}` must be set", field)
            }
            ConfigError::Io { path, .. } => {
                format!("{} could not be read", path.display())
            }
            ConfigError::EnvVarNotFound { name } => {
                format!("export {} or give the placeholder a default", name)
            }
            ConfigError::InvalidEnvVar { name, message } => {
                format!("{} is invalid: {}", name, message)
            }
            ConfigError::FileNotFound { path } => {
                format!("no file at {}; pass --config or set GATEHOUSE_CONFIG", path.display())
            }
            ConfigError::OutOfRange { field, value, min, max } => {
                format!("`{}` is {}; it must be within {}..={}", field, value, min, max)
            }
            ConfigError::DuplicateUser { kind, value } => {
                format!("two users share the {} {}", kind, value)
            }
            ConfigError::UnsupportedFormat { format } => {
                format!("'{}' files are not supported; use .yaml, .toml or .json", format)
            }
        }
    }

    /// Returns `true` if this error is related to file I/O.
    pub fn is_io_error(&self) -> bool {
        matches!(
            self,
            ConfigError::Io { .. } | ConfigError::FileNotFound { .. }
        )
    }

    /// Returns the error type as a string for logging.
    pub fn error_type(&self) -> &'static str {
        match self {
            ConfigError::Parse { .. } => "parse",
            ConfigError::Validation { .. } => "validation",
            ConfigError::MissingField { .. } => "missing_field",
            ConfigError::Io { .. } => "io",
            ConfigError::EnvVarNotFound { .. } => "env_var_not_found",
            ConfigError::InvalidEnvVar { .. } => "invalid_env_var",
            ConfigError::FileNotFound { .. } => "file_not_found",
            ConfigError::OutOfRange { .. } => "out_of_range",
            ConfigError::DuplicateUser { .. } => "duplicate_user",
            ConfigError::UnsupportedFormat { .. } => "unsupported_format",
        }
    }
}

/// A Result type with ConfigError.
pub type ConfigResult<T> = Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_creation() {
        let error = ConfigError::validation("auth.signing_secret", "must not be empty");
        assert!(matches!(error, ConfigError::Validation { .. }));
        assert_eq!(error.error_type(), "validation");

        let error = ConfigError::missing_field("auth.signing_secret");
        assert_eq!(error.error_type(), "missing_field");

        let error = ConfigError::duplicate_user("email", "a@example.com");
        assert_eq!(error.to_string(), "Duplicate user email: a@example.com");
    }

    #[test]
    fn test_config_error_user_message() {
        let error = ConfigError::validation("server.port", "must be positive");
        assert_eq!(error.user_message(), "`server.port` is invalid: must be positive");
    }

    #[test]
    fn test_config_error_is_io_error() {
        let error = ConfigError::io(
            "gatehouse.yaml",
            std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
        );
        assert!(error.is_io_error());
        assert!(ConfigError::file_not_found("gatehouse.yaml").is_io_error());
        assert!(!ConfigError::missing_field("auth").is_io_error());
    }

    #[test]
    fn test_out_of_range() {
        let error = ConfigError::out_of_range("auth.access_ttl_secs", 0, 1, 86_400);
        assert!(error.user_message().contains("auth.access_ttl_secs"));
    }
}
