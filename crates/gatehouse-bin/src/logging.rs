// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Logging and tracing initialization.
//!
//! `RUST_LOG`, when set, replaces the level chosen on the command line or in
//! the config file.

use tracing_subscriber::{
    filter::Directive, fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
};

use std::path::Path;

use gatehouse_config::{ConfigLoader, LoggingConfig};

use crate::cli::LogFormat;
use crate::error::{BinError, BinResult};

/// Directives that keep dependency chatter down at `debug`.
const QUIET_DEPENDENCIES: &[&str] = &["hyper=warn", "tower=warn", "axum=info", "tokio=info"];

// =============================================================================
// Logging Initialization
// =============================================================================

/// Initializes the logging subsystem.
///
/// # Arguments
///
/// * `level` - Log level string (trace, debug, info, warn, error)
/// * `format` - Log output format (text, json, compact)
///
/// # Example
///
/// ```ignore
/// use gatehouse_bin::logging::init_logging;
/// use gatehouse_bin::cli::LogFormat;
///
/// init_logging("info", LogFormat::Text)?;
/// ```
pub fn init_logging(level: &str, format: LogFormat) -> BinResult<()> {
    let filter = build_filter(level);

    let result = match format {
        LogFormat::Text => init_text_logging(filter),
        LogFormat::Json => init_json_logging(filter),
        LogFormat::Compact => init_compact_logging(filter),
    };

    result.map_err(|e| BinError::init(format!("Failed to install log subscriber: {}", e)))
}

/// Builds the filter from `RUST_LOG` or `level`, plus dependency directives.
pub fn build_filter(level: &str) -> EnvFilter {
    let base = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    QUIET_DEPENDENCIES
        .iter()
        .filter_map(|directive| directive.parse::<Directive>().ok())
        .fold(base, |filter, directive| filter.add_directive(directive))
}

/// Reads the `logging` section of the config file, if one can be read.
///
/// Runs before any subscriber exists, so an unreadable file silently yields
/// the defaults; the command itself reports the real error.
pub fn configured_logging(path: &Path) -> LoggingConfig {
    if !path.exists() {
        return LoggingConfig::default();
    }

    ConfigLoader::new()
        .with_validation(false)
        .load(path)
        .map(|config| config.logging)
        .unwrap_or_default()
}

fn init_text_logging(filter: EnvFilter) -> Result<(), tracing_subscriber::util::TryInitError> {
    let is_terminal = std::io::IsTerminal::is_terminal(&std::io::stdout());

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(true)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .with_ansi(is_terminal),
        )
        .try_init()
}

fn init_json_logging(filter: EnvFilter) -> Result<(), tracing_subscriber::util::TryInitError> {
    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .json()
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .with_current_span(true)
                .with_span_list(true),
        )
        .try_init()
}

fn init_compact_logging(filter: EnvFilter) -> Result<(), tracing_subscriber::util::TryInitError> {
    let is_terminal = std::io::IsTerminal::is_terminal(&std::io::stdout());

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .compact()
                .with_target(false)
                .with_file(false)
                .with_line_number(false)
                .with_ansi(is_terminal),
        )
        .try_init()
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_filter_includes_dependency_directives() {
        let filter = build_filter("debug").to_string();
        assert!(filter.contains("hyper=warn"));
        assert!(filter.contains("tower=warn"));
    }

    #[test]
    fn test_configured_logging_defaults_without_file() {
        let logging = configured_logging(Path::new("/nonexistent/gatehouse.yaml"));
        assert_eq!(logging.level, gatehouse_config::LogLevel::Info);
    }

    #[test]
    fn test_configured_logging_reads_unvalidated_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gatehouse.yaml");
        // No signing secret: the logging section is still honored.
        std::fs::write(&path, "logging:\n  level: trace\n  format: json\n").unwrap();

        let logging = configured_logging(&path);
        assert_eq!(logging.level, gatehouse_config::LogLevel::Trace);
        assert_eq!(logging.format, gatehouse_config::LogFormat::Json);
    }

    #[test]
    fn test_second_init_is_an_error() {
        let _ = init_logging("info", LogFormat::Compact);
        let second = init_logging("info", LogFormat::Compact);
        assert!(matches!(second, Err(BinError::Initialization(_))));
    }
}
