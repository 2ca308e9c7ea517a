// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! CLI argument parsing and command definitions.
//!
//! - `run`: Start the server (default)
//! - `validate`: Validate configuration file
//! - `version`: Show version information
//! - `gen-secret`: Generate a token signing secret
//! - `hash-password`: Hash a password for the `users` config section

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

// =============================================================================
// Main CLI Structure
// =============================================================================

/// gatehouse - token-pair session gate
///
/// Issues and rotates access/refresh token pairs over HTTP, with CSRF
/// binding and privilege checks on every gated request.
#[derive(Parser, Debug)]
#[command(
    name = "gatehouse",
    author = "Sylvex <contact@sylvex.io>",
    version = gatehouse_core::VERSION,
    about = "Token-pair session gate",
    long_about = None,
    propagate_version = true
)]
pub struct Cli {
    /// Configuration file path
    #[arg(
        short,
        long,
        default_value = "gatehouse.yaml",
        env = "GATEHOUSE_CONFIG",
        global = true
    )]
    pub config: PathBuf,

    /// Log level (trace, debug, info, warn, error). Overrides the config file.
    #[arg(short, long, global = true)]
    pub log_level: Option<String>,

    /// Log format (text, json, compact). Overrides the config file.
    #[arg(long, env = "GATEHOUSE_LOG_FORMAT", global = true)]
    pub log_format: Option<LogFormat>,

    /// Enable quiet mode (minimal output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

// =============================================================================
// Subcommands
// =============================================================================

/// Available subcommands for the gatehouse CLI.
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start the server
    ///
    /// This is the default command when no subcommand is specified.
    Run(RunArgs),

    /// Validate the configuration file
    ///
    /// Parses and validates the configuration file without starting the server.
    Validate(ValidateArgs),

    /// Show detailed version information
    Version,

    /// Generate a random token signing secret
    ///
    /// Prints a URL-safe base64 string suitable for `auth.signing_secret`.
    #[command(name = "gen-secret")]
    GenSecret(GenSecretArgs),

    /// Hash a password for a seeded user
    ///
    /// Prints an Argon2 PHC string suitable for `users[].password_hash`.
    #[command(name = "hash-password")]
    HashPassword(HashPasswordArgs),
}

// =============================================================================
// Command Arguments
// =============================================================================

/// Arguments for the `run` command.
#[derive(Args, Debug, Default, Clone)]
pub struct RunArgs {
    /// Override the listen port from the config file
    #[arg(short, long)]
    pub port: Option<u16>,
}

/// Arguments for the `validate` command.
#[derive(Args, Debug, Default, Clone)]
pub struct ValidateArgs {
    /// Show parsed configuration after validation
    #[arg(short, long)]
    pub show_config: bool,

    /// Output format for validation results
    #[arg(short, long, default_value = "text")]
    pub format: OutputFormat,

    /// Strict mode: treat warnings as errors
    #[arg(long)]
    pub strict: bool,
}

/// Arguments for the `gen-secret` command.
#[derive(Args, Debug, Clone)]
pub struct GenSecretArgs {
    /// Number of random bytes
    #[arg(short, long, default_value = "32")]
    pub bytes: usize,
}

/// Arguments for the `hash-password` command.
#[derive(Args, Debug, Clone)]
pub struct HashPasswordArgs {
    /// Password to hash
    #[arg(required_unless_present = "stdin")]
    pub password: Option<String>,

    /// Read the password from stdin
    #[arg(long)]
    pub stdin: bool,
}

// =============================================================================
// Enums
// =============================================================================

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum LogFormat {
    /// Human-readable text format
    #[default]
    Text,
    /// JSON format for structured logging
    Json,
    /// Compact format for minimal output
    Compact,
}

impl From<gatehouse_config::LogFormat> for LogFormat {
    fn from(format: gatehouse_config::LogFormat) -> Self {
        match format {
            gatehouse_config::LogFormat::Text => LogFormat::Text,
            gatehouse_config::LogFormat::Json => LogFormat::Json,
            gatehouse_config::LogFormat::Compact => LogFormat::Compact,
        }
    }
}

/// Output format for command results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text format
    #[default]
    Text,
    /// JSON format for programmatic parsing
    Json,
}

// =============================================================================
// Helper Methods
// =============================================================================

impl Cli {
    /// Parse CLI arguments from the command line.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Get the effective command, defaulting to `Run` if none specified.
    pub fn effective_command(&self) -> Commands {
        self.command
            .clone()
            .unwrap_or_else(|| Commands::Run(RunArgs::default()))
    }

    /// Get the effective log level.
    ///
    /// `--quiet` and `--verbose` win over `--log-level`, which wins over
    /// the configured `fallback`.
    pub fn effective_log_level<'a>(&'a self, fallback: &'a str) -> &'a str {
        if self.quiet {
            "warn"
        } else if self.verbose {
            "debug"
        } else {
            self.log_level.as_deref().unwrap_or(fallback)
        }
    }

    /// Get the effective log format, falling back to the configured one.
    pub fn effective_log_format(&self, fallback: LogFormat) -> LogFormat {
        self.log_format.unwrap_or(fallback)
    }
}

impl Default for GenSecretArgs {
    fn default() -> Self {
        Self { bytes: 32 }
    }
}

// =============================================================================
// Tests
// =============================================================================
