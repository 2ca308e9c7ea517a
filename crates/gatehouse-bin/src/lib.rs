// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # gatehouse-bin
//!
//! CLI binary for the gatehouse session gate.
//!
//! - CLI argument parsing with clap
//! - Server runtime wiring from the config file
//! - Graceful shutdown handling
//! - Logging initialization
//! - Command implementations (run, validate, version, gen-secret, hash-password)
//!
//! ## Usage
//!
//! ```bash
//! # Start the server (default command)
//! gatehouse
//!
//! # Start with custom config and port
//! gatehouse -c /etc/gatehouse/config.yaml run --port 9090
//!
//! # Validate configuration
//! gatehouse validate --strict
//!
//! # Generate a signing secret
//! gatehouse gen-secret
//!
//! # Hash a password for the users section
//! echo -n 'hunter2' | gatehouse hash-password --stdin
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

// =============================================================================
// Modules
// =============================================================================

pub mod cli;
pub mod commands;
pub mod error;
pub mod logging;
pub mod runtime;
pub mod shutdown;

// =============================================================================
// Re-exports
// =============================================================================

pub use cli::{Cli, Commands};
pub use error::{BinError, BinResult};
pub use logging::init_logging;
pub use runtime::{GatehouseRuntime, RuntimeBuilder};
pub use shutdown::{ShutdownCoordinator, ShutdownSignal};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name.
pub const NAME: &str = env!("CARGO_PKG_NAME");
