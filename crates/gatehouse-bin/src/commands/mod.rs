// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! CLI command implementations.
//!
//! - `run`: Start the server
//! - `validate`: Validate configuration file
//! - `version`: Show version information
//! - `gen-secret`: Generate a token signing secret
//! - `hash-password`: Hash a password for a seeded user

mod run;
mod secrets;
mod validate;
mod version;

pub use run::run;
pub use secrets::{gen_secret, generate_secret, hash_password};
pub use validate::validate;
pub use version::version;

use crate::cli::{Cli, Commands};
use crate::error::BinResult;

/// Executes the appropriate command based on CLI arguments.
pub async fn execute(cli: Cli) -> BinResult<()> {
    match cli.effective_command() {
        Commands::Run(args) => run::run(&cli, args).await,
        Commands::Validate(args) => validate::validate(&cli, args),
        Commands::Version => version::version(&cli),
        Commands::GenSecret(args) => secrets::gen_secret(&cli, args),
        Commands::HashPassword(args) => secrets::hash_password(&cli, args),
    }
}
