// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Implementation of the `version` command.

use crate::cli::Cli;
use crate::error::BinResult;

/// Executes the `version` command to display version information.
pub fn version(_cli: &Cli) -> BinResult<()> {
    println!("gatehouse - token-pair session gate");
    println!();
    println!("Version Information:");
    println!("  gatehouse-bin:    {}", env!("CARGO_PKG_VERSION"));
    println!("  gatehouse-core:   {}", gatehouse_core::VERSION);
    println!("  gatehouse-api:    {}", gatehouse_api::VERSION);
    println!("  gatehouse-config: {}", gatehouse_config::VERSION);
    println!();
    println!("Build Information:");
    println!("  Arch:         {}", std::env::consts::ARCH);
    println!("  OS:           {}", std::env::consts::OS);
    println!();
    println!("License: PolyForm Noncommercial License 1.0.0");
    println!("Copyright (c) 2025 Sylvex. All rights reserved.");

    Ok(())
}
