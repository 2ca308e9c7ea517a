// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! gatehouse - token-pair session gate
//!
//! Main binary entry point.

use gatehouse_bin::cli::{Cli, LogFormat};
use gatehouse_bin::commands;
use gatehouse_bin::error::report_error_and_exit;
use gatehouse_bin::logging::{configured_logging, init_logging};

#[tokio::main]
async fn main() {
    let cli = Cli::parse_args();

    let file_logging = configured_logging(&cli.config);
    let level = cli.effective_log_level(file_logging.level.as_str()).to_string();
    let format = cli.effective_log_format(LogFormat::from(file_logging.format));

    if let Err(e) = init_logging(&level, format) {
        report_error_and_exit(e);
    }

    if let Err(e) = commands::execute(cli).await {
        report_error_and_exit(e);
    }
}
