// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Implementation of the `gen-secret` and `hash-password` commands.

use std::io::{self, Read};

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use rand::{rngs::OsRng, RngCore};

use crate::cli::{Cli, GenSecretArgs, HashPasswordArgs};
use crate::error::{BinError, BinResult};

/// Smallest secret `gen-secret` will produce, in bytes.
const MIN_SECRET_BYTES: usize = 16;

/// Largest secret `gen-secret` will produce, in bytes.
const MAX_SECRET_BYTES: usize = 512;

/// Executes the `gen-secret` command.
pub fn gen_secret(cli: &Cli, args: GenSecretArgs) -> BinResult<()> {
    let secret = generate_secret(args.bytes)?;
    println!("{}", secret);

    if !cli.quiet {
        eprintln!();
        eprintln!("Set it as auth.signing_secret, or export GATEHOUSE_AUTH_SECRET=<secret>");
    }
    Ok(())
}

/// Generates `bytes` random bytes from the OS and encodes them as URL-safe base64.
pub fn generate_secret(bytes: usize) -> BinResult<String> {
    if !(MIN_SECRET_BYTES..=MAX_SECRET_BYTES).contains(&bytes) {
        return Err(BinError::config(format!(
            "Secret length must be between {} and {} bytes, got {}",
            MIN_SECRET_BYTES, MAX_SECRET_BYTES, bytes
        )));
    }

    let mut buf = vec![0u8; bytes];
    OsRng.fill_bytes(&mut buf);
    Ok(URL_SAFE_NO_PAD.encode(buf))
}

/// Executes the `hash-password` command.
pub fn hash_password(_cli: &Cli, args: HashPasswordArgs) -> BinResult<()> {
    let password = if args.stdin {
        let mut input = String::new();
        io::stdin()
            .read_to_string(&mut input)
            .map_err(|e| BinError::io(format!("Failed to read from stdin: {}", e)))?;
        input.trim_end_matches(['\r', '\n']).to_string()
    } else {
        args.password
            .ok_or_else(|| BinError::config("No password provided. Use --stdin or pass it as an argument"))?
    };

    if password.is_empty() {
        return Err(BinError::config("Password must not be empty"));
    }

    let hash = gatehouse_core::hash_password(&password)?;
    println!("{}", hash);
    Ok(())
}
