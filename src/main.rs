// Copyright © 2024 FormDecor. All rights reserved.
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! # FormDecor CLI
//!
//! This is the main entry point for the FormDecor command-line interface.
//! It parses the arguments, initialises the logger and runs the selected
//! command.

use anyhow::Context;
use formdecor::cli;
use std::io;

/// Parses the command line, sets up logging and runs the command.
fn run() -> anyhow::Result<()> {
    let matches = cli::build().get_matches();

    env_logger::Builder::from_default_env()
        .filter_level(cli::log_level(&matches))
        .parse_default_env()
        .init();

    let stdout = io::stdout();
    let mut out = stdout.lock();
    cli::execute(&matches, &mut out).context("formdecor failed")?;
    Ok(())
}

/// The main entry point for the FormDecor CLI.
fn main() {
    if let Err(err) = run() {
        eprintln!("Error: {:#}", err);
        std::process::exit(1);
    }
}
