// Copyright © 2024 FormDecor. All rights reserved.
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Command-line interface for FormDecor
//!
//! This module provides the command-line interface of the decorator. It
//! handles argument parsing and command execution; the heavy lifting lives
//! in [`crate::decorator`].
//!
//! # Examples
//!
//! ```
//! use formdecor::cli;
//!
//! let matches = cli::build().get_matches_from(vec![
//!     "formdecor",
//!     "decorate",
//!     "contact.form.yaml",
//!     "--page",
//!     "1",
//! ]);
//!
//! let decorate = matches.subcommand_matches("decorate").unwrap();
//! assert_eq!(decorate.get_one::<i64>("page"), Some(&1));
//! ```

use crate::core::config::{Config, ConfigBuilder};
use crate::core::error::{DecoratorError, Result};
use crate::decorator::FormDecorator;
use crate::loader::{load_definition, load_status};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use log::{debug, info};
use serde_json::json;
use std::fs;
use std::io::Write;
use std::path::PathBuf;

/// The current version of FormDecor, as defined in `Cargo.toml`.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prefix of environment variables read into the configuration.
pub const ENV_PREFIX: &str = "FORMDECOR_";

/// Builds and configures the FormDecor command-line interface.
pub fn build() -> Command {
    debug!("Building CLI command structure");

    Command::new("formdecor")
        .author("FormDecor Contributors")
        .about("Turns nested CMS form definitions into flat, client-ready JSON.")
        .version(VERSION)
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Increase log output (-v, -vv, -vvv)")
                .action(ArgAction::Count)
                .global(true),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .help("TOML file extending the type and validation tables")
                .value_parser(value_parser!(PathBuf))
                .global(true),
        )
        .subcommand(
            Command::new("decorate")
                .about("Decorate a form definition")
                .arg(
                    Arg::new("definition")
                        .help("Form definition (.json, .yaml or .yml)")
                        .required(true)
                        .value_parser(value_parser!(PathBuf)),
                )
                .arg(
                    Arg::new("status")
                        .short('s')
                        .long("status")
                        .help("JSON file echoed under `api`")
                        .value_parser(value_parser!(PathBuf)),
                )
                .arg(
                    Arg::new("page")
                        .short('p')
                        .long("page")
                        .help("Current page index handed to the hooks")
                        .value_parser(value_parser!(i64))
                        .allow_negative_numbers(true)
                        .default_value("0"),
                )
                .arg(
                    Arg::new("output")
                        .short('o')
                        .long("output")
                        .help("Write the result to a file instead of stdout")
                        .value_parser(value_parser!(PathBuf)),
                )
                .arg(
                    Arg::new("compact")
                        .long("compact")
                        .help("Emit compact JSON")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("tables")
                .about("Print the effective type and validation tables"),
        )
        .after_help(
            "\x1b[1;4mLicense:\x1b[0m\n  The project is licensed under the terms of \
             both the MIT license and the Apache License (Version 2.0).",
        )
}

/// Returns the log level filter selected by `-v` flags.
pub fn log_level(matches: &ArgMatches) -> log::LevelFilter {
    match matches.get_count("verbose") {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    }
}

/// Executes the command selected in `matches`, writing results to `out`.
pub fn execute<W: Write>(matches: &ArgMatches, out: &mut W) -> Result<()> {
    let config = load_config(matches)?;

    match matches.subcommand() {
        Some(("decorate", sub_matches)) => {
            decorate_definition(sub_matches, &config, out)
        }
        Some(("tables", _)) => print_tables(&config, out),
        _ => Err(DecoratorError::config_error("Unknown command", None)),
    }
}

fn load_config(matches: &ArgMatches) -> Result<Config> {
    let mut builder = ConfigBuilder::new().with_env_prefix(ENV_PREFIX);
    if let Some(path) = matches.get_one::<PathBuf>("config") {
        builder = builder.with_file(path);
    }
    builder.build()
}

fn decorate_definition<W: Write>(
    matches: &ArgMatches,
    config: &Config,
    out: &mut W,
) -> Result<()> {
    let definition_path = matches
        .get_one::<PathBuf>("definition")
        .ok_or_else(|| DecoratorError::config_error("No definition given", None))?;
    let current_page = matches.get_one::<i64>("page").copied().unwrap_or(0);
    let pretty = config.pretty_print && !matches.get_flag("compact");

    info!("Decorating {}", definition_path.display());

    let definition = load_definition(definition_path)?;
    let status = load_status(matches.get_one::<PathBuf>("status"))?;
    let decorated =
        FormDecorator::with_config(config, status).decorate(&definition, current_page)?;
    let json = decorated.to_json(pretty)?;

    match matches.get_one::<PathBuf>("output") {
        Some(path) => {
            fs::write(path, json)
                .map_err(|e| DecoratorError::io_error(path.clone(), e))?;
            info!("Wrote decorated form to {}", path.display());
        }
        None => writeln!(out, "{}", json)?,
    }
    Ok(())
}

fn print_tables<W: Write>(config: &Config, out: &mut W) -> Result<()> {
    let tables = json!({
        "types": config.types,
        "validations": config.validations,
    });
    let json = if config.pretty_print {
        serde_json::to_string_pretty(&tables)?
    } else {
        serde_json::to_string(&tables)?
    };
    writeln!(out, "{}", json)?;
    Ok(())
}
