//! # Configuration Module
//!
//! Configuration of the decorator: the two lookup tables it injects into
//! the engine and the output preferences of the command-line tool. Values
//! come from the built-in defaults, optionally extended by a TOML file,
//! environment variables and programmatic overrides, applied in that order.
//!
//! ## Example
//!
//! ```rust,no_run
//! use formdecor::core::config::ConfigBuilder;
//!
//! let config = ConfigBuilder::new()
//!     .with_file("formdecor.toml")
//!     .with_env_prefix("FORMDECOR_")
//!     .with_override("types.ImageUpload", "file")
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(config.types.client_type("ImageUpload"), "file");
//! ```
//!
//! ## File format
//!
//! ```toml
//! pretty_print = false
//!
//! [types]
//! ImageUpload = "file"
//! CountrySelect = "select"
//!
//! [validations]
//! StringLength = "length"
//! ```
//!
//! Entries in `[types]` and `[validations]` are merged over the defaults;
//! an entry with a built-in key replaces the built-in mapping.

use std::collections::{BTreeMap, HashMap};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use log::debug;
use serde::{Deserialize, Serialize};
use toml::Value as TomlValue;

use crate::core::error::{DecoratorError, Result};
use crate::tables::{TypeMap, ValidationMap};

/// Represents the complete configuration of the decorator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Pretty-print JSON written by the command-line tool.
    #[serde(default = "default_true")]
    pub pretty_print: bool,

    /// Element type name to client type tag.
    #[serde(default)]
    pub types: TypeMap,

    /// Validator identifier to client validation keyword.
    #[serde(default)]
    pub validations: ValidationMap,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            pretty_print: true,
            types: TypeMap::default(),
            validations: ValidationMap::default(),
        }
    }
}

impl Config {
    /// Validates the configuration.
    pub fn validate(&self) -> Result<()> {
        validate_config(self)
    }
}

/// Shape of a configuration file. Tables are partial and merged over the
/// defaults rather than replacing them.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    pretty_print: Option<bool>,
    #[serde(default)]
    types: BTreeMap<String, String>,
    #[serde(default)]
    validations: BTreeMap<String, String>,
}

/// Builds a `Config` instance from several sources.
#[derive(Debug, Default)]
pub struct ConfigBuilder {
    config_file: Option<PathBuf>,
    env_prefix: Option<String>,
    overrides: HashMap<String, TomlValue>,
}

impl ConfigBuilder {
    /// Initialises a new `ConfigBuilder` instance with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a TOML configuration file to the builder.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_file = Some(path.as_ref().to_path_buf());
        self
    }

    /// Adds a prefix for environment variables that override configuration
    /// values, e.g. `FORMDECOR_` makes `FORMDECOR_PRETTY_PRINT=false`
    /// switch pretty-printing off.
    pub fn with_env_prefix<S: Into<String>>(mut self, prefix: S) -> Self {
        self.env_prefix = Some(prefix.into());
        self
    }

    /// Adds a key-value pair to override configuration values.
    ///
    /// Recognised keys are `pretty_print`, `types.<TypeName>` and
    /// `validations.<ValidatorIdentifier>`.
    pub fn with_override<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<TomlValue>,
    {
        _ = self.overrides.insert(key.into(), value.into());
        self
    }

    /// Builds the final configuration by applying all specified settings
    /// and overrides, then validates it.
    pub fn build(self) -> Result<Config> {
        let mut config = Config::default();

        if let Some(path) = &self.config_file {
            let file = load_from_file(path)?;
            merge_file(&mut config, file);
            debug!("Loaded decorator configuration from {:?}", path);
        }

        if let Some(prefix) = &self.env_prefix {
            apply_env_overrides(&mut config, prefix)?;
        }

        apply_overrides(&mut config, &self.overrides)?;
        validate_config(&config)?;

        Ok(config)
    }
}

// Internal helper functions

fn load_from_file(path: &Path) -> Result<ConfigFile> {
    let content = fs::read_to_string(path).map_err(|e| {
        DecoratorError::config_error(
            format!("Failed to read config file: {}", e),
            Some(path.to_path_buf()),
        )
    })?;

    toml::from_str(&content).map_err(|e| {
        DecoratorError::config_error(
            format!("Failed to parse config file: {}", e),
            Some(path.to_path_buf()),
        )
    })
}

fn merge_file(config: &mut Config, file: ConfigFile) {
    if let Some(pretty_print) = file.pretty_print {
        config.pretty_print = pretty_print;
    }
    for (type_name, tag) in file.types {
        config.types.insert(type_name, tag);
    }
    for (identifier, keyword) in file.validations {
        config.validations.insert(identifier, keyword);
    }
}

fn apply_env_overrides(config: &mut Config, prefix: &str) -> Result<()> {
    apply_env_pairs(config, prefix, env::vars())
}

fn apply_env_pairs<I>(config: &mut Config, prefix: &str, vars: I) -> Result<()>
where
    I: IntoIterator<Item = (String, String)>,
{
    for (key, value) in vars {
        if let Some(stripped) = key.strip_prefix(prefix) {
            let config_key = stripped.trim_start_matches('_').to_lowercase();
            apply_config_value(config, &config_key, &value)?;
        }
    }
    Ok(())
}

fn apply_overrides(
    config: &mut Config,
    overrides: &HashMap<String, TomlValue>,
) -> Result<()> {
    for (key, value) in overrides {
        let value = match value {
            TomlValue::String(s) => s.clone(),
            other => other.to_string(),
        };
        apply_config_value(config, key, &value)?;
    }
    Ok(())
}

fn apply_config_value(config: &mut Config, key: &str, value: &str) -> Result<()> {
    match key {
        "pretty_print" => {
            config.pretty_print = value.parse().map_err(|e| {
                DecoratorError::config_error(
                    format!("Invalid pretty_print value '{}': {}", value, e),
                    None,
                )
            })?;
        }
        _ => match key.split_once('.') {
            Some(("types", type_name)) => config.types.insert(type_name, value),
            Some(("validations", identifier)) => {
                config.validations.insert(identifier, value)
            }
            Some((section, _)) => {
                return Err(DecoratorError::config_error(
                    format!("Unknown configuration section: {}", section),
                    None,
                ));
            }
            None => {
                return Err(DecoratorError::config_error(
                    format!("Unknown configuration key: {}", key),
                    None,
                ));
            }
        },
    }
    Ok(())
}

fn validate_config(config: &Config) -> Result<()> {
    for (type_name, tag) in config.types.iter() {
        if type_name.is_empty() || tag.is_empty() {
            return Err(DecoratorError::config_error(
                format!("Empty type mapping '{}' -> '{}'", type_name, tag),
                None,
            ));
        }
    }
    for (identifier, keyword) in config.validations.iter() {
        if identifier.is_empty() || keyword.is_empty() {
            return Err(DecoratorError::config_error(
                format!(
                    "Empty validation mapping '{}' -> '{}'",
                    identifier, keyword
                ),
                None,
            ));
        }
    }
    Ok(())
}

fn default_true() -> bool {
    true
}
