//! # Definition Loading
//!
//! Reads form definitions and status payloads from disk. The CMS stores
//! form definitions as YAML (`*.form.yaml`); exported or API-fetched
//! definitions are usually JSON. Both parse straight into the typed
//! [`FormDefinition`], so every structural check happens while loading.

use crate::core::error::{DecoratorError, Result};
use crate::definition::FormDefinition;
use log::debug;
use serde_json::{Map, Value as JsonValue};
use std::fmt;
use std::fs;
use std::path::Path;

/// Serialisation format of a definition document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefinitionFormat {
    /// JSON document.
    Json,
    /// YAML document.
    Yaml,
}

impl DefinitionFormat {
    /// Detects the format from a file extension, `None` when unsupported.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Option<Self> {
        let extension = path.as_ref().extension()?.to_str()?.to_lowercase();
        match extension.as_str() {
            "json" => Some(DefinitionFormat::Json),
            "yaml" | "yml" => Some(DefinitionFormat::Yaml),
            _ => None,
        }
    }
}

impl fmt::Display for DefinitionFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DefinitionFormat::Json => f.write_str("JSON"),
            DefinitionFormat::Yaml => f.write_str("YAML"),
        }
    }
}

/// Parses a definition document.
pub fn parse_definition(
    content: &str,
    format: DefinitionFormat,
) -> Result<FormDefinition> {
    let value = parse_value(content, format)?;
    FormDefinition::from_value(value)
}

/// Loads a definition from `path`, picking the parser from its extension.
pub fn load_definition<P: AsRef<Path>>(path: P) -> Result<FormDefinition> {
    let path = path.as_ref();
    let format = DefinitionFormat::from_path(path).ok_or_else(|| {
        DecoratorError::parse_error(
            format!(
                "Unsupported definition file '{}', expected .json, .yaml or .yml",
                path.display()
            ),
            None,
        )
    })?;
    let content = fs::read_to_string(path)
        .map_err(|e| DecoratorError::io_error(path.to_path_buf(), e))?;

    debug!("Loading {} definition from {}", format, path.display());
    parse_definition(&content, format)
}

/// Loads a JSON status payload. Without a path, the payload is an empty
/// mapping.
pub fn load_status<P: AsRef<Path>>(path: Option<P>) -> Result<JsonValue> {
    let Some(path) = path else {
        return Ok(JsonValue::Object(Map::new()));
    };
    let path = path.as_ref();
    let content = fs::read_to_string(path)
        .map_err(|e| DecoratorError::io_error(path.to_path_buf(), e))?;
    parse_value(&content, DefinitionFormat::Json)
}

fn parse_value(content: &str, format: DefinitionFormat) -> Result<JsonValue> {
    match format {
        DefinitionFormat::Json => serde_json::from_str(content).map_err(|e| {
            DecoratorError::parse_error("Invalid JSON document", Some(Box::new(e)))
        }),
        DefinitionFormat::Yaml => serde_yml::from_str(content).map_err(|e| {
            DecoratorError::parse_error("Invalid YAML document", Some(Box::new(e)))
        }),
    }
}
