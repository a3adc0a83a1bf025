//! # Error Handling for FormDecor
//!
//! This module defines the error taxonomy of the decorator. The `thiserror`
//! crate is used to derive `Display` and `Error` so every failure carries a
//! readable message and, where one exists, its underlying source.
//!
//! Two variants describe a broken form definition handed in by upstream:
//! [`DecoratorError::MissingField`] for an absent required key and
//! [`DecoratorError::MalformedDefinition`] for a value of the wrong shape.
//! Neither is retried or recovered from; callers should treat them as a
//! contract violation and surface a failure response.

use std::path::PathBuf;
use thiserror::Error;

/// A unified result type for the FormDecor library.
pub type Result<T> = std::result::Result<T, DecoratorError>;

/// The main error type for FormDecor.
#[derive(Error, Debug)]
pub enum DecoratorError {
    /// A required key is absent from the definition tree.
    ///
    /// Raised for a missing `identifier` on the root, a container or a
    /// field, and for a missing `type` on any node.
    #[error("Missing required field `{field}` at `{path}`.")]
    MissingField {
        /// Name of the absent key.
        field: String,
        /// Location of the offending node, e.g. `renderables[0].renderables[2]`.
        path: String,
    },

    /// A definition value has the wrong shape.
    #[error("Malformed definition at `{path}`: {message}.")]
    MalformedDefinition {
        /// What was expected and what was found.
        message: String,
        /// Location of the offending node.
        path: String,
    },

    /// Error related to configuration loading or validation.
    #[error("Configuration error: {message}.")]
    ConfigError {
        /// Detailed description of the configuration error.
        message: String,
        /// Optional path of the configuration file that caused the error.
        path: Option<PathBuf>,
    },

    /// A definition or status document could not be parsed.
    #[error("Parse error: {message}.")]
    ParseError {
        /// Description of the parse failure.
        message: String,
        /// The underlying JSON or YAML error, if available.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// IO error encountered while reading or writing files.
    #[error("File IO error at `{path:?}`: {source}")]
    IOError {
        /// Path associated with the IO error.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// An override hook refused the element or definition it was given.
    #[error("Hook error: {0}")]
    HookError(String),

    /// The decorated tree could not be serialised.
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl From<std::io::Error> for DecoratorError {
    /// Converts a standard IO error into a `DecoratorError::IOError` with an
    /// empty path.
    fn from(source: std::io::Error) -> Self {
        DecoratorError::IOError {
            path: PathBuf::new(),
            source,
        }
    }
}

impl DecoratorError {
    /// Creates a `MissingField` error for `field` at the tree location `path`.
    pub fn missing_field<F: Into<String>, P: Into<String>>(
        field: F,
        path: P,
    ) -> Self {
        DecoratorError::MissingField {
            field: field.into(),
            path: path.into(),
        }
    }

    /// Creates a `MalformedDefinition` error at the tree location `path`.
    pub fn malformed<S: Into<String>, P: Into<String>>(
        message: S,
        path: P,
    ) -> Self {
        DecoratorError::MalformedDefinition {
            message: message.into(),
            path: path.into(),
        }
    }

    /// Creates a `ConfigError` with a specific message.
    ///
    /// # Parameters
    /// - `message`: A description of the configuration error.
    /// - `path`: Optional path of the configuration file causing the error.
    pub fn config_error<S: Into<String>>(
        message: S,
        path: Option<PathBuf>,
    ) -> Self {
        DecoratorError::ConfigError {
            message: message.into(),
            path,
        }
    }

    /// Creates a `ParseError` with a message and optional source.
    pub fn parse_error<S: Into<String>>(
        message: S,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        DecoratorError::ParseError {
            message: message.into(),
            source,
        }
    }

    /// Wraps an IO error as an `IOError` variant with the specified path.
    pub fn io_error(path: PathBuf, source: std::io::Error) -> Self {
        DecoratorError::IOError { path, source }
    }

    /// Creates a `HookError` with a custom message.
    pub fn hook_error<S: Into<String>>(message: S) -> Self {
        DecoratorError::HookError(message.into())
    }

    /// Returns `true` when the error describes a broken definition tree
    /// rather than an environmental failure.
    pub fn is_definition_error(&self) -> bool {
        matches!(
            self,
            DecoratorError::MissingField { .. }
                | DecoratorError::MalformedDefinition { .. }
        )
    }
}
