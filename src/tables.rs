//! # Lookup Tables
//!
//! The two constant mappings the decorator owns: framework element type
//! names to client type tags, and validator identifiers to client
//! validation keywords. Both are plain ordered maps so a caller can extend
//! or override entries through configuration without touching the engine.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Client type used for any element type missing from the [`TypeMap`].
pub const FALLBACK_TYPE: &str = "hidden";

/// Built-in element type mapping.
pub const DEFAULT_TYPES: &[(&str, &str)] = &[
    ("StaticText", "staticText"),
    ("Text", "text"),
    ("Textarea", "textarea"),
    ("Password", "password"),
    ("Email", "email"),
    ("Telephone", "tel"),
    ("Url", "url"),
    ("Number", "number"),
    ("Date", "date"),
    ("SingleSelect", "select"),
    ("FileUpload", "file"),
    ("Checkbox", "checkbox"),
    ("MultiCheckbox", "checkbox"),
    ("RadioButton", "radio"),
];

/// Built-in validator mapping.
pub const DEFAULT_VALIDATIONS: &[(&str, &str)] = &[
    ("EmailAddress", "email"),
    ("NotEmpty", "required"),
    ("Number", "number"),
];

/// Maps framework element type names to client type tags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeMap(BTreeMap<String, String>);

impl TypeMap {
    /// Creates an empty table. Every lookup falls back to [`FALLBACK_TYPE`].
    pub fn empty() -> Self {
        Self(BTreeMap::new())
    }

    /// Adds or replaces the tag for `type_name`.
    pub fn with<N: Into<String>, T: Into<String>>(
        mut self,
        type_name: N,
        tag: T,
    ) -> Self {
        self.insert(type_name, tag);
        self
    }

    /// Adds or replaces the tag for `type_name` in place.
    pub fn insert<N: Into<String>, T: Into<String>>(
        &mut self,
        type_name: N,
        tag: T,
    ) {
        _ = self.0.insert(type_name.into(), tag.into());
    }

    /// Returns the client tag for `type_name`, if the table knows it.
    pub fn get(&self, type_name: &str) -> Option<&str> {
        self.0.get(type_name).map(String::as_str)
    }

    /// Returns the client tag for `type_name`, or `hidden` when unknown.
    pub fn client_type(&self, type_name: &str) -> &str {
        self.get(type_name).unwrap_or(FALLBACK_TYPE)
    }

    /// Iterates over `(type name, client tag)` pairs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the table has no entries.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for TypeMap {
    fn default() -> Self {
        DEFAULT_TYPES
            .iter()
            .fold(Self::empty(), |map, (name, tag)| map.with(*name, *tag))
    }
}

/// Maps validator identifiers to client validation keywords.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValidationMap(BTreeMap<String, String>);

impl ValidationMap {
    /// Creates an empty table. Every identifier maps to itself.
    pub fn empty() -> Self {
        Self(BTreeMap::new())
    }

    /// Adds or replaces the keyword for `identifier`.
    pub fn with<I: Into<String>, K: Into<String>>(
        mut self,
        identifier: I,
        keyword: K,
    ) -> Self {
        self.insert(identifier, keyword);
        self
    }

    /// Adds or replaces the keyword for `identifier` in place.
    pub fn insert<I: Into<String>, K: Into<String>>(
        &mut self,
        identifier: I,
        keyword: K,
    ) {
        _ = self.0.insert(identifier.into(), keyword.into());
    }

    /// Returns the keyword for `identifier`, if the table knows it.
    pub fn get(&self, identifier: &str) -> Option<&str> {
        self.0.get(identifier).map(String::as_str)
    }

    /// Returns the keyword for `identifier`; unknown identifiers pass
    /// through unchanged.
    pub fn keyword<'a>(&'a self, identifier: &'a str) -> &'a str {
        self.get(identifier).unwrap_or(identifier)
    }

    /// Maps every identifier and joins the keywords with `|`.
    pub fn join<I>(&self, identifiers: I) -> String
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        identifiers
            .into_iter()
            .map(|identifier| self.keyword(identifier.as_ref()).to_owned())
            .collect::<Vec<_>>()
            .join("|")
    }

    /// Iterates over `(identifier, keyword)` pairs in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the table has no entries.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for ValidationMap {
    fn default() -> Self {
        DEFAULT_VALIDATIONS.iter().fold(
            Self::empty(),
            |map, (identifier, keyword)| map.with(*identifier, *keyword),
        )
    }
}
