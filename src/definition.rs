//! # Definition Tree
//!
//! Typed model of the framework-native form definition the decorator
//! consumes. A definition arrives as a loosely typed JSON/YAML map; it is
//! turned into a [`FormDefinition`] exactly once, at the boundary, and every
//! required key is checked there. Traversal code downstream can then match
//! exhaustively on [`Renderable`] without re-checking keys.
//!
//! A node is classified as a [`Container`] only when its `type` is one of
//! `Page`, `Fieldset` or `GridRow` **and** it carries a non-empty
//! `renderables` sequence. Every other node, including a container-typed
//! node with an empty `renderables` list, is a [`Field`].

use crate::core::error::{DecoratorError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use std::fmt;

const KEY_IDENTIFIER: &str = "identifier";
const KEY_TYPE: &str = "type";
const KEY_RENDERABLES: &str = "renderables";
const KEY_RENDERING_OPTIONS: &str = "renderingOptions";
const KEY_LABEL: &str = "label";
const KEY_DEFAULT_VALUE: &str = "defaultValue";
const KEY_PROPERTIES: &str = "properties";
const KEY_VALIDATORS: &str = "validators";

/// Kinds of grouping nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ContainerKind {
    /// A form page.
    Page,
    /// A fieldset grouping fields on a page.
    Fieldset,
    /// A grid row grouping fields horizontally.
    GridRow,
}

impl ContainerKind {
    /// Parses a framework type name into a container kind.
    pub fn from_type_name(type_name: &str) -> Option<Self> {
        match type_name {
            "Page" => Some(ContainerKind::Page),
            "Fieldset" => Some(ContainerKind::Fieldset),
            "GridRow" => Some(ContainerKind::GridRow),
            _ => None,
        }
    }

    /// The framework type name of this kind.
    pub fn as_str(self) -> &'static str {
        match self {
            ContainerKind::Page => "Page",
            ContainerKind::Fieldset => "Fieldset",
            ContainerKind::GridRow => "GridRow",
        }
    }
}

impl fmt::Display for ContainerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The root of a form definition.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "JsonValue")]
pub struct FormDefinition {
    /// Form identifier.
    pub identifier: String,
    /// Opaque rendering options, `None` when the definition has none.
    pub rendering_options: Option<JsonValue>,
    /// Top-level pages and elements, in definition order.
    pub renderables: Vec<Renderable>,
    /// Every other root key (`type`, `label`, `i18n`, `finishers`, ...).
    pub attributes: Map<String, JsonValue>,
}

impl FormDefinition {
    /// Builds a definition from a raw JSON value, checking every node.
    pub fn from_value(value: JsonValue) -> Result<Self> {
        let mut map = into_object(value, "$")?;

        let identifier = take_string(&mut map, KEY_IDENTIFIER, "$")?
            .ok_or_else(|| {
                DecoratorError::missing_field(KEY_IDENTIFIER, "$")
            })?;
        let rendering_options =
            take_present(&mut map, KEY_RENDERING_OPTIONS);
        let renderables = match take_present(&mut map, KEY_RENDERABLES)
        {
            Some(JsonValue::Array(items)) => {
                parse_renderables(items, KEY_RENDERABLES)?
            }
            Some(_) => {
                return Err(DecoratorError::malformed(
                    "`renderables` must be a sequence",
                    "$",
                ))
            }
            None => Vec::new(),
        };

        Ok(Self {
            identifier,
            rendering_options,
            renderables,
            attributes: map,
        })
    }

    /// Translation map found under `i18n.properties`, empty when absent.
    /// An empty list counts as an empty mapping.
    pub fn i18n_properties(&self) -> Result<Map<String, JsonValue>> {
        match self
            .attributes
            .get("i18n")
            .and_then(|i18n| i18n.get("properties"))
        {
            None | Some(JsonValue::Null) => Ok(Map::new()),
            Some(JsonValue::Array(items)) if items.is_empty() => Ok(Map::new()),
            Some(JsonValue::Object(properties)) => Ok(properties.clone()),
            Some(_) => Err(DecoratorError::malformed(
                "`i18n.properties` must be a mapping",
                "$",
            )),
        }
    }

    /// Collects every field in the tree, depth first.
    pub fn fields(&self) -> Vec<&Field> {
        let mut out = Vec::new();
        collect_fields(&self.renderables, &mut out);
        out
    }
}

impl TryFrom<JsonValue> for FormDefinition {
    type Error = DecoratorError;

    fn try_from(value: JsonValue) -> Result<Self> {
        Self::from_value(value)
    }
}

/// A node of the definition tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Renderable {
    /// A page, fieldset or grid row with children.
    Container(Container),
    /// A single input control, or a childless container.
    Field(Field),
}

impl Renderable {
    /// Builds a node from a raw JSON value found at `path`.
    pub fn from_value(value: JsonValue, path: &str) -> Result<Self> {
        let mut map = into_object(value, path)?;

        let type_name = take_string(&mut map, KEY_TYPE, path)?
            .ok_or_else(|| DecoratorError::missing_field(KEY_TYPE, path))?;
        let identifier = take_string(&mut map, KEY_IDENTIFIER, path)?
            .ok_or_else(|| {
                DecoratorError::missing_field(KEY_IDENTIFIER, path)
            })?;

        if let Some(kind) = ContainerKind::from_type_name(&type_name) {
            match map.remove(KEY_RENDERABLES) {
                Some(JsonValue::Array(items)) if !items.is_empty() => {
                    let children = parse_renderables(
                        items,
                        &format!("{}.{}", path, KEY_RENDERABLES),
                    )?;
                    return Ok(Renderable::Container(Container {
                        kind,
                        identifier,
                        renderables: children,
                        attributes: map,
                    }));
                }
                Some(empty @ JsonValue::Array(_)) => {
                    _ = map.insert(KEY_RENDERABLES.to_owned(), empty);
                }
                None | Some(JsonValue::Null) => {}
                Some(_) => {
                    return Err(DecoratorError::malformed(
                        "`renderables` must be a sequence",
                        path,
                    ))
                }
            }
        }

        Field::from_parts(type_name, identifier, map, path)
            .map(Renderable::Field)
    }

    /// The node's identifier.
    pub fn identifier(&self) -> &str {
        match self {
            Renderable::Container(container) => &container.identifier,
            Renderable::Field(field) => &field.identifier,
        }
    }
}

/// A grouping node with at least one child.
#[derive(Debug, Clone, PartialEq)]
pub struct Container {
    /// Which kind of grouping this is.
    pub kind: ContainerKind,
    /// Container identifier.
    pub identifier: String,
    /// Children, never empty.
    pub renderables: Vec<Renderable>,
    /// Remaining keys (`label`, `renderingOptions`, `defaultValue`, ...).
    pub attributes: Map<String, JsonValue>,
}

/// A leaf node.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    /// Field identifier, unique within a form.
    pub identifier: String,
    /// Framework type name, e.g. `Text` or `SingleSelect`.
    pub element_type: String,
    /// Human readable label.
    pub label: Option<String>,
    /// Initial value of the control.
    pub default_value: Option<JsonValue>,
    /// Free-form element properties.
    pub properties: Option<Map<String, JsonValue>>,
    /// Validators attached to the field, in order.
    pub validators: Option<Vec<ValidatorRef>>,
    /// Every other key, passed through to the output unchanged.
    pub attributes: Map<String, JsonValue>,
}

impl Field {
    /// Creates a field with only the required keys set.
    pub fn new<I: Into<String>, T: Into<String>>(
        identifier: I,
        element_type: T,
    ) -> Self {
        Self {
            identifier: identifier.into(),
            element_type: element_type.into(),
            label: None,
            default_value: None,
            properties: None,
            validators: None,
            attributes: Map::new(),
        }
    }

    fn from_parts(
        element_type: String,
        identifier: String,
        mut map: Map<String, JsonValue>,
        path: &str,
    ) -> Result<Self> {
        let label = take_string(&mut map, KEY_LABEL, path)?;
        let default_value = take_present(&mut map, KEY_DEFAULT_VALUE);
        let properties = match take_present(&mut map, KEY_PROPERTIES) {
            Some(JsonValue::Object(properties)) => Some(properties),
            // An empty YAML/PHP list stands in for an empty mapping.
            Some(JsonValue::Array(items)) if items.is_empty() => {
                Some(Map::new())
            }
            Some(_) => {
                return Err(DecoratorError::malformed(
                    "`properties` must be a mapping",
                    path,
                ))
            }
            None => None,
        };
        let validators = match take_present(&mut map, KEY_VALIDATORS) {
            Some(JsonValue::Array(items)) => Some(
                items
                    .into_iter()
                    .enumerate()
                    .map(|(index, item)| {
                        ValidatorRef::from_value(
                            item,
                            &format!("{}.{}[{}]", path, KEY_VALIDATORS, index),
                        )
                    })
                    .collect::<Result<Vec<_>>>()?,
            ),
            Some(_) => {
                return Err(DecoratorError::malformed(
                    "`validators` must be a sequence",
                    path,
                ))
            }
            None => None,
        };

        Ok(Self {
            identifier,
            element_type,
            label,
            default_value,
            properties,
            validators,
            attributes: map,
        })
    }
}

/// A validator reference on a field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatorRef {
    /// Validator identifier, e.g. `NotEmpty`.
    pub identifier: String,
    /// Any other keys of the entry (typically `options`).
    pub attributes: Map<String, JsonValue>,
}

impl ValidatorRef {
    /// Creates a validator reference without options.
    pub fn new<S: Into<String>>(identifier: S) -> Self {
        Self {
            identifier: identifier.into(),
            attributes: Map::new(),
        }
    }

    fn from_value(value: JsonValue, path: &str) -> Result<Self> {
        let mut map = into_object(value, path)?;
        let identifier = take_string(&mut map, KEY_IDENTIFIER, path)?
            .ok_or_else(|| {
                DecoratorError::missing_field(KEY_IDENTIFIER, path)
            })?;
        Ok(Self {
            identifier,
            attributes: map,
        })
    }
}

fn parse_renderables(
    items: Vec<JsonValue>,
    path: &str,
) -> Result<Vec<Renderable>> {
    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            Renderable::from_value(item, &format!("{}[{}]", path, index))
        })
        .collect()
}

fn collect_fields<'a>(nodes: &'a [Renderable], out: &mut Vec<&'a Field>) {
    for node in nodes {
        match node {
            Renderable::Container(container) => {
                collect_fields(&container.renderables, out)
            }
            Renderable::Field(field) => out.push(field),
        }
    }
}

fn into_object(value: JsonValue, path: &str) -> Result<Map<String, JsonValue>> {
    match value {
        JsonValue::Object(map) => Ok(map),
        other => Err(DecoratorError::malformed(
            format!("expected a mapping, found {}", kind_of(&other)),
            path,
        )),
    }
}

/// Removes `key`, treating an explicit `null` as absent.
fn take_present(
    map: &mut Map<String, JsonValue>,
    key: &str,
) -> Option<JsonValue> {
    match map.remove(key) {
        None | Some(JsonValue::Null) => None,
        Some(value) => Some(value),
    }
}

fn take_string(
    map: &mut Map<String, JsonValue>,
    key: &str,
    path: &str,
) -> Result<Option<String>> {
    match take_present(map, key) {
        None => Ok(None),
        Some(JsonValue::String(s)) => Ok(Some(s)),
        // Numeric identifiers and labels show up in hand-written YAML.
        Some(JsonValue::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(DecoratorError::malformed(
            format!("`{}` must be a string, found {}", key, kind_of(&other)),
            path,
        )),
    }
}

fn kind_of(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "a boolean",
        JsonValue::Number(_) => "a number",
        JsonValue::String(_) => "a string",
        JsonValue::Array(_) => "a sequence",
        JsonValue::Object(_) => "a mapping",
    }
}
