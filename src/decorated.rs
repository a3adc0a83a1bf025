//! # Decorated Tree
//!
//! The client-facing shape the decorator produces. Every type here
//! serialises straight to the JSON a headless front-end consumes; raw
//! definition keys (`identifier`, `defaultValue`, `properties`,
//! `validators`) have no slot in these types, so they can never leak into
//! the output.

use crate::core::error::Result;
use crate::definition::ContainerKind;
use serde::Serialize;
use serde_json::{Map, Value as JsonValue};

/// Root of a decorated form.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecoratedForm {
    /// Form identifier.
    pub id: String,
    /// Status payload bound to the decorator, echoed verbatim.
    pub api: JsonValue,
    /// Translation map taken from `i18n.properties`.
    pub i18n: Map<String, JsonValue>,
    /// Rendering options of the definition, passed through.
    #[serde(rename = "renderingOptions")]
    pub rendering_options: JsonValue,
    /// Decorated pages and elements, in definition order.
    pub elements: Vec<DecoratedElement>,
    /// Extra root keys added by a definition hook.
    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

impl DecoratedForm {
    /// Converts the form into a JSON value.
    pub fn to_value(&self) -> Result<JsonValue> {
        Ok(serde_json::to_value(self)?)
    }

    /// Serialises the form to a JSON string.
    pub fn to_json(&self, pretty: bool) -> Result<String> {
        let json = if pretty {
            serde_json::to_string_pretty(self)?
        } else {
            serde_json::to_string(self)?
        };
        Ok(json)
    }

    /// Collects every decorated field, depth first.
    pub fn fields(&self) -> Vec<&DecoratedField> {
        let mut out = Vec::new();
        collect_fields(&self.elements, &mut out);
        out
    }

    /// Finds the decorated field with the given `id`.
    pub fn field(&self, id: &str) -> Option<&DecoratedField> {
        self.fields().into_iter().find(|field| field.id == id)
    }
}

/// A decorated node.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum DecoratedElement {
    /// A page, fieldset or grid row whose children were decorated.
    Container(DecoratedContainer),
    /// A prepared field.
    Field(DecoratedField),
}

/// A container with its `renderables` replaced by `elements`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecoratedContainer {
    /// Container kind, serialised under `type`.
    #[serde(rename = "type")]
    pub kind: ContainerKind,
    /// Container identifier, kept as is.
    pub identifier: String,
    /// Every other key of the container.
    #[serde(flatten)]
    pub attributes: Map<String, JsonValue>,
    /// Decorated children.
    pub elements: Vec<DecoratedElement>,
}

/// A field prepared for the client.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DecoratedField {
    /// Request parameter name, `tx_form_formframework[<form>][<field>]`.
    pub name: String,
    /// Field identifier.
    pub id: String,
    /// Client type tag.
    #[serde(rename = "type")]
    pub field_type: String,
    /// Label if present, identifier otherwise.
    pub validation_name: String,
    /// Initial value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<JsonValue>,
    /// Non-empty label.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Help text from `elementDescription`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub help: Option<JsonValue>,
    /// Placeholder text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<JsonValue>,
    /// Selectable options.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<JsonValue>,
    /// `|`-joined validation keywords.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validation: Option<JsonValue>,
    /// Pass-through keys.
    #[serde(flatten)]
    pub attributes: Map<String, JsonValue>,
}

fn collect_fields<'a>(
    nodes: &'a [DecoratedElement],
    out: &mut Vec<&'a DecoratedField>,
) {
    for node in nodes {
        match node {
            DecoratedElement::Container(container) => {
                collect_fields(&container.elements, out)
            }
            DecoratedElement::Field(field) => out.push(field),
        }
    }
}
