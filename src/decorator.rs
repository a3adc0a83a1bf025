//! # Decorator Engine
//!
//! Turns a [`FormDefinition`] into a [`DecoratedForm`]: containers are
//! walked depth first with their order preserved, every leaf is renamed,
//! its type and validators are mapped through the configured tables and
//! the client-relevant properties are promoted to top-level keys.
//!
//! The engine is a pure function of its input, the two lookup tables and
//! the status payload bound at construction. Specialisations plug in
//! through [`DecoratorHooks`] instead of subclassing.
//!
//! ```
//! use formdecor::{FormDecorator, FormDefinition};
//! use serde_json::json;
//!
//! let definition = FormDefinition::from_value(json!({
//!     "identifier": "contact",
//!     "renderables": [{
//!         "type": "Page",
//!         "identifier": "page-1",
//!         "renderables": [
//!             { "type": "Text", "identifier": "name", "label": "Name" }
//!         ]
//!     }]
//! }))
//! .unwrap();
//!
//! let decorated = FormDecorator::new(json!({ "status": null }))
//!     .decorate(&definition, 0)
//!     .unwrap();
//!
//! let name = decorated.field("name").unwrap();
//! assert_eq!(name.name, "tx_form_formframework[contact][name]");
//! assert_eq!(name.field_type, "text");
//! ```

use crate::core::config::Config;
use crate::core::error::{DecoratorError, Result};
use crate::core::traits::{DecoratorHooks, FieldDraft, IdentityHooks, Processor};
use crate::decorated::{
    DecoratedContainer, DecoratedElement, DecoratedField, DecoratedForm,
};
use crate::definition::{
    Container, ContainerKind, Field, FormDefinition, Renderable, ValidatorRef,
};
use crate::tables::{TypeMap, ValidationMap};
use log::{debug, trace, warn};
use serde_json::{Map, Value as JsonValue};

/// Prefix of every generated request parameter name.
pub const FIELD_NAME_PREFIX: &str = "tx_form_formframework";

/// Element types whose upload target must never reach the client.
const UPLOAD_TYPES: [&str; 2] = ["ImageUpload", "FileUpload"];

/// Keys a decorated field sets itself, or that must never be emitted.
const RESERVED_FIELD_KEYS: [&str; 14] = [
    "identifier",
    "defaultValue",
    "properties",
    "validators",
    "name",
    "id",
    "type",
    "validationName",
    "label",
    "value",
    "help",
    "placeholder",
    "options",
    "validation",
];

/// Container keys dropped once the children were decorated.
const DISCARDED_CONTAINER_KEYS: [&str; 4] =
    ["renderables", "defaultValue", "properties", "elements"];

/// Builds the request parameter name of a field.
pub fn field_name(form_id: &str, identifier: &str) -> String {
    format!("{}[{}][{}]", FIELD_NAME_PREFIX, form_id, identifier)
}

/// The decorator engine.
#[derive(Debug)]
pub struct FormDecorator {
    types: TypeMap,
    validations: ValidationMap,
    status: JsonValue,
    hooks: Box<dyn DecoratorHooks>,
}

impl FormDecorator {
    /// Creates a decorator with the default tables and identity hooks.
    /// `status` is echoed under `api` in every decorated form.
    pub fn new(status: JsonValue) -> Self {
        Self::with_config(&Config::default(), status)
    }

    /// Creates a decorator using the lookup tables of `config`.
    pub fn with_config(config: &Config, status: JsonValue) -> Self {
        Self {
            types: config.types.clone(),
            validations: config.validations.clone(),
            status,
            hooks: Box::new(IdentityHooks),
        }
    }

    /// Replaces the type table.
    pub fn with_types(mut self, types: TypeMap) -> Self {
        self.types = types;
        self
    }

    /// Replaces the validation table.
    pub fn with_validations(mut self, validations: ValidationMap) -> Self {
        self.validations = validations;
        self
    }

    /// Installs override hooks.
    pub fn with_hooks<H: DecoratorHooks + 'static>(mut self, hooks: H) -> Self {
        self.hooks = Box::new(hooks);
        self
    }

    /// The status payload bound to this decorator.
    pub fn status(&self) -> &JsonValue {
        &self.status
    }

    /// The type table in use.
    pub fn types(&self) -> &TypeMap {
        &self.types
    }

    /// The validation table in use.
    pub fn validations(&self) -> &ValidationMap {
        &self.validations
    }

    /// Decorates `definition`. `current_page` is handed to
    /// [`DecoratorHooks::override_definition`] and not otherwise used.
    pub fn decorate(
        &self,
        definition: &FormDefinition,
        current_page: i64,
    ) -> Result<DecoratedForm> {
        let form_id = definition.identifier.as_str();
        debug!(
            "Decorating form '{}' ({} top-level renderables, page {})",
            form_id,
            definition.renderables.len(),
            current_page
        );

        let decorated = DecoratedForm {
            id: form_id.to_owned(),
            api: self.status.clone(),
            i18n: definition.i18n_properties()?,
            rendering_options: definition
                .rendering_options
                .clone()
                .unwrap_or_else(|| JsonValue::Object(Map::new())),
            elements: self.handle_renderables(
                &definition.renderables,
                form_id,
                "renderables",
            )?,
            extra: Map::new(),
        };

        let decorated =
            self.hooks
                .override_definition(decorated, definition, current_page)?;
        debug!("Decorated form '{}'", form_id);
        Ok(decorated)
    }

    /// Parses a raw definition value and decorates it.
    pub fn decorate_value(
        &self,
        definition: JsonValue,
        current_page: i64,
    ) -> Result<DecoratedForm> {
        let definition = FormDefinition::from_value(definition)?;
        self.decorate(&definition, current_page)
    }

    fn handle_renderables(
        &self,
        renderables: &[Renderable],
        form_id: &str,
        path: &str,
    ) -> Result<Vec<DecoratedElement>> {
        renderables
            .iter()
            .enumerate()
            .map(|(index, renderable)| {
                let path = format!("{}[{}]", path, index);
                match renderable {
                    Renderable::Container(container) => self
                        .decorate_container(container, form_id, &path)
                        .map(DecoratedElement::Container),
                    Renderable::Field(field) => self
                        .prepare_field(field, form_id, &path)
                        .map(DecoratedElement::Field),
                }
            })
            .collect()
    }

    fn decorate_container(
        &self,
        container: &Container,
        form_id: &str,
        path: &str,
    ) -> Result<DecoratedContainer> {
        trace!("Descending into {} '{}'", container.kind, container.identifier);

        let mut attributes = container.attributes.clone();
        for key in DISCARDED_CONTAINER_KEYS {
            _ = attributes.remove(key);
        }

        Ok(DecoratedContainer {
            kind: container.kind,
            identifier: container.identifier.clone(),
            attributes,
            elements: self.handle_renderables(
                &container.renderables,
                form_id,
                &format!("{}.renderables", path),
            )?,
        })
    }

    /// Prepares a single leaf for the client.
    pub fn prepare_field(
        &self,
        field: &Field,
        form_id: &str,
        path: &str,
    ) -> Result<DecoratedField> {
        let draft = FieldDraft {
            name: field_name(form_id, &field.identifier),
            field: field.clone(),
        };
        let FieldDraft { mut name, field } = self.hooks.override_element(draft)?;
        let Field {
            identifier,
            element_type,
            mut label,
            mut default_value,
            mut properties,
            mut validators,
            mut attributes,
        } = field;
        trace!("Preparing {} field '{}'", element_type, identifier);

        // Keys a hook placed on the field survive unless a rule below
        // writes the same key.
        if let Some(hook_name) = present(attributes.remove("name").as_ref()) {
            name = hook_string(hook_name, "name", &identifier)?;
        }
        if let Some(hook_label) = present(attributes.remove("label").as_ref()) {
            label = Some(hook_string(hook_label, "label", &identifier)?);
        }
        if let Some(hook_default) = attributes.remove("defaultValue") {
            if !hook_default.is_null() {
                default_value = Some(hook_default);
            }
        }
        let mut value = attributes.remove("value");
        let mut help = attributes.remove("help");
        let mut placeholder = attributes.remove("placeholder");
        let mut options = attributes.remove("options");
        let mut validation = attributes.remove("validation");
        for key in RESERVED_FIELD_KEYS {
            _ = attributes.remove(key);
        }

        let label = label.filter(|label| !label.is_empty());
        let validation_name = label.clone().unwrap_or_else(|| identifier.clone());

        if let Some(default_value) = default_value.filter(|v| !is_empty_string(v)) {
            value = Some(default_value);
        }

        if UPLOAD_TYPES.contains(&element_type.as_str()) {
            if let Some(properties) = properties.as_mut() {
                _ = properties.remove("saveToFileMount");
            }
        }

        let field_type = match self.types.get(&element_type) {
            Some(tag) => tag.to_owned(),
            None => {
                let fallback = self.types.client_type(&element_type);
                if !is_container_type(&element_type) {
                    warn!(
                        "Unknown element type '{}' on '{}', using '{}'",
                        element_type, identifier, fallback
                    );
                }
                fallback.to_owned()
            }
        };

        if let Some(properties) = properties {
            if let Some(found) = present(properties.get("options")) {
                options = Some(found.clone());
            }

            if let Some(description) = present(properties.get("elementDescription")) {
                if !is_empty_string(description) {
                    help = Some(description.clone());
                }
            }

            let fluid_placeholder = properties
                .get("fluidAdditionalAttributes")
                .and_then(|attributes| attributes.get("placeholder"));
            if let Some(found) = present(fluid_placeholder)
                .or_else(|| present(properties.get("prependOptionLabel")))
            {
                placeholder = Some(found.clone());
            }

            if let Some(mime_types) = present(properties.get("allowedMimeTypes")) {
                validators
                    .get_or_insert_with(Vec::new)
                    .push(mime_validator(mime_types, path)?);
            }
        }

        if let Some(validators) = validators {
            validation = Some(JsonValue::String(
                self.validations
                    .join(validators.iter().map(|v| v.identifier.as_str())),
            ));
        }

        Ok(DecoratedField {
            name,
            id: identifier,
            field_type,
            validation_name,
            value,
            label,
            help,
            placeholder,
            options,
            validation,
            attributes,
        })
    }
}

impl Processor for FormDecorator {
    type Input = FormDefinition;
    type Output = DecoratedForm;
    type Context = i64;

    /// Decorates `input`, treating a missing context as page 0.
    fn process(
        &self,
        input: Self::Input,
        context: Option<&Self::Context>,
    ) -> Result<Self::Output> {
        self.decorate(&input, context.copied().unwrap_or(0))
    }
}

/// Builds the `mime:<type>,<type>` validator for `allowedMimeTypes`.
fn mime_validator(mime_types: &JsonValue, path: &str) -> Result<ValidatorRef> {
    let malformed = || {
        DecoratorError::malformed(
            "`properties.allowedMimeTypes` must be a sequence of strings",
            path,
        )
    };
    let list = mime_types
        .as_array()
        .ok_or_else(malformed)?
        .iter()
        .map(|mime| mime.as_str().ok_or_else(malformed))
        .collect::<Result<Vec<_>>>()?;
    Ok(ValidatorRef::new(format!("mime:{}", list.join(","))))
}

/// Reads a string-valued key a hook placed among the field attributes.
fn hook_string(value: &JsonValue, key: &str, identifier: &str) -> Result<String> {
    match value {
        JsonValue::String(s) => Ok(s.clone()),
        JsonValue::Number(n) => Ok(n.to_string()),
        _ => Err(DecoratorError::hook_error(format!(
            "hook set a non-string `{}` on field '{}'",
            key, identifier
        ))),
    }
}

fn present(value: Option<&JsonValue>) -> Option<&JsonValue> {
    value.filter(|v| !v.is_null())
}

fn is_empty_string(value: &JsonValue) -> bool {
    value.as_str().map_or(false, str::is_empty)
}

fn is_container_type(type_name: &str) -> bool {
    ContainerKind::from_type_name(type_name).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn decorate(definition: JsonValue) -> DecoratedForm {
        FormDecorator::new(json!({}))
            .decorate_value(definition, 0)
            .unwrap()
    }

    fn single_field(field: JsonValue) -> JsonValue {
        let form = decorate(json!({
            "identifier": "contact",
            "renderables": [field]
        }));
        form.to_value().unwrap()["elements"][0].clone()
    }

    #[test]
    fn test_field_name_template() {
        assert_eq!(
            field_name("contact-12", "text-1"),
            "tx_form_formframework[contact-12][text-1]"
        );
    }

    #[test]
    fn test_root_keys_always_present() {
        let value = decorate(json!({ "identifier": "contact" }))
            .to_value()
            .unwrap();
        assert_eq!(
            value,
            json!({
                "id": "contact",
                "api": {},
                "i18n": {},
                "renderingOptions": {},
                "elements": []
            })
        );
    }

    #[test]
    fn test_status_payload_echoed() {
        let status = json!({ "status": "success", "errors": [] });
        let form = FormDecorator::new(status.clone())
            .decorate_value(json!({ "identifier": "contact" }), 0)
            .unwrap();
        assert_eq!(form.api, status);
    }

    #[test]
    fn test_basic_field_preparation() {
        let field = single_field(json!({
            "type": "Text",
            "identifier": "name",
            "label": "Your name",
            "defaultValue": "Jane",
            "validators": [{ "identifier": "NotEmpty" }]
        }));
        assert_eq!(
            field,
            json!({
                "name": "tx_form_formframework[contact][name]",
                "id": "name",
                "type": "text",
                "validationName": "Your name",
                "value": "Jane",
                "label": "Your name",
                "validation": "required"
            })
        );
    }

    #[test]
    fn test_empty_label_removed() {
        let field = single_field(json!({
            "type": "Text",
            "identifier": "name",
            "label": ""
        }));
        assert!(field.get("label").is_none());
        assert_eq!(field["validationName"], json!("name"));
    }

    #[test]
    fn test_empty_default_value_dropped() {
        let field = single_field(json!({
            "type": "Text",
            "identifier": "name",
            "defaultValue": ""
        }));
        assert!(field.get("value").is_none());
        assert!(field.get("defaultValue").is_none());
    }

    #[test]
    fn test_non_string_default_value_kept() {
        let field = single_field(json!({
            "type": "MultiCheckbox",
            "identifier": "topics",
            "defaultValue": ["a", "b"]
        }));
        assert_eq!(field["value"], json!(["a", "b"]));
        assert_eq!(field["type"], json!("checkbox"));
    }

    #[test]
    fn test_unknown_type_is_hidden() {
        let field = single_field(json!({
            "type": "Honeypot",
            "identifier": "hp"
        }));
        assert_eq!(field["type"], json!("hidden"));
    }

    #[test]
    fn test_properties_promoted() {
        let field = single_field(json!({
            "type": "SingleSelect",
            "identifier": "country",
            "properties": {
                "options": { "de": "Germany", "fr": "France" },
                "elementDescription": "Where you live",
                "prependOptionLabel": "Please choose",
                "containerClassAttribute": "input"
            }
        }));
        assert_eq!(field["type"], json!("select"));
        assert_eq!(field["options"], json!({ "de": "Germany", "fr": "France" }));
        assert_eq!(field["help"], json!("Where you live"));
        assert_eq!(field["placeholder"], json!("Please choose"));
        assert!(field.get("properties").is_none());
        assert!(field.get("containerClassAttribute").is_none());
    }

    #[test]
    fn test_fluid_placeholder_wins() {
        let field = single_field(json!({
            "type": "Text",
            "identifier": "name",
            "properties": {
                "fluidAdditionalAttributes": { "placeholder": "Jane Doe" },
                "prependOptionLabel": "ignored"
            }
        }));
        assert_eq!(field["placeholder"], json!("Jane Doe"));
    }

    #[test]
    fn test_empty_description_not_promoted() {
        let field = single_field(json!({
            "type": "Textarea",
            "identifier": "message",
            "properties": { "elementDescription": "" }
        }));
        assert!(field.get("help").is_none());
        assert_eq!(field["type"], json!("textarea"));
    }

    #[test]
    fn test_mime_types_become_validator() {
        let field = single_field(json!({
            "type": "FileUpload",
            "identifier": "up1",
            "properties": {
                "allowedMimeTypes": ["image/png", "image/jpeg"],
                "saveToFileMount": "1:/user_upload/"
            },
            "validators": [{ "identifier": "NotEmpty" }]
        }));
        assert_eq!(field["type"], json!("file"));
        assert_eq!(
            field["validation"],
            json!("required|mime:image/png,image/jpeg")
        );
        assert!(!field.to_string().contains("saveToFileMount"));
    }

    #[test]
    fn test_mime_types_must_be_strings() {
        let err = FormDecorator::new(json!({}))
            .decorate_value(
                json!({
                    "identifier": "contact",
                    "renderables": [{
                        "type": "FileUpload",
                        "identifier": "up1",
                        "properties": { "allowedMimeTypes": "image/png" }
                    }]
                }),
                0,
            )
            .unwrap_err();
        match err {
            DecoratorError::MalformedDefinition { path, .. } => {
                assert_eq!(path, "renderables[0]")
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_unknown_validator_passes_through() {
        let field = single_field(json!({
            "type": "Text",
            "identifier": "zip",
            "validators": [
                { "identifier": "StringLength", "options": { "minimum": 5 } },
                { "identifier": "Number" }
            ]
        }));
        assert_eq!(field["validation"], json!("StringLength|number"));
        assert!(field.get("validators").is_none());
    }

    #[test]
    fn test_empty_validator_list_yields_empty_validation() {
        let field = single_field(json!({
            "type": "Text",
            "identifier": "name",
            "validators": []
        }));
        assert_eq!(field["validation"], json!(""));
    }

    #[test]
    fn test_container_strips_raw_keys() {
        let form = decorate(json!({
            "identifier": "contact",
            "renderables": [{
                "type": "Page",
                "identifier": "page-1",
                "label": "Step 1",
                "defaultValue": "x",
                "properties": { "foo": "bar" },
                "renderables": [{ "type": "Text", "identifier": "name" }]
            }]
        }));
        let page = &form.to_value().unwrap()["elements"][0];
        assert_eq!(page["type"], json!("Page"));
        assert_eq!(page["identifier"], json!("page-1"));
        assert_eq!(page["label"], json!("Step 1"));
        assert!(page.get("renderables").is_none());
        assert!(page.get("defaultValue").is_none());
        assert!(page.get("properties").is_none());
        assert_eq!(page["elements"][0]["id"], json!("name"));
    }

    #[test]
    fn test_empty_container_falls_through_to_field() {
        let field = single_field(json!({
            "type": "Fieldset",
            "identifier": "f1",
            "renderables": []
        }));
        assert_eq!(field["id"], json!("f1"));
        assert_eq!(field["type"], json!("hidden"));
        assert_eq!(field["name"], json!("tx_form_formframework[contact][f1]"));
        assert!(field.get("elements").is_none());
    }

    #[test]
    fn test_custom_tables() {
        let form = FormDecorator::new(json!({}))
            .with_types(TypeMap::default().with("ImageUpload", "file"))
            .with_validations(ValidationMap::empty())
            .decorate_value(
                json!({
                    "identifier": "contact",
                    "renderables": [{
                        "type": "ImageUpload",
                        "identifier": "photo",
                        "validators": [{ "identifier": "NotEmpty" }]
                    }]
                }),
                0,
            )
            .unwrap();
        let photo = form.field("photo").unwrap();
        assert_eq!(photo.field_type, "file");
        assert_eq!(photo.validation, Some(json!("NotEmpty")));
    }

    #[test]
    fn test_empty_i18n_list_becomes_empty_map() {
        let value = decorate(json!({
            "identifier": "contact",
            "i18n": { "properties": [] }
        }))
        .to_value()
        .unwrap();
        assert_eq!(value["i18n"], json!({}));
    }

    #[derive(Debug)]
    struct InjectKeys;

    impl DecoratorHooks for InjectKeys {
        fn override_element(&self, mut draft: FieldDraft) -> Result<FieldDraft> {
            let attributes = &mut draft.field.attributes;
            _ = attributes.insert("label".to_string(), json!("Injected"));
            _ = attributes.insert("defaultValue".to_string(), json!("preset"));
            if draft.field.identifier == "renamed" {
                _ = attributes.insert("name".to_string(), json!("custom[renamed]"));
            }
            Ok(draft)
        }
    }

    #[test]
    fn test_hook_set_label_default_and_name_survive() {
        let form = FormDecorator::new(json!({}))
            .with_hooks(InjectKeys)
            .decorate_value(
                json!({
                    "identifier": "c",
                    "renderables": [
                        { "type": "Text", "identifier": "x" },
                        { "type": "Text", "identifier": "renamed", "label": "Old" }
                    ]
                }),
                0,
            )
            .unwrap();

        let x = form.field("x").unwrap();
        assert_eq!(x.label.as_deref(), Some("Injected"));
        assert_eq!(x.validation_name, "Injected");
        assert_eq!(x.value, Some(json!("preset")));
        assert_eq!(x.name, "tx_form_formframework[c][x]");
        assert!(!x.attributes.contains_key("label"));
        assert!(!x.attributes.contains_key("defaultValue"));

        let renamed = form.field("renamed").unwrap();
        assert_eq!(renamed.name, "custom[renamed]");
        assert_eq!(renamed.label.as_deref(), Some("Injected"));
    }

    #[derive(Debug)]
    struct ObjectLabel;

    impl DecoratorHooks for ObjectLabel {
        fn override_element(&self, mut draft: FieldDraft) -> Result<FieldDraft> {
            _ = draft
                .field
                .attributes
                .insert("label".to_string(), json!({ "en": "Name" }));
            Ok(draft)
        }
    }

    #[test]
    fn test_hook_set_non_string_label_rejected() {
        let err = FormDecorator::new(json!({}))
            .with_hooks(ObjectLabel)
            .decorate_value(
                json!({
                    "identifier": "c",
                    "renderables": [{ "type": "Text", "identifier": "x" }]
                }),
                0,
            )
            .unwrap_err();
        assert!(matches!(err, DecoratorError::HookError(_)));
    }

    #[test]
    fn test_processor_defaults_to_page_zero() {
        #[derive(Debug)]
        struct RecordPage;

        impl DecoratorHooks for RecordPage {
            fn override_definition(
                &self,
                mut decorated: DecoratedForm,
                _definition: &FormDefinition,
                current_page: i64,
            ) -> Result<DecoratedForm> {
                _ = decorated
                    .extra
                    .insert("currentPage".to_string(), json!(current_page));
                Ok(decorated)
            }
        }

        let decorator = FormDecorator::new(json!({})).with_hooks(RecordPage);
        let definition =
            FormDefinition::from_value(json!({ "identifier": "contact" })).unwrap();

        let form = decorator.process(definition.clone(), None).unwrap();
        assert_eq!(form.extra["currentPage"], json!(0));

        let form = decorator.process(definition, Some(&4)).unwrap();
        assert_eq!(form.extra["currentPage"], json!(4));
    }
}
