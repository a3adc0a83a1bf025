//! # Core Traits Module
//!
//! This module defines the extension seams of the decorator.
//!
//! ## Key Traits
//!
//! - [`Processor`]: Generic one-shot transformation of an input into an
//!   output under an optional context. The decorator engine implements it
//!   with the current page as context.
//! - [`DecoratorHooks`]: Strategy object injected into the engine to rewrite
//!   single fields before the generic rules run, or the whole decorated form
//!   once traversal has finished. Both methods default to the identity, so
//!   an implementation only overrides what it needs.

use crate::core::error::Result;
use crate::decorated::DecoratedForm;
use crate::definition::{Field, FormDefinition};

/// Core trait for implementing processors.
///
/// # Type Parameters
///
/// * `Input`: The value being processed
/// * `Output`: The value produced
/// * `Context`: Additional context for processing
pub trait Processor: Send + Sync + std::fmt::Debug {
    /// The type of input for the processor.
    type Input;
    /// The type of output produced by the processor.
    type Output;
    /// The type of context used by the processor.
    type Context;

    /// Processes the input using optional context information.
    fn process(
        &self,
        input: Self::Input,
        context: Option<&Self::Context>,
    ) -> Result<Self::Output>;
}

/// A field on its way through preparation, as seen by
/// [`DecoratorHooks::override_element`].
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDraft {
    /// Request parameter name computed for the field.
    pub name: String,
    /// The field as it will enter the generic rules.
    pub field: Field,
}

/// Override points of the decorator.
///
/// # Example
///
/// ```
/// use formdecor::core::error::Result;
/// use formdecor::core::traits::{DecoratorHooks, FieldDraft};
/// use serde_json::json;
///
/// #[derive(Debug)]
/// struct Autocomplete;
///
/// impl DecoratorHooks for Autocomplete {
///     fn override_element(&self, mut draft: FieldDraft) -> Result<FieldDraft> {
///         if draft.field.element_type == "Email" {
///             _ = draft
///                 .field
///                 .attributes
///                 .insert("autocomplete".to_string(), json!("email"));
///         }
///         Ok(draft)
///     }
/// }
/// ```
pub trait DecoratorHooks: Send + Sync + std::fmt::Debug {
    /// Rewrites a single field right after its name was assigned and before
    /// any other rule runs.
    fn override_element(&self, draft: FieldDraft) -> Result<FieldDraft> {
        Ok(draft)
    }

    /// Post-processes the fully decorated form. The second argument is the
    /// untouched input definition and the third the page index the caller
    /// passed to `decorate`.
    fn override_definition(
        &self,
        decorated: DecoratedForm,
        _definition: &FormDefinition,
        _current_page: i64,
    ) -> Result<DecoratedForm> {
        Ok(decorated)
    }
}

/// Hooks that leave every field and form unchanged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IdentityHooks;

impl DecoratorHooks for IdentityHooks {}
