// Copyright © 2024 FormDecor. All rights reserved.
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! # FormDecor Library
//!
//! FormDecor reshapes the nested form definitions produced by a CMS form
//! framework (pages holding fieldsets and grid rows holding fields) into
//! the flat, client-consumable JSON a decoupled front-end renders from.
//!
//! The library is organised around a single engine, [`FormDecorator`],
//! fed with a typed [`FormDefinition`] and producing a [`DecoratedForm`].
//! Lookup tables come from [`crate::core::config::Config`]; per-field and
//! per-form customisation plugs in through
//! [`crate::core::traits::DecoratorHooks`].

#![doc = include_str!("../README.md")]
#![crate_name = "formdecor"]
#![crate_type = "lib"]

/// Configuration, error handling and extension traits.
pub mod core;

/// Provides command-line interface utilities.
pub mod cli;

/// Client-facing output model.
pub mod decorated;

/// The decorator engine.
pub mod decorator;

/// Typed input model.
pub mod definition;

/// Definition and status loading.
pub mod loader;

/// Type and validation lookup tables.
pub mod tables;

pub use crate::core::error::{DecoratorError, Result};
pub use crate::core::traits::{DecoratorHooks, FieldDraft, IdentityHooks};
pub use crate::decorated::{
    DecoratedContainer, DecoratedElement, DecoratedField, DecoratedForm,
};
pub use crate::decorator::FormDecorator;
pub use crate::definition::{
    Container, ContainerKind, Field, FormDefinition, Renderable, ValidatorRef,
};
