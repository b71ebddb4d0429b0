//! Named field validators and the soft errors they produce.
//!
//! # Overview
//!
//! A field annotated with `validate=required|not_empty` runs each named
//! validator, in order, before its value is converted. Validators see the
//! [`Resolution`] of the field: the key that was looked up, whether it was
//! present, the raw environment text and the effective value after the
//! default was applied.
//!
//! A failing validator does not stop the bind. Its message is appended to
//! the context's [`ValidationErrors`] under the field's path and the walk
//! continues. A validator name that is not registered *is* a hard error
//! ([`Error::UnknownValidator`]).
//!
//! # Built-in Validators
//!
//! | Name | Fails when |
//! |------|------------|
//! | `required` | The key is absent from the environment |
//! | `not_empty` | The environment text is empty (defaults are not consulted) |
//!
//! # Example
//!
//! ```rust,ignore
//! use envar::{Bind, BindContext};
//!
//! #[derive(Bind, Default)]
//! struct Config {
//!     #[tag(env = "PORT,validate=required|even")]
//!     port: u16,
//! }
//!
//! let ctx = BindContext::new().with_validator("even", |r| {
//!     match r.value.parse::<u16>() {
//!         Ok(n) if n % 2 == 0 => Ok(()),
//!         _ => Err(format!("{} must be even", r.key)),
//!     }
//! });
//!
//! let mut config = Config::default();
//! let ctx = ctx.bind(&mut config)?;
//! ctx.errors().clone().into_result()?;
//! ```

use std::collections::BTreeMap;
use std::collections::HashMap;
use std::error::Error as StdError;
use std::fmt::{self, Debug, Display, Formatter};
use std::sync::Arc;

use miette::Diagnostic;

use crate::error::Error;

/// Name of the built-in presence validator.
pub const REQUIRED: &str = "required";

/// Name of the built-in non-empty validator.
pub const NOT_EMPTY: &str = "not_empty";

/// What the binder found for one field, handed to each validator.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Resolution<'a> {
    /// Dotted path of the field (`db.host`, `items[1].port`).
    pub field: &'a str,

    /// The environment key that was looked up.
    pub key: &'a str,

    /// Whether the key was present at all.
    pub found: bool,

    /// Raw environment text, `""` when absent.
    pub env_value: &'a str,

    /// Effective value: the environment text, or the default when that is empty.
    pub value: &'a str,
}

/// A validator: `Ok(())` to accept, `Err(message)` to record a failure.
pub type ValidatorFn = Arc<dyn Fn(&Resolution<'_>) -> Result<(), String> + Send + Sync>;

/// Registry of validators by name.
#[derive(Clone, Default)]
pub struct ValidatorMap {
    entries: HashMap<String, ValidatorFn>,
}

impl ValidatorMap {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding `required` and `not_empty`.
    #[must_use]
    pub fn builtin() -> Self {
        let mut map = Self::new();
        map.insert(REQUIRED, required);
        map.insert(NOT_EMPTY, not_empty);
        map
    }

    /// Registers `validator` under `name`, replacing any previous entry.
    pub fn insert<F>(&mut self, name: impl Into<String>, validator: F)
    where
        F: Fn(&Resolution<'_>) -> Result<(), String> + Send + Sync + 'static,
    {
        self.entries.insert(name.into(), Arc::new(validator));
    }

    /// Builder form of [`insert`](Self::insert).
    #[must_use]
    pub fn with<F>(mut self, name: impl Into<String>, validator: F) -> Self
    where
        F: Fn(&Resolution<'_>) -> Result<(), String> + Send + Sync + 'static,
    {
        self.insert(name, validator);
        self
    }

    /// Removes a validator, returning whether it existed.
    pub fn remove(&mut self, name: &str) -> bool {
        self.entries.remove(name).is_some()
    }

    /// Looks up a validator.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ValidatorFn> {
        self.entries.get(name)
    }

    /// Whether `name` is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Number of registered validators.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Debug for ValidatorMap {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.entries.keys().collect();
        names.sort();
        f.debug_set().entries(names).finish()
    }
}

fn required(resolution: &Resolution<'_>) -> Result<(), String> {
    if resolution.found {
        Ok(())
    } else {
        Err(format!("env key: {} not found", resolution.key))
    }
}

fn not_empty(resolution: &Resolution<'_>) -> Result<(), String> {
    if resolution.env_value.is_empty() {
        Err(format!("env key: {} value is empty", resolution.key))
    } else {
        Ok(())
    }
}

// ============================================================================
// Accumulated failures
// ============================================================================

/// A validation failure for one field.
#[derive(Clone, Debug, Diagnostic, Eq, PartialEq)]
#[diagnostic(code(envar::field_validation_error))]
pub struct ValidationFieldError {
    /// Dotted path of the field.
    pub field: String,

    /// Message returned by the validator.
    #[help]
    pub message: String,
}

impl ValidationFieldError {
    /// Create a new validation field error.
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl Display for ValidationFieldError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "field `{}` failed validation: {}",
            self.field, self.message
        )
    }
}

impl StdError for ValidationFieldError {}

/// Validation messages grouped by field path.
///
/// Paths are unique across the whole bound tree, so two nested structs with
/// a field of the same name never share an entry. Iteration is ordered by
/// path.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ValidationErrors {
    fields: BTreeMap<String, Vec<String>>,
}

impl ValidationErrors {
    /// Creates an empty collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `message` to the entry for `field`.
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.fields
            .entry(field.into())
            .or_default()
            .push(message.into());
    }

    /// Messages recorded for `field`, in the order they were added.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.fields.get(field).map(Vec::as_slice)
    }

    /// Whether `field` has any recorded failure.
    #[must_use]
    pub fn has_errors(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    /// Number of fields with at least one failure.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Total number of messages across all fields.
    #[must_use]
    pub fn message_count(&self) -> usize {
        self.fields.values().map(Vec::len).sum()
    }

    /// Whether nothing failed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterates `(field, messages)` pairs ordered by field path.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.fields
            .iter()
            .map(|(field, messages)| (field.as_str(), messages.as_slice()))
    }

    /// One [`ValidationFieldError`] per recorded message.
    #[must_use]
    pub fn to_field_errors(&self) -> Vec<ValidationFieldError> {
        self.iter()
            .flat_map(|(field, messages)| {
                messages
                    .iter()
                    .map(move |message| ValidationFieldError::new(field, message.as_str()))
            })
            .collect()
    }

    /// `Ok(())` when empty, otherwise [`Error::Validation`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] carrying every recorded message.
    pub fn into_result(self) -> Result<(), Error> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(Error::Validation {
                errors: self.to_field_errors(),
            })
        }
    }
}

impl<'a> IntoIterator for &'a ValidationErrors {
    type Item = (&'a String, &'a Vec<String>);
    type IntoIter = std::collections::btree_map::Iter<'a, String, Vec<String>>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.iter()
    }
}
