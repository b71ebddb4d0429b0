//! Error types for binding.
//!
//! This module contains the [`Error`] enum returned by every bind entry
//! point. All variants are *hard* errors: they abort the walk immediately
//! and no context is returned. Validation failures are *soft* and are
//! collected in [`ValidationErrors`](crate::ValidationErrors) instead; use
//! [`ValidationErrors::into_result`](crate::ValidationErrors::into_result)
//! to promote them into [`Error::Validation`].
//!
//! # Error Variants
//!
//! | Variant | When It Occurs |
//! |---------|----------------|
//! | [`Error::UnknownOption`] | Annotation carries an unrecognized option key |
//! | [`Error::NestedNotStruct`] | `nested` applied to a non-struct field |
//! | [`Error::NoParser`] | No registered parser for the field's element type |
//! | [`Error::Parse`] | A value failed to convert |
//! | [`Error::UnknownValidator`] | `validate=` names a validator that is not registered |
//! | [`Error::Validation`] | Accumulated validation failures, promoted by the caller |
//!
//! Every variant integrates with [`miette`] for rich terminal output:
//!
//! ```rust,ignore
//! if let Err(e) = envar::bind(&mut config) {
//!     eprintln!("{:?}", miette::Report::from(e));
//! }
//! ```

use miette::Diagnostic;
use thiserror::Error as ThisError;

use crate::coerce::BoxError;
use crate::validation::ValidationFieldError;

/// Errors that abort a bind.
#[derive(Debug, ThisError, Diagnostic)]
pub enum Error {
    /// An annotation carried an option key the tag parser does not know.
    #[error("unrecognized field option key: {key}")]
    #[diagnostic(
        code(envar::unknown_option),
        help("valid options are nested, unset, validate=..., default=...")
    )]
    UnknownOption {
        /// Path of the field carrying the annotation.
        field: String,
        /// The offending option key.
        key: String,
    },

    /// A field tagged `nested` is not a struct (or sequence of structs).
    #[error("field: {type_name} is not a struct but has nested tag option")]
    #[diagnostic(
        code(envar::nested_not_struct),
        help("derive `Bind` for the field type or drop the nested option")
    )]
    NestedNotStruct {
        /// Path of the offending field.
        field: String,
        /// Type of the offending field.
        type_name: String,
    },

    /// No parser is registered for the field's element type.
    #[error("no parser found for field \"{field}\" of type \"{type_name}\"")]
    #[diagnostic(
        code(envar::no_parser),
        help("register one with `BindContext::with_parser` or implement `TextDecode`")
    )]
    NoParser {
        /// Path of the field.
        field: String,
        /// Declared type of the field.
        type_name: String,
    },

    /// The effective value of a field failed to convert.
    #[error("parse error on field \"{field}\" of type \"{type_name}\": {source}")]
    #[diagnostic(code(envar::parse_error))]
    Parse {
        /// Path of the field.
        field: String,
        /// Declared type of the field.
        type_name: String,
        /// The raw text that failed to convert.
        value: String,
        /// Underlying conversion error.
        #[source]
        source: BoxError,
    },

    /// `validate=` named a validator that is not registered.
    #[error("validator func: {name} not found")]
    #[diagnostic(
        code(envar::unknown_validator),
        help("register it with `BindContext::with_validator`")
    )]
    UnknownValidator {
        /// Path of the field declaring the validator.
        field: String,
        /// The missing validator name.
        name: String,
    },

    /// Validation failures promoted to a hard error.
    #[error("{} validation error(s) occurred", .errors.len())]
    #[diagnostic(
        code(envar::validation_error),
        help("fix the validation errors listed above")
    )]
    Validation {
        /// One entry per failed check.
        #[related]
        errors: Vec<ValidationFieldError>,
    },
}

impl Error {
    /// Creates a parse error for `field`.
    pub fn parse(
        field: impl Into<String>,
        type_name: impl Into<String>,
        value: impl Into<String>,
        source: BoxError,
    ) -> Self {
        Error::Parse {
            field: field.into(),
            type_name: type_name.into(),
            value: value.into(),
            source,
        }
    }

    /// Path of the field the error refers to, if it refers to one.
    #[must_use]
    pub fn field(&self) -> Option<&str> {
        match self {
            Error::UnknownOption { field, .. }
            | Error::NestedNotStruct { field, .. }
            | Error::NoParser { field, .. }
            | Error::Parse { field, .. }
            | Error::UnknownValidator { field, .. } => Some(field),
            Error::Validation { .. } => None,
        }
    }
}
