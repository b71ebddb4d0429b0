//! Annotation parsing for `#[tag(env = "NAME,opt,opt=value")]`.
//!
//! The derive macro stores each field's annotation strings verbatim; they
//! are parsed here at bind time, against the tag name the
//! [`BindContext`](crate::BindContext) was configured with.
//!
//! # Syntax
//!
//! ```text
//! name[,opt[,opt...]]
//!
//! opt := nested
//!      | unset[=true|t|1]
//!      | validate=v1|v2|...
//!      | default=literal
//! ```
//!
//! The first segment is the lookup name and is kept even when empty:
//! `",nested"` marks a container whose own fields carry the names.

use thiserror::Error as ThisError;

/// Separates the lookup name and the options.
pub const OPTION_DELIMITER: char = ',';

/// Separates validator names inside `validate=`.
pub const VALIDATOR_DELIMITER: char = '|';

/// Values of `unset=` that enable it.
const TRUTHY: [&str; 3] = ["true", "t", "1"];

/// An annotation could not be parsed.
#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum TagError {
    /// An option key outside the recognized set.
    #[error("unrecognized field option key: {0}")]
    UnknownKey(String),
}

/// Options parsed from one field annotation.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct TagOptions {
    /// Lookup name (may be empty).
    pub name: String,

    /// Recurse into the field instead of converting it.
    pub nested: bool,

    /// Remove the resolved key from the environment after binding.
    pub unset: bool,

    /// Validator names, in declaration order.
    pub validate: Vec<String>,

    /// Fallback literal used when the key is absent or empty.
    pub default: Option<String>,
}

impl TagOptions {
    /// Parses an annotation string.
    ///
    /// # Errors
    ///
    /// Returns [`TagError::UnknownKey`] for any option other than `nested`,
    /// `unset`, `validate` and `default`. A stray comma yields an empty key
    /// and is rejected the same way.
    pub fn parse(annotation: &str) -> Result<Self, TagError> {
        let mut segments = annotation.split(OPTION_DELIMITER);

        let mut options = Self {
            name: segments.next().unwrap_or_default().to_string(),
            ..Self::default()
        };

        for segment in segments {
            let (key, value) = match segment.split_once('=') {
                Some((key, value)) => (key, Some(value)),
                None => (segment, None),
            };

            match key {
                "nested" => options.nested = true,

                "unset" => options.unset = value.is_none_or(|v| TRUTHY.contains(&v)),

                "validate" => {
                    options.validate = value
                        .unwrap_or_default()
                        .split(VALIDATOR_DELIMITER)
                        .filter(|name| !name.is_empty())
                        .map(str::to_string)
                        .collect();
                }

                "default" => options.default = Some(value.unwrap_or_default().to_string()),

                other => return Err(TagError::UnknownKey(other.to_string())),
            }
        }

        Ok(options)
    }

    /// The default literal, or `""` when none was declared.
    #[must_use]
    pub fn default_value(&self) -> &str {
        self.default.as_deref().unwrap_or_default()
    }
}
