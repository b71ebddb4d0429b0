//! Bind configuration and per-bind state.

use std::fmt::{self, Debug, Formatter};

use crate::coerce::{BoxError, ParserMap};
use crate::error::Error;
use crate::field::Bind;
use crate::log::{debug, warn};
use crate::source::{EnvMap, EnvSource, Source};
use crate::validation::{Resolution, ValidationErrors, ValidatorMap};
use crate::walker;

/// Tag name read when none is configured.
pub const DEFAULT_TAG_NAME: &str = "env";

/// Separator between prefix and lookup name.
pub const DEFAULT_PREFIX_DELIMITER: &str = "_";

/// Separator for sequence values read from the environment.
pub const DEFAULT_SLICE_DELIMITER: &str = ",";

/// Separator for sequence values taken from a `default=` literal.
///
/// The option list itself is comma separated, so defaults cannot use `,`.
pub const DEFAULT_LITERAL_DELIMITER: &str = "|";

type UnsetHook = Box<dyn FnMut(&str)>;

/// Configuration for a bind, and the results of the last one.
///
/// A context is consumed by [`bind`](Self::bind) and handed back on success,
/// carrying the environment snapshot and the [`ValidationErrors`] of that
/// bind. Reusing a context for another bind reloads the snapshot and starts
/// from an empty error collection.
///
/// ```rust,ignore
/// use envar::{Bind, BindContext, EnvMap};
///
/// #[derive(Bind, Default)]
/// struct Config {
///     #[tag(env = "PORT,default=8080")]
///     port: u16,
/// }
///
/// let mut config = Config::default();
/// let ctx = BindContext::new()
///     .with_prefix("APP")
///     .with_source(EnvMap::new().with("APP_PORT", "9000"))
///     .bind(&mut config)?;
///
/// assert_eq!(config.port, 9000);
/// assert!(ctx.errors().is_empty());
/// ```
pub struct BindContext {
    tag_name: String,
    prefix: String,
    prefix_delimiter: String,
    slice_delimiter: String,
    parsers: ParserMap,
    validators: ValidatorMap,
    source: Box<dyn Source>,
    unset_hook: UnsetHook,
    env: EnvMap,
    errors: ValidationErrors,
}

impl BindContext {
    /// A context with the built-in parsers and validators, reading the
    /// process environment and unsetting keys from it.
    #[must_use]
    pub fn new() -> Self {
        Self {
            tag_name: DEFAULT_TAG_NAME.to_string(),
            prefix: String::new(),
            prefix_delimiter: DEFAULT_PREFIX_DELIMITER.to_string(),
            slice_delimiter: DEFAULT_SLICE_DELIMITER.to_string(),
            parsers: ParserMap::builtin(),
            validators: ValidatorMap::builtin(),
            source: Box::new(EnvSource::new()),
            unset_hook: Box::new(remove_process_var),
            env: EnvMap::new(),
            errors: ValidationErrors::new(),
        }
    }

    /// Reads annotations registered under `tag_name` instead of `env`.
    #[must_use]
    pub fn with_tag_name(mut self, tag_name: impl Into<String>) -> Self {
        self.tag_name = tag_name.into();
        self
    }

    /// Prepends `prefix` and the prefix delimiter to every lookup name.
    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Separator between prefix and name.
    #[must_use]
    pub fn with_prefix_delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.prefix_delimiter = delimiter.into();
        self
    }

    /// Separator for sequence values read from the environment. An empty
    /// delimiter falls back to [`DEFAULT_SLICE_DELIMITER`].
    #[must_use]
    pub fn with_slice_delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.slice_delimiter = delimiter.into();
        self
    }

    /// Replaces the whole parser registry.
    #[must_use]
    pub fn with_parsers(mut self, parsers: ParserMap) -> Self {
        self.parsers = parsers;
        self
    }

    /// Registers one parser for `T`.
    #[must_use]
    pub fn with_parser<T, F, E>(mut self, parser: F) -> Self
    where
        T: 'static,
        F: Fn(&str) -> Result<T, E> + Send + Sync + 'static,
        E: Into<BoxError>,
    {
        self.parsers.insert(parser);
        self
    }

    /// Replaces the whole validator registry.
    #[must_use]
    pub fn with_validators(mut self, validators: ValidatorMap) -> Self {
        self.validators = validators;
        self
    }

    /// Registers one named validator.
    #[must_use]
    pub fn with_validator<F>(mut self, name: impl Into<String>, validator: F) -> Self
    where
        F: Fn(&Resolution<'_>) -> Result<(), String> + Send + Sync + 'static,
    {
        self.validators.insert(name, validator);
        self
    }

    /// Reads the environment from `source` instead of the process.
    #[must_use]
    pub fn with_source(mut self, source: impl Source + 'static) -> Self {
        self.source = Box::new(source);
        self
    }

    /// Replaces the action run for fields annotated with `unset`.
    #[must_use]
    pub fn with_unset_hook(mut self, hook: impl FnMut(&str) + 'static) -> Self {
        self.unset_hook = Box::new(hook);
        self
    }

    /// Binds `target` from a fresh snapshot of the source.
    ///
    /// # Errors
    ///
    /// Any hard [`Error`] aborts the walk. Fields bound before the failure
    /// keep their new values. Validation failures do not error; read them
    /// from [`errors`](Self::errors) on the returned context.
    pub fn bind<T: Bind>(mut self, target: &mut T) -> Result<Self, Error> {
        self.env = self.source.load();
        self.errors = ValidationErrors::new();

        debug!(
            tag = %self.tag_name,
            prefix = %self.prefix,
            vars = self.env.len(),
            "binding environment"
        );

        walker::walk(&mut self, target, "")?;

        debug!(
            invalid_fields = self.errors.len(),
            messages = self.errors.message_count(),
            "bind finished"
        );

        Ok(self)
    }

    /// Tag name annotations are read from.
    #[must_use]
    pub fn tag_name(&self) -> &str {
        &self.tag_name
    }

    /// Key prefix, empty when none.
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Separator between prefix and name.
    #[must_use]
    pub fn prefix_delimiter(&self) -> &str {
        &self.prefix_delimiter
    }

    /// Configured sequence separator, possibly empty.
    #[must_use]
    pub fn slice_delimiter(&self) -> &str {
        &self.slice_delimiter
    }

    /// Parser registry.
    #[must_use]
    pub fn parsers(&self) -> &ParserMap {
        &self.parsers
    }

    /// Validator registry.
    #[must_use]
    pub fn validators(&self) -> &ValidatorMap {
        &self.validators
    }

    /// Snapshot taken by the last bind.
    #[must_use]
    pub fn env(&self) -> &EnvMap {
        &self.env
    }

    /// Validation failures from the last bind.
    #[must_use]
    pub fn errors(&self) -> &ValidationErrors {
        &self.errors
    }

    /// Takes the validation failures, leaving the context empty.
    pub fn take_errors(&mut self) -> ValidationErrors {
        std::mem::take(&mut self.errors)
    }

    /// The environment key for lookup name `name`.
    #[must_use]
    pub fn key_for(&self, name: &str) -> String {
        if self.prefix.is_empty() {
            name.to_string()
        } else {
            format!("{}{}{}", self.prefix, self.prefix_delimiter, name)
        }
    }

    pub(crate) fn effective_slice_delimiter(&self) -> &str {
        if self.slice_delimiter.is_empty() {
            DEFAULT_SLICE_DELIMITER
        } else {
            &self.slice_delimiter
        }
    }

    /// Runs the named validators, recording failures under the field path.
    pub(crate) fn validate(
        &mut self,
        names: &[String],
        resolution: &Resolution<'_>,
    ) -> Result<(), Error> {
        for name in names {
            let validator = self
                .validators
                .get(name)
                .ok_or_else(|| Error::UnknownValidator {
                    field: resolution.field.to_string(),
                    name: name.clone(),
                })?;

            if let Err(message) = validator(resolution) {
                warn!(
                    field = resolution.field,
                    key = resolution.key,
                    validator = %name,
                    "{message}"
                );
                self.errors.add(resolution.field, message);
            }
        }
        Ok(())
    }

    /// Removes `key` from the environment via the unset hook.
    pub(crate) fn unset(&mut self, key: &str) {
        debug!(key, "unsetting environment variable");
        (self.unset_hook)(key);
    }
}

impl Default for BindContext {
    fn default() -> Self {
        Self::new()
    }
}

impl Debug for BindContext {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("BindContext")
            .field("tag_name", &self.tag_name)
            .field("prefix", &self.prefix)
            .field("prefix_delimiter", &self.prefix_delimiter)
            .field("slice_delimiter", &self.slice_delimiter)
            .field("parsers", &self.parsers)
            .field("validators", &self.validators)
            .field("env", &self.env.len())
            .field("errors", &self.errors)
            .finish_non_exhaustive()
    }
}

fn remove_process_var(key: &str) {
    // remove_var panics on these.
    if key.is_empty() || key.contains(['=', '\0']) {
        return;
    }

    // SAFETY: binding runs on one thread; callers must not read or write
    // the process environment concurrently with a bind.
    unsafe { std::env::remove_var(key) }
}
