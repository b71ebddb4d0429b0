//! # envar
//!
//! Bind environment variables into plain Rust structs, field by field,
//! through string annotations.
//!
//! Each field carries an annotation under a tag name (`env` by default)
//! that names the variable to read and a few options. The bind walks the
//! struct depth first, recursing into nested structs, and converts every
//! value through a registry of typed parsers that callers can extend.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use envar::Bind;
//!
//! #[derive(Bind, Default)]
//! struct Config {
//!     #[tag(env = "DATABASE_URL,validate=required")]
//!     db_url: Option<url::Url>,
//!
//!     #[tag(env = "PORT,default=8080")]
//!     port: u16,
//!
//!     #[tag(env = "PEERS,default=a|b")]
//!     peers: Vec<String>,
//!
//!     #[tag(env = ",nested")]
//!     cache: CacheConfig,
//! }
//!
//! #[derive(Bind, Default)]
//! struct CacheConfig {
//!     #[tag(env = "CACHE_TTL,default=5m")]
//!     ttl: std::time::Duration,
//! }
//!
//! fn main() -> envar::Result<()> {
//!     let mut config = Config::default();
//!     let ctx = envar::bind(&mut config)?;
//!     ctx.errors().clone().into_result()?;
//!     println!("listening on {}", config.port);
//!     Ok(())
//! }
//! ```
//!
//! ## Annotation Syntax
//!
//! ```text
//! #[tag(env = "NAME[,option]...")]
//! ```
//!
//! | Option | Description |
//! |--------|-------------|
//! | `default=literal` | Used when the variable is absent or empty. Sequence defaults split on `\|` |
//! | `validate=a\|b` | Named validators run before conversion |
//! | `nested` | Recurse into a struct, `Option`/`Box` of struct, or `Vec` of structs |
//! | `unset[=true]` | Remove the variable after a successful bind |
//!
//! Field markers outside the annotation:
//!
//! | Marker | Description |
//! |--------|-------------|
//! | `#[tag(embed)]` | Bind an unannotated struct field as if it were `",nested"` |
//! | `#[tag(skip)]` | Never touch the field |
//!
//! Any number of tag names can be declared on one field; the context
//! decides which one is read ([`BindContext::with_tag_name`]).
//!
//! ## Supported Field Types
//!
//! Every type implementing [`Element`] can appear as `T`, `Box<T>`,
//! `Option<T>`, `Option<Box<T>>`, `Vec<T>` or `Vec<Box<T>>`. The built-in
//! elements are listed in [`coerce`].
//!
//! ## Errors
//!
//! Structural problems (unknown options, missing parsers, unparseable values,
//! unknown validators) abort the bind with an [`Error`]. Validation failures
//! are collected per field path in [`ValidationErrors`] and returned on the
//! context; [`ValidationErrors::into_result`] promotes them to an error.
//!
//! ## Logging
//!
//! With the `tracing` feature the bind emits `tracing` events: `debug` for
//! bound fields, `warn` for validation failures and unreadable sources,
//! `trace` for skipped fields. Without it no events are emitted.
//!
//! ## Feature Flags
//!
//! | Feature | Description | Default |
//! |---------|-------------|---------|
//! | `dotenv` | [`DotenvSource`] layering a `.env` file under the process environment | **Yes** |
//! | `tracing` | Emit `tracing` events during a bind | **Yes** |
//! | `secrecy` | [`SecretString`] as a bindable scalar | No |
//! | `full` | Enable all features | No |

#![deny(missing_docs)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

// Re-export the derive macro
pub use envar_macro::Bind;

// ============================================================================
// Re-exported Dependencies
// ============================================================================

/// Re-export miette for error handling.
pub use miette;

/// Re-export url, whose `Url` is a built-in element.
pub use url;

/// Re-export secrecy when the feature is enabled.
#[cfg(feature = "secrecy")]
pub use secrecy;

#[cfg(feature = "secrecy")]
pub use secrecy::{ExposeSecret, SecretString};

/// Re-export dotenvy when the dotenv feature is enabled.
#[cfg(feature = "dotenv")]
pub use dotenvy;

// ============================================================================
// Core Modules
// ============================================================================

mod log;

mod error;
pub use error::Error;

/// A Result type that displays errors with miette's fancy formatting.
///
/// ```rust,ignore
/// fn main() -> envar::Result<()> {
///     let mut config = Config::default();
///     envar::bind(&mut config)?;
///     Ok(())
/// }
/// ```
pub type Result<T> = miette::Result<T>;

pub mod coerce;
pub use coerce::{
    BoxError, Element, ElementKind, ParserFn, ParserMap, RELATIVE_URL_BASE, TextDecode, TypeKey,
    is_relative_url,
};

mod field;
#[doc(hidden)]
pub use field::project;
pub use field::{Bind, FieldDescriptor, FieldSlot};

pub mod source;
#[cfg(feature = "dotenv")]
pub use source::DotenvSource;
pub use source::{EnvMap, EnvSource, Source};

pub mod tag;
pub use tag::TagOptions;

mod validation;
pub use validation::{
    NOT_EMPTY, REQUIRED, Resolution, ValidationErrors, ValidationFieldError, ValidatorFn,
    ValidatorMap,
};

mod context;
pub use context::{
    BindContext, DEFAULT_LITERAL_DELIMITER, DEFAULT_PREFIX_DELIMITER, DEFAULT_SLICE_DELIMITER,
    DEFAULT_TAG_NAME,
};

mod binder;
mod walker;

/// Binds `target` from the process environment with default settings.
///
/// Equivalent to `BindContext::new().bind(target)`.
///
/// # Errors
///
/// See [`BindContext::bind`].
pub fn bind<T: Bind>(target: &mut T) -> std::result::Result<BindContext, Error> {
    BindContext::new().bind(target)
}
