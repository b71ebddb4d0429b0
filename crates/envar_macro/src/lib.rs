//! # envar_macro
//!
//! Procedural macro implementation for the `envar` crate.
//!
//! This crate provides `#[derive(Bind)]`, which generates the field table
//! and mutable field access the `envar` runtime walks during a bind.
//!
//! **Note:** Users should depend on the `envar` crate, not this one directly.
//! The `envar` crate re-exports this macro along with runtime types.
//!
//! # Module Structure
//!
//! - `parse` - Attribute parsing for `#[tag(...)]`
//! - `field` - Field shape detection and per-field code generation
//! - `expand` - Macro expansion orchestration

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

// Internal modules - not exposed publicly
mod expand;
mod field;
mod parse;

/// Derive macro making a struct bindable from the environment.
///
/// # Field Attributes
///
/// | Attribute | Description |
/// |-----------|-------------|
/// | `<tag> = "NAME,opts"` | Annotation read when the context's tag name is `<tag>` |
/// | `embed` | Bind an unannotated struct field into the parent's namespace |
/// | `skip` | Never touch the field |
///
/// Annotation options (`default=`, `validate=`, `nested`, `unset`) are
/// checked at bind time, not here.
///
/// # Requirements
///
/// - The struct has named fields and no generic parameters.
/// - The struct implements `Default`, so it can be allocated when nested
///   inside an `Option` or `Vec`.
/// - Every bindable field's element type implements `envar::Element`.
///
/// # Example
///
/// ```ignore
/// use envar::Bind;
///
/// #[derive(Bind, Default)]
/// struct Config {
///     #[tag(env = "PORT,default=8080", file = "port")]
///     port: u16,
///
///     #[tag(env = "DB,nested")]
///     db: Option<Database>,
///
///     #[tag(skip)]
///     cache: std::sync::Mutex<Vec<u8>>,
/// }
/// ```
#[proc_macro_derive(Bind, attributes(tag))]
pub fn derive_bind(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    // On error, convert to a compile_error!() invocation
    expand::Expander::expand(&input)
        .unwrap_or_else(|err| err.to_compile_error())
        .into()
}
