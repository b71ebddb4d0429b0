//! Field shape detection and per-field code generation.
//!
//! The runtime handles six container shapes around an element type. The
//! shape is chosen here, syntactically, from the last path segment of the
//! declared type, so `std::option::Option<T>` and `Option<T>` are treated
//! alike. Anything that is not one of the wrappers below is a plain value.
//!
//! | Declared type | Shape | Slot constructor |
//! |---------------|-------|------------------|
//! | `Option<Box<T>>` | [`Shape::OptionalBoxed`] | `optional_boxed` |
//! | `Option<T>` | [`Shape::Optional`] | `optional` |
//! | `Vec<Box<T>>` | [`Shape::BoxedSequence`] | `boxed_sequence` |
//! | `Vec<T>` | [`Shape::Sequence`] | `sequence` |
//! | `Box<T>` | [`Shape::Boxed`] | `value`, dereferenced |
//! | `T` | [`Shape::Value`] | `value` |

use proc_macro2::TokenStream as QuoteStream;
use quote::quote;
use syn::ext::IdentExt;
use syn::{Field, GenericArgument, Ident, PathArguments, Type};

use crate::parse::TagAttr;

/// Container shape of a field.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Shape {
    Value,
    Boxed,
    Optional,
    OptionalBoxed,
    Sequence,
    BoxedSequence,
}

impl Shape {
    /// Detects the shape of `ty`.
    pub fn of(ty: &Type) -> Self {
        if let Some(inner) = extract_generic_inner(ty, "Option") {
            return if extract_generic_inner(inner, "Box").is_some() {
                Self::OptionalBoxed
            } else {
                Self::Optional
            };
        }

        if let Some(inner) = extract_generic_inner(ty, "Vec") {
            return if extract_generic_inner(inner, "Box").is_some() {
                Self::BoxedSequence
            } else {
                Self::Sequence
            };
        }

        if extract_generic_inner(ty, "Box").is_some() {
            return Self::Boxed;
        }

        Self::Value
    }
}

/// Returns `T` when `ty` is `<wrapper><T>`.
///
/// Only the last path segment is compared, which also accepts fully
/// qualified paths like `std::vec::Vec<T>`.
pub fn extract_generic_inner<'a>(ty: &'a Type, wrapper: &str) -> Option<&'a Type> {
    let Type::Path(type_path) = ty else {
        return None;
    };

    let segment = type_path.path.segments.last()?;
    if segment.ident != wrapper {
        return None;
    }

    let PathArguments::AngleBracketed(args) = &segment.arguments else {
        return None;
    };

    let GenericArgument::Type(inner) = args.args.first()? else {
        return None;
    };

    Some(inner)
}

/// One named field of the deriving struct.
pub struct BindField {
    pub ident: Ident,
    pub ty: Type,
    pub attr: TagAttr,
}

impl BindField {
    pub fn new(field: &Field) -> syn::Result<Self> {
        let ident = field
            .ident
            .clone()
            .ok_or_else(|| syn::Error::new_spanned(field, "Bind requires named fields"))?;

        Ok(Self {
            ident,
            ty: field.ty.clone(),
            attr: TagAttr::from_field(field)?,
        })
    }

    /// The declared type as written, without whitespace.
    pub fn type_name(&self) -> String {
        let ty = &self.ty;
        quote!(#ty).to_string().replace(' ', "")
    }

    /// A `FieldDescriptor` literal for this field.
    pub fn descriptor(&self) -> QuoteStream {
        let name = self.ident.unraw().to_string();
        let type_name = self.type_name();
        let embedded = self.attr.embed;
        let writable = !self.attr.skip;
        let tags = self.attr.tags.iter().map(|(tag, annotation)| {
            quote! { (#tag, #annotation) }
        });

        quote! {
            ::envar::FieldDescriptor {
                name: #name,
                type_name: #type_name,
                tags: &[#(#tags),*],
                embedded: #embedded,
                writable: #writable,
            }
        }
    }

    /// Expression producing a `FieldSlot` over `self.<field>`.
    pub fn slot(&self) -> QuoteStream {
        let ident = &self.ident;

        match Shape::of(&self.ty) {
            Shape::Value => quote! { ::envar::FieldSlot::value(&mut self.#ident) },
            Shape::Boxed => quote! { ::envar::FieldSlot::value(&mut *self.#ident) },
            Shape::Optional => quote! { ::envar::FieldSlot::optional(&mut self.#ident) },
            Shape::OptionalBoxed => {
                quote! { ::envar::FieldSlot::optional_boxed(&mut self.#ident) }
            }
            Shape::Sequence => quote! { ::envar::FieldSlot::sequence(&mut self.#ident) },
            Shape::BoxedSequence => {
                quote! { ::envar::FieldSlot::boxed_sequence(&mut self.#ident) }
            }
        }
    }
}
