//! Expansion of `#[derive(Bind)]`.
//!
//! For a struct `S` the expander emits two impls:
//!
//! ```ignore
//! impl ::envar::Bind for S {
//!     fn descriptors(&self) -> &'static [::envar::FieldDescriptor] { /* const table */ }
//!     fn field_mut(&mut self, index: usize) -> Option<::envar::FieldSlot<'_>> { /* match */ }
//! }
//!
//! impl ::envar::Element for S {
//!     fn kind() -> ::envar::ElementKind<Self> { ::envar::ElementKind::Struct { .. } }
//! }
//! ```
//!
//! The second impl lets `S` appear nested inside other bindable structs and
//! requires `S: Default`.
//!
//! Fields that can never be bound (`skip`, or no annotation and no `embed`)
//! keep their descriptor but get no slot, so their types are unconstrained.

use proc_macro2::TokenStream as QuoteStream;
use quote::quote;
use syn::{Data, DataStruct, DeriveInput, Error as SynError, Fields, Result as SynResult};

use crate::field::BindField;

pub struct Expander;

impl Expander {
    pub fn expand(input: &DeriveInput) -> SynResult<QuoteStream> {
        let fields = Self::named_fields(input)?;

        if !input.generics.params.is_empty() {
            return Err(SynError::new_spanned(
                &input.generics,
                "Bind cannot be derived for generic structs",
            ));
        }

        let fields = fields
            .named
            .iter()
            .map(BindField::new)
            .collect::<SynResult<Vec<_>>>()?;

        let name = &input.ident;
        let descriptors = fields.iter().map(BindField::descriptor);
        let arms = fields
            .iter()
            .enumerate()
            .filter(|(_, field)| field.attr.is_bindable())
            .map(|(index, field)| {
                let slot = field.slot();
                quote! { #index => ::core::option::Option::Some(#slot), }
            });

        Ok(quote! {
            #[automatically_derived]
            impl ::envar::Bind for #name {
                fn descriptors(&self) -> &'static [::envar::FieldDescriptor] {
                    const FIELDS: &[::envar::FieldDescriptor] = &[#(#descriptors),*];
                    FIELDS
                }

                fn field_mut(
                    &mut self,
                    index: usize,
                ) -> ::core::option::Option<::envar::FieldSlot<'_>> {
                    match index {
                        #(#arms)*
                        _ => ::core::option::Option::None,
                    }
                }
            }

            #[automatically_derived]
            impl ::envar::Element for #name {
                fn kind() -> ::envar::ElementKind<Self> {
                    ::envar::ElementKind::Struct {
                        alloc: <Self as ::core::default::Default>::default,
                        project: ::envar::project::<Self>,
                    }
                }
            }
        })
    }

    fn named_fields(input: &DeriveInput) -> SynResult<&syn::FieldsNamed> {
        match &input.data {
            Data::Struct(DataStruct {
                fields: Fields::Named(named),
                ..
            }) => Ok(named),
            Data::Struct(_) => Err(SynError::new_spanned(
                &input.ident,
                "Bind can only be derived for structs with named fields",
            )),
            Data::Enum(_) | Data::Union(_) => Err(SynError::new_spanned(
                &input.ident,
                "Bind can only be derived for structs",
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use syn::parse_quote;

    #[test]
    fn test_expands_struct() {
        let input: DeriveInput = parse_quote! {
            struct Config {
                #[tag(env = "PORT,default=8080")]
                port: u16,
                #[tag(skip)]
                cache: std::sync::Mutex<u8>,
                untouched: std::collections::HashMap<String, String>,
            }
        };

        let out = Expander::expand(&input).unwrap().to_string();
        assert!(out.contains("impl :: envar :: Bind for Config"));
        assert!(out.contains("impl :: envar :: Element for Config"));
        assert!(out.contains("FieldSlot :: value"));
        assert!(out.contains("\"std::sync::Mutex<u8>\""));
    }

    #[test]
    fn test_only_bindable_fields_get_slots() {
        let input: DeriveInput = parse_quote! {
            struct Config {
                #[tag(env = "A")]
                a: u8,
                #[tag(skip)]
                b: u8,
                c: u8,
                #[tag(embed)]
                d: Base,
            }
        };

        let out = Expander::expand(&input).unwrap().to_string();
        assert!(out.contains("0usize =>"));
        assert!(!out.contains("1usize =>"));
        assert!(!out.contains("2usize =>"));
        assert!(out.contains("3usize =>"));
    }

    #[test]
    fn test_descriptors_follow_declaration_order() {
        let input: DeriveInput = parse_quote! {
            struct Ordered {
                #[tag(env = "FIRST")]
                first: u8,
                #[tag(env = "SECOND")]
                second: Vec<u8>,
            }
        };

        let out = Expander::expand(&input).unwrap().to_string();
        let first = out.find("name : \"first\"").unwrap();
        let second = out.find("name : \"second\"").unwrap();
        assert!(first < second);
        assert!(out.contains("FieldSlot :: sequence (& mut self . second)"));
    }

    #[test]
    fn test_rejects_tuple_struct() {
        let input: DeriveInput = parse_quote! { struct Port(u16); };
        let err = Expander::expand(&input).unwrap_err();
        assert!(err.to_string().contains("named fields"));
    }

    #[test]
    fn test_rejects_enum() {
        let input: DeriveInput = parse_quote! { enum Mode { A, B } };
        assert!(Expander::expand(&input).is_err());
    }

    #[test]
    fn test_rejects_generics() {
        let input: DeriveInput = parse_quote! {
            struct Wrapper<T> {
                #[tag(env = "X")]
                x: T,
            }
        };
        let err = Expander::expand(&input).unwrap_err();
        assert!(err.to_string().contains("generic"));
    }
}
