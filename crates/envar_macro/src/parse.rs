//! Attribute parsing for `#[tag(env = "NAME,opt", embed, skip)]`.
//!
//! Every `name = "..."` item registers an annotation string under that tag
//! name. The strings are stored verbatim; their contents are interpreted at
//! bind time, so the macro accepts any tag name and any annotation text.
//!
//! Two bare flags are reserved:
//!
//! | Flag | Meaning |
//! |------|---------|
//! | `embed` | Flatten the field into its parent even when unannotated |
//! | `skip` | Never touch the field |
//!
//! Several `#[tag(...)]` attributes on one field are merged. Declaring the
//! same tag name or flag twice is an error.

use std::collections::HashSet;

use syn::ext::IdentExt;
use syn::meta::ParseNestedMeta;
use syn::{Field, LitStr, Result as SynResult};

/// Name of the field attribute.
pub const ATTRIBUTE: &str = "tag";

/// Everything declared in a field's `#[tag(...)]` attributes.
#[derive(Debug, Default)]
pub struct TagAttr {
    /// `(tag name, annotation)` pairs in declaration order.
    pub tags: Vec<(String, String)>,

    /// `embed` flag.
    pub embed: bool,

    /// `skip` flag.
    pub skip: bool,

    seen: HashSet<String>,
}

impl TagAttr {
    /// Collects the `#[tag(...)]` attributes of `field`.
    pub fn from_field(field: &Field) -> SynResult<Self> {
        let mut attr = Self::default();

        for a in &field.attrs {
            if a.path().is_ident(ATTRIBUTE) {
                a.parse_nested_meta(|meta| attr.parse_meta(&meta))?;
            }
        }

        Ok(attr)
    }

    /// Whether the walker can bind this field at all.
    pub fn is_bindable(&self) -> bool {
        !self.skip && (self.embed || !self.tags.is_empty())
    }

    fn parse_meta(&mut self, meta: &ParseNestedMeta<'_>) -> SynResult<()> {
        let name = meta
            .path
            .get_ident()
            .ok_or_else(|| meta.error("expected a tag name or `embed`/`skip`"))?
            .unraw()
            .to_string();

        if !self.seen.insert(name.clone()) {
            return Err(meta.error(format!("duplicate tag `{name}`")));
        }

        if !meta.input.peek(syn::Token![=]) {
            return match name.as_str() {
                "embed" => {
                    self.embed = true;
                    Ok(())
                }
                "skip" => {
                    self.skip = true;
                    Ok(())
                }
                _ => Err(meta.error(format!(
                    "tag `{name}` needs an annotation string: `{name} = \"...\"`"
                ))),
            };
        }

        let annotation: LitStr = meta.value()?.parse()?;
        self.tags.push((name, annotation.value()));

        Ok(())
    }
}
