//! The bindable-struct surface generated by `#[derive(Bind)]`.
//!
//! A [`Bind`] implementation exposes two things to the walker:
//!
//! - a static table of [`FieldDescriptor`]s, one per declared field, holding
//!   the raw annotation strings for every tag name used on that field;
//! - [`Bind::field_mut`], which hands out a [`FieldSlot`]: a typed, mutable
//!   view of one field, erased behind a small internal trait.
//!
//! Slots come in five shapes, selected by the derive from the field's
//! declared type:
//!
//! | Declared type | Constructor |
//! |---------------|-------------|
//! | `T`, `Box<T>` | [`FieldSlot::value`] |
//! | `Option<T>` | [`FieldSlot::optional`] |
//! | `Option<Box<T>>` | [`FieldSlot::optional_boxed`] |
//! | `Vec<T>` | [`FieldSlot::sequence`] |
//! | `Vec<Box<T>>` | [`FieldSlot::boxed_sequence`] |
//!
//! Implementing [`Bind`] by hand is possible but rarely needed.

use crate::coerce::{self, Conversion, Element, ElementKind, ParserMap};

/// Static metadata for one struct field.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct FieldDescriptor {
    /// Field identifier as declared.
    pub name: &'static str,

    /// Declared type, as written in the source.
    pub type_name: &'static str,

    /// `(tag name, annotation)` pairs from `#[tag(...)]`.
    pub tags: &'static [(&'static str, &'static str)],

    /// Marked `#[tag(embed)]`: bound into the parent's namespace even
    /// without an annotation.
    pub embedded: bool,

    /// `false` for `#[tag(skip)]` fields, which are never touched.
    pub writable: bool,
}

impl FieldDescriptor {
    /// The annotation registered under `tag_name`, if any.
    #[must_use]
    pub fn annotation(&self, tag_name: &str) -> Option<&'static str> {
        self.tags
            .iter()
            .find(|(name, _)| *name == tag_name)
            .map(|(_, annotation)| *annotation)
    }
}

/// A struct whose fields can be bound from the environment.
///
/// Normally derived. Implementations must return a slot for every index
/// below `descriptors().len()`, in declaration order.
pub trait Bind {
    /// Field metadata, in declaration order.
    fn descriptors(&self) -> &'static [FieldDescriptor];

    /// Mutable access to the field at `index`.
    fn field_mut(&mut self, index: usize) -> Option<FieldSlot<'_>>;
}

/// Erases a concrete `T: Bind` for [`ElementKind::Struct`].
#[doc(hidden)]
pub fn project<T: Bind>(value: &mut T) -> &mut dyn Bind {
    value
}

/// Typed mutable view of one field.
pub struct FieldSlot<'a> {
    target: Box<dyn Target + 'a>,
}

impl<'a> FieldSlot<'a> {
    /// A plain field, or a `Box<T>` dereferenced by the caller.
    pub fn value<T: Element>(field: &'a mut T) -> Self {
        Self::new(Value(field))
    }

    /// An `Option<T>` field.
    pub fn optional<T: Element>(field: &'a mut Option<T>) -> Self {
        Self::new(Optional(field))
    }

    /// An `Option<Box<T>>` field.
    pub fn optional_boxed<T: Element>(field: &'a mut Option<Box<T>>) -> Self {
        Self::new(OptionalBoxed(field))
    }

    /// A `Vec<T>` field.
    pub fn sequence<T: Element>(field: &'a mut Vec<T>) -> Self {
        Self::new(Sequence(field))
    }

    /// A `Vec<Box<T>>` field.
    pub fn boxed_sequence<T: Element>(field: &'a mut Vec<Box<T>>) -> Self {
        Self::new(BoxedSequence(field))
    }

    fn new(target: impl Target + 'a) -> Self {
        Self {
            target: Box::new(target),
        }
    }

    pub(crate) fn is_sequence(&self) -> bool {
        self.target.is_sequence()
    }

    /// Converts `raw` and stores it. Sequences split `raw` on `delimiter`.
    pub(crate) fn assign(
        &mut self,
        raw: &str,
        delimiter: &str,
        parsers: &ParserMap,
    ) -> Result<(), Conversion> {
        self.target.assign(raw, delimiter, parsers)
    }

    /// The struct values to recurse into, allocating where the shape
    /// requires it. `None` when the element type is not a struct.
    pub(crate) fn structs(&mut self) -> Option<Vec<&mut dyn Bind>> {
        self.target.structs()
    }
}

trait Target {
    fn is_sequence(&self) -> bool {
        false
    }

    fn assign(&mut self, raw: &str, delimiter: &str, parsers: &ParserMap)
    -> Result<(), Conversion>;

    fn structs(&mut self) -> Option<Vec<&mut dyn Bind>>;
}

struct Value<'a, T>(&'a mut T);

impl<T: Element> Target for Value<'_, T> {
    fn assign(&mut self, raw: &str, _: &str, parsers: &ParserMap) -> Result<(), Conversion> {
        coerce::convert_into(self.0, raw, parsers)
    }

    fn structs(&mut self) -> Option<Vec<&mut dyn Bind>> {
        match T::kind() {
            ElementKind::Struct { project, .. } => Some(vec![project(self.0)]),
            _ => None,
        }
    }
}

struct Optional<'a, T>(&'a mut Option<T>);

impl<T: Element> Target for Optional<'_, T> {
    fn assign(&mut self, raw: &str, _: &str, parsers: &ParserMap) -> Result<(), Conversion> {
        *self.0 = Some(coerce::convert(raw, parsers)?);
        Ok(())
    }

    fn structs(&mut self) -> Option<Vec<&mut dyn Bind>> {
        match T::kind() {
            ElementKind::Struct { alloc, project } => {
                Some(vec![project(self.0.get_or_insert_with(alloc))])
            }
            _ => None,
        }
    }
}

struct OptionalBoxed<'a, T>(&'a mut Option<Box<T>>);

impl<T: Element> Target for OptionalBoxed<'_, T> {
    fn assign(&mut self, raw: &str, _: &str, parsers: &ParserMap) -> Result<(), Conversion> {
        *self.0 = Some(Box::new(coerce::convert(raw, parsers)?));
        Ok(())
    }

    fn structs(&mut self) -> Option<Vec<&mut dyn Bind>> {
        match T::kind() {
            ElementKind::Struct { alloc, project } => {
                let boxed = self.0.get_or_insert_with(|| Box::new(alloc()));
                Some(vec![project(&mut **boxed)])
            }
            _ => None,
        }
    }
}

struct Sequence<'a, T>(&'a mut Vec<T>);

impl<T: Element> Target for Sequence<'_, T> {
    fn is_sequence(&self) -> bool {
        true
    }

    fn assign(
        &mut self,
        raw: &str,
        delimiter: &str,
        parsers: &ParserMap,
    ) -> Result<(), Conversion> {
        *self.0 = raw
            .split(delimiter)
            .map(|part| coerce::convert(part, parsers))
            .collect::<Result<_, _>>()?;
        Ok(())
    }

    fn structs(&mut self) -> Option<Vec<&mut dyn Bind>> {
        let ElementKind::Struct { alloc, project } = T::kind() else {
            return None;
        };
        let fresh = (0..self.0.len()).map(|_| alloc()).collect();
        *self.0 = fresh;
        Some(self.0.iter_mut().map(project).collect())
    }
}

struct BoxedSequence<'a, T>(&'a mut Vec<Box<T>>);

impl<T: Element> Target for BoxedSequence<'_, T> {
    fn is_sequence(&self) -> bool {
        true
    }

    fn assign(
        &mut self,
        raw: &str,
        delimiter: &str,
        parsers: &ParserMap,
    ) -> Result<(), Conversion> {
        *self.0 = raw
            .split(delimiter)
            .map(|part| coerce::convert(part, parsers).map(Box::new))
            .collect::<Result<_, _>>()?;
        Ok(())
    }

    fn structs(&mut self) -> Option<Vec<&mut dyn Bind>> {
        let ElementKind::Struct { alloc, project } = T::kind() else {
            return None;
        };
        let fresh = (0..self.0.len()).map(|_| Box::new(alloc())).collect();
        *self.0 = fresh;
        Some(self.0.iter_mut().map(|boxed| project(&mut **boxed)).collect())
    }
}
