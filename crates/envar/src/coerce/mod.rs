//! Type coercion: the parser registry and the element capability.
//!
//! Every type that can appear in a bound field implements [`Element`]. Its
//! [`ElementKind`] decides how a raw string becomes a value:
//!
//! | Kind | Conversion |
//! |------|------------|
//! | [`ElementKind::Parsed`] | Looked up in the [`ParserMap`] by [`TypeKey`] |
//! | [`ElementKind::Text`] | The type decodes itself via [`TextDecode`] |
//! | [`ElementKind::Struct`] | A nested `#[derive(Bind)]` struct |
//!
//! Optional, boxed and sequence fields reuse the scalar entry of their
//! element type; they are never registered separately.
//!
//! # Built-in Parsers
//!
//! | Type | Accepted text |
//! |------|---------------|
//! | `bool` | `1 t T TRUE true True`, `0 f F FALSE false False` |
//! | `String` | anything |
//! | `i8`..`i64`, `isize` | base-10, range checked for the width |
//! | `u8`..`u64`, `usize` | base-10, range checked for the width |
//! | `f32`, `f64` | float literals |
//! | [`Duration`] | `300ms`, `1.5h`, `2h45m` (see [`duration`]) |
//! | [`Url`] | absolute URLs, or relative references resolved against [`RELATIVE_URL_BASE`] |
//! | [`File`] | path to an existing regular file, opened read-only |
//!
//! # Custom Types
//!
//! ```rust,ignore
//! use envar::{BindContext, Element};
//!
//! #[derive(Debug, PartialEq)]
//! struct Level(u8);
//!
//! impl Element for Level {}
//!
//! let ctx = BindContext::new()
//!     .with_parser(|raw: &str| raw.parse::<u8>().map(Level));
//! ```

pub mod duration;

use std::any::{Any, TypeId, type_name};
use std::collections::HashMap;
use std::convert::Infallible;
use std::fmt::{self, Debug, Formatter};
use std::fs::File;
use std::hash::{Hash, Hasher};
use std::num::ParseIntError;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use num_traits::Num;
use thiserror::Error as ThisError;
use url::Url;

use crate::field::Bind;

/// Boxed error returned by parsers and text decoders.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Base that relative URL references are resolved against.
///
/// `url::Url` has no relative form, so `/api/v1?x=1` binds as
/// `relative:///api/v1?x=1`. Path, query and fragment are kept as given.
pub const RELATIVE_URL_BASE: &str = "relative:///";

/// Whether `url` was bound from a relative reference.
#[must_use]
pub fn is_relative_url(url: &Url) -> bool {
    url.scheme() == "relative"
}

/// A typed conversion function stored in a [`ParserMap`].
pub type ParserFn<T> = Arc<dyn Fn(&str) -> Result<T, BoxError> + Send + Sync>;

// ============================================================================
// Conversion errors
// ============================================================================

/// Failures of the built-in parsers.
#[derive(Debug, ThisError)]
pub enum ConvertError {
    /// Not one of the accepted boolean spellings.
    #[error("invalid boolean {0:?}")]
    Bool(String),

    /// Malformed duration.
    #[error("unable to parse duration: {0}")]
    Duration(#[from] duration::DurationError),

    /// Malformed URL.
    #[error("unable to parse URL: {0}")]
    Url(#[from] url::ParseError),

    /// A file field was given an empty path.
    #[error("the file path can not be empty")]
    EmptyPath,

    /// A file field points at nothing.
    #[error("the file {} does not exist", .0.display())]
    FileNotFound(PathBuf),

    /// A file field points at a directory.
    #[error("the file {} is a directory", .0.display())]
    IsDirectory(PathBuf),

    /// Opening or inspecting a file failed.
    #[error("unable to open {}: {source}", path.display())]
    Io {
        /// Path being opened.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}

/// Outcome of a failed conversion, before the binder attaches field context.
#[derive(Debug)]
pub(crate) enum Conversion {
    /// No parser registered for the element type.
    NoParser,

    /// The parser or decoder rejected the text.
    Failed(BoxError),
}

// ============================================================================
// Element capability
// ============================================================================

/// Decodes a value from its textual form, in place.
///
/// Types implementing this bypass the [`ParserMap`]. Register them with
/// [`text_decodable!`](crate::text_decodable), which requires `Default`
/// so optional and sequence fields can allocate fresh values.
pub trait TextDecode {
    /// Overwrites `self` with the value encoded in `text`.
    ///
    /// # Errors
    ///
    /// Returns an error when `text` is not a valid encoding.
    fn decode_text(&mut self, text: &[u8]) -> Result<(), BoxError>;
}

/// How an [`Element`] is produced from raw text.
pub enum ElementKind<T> {
    /// Converted by the parser registered for `T`.
    Parsed,

    /// Decoded by the type itself.
    Text {
        /// Produces a blank value to decode into.
        alloc: fn() -> T,
        /// Decodes text into an existing value.
        decode: fn(&mut T, &[u8]) -> Result<(), BoxError>,
    },

    /// A nested struct, bound field by field.
    Struct {
        /// Produces a fresh value to bind into.
        alloc: fn() -> T,
        /// Exposes the value to the walker.
        project: fn(&mut T) -> &mut dyn Bind,
    },
}

/// A type that can appear in a bound field, directly or as the element of
/// an `Option`, `Box` or `Vec`.
///
/// The default kind is [`ElementKind::Parsed`]; an empty impl is enough for
/// types converted through a registered parser.
pub trait Element: Sized + 'static {
    /// Conversion strategy for this type.
    fn kind() -> ElementKind<Self> {
        ElementKind::Parsed
    }
}

/// Implements [`Element`] for types that decode themselves through
/// [`TextDecode`].
///
/// ```rust,ignore
/// #[derive(Default)]
/// struct Level(u8);
///
/// impl envar::TextDecode for Level {
///     fn decode_text(&mut self, text: &[u8]) -> Result<(), envar::BoxError> {
///         self.0 = std::str::from_utf8(text)?.parse()?;
///         Ok(())
///     }
/// }
///
/// envar::text_decodable!(Level);
/// ```
#[macro_export]
macro_rules! text_decodable {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl $crate::Element for $ty {
                fn kind() -> $crate::ElementKind<Self> {
                    $crate::ElementKind::Text {
                        alloc: <Self as ::std::default::Default>::default,
                        decode: <Self as $crate::TextDecode>::decode_text,
                    }
                }
            }
        )+
    };
}

/// Generates parsed `Element` impls for the built-in scalars.
macro_rules! impl_parsed_element {
    ($($t:ty),+ $(,)?) => {
        $(
            impl Element for $t {}
        )+
    };
}

impl_parsed_element!(
    bool, String, i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64, Duration, Url,
    File,
);

#[cfg(feature = "secrecy")]
impl Element for secrecy::SecretString {}

/// Converts `raw` into a fresh `T`.
pub(crate) fn convert<T: Element>(raw: &str, parsers: &ParserMap) -> Result<T, Conversion> {
    match T::kind() {
        ElementKind::Text { alloc, decode } => {
            let mut value = alloc();
            decode(&mut value, raw.as_bytes()).map_err(Conversion::Failed)?;
            Ok(value)
        }
        ElementKind::Parsed | ElementKind::Struct { .. } => parsers.parse::<T>(raw),
    }
}

/// Converts `raw` into an existing `T`. Text decoders decode in place.
pub(crate) fn convert_into<T: Element>(
    slot: &mut T,
    raw: &str,
    parsers: &ParserMap,
) -> Result<(), Conversion> {
    match T::kind() {
        ElementKind::Text { decode, .. } => {
            decode(slot, raw.as_bytes()).map_err(Conversion::Failed)
        }
        ElementKind::Parsed | ElementKind::Struct { .. } => {
            *slot = parsers.parse::<T>(raw)?;
            Ok(())
        }
    }
}

// ============================================================================
// Parser registry
// ============================================================================

/// Stable identity of a registered type.
///
/// Equality and hashing use the [`TypeId`]; the name is kept for messages.
#[derive(Clone, Copy)]
pub struct TypeKey {
    id: TypeId,
    name: &'static str,
}

impl TypeKey {
    /// The key for `T`.
    #[must_use]
    pub fn of<T: 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: type_name::<T>(),
        }
    }

    /// Fully qualified type name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for TypeKey {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeKey {}

impl Hash for TypeKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl Debug for TypeKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Registry of typed parsers keyed by [`TypeKey`].
///
/// Each entry holds a [`ParserFn<T>`] for exactly the `T` of its key, so
/// lookups are typed and cannot mix up types.
#[derive(Clone, Default)]
pub struct ParserMap {
    entries: HashMap<TypeKey, Arc<dyn Any + Send + Sync>>,
}

impl ParserMap {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding the built-in parsers.
    #[must_use]
    pub fn builtin() -> Self {
        let mut map = Self::new();

        map.insert(parse_bool);
        map.insert(|raw: &str| Ok::<_, Infallible>(raw.to_string()));

        map.insert(parse_int::<i8>);
        map.insert(parse_int::<i16>);
        map.insert(parse_int::<i32>);
        map.insert(parse_int::<i64>);
        map.insert(parse_int::<isize>);
        map.insert(parse_int::<u8>);
        map.insert(parse_int::<u16>);
        map.insert(parse_int::<u32>);
        map.insert(parse_int::<u64>);
        map.insert(parse_int::<usize>);

        map.insert(|raw: &str| raw.parse::<f32>());
        map.insert(|raw: &str| raw.parse::<f64>());

        map.insert(|raw: &str| duration::parse(raw.trim()).map_err(ConvertError::from));
        map.insert(parse_url);
        map.insert(|raw: &str| open_file(Path::new(raw)));

        #[cfg(feature = "secrecy")]
        map.insert(|raw: &str| Ok::<_, Infallible>(secrecy::SecretString::from(raw.to_string())));

        map
    }

    /// Registers `parser` for `T`, replacing any previous entry.
    pub fn insert<T, F, E>(&mut self, parser: F)
    where
        T: 'static,
        F: Fn(&str) -> Result<T, E> + Send + Sync + 'static,
        E: Into<BoxError>,
    {
        let parser: ParserFn<T> = Arc::new(move |raw| parser(raw).map_err(Into::into));
        self.entries.insert(TypeKey::of::<T>(), Arc::new(parser));
    }

    /// Builder form of [`insert`](Self::insert).
    #[must_use]
    pub fn with<T, F, E>(mut self, parser: F) -> Self
    where
        T: 'static,
        F: Fn(&str) -> Result<T, E> + Send + Sync + 'static,
        E: Into<BoxError>,
    {
        self.insert(parser);
        self
    }

    /// Removes the entry for `T`, returning whether one existed.
    pub fn remove<T: 'static>(&mut self) -> bool {
        self.entries.remove(&TypeKey::of::<T>()).is_some()
    }

    /// Returns the parser registered for `T`.
    #[must_use]
    pub fn get<T: 'static>(&self) -> Option<&ParserFn<T>> {
        self.entries
            .get(&TypeKey::of::<T>())
            .and_then(|entry| entry.downcast_ref::<ParserFn<T>>())
    }

    /// Whether a parser is registered for `T`.
    #[must_use]
    pub fn contains<T: 'static>(&self) -> bool {
        self.entries.contains_key(&TypeKey::of::<T>())
    }

    /// Number of registered types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Registered type keys, in no particular order.
    pub fn keys(&self) -> impl Iterator<Item = &TypeKey> {
        self.entries.keys()
    }

    /// Runs the parser registered for `T`.
    pub(crate) fn parse<T: 'static>(&self, raw: &str) -> Result<T, Conversion> {
        let parser = self.get::<T>().ok_or(Conversion::NoParser)?;
        parser(raw).map_err(Conversion::Failed)
    }
}

impl Debug for ParserMap {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.entries.keys()).finish()
    }
}

// ============================================================================
// Built-in parsers
// ============================================================================

fn parse_bool(raw: &str) -> Result<bool, ConvertError> {
    match raw {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Ok(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Ok(false),
        other => Err(ConvertError::Bool(other.to_string())),
    }
}

fn parse_url(raw: &str) -> Result<Url, ConvertError> {
    match Url::parse(raw) {
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            let base = Url::parse(RELATIVE_URL_BASE)?;
            Ok(base.join(raw)?)
        }
        other => Ok(other?),
    }
}

fn parse_int<T>(raw: &str) -> Result<T, ParseIntError>
where
    T: Num<FromStrRadixErr = ParseIntError>,
{
    T::from_str_radix(raw, 10)
}

fn open_file(path: &Path) -> Result<File, ConvertError> {
    if path.as_os_str().is_empty() {
        return Err(ConvertError::EmptyPath);
    }

    let metadata = std::fs::metadata(path).map_err(|source| {
        if source.kind() == std::io::ErrorKind::NotFound {
            ConvertError::FileNotFound(path.to_path_buf())
        } else {
            ConvertError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;

    if metadata.is_dir() {
        return Err(ConvertError::IsDirectory(path.to_path_buf()));
    }

    File::open(path).map_err(|source| ConvertError::Io {
        path: path.to_path_buf(),
        source,
    })
}
