//! Where environment values come from.
//!
//! A [`BindContext`](crate::BindContext) pulls one [`EnvMap`] snapshot from
//! its [`Source`] at the start of every bind. The default source reads the
//! process environment; tests usually hand the context an [`EnvMap`]
//! directly, and closures returning an `EnvMap` work as sources too.
//!
//! # Available Sources
//!
//! | Source | Contents |
//! |--------|----------|
//! | [`EnvSource`] | The process environment (UTF-8 entries only) |
//! | [`EnvMap`] | A fixed snapshot, cloned on each load |
//! | `FnMut() -> EnvMap` | Whatever the closure returns |
//! | [`DotenvSource`] | A `.env` file overlaid by the process environment |

use std::collections::HashMap;
use std::collections::hash_map;
#[cfg(feature = "dotenv")]
use std::path::PathBuf;

use crate::log::warn;
#[cfg(feature = "dotenv")]
use crate::log::{debug, trace};

/// A snapshot of environment variables.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct EnvMap {
    vars: HashMap<String, String>,
}

impl EnvMap {
    /// Creates an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up a key. Present-but-empty keys return `Some("")`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    /// Whether `key` is present.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.vars.contains_key(key)
    }

    /// Sets a key, returning the previous value.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.vars.insert(key.into(), value.into())
    }

    /// Builder form of [`set`](Self::set).
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    /// Removes a key, returning its value.
    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.vars.remove(key)
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.vars.len()
    }

    /// Whether the map is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// Iterates entries in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Copies every entry of `other` over this map.
    pub fn extend_from(&mut self, other: &EnvMap) {
        self.vars
            .extend(other.vars.iter().map(|(k, v)| (k.clone(), v.clone())));
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for EnvMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            vars: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl From<HashMap<String, String>> for EnvMap {
    fn from(vars: HashMap<String, String>) -> Self {
        Self { vars }
    }
}

impl IntoIterator for EnvMap {
    type Item = (String, String);
    type IntoIter = hash_map::IntoIter<String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.vars.into_iter()
    }
}

/// Produces the environment snapshot for a bind.
pub trait Source {
    /// Loads the current snapshot.
    fn load(&mut self) -> EnvMap;
}

impl Source for EnvMap {
    fn load(&mut self) -> EnvMap {
        self.clone()
    }
}

impl<F> Source for F
where
    F: FnMut() -> EnvMap,
{
    fn load(&mut self) -> EnvMap {
        self()
    }
}

/// Reads the process environment.
///
/// Entries whose key or value is not valid UTF-8 are skipped with a warning.
#[derive(Clone, Copy, Debug, Default)]
pub struct EnvSource;

impl EnvSource {
    /// Creates the source.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Source for EnvSource {
    fn load(&mut self) -> EnvMap {
        process_env()
    }
}

#[cfg_attr(not(feature = "tracing"), allow(unused_variables))]
fn process_env() -> EnvMap {
    std::env::vars_os()
        .filter_map(|(key, value)| match (key.into_string(), value.into_string()) {
            (Ok(key), Ok(value)) => Some((key, value)),
            (key, _) => {
                warn!(key = ?key, "skipping environment variable with non UTF-8 content");
                None
            }
        })
        .collect()
}

/// Reads a `.env` file and overlays the process environment on top.
///
/// The file is re-read on every load. A missing file is an empty layer for
/// [`DotenvSource::new`] and [`DotenvSource::optional`]; a malformed or
/// unreadable file is logged and skipped.
#[cfg(feature = "dotenv")]
#[derive(Clone, Debug)]
pub struct DotenvSource {
    path: PathBuf,
    required: bool,
}

#[cfg(feature = "dotenv")]
impl DotenvSource {
    /// Uses `.env` in the working directory, if it exists.
    #[must_use]
    pub fn new() -> Self {
        Self::optional(".env")
    }

    /// Uses `path`, warning when it is missing.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            required: true,
        }
    }

    /// Uses `path`, silently treating a missing file as empty.
    pub fn optional(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            required: false,
        }
    }

    /// The file this source reads.
    #[must_use]
    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    #[cfg_attr(not(feature = "tracing"), allow(unused_variables))]
    fn read_file(&self) -> EnvMap {
        if !self.path.exists() {
            if self.required {
                warn!(path = %self.path.display(), "dotenv file not found");
            } else {
                trace!(path = %self.path.display(), "no dotenv file");
            }
            return EnvMap::new();
        }

        let entries = match dotenvy::from_path_iter(&self.path) {
            Ok(entries) => entries,
            Err(err) => {
                warn!(path = %self.path.display(), error = %err, "unable to read dotenv file");
                return EnvMap::new();
            }
        };

        let mut vars = EnvMap::new();
        for entry in entries {
            match entry {
                Ok((key, value)) => {
                    vars.set(key, value);
                }
                Err(err) => {
                    warn!(
                        path = %self.path.display(),
                        error = %err,
                        "skipping malformed dotenv line"
                    );
                }
            }
        }

        debug!(path = %self.path.display(), count = vars.len(), "loaded dotenv file");
        vars
    }
}

#[cfg(feature = "dotenv")]
impl Default for DotenvSource {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "dotenv")]
impl Source for DotenvSource {
    fn load(&mut self) -> EnvMap {
        let mut vars = self.read_file();
        vars.extend_from(&process_env());
        vars
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_map_basics() {
        let mut vars = EnvMap::new().with("A", "1").with("EMPTY", "");
        assert_eq!(vars.get("A"), Some("1"));
        assert_eq!(vars.get("EMPTY"), Some(""));
        assert_eq!(vars.get("B"), None);
        assert!(vars.contains("EMPTY"));
        assert_eq!(vars.len(), 2);

        assert_eq!(vars.set("A", "2"), Some("1".to_string()));
        assert_eq!(vars.remove("A"), Some("2".to_string()));
        assert!(!vars.contains("A"));
    }

    #[test]
    fn test_env_map_from_iter() {
        let vars: EnvMap = [("X", "1"), ("Y", "2")].into_iter().collect();
        assert_eq!(vars.len(), 2);
        assert_eq!(vars.get("Y"), Some("2"));
    }

    #[test]
    fn test_env_map_is_a_source() {
        let mut source = EnvMap::new().with("K", "V");
        assert_eq!(source.load().get("K"), Some("V"));
        assert_eq!(source.load().len(), 1);
    }

    #[test]
    fn test_closure_is_a_source() {
        let mut calls = 0;
        let mut source = || {
            calls += 1;
            EnvMap::new().with("CALLS", calls.to_string())
        };
        assert_eq!(Source::load(&mut source).get("CALLS"), Some("1"));
        assert_eq!(Source::load(&mut source).get("CALLS"), Some("2"));
    }

    #[cfg(feature = "dotenv")]
    #[test]
    fn test_dotenv_file_is_loaded() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "ENVAR_DOTENV_ONLY_KEY=from_file").unwrap();
        writeln!(file, "# comment").unwrap();
        writeln!(file, "ENVAR_DOTENV_QUOTED=\"a b\"").unwrap();

        let vars = DotenvSource::from_path(file.path()).load();
        assert_eq!(vars.get("ENVAR_DOTENV_ONLY_KEY"), Some("from_file"));
        assert_eq!(vars.get("ENVAR_DOTENV_QUOTED"), Some("a b"));
    }

    #[cfg(feature = "dotenv")]
    #[test]
    fn test_dotenv_missing_file_is_empty_layer() {
        let vars = DotenvSource::optional("/nonexistent/envar/.env").load();
        assert_eq!(vars.get("ENVAR_DOTENV_ONLY_KEY"), None);
    }
}
