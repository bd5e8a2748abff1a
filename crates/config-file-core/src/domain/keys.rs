//! Allowed-key set and key validation.
//!
//! A config file may be defined with a closed vocabulary of property names.
//! When it is, every keyed operation checks membership before the file is
//! touched.  When it is not, the file runs in "open schema" mode and any
//! string key is accepted.
//!
//! Only *requested* keys are validated.  Extra properties already present on
//! disk are tolerated.

use std::path::Path;

use thiserror::Error;

/// A requested key is not a member of the configured [`AllowedKeys`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error(
    "Key \"{key}\" is not allowed for config file \"{file_name}\". \
     Expected one of the following: {expected}"
)]
pub struct InvalidKey {
    /// The rejected key.
    pub key: String,
    /// Base name of the config file (e.g. `settings.json`).
    pub file_name: String,
    /// The allowed keys, human-joined with a final `or`.
    pub expected: String,
}

/// Ordered, duplicate-free set of permissible property names.
///
/// Insertion order is kept so error messages list keys in the order the
/// caller declared them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AllowedKeys {
    keys: Vec<String>,
}

impl AllowedKeys {
    /// Builds a key set, dropping later duplicates.
    pub fn new<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut set = Self::default();
        for key in keys {
            let key = key.into();
            if !set.contains(&key) {
                set.keys.push(key);
            }
        }
        set
    }

    pub fn contains(&self, key: &str) -> bool {
        self.keys.iter().any(|k| k == key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.keys.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.keys
    }

    /// Checks that `key` is a member of this set.
    ///
    /// `file_path` is only used to name the file in the error message; its
    /// base name is reported, not the full path.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidKey`] when `key` is not in the set.
    pub fn check(&self, key: &str, file_path: &Path) -> Result<(), InvalidKey> {
        if self.contains(key) {
            return Ok(());
        }
        let file_name = file_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| file_path.display().to_string());
        Err(InvalidKey {
            key: key.to_string(),
            file_name,
            expected: join_with_final_conjunction(&self.keys, "or"),
        })
    }
}

impl<S: Into<String>> FromIterator<S> for AllowedKeys {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::new(iter)
    }
}

impl<'a> IntoIterator for &'a AllowedKeys {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.keys.iter()
    }
}

/// Joins `items` for a human reader, placing `conjunction` before the last
/// item.
///
/// | Items          | Output          |
/// |----------------|-----------------|
/// | `[]`           | `""`            |
/// | `[a]`          | `"a"`           |
/// | `[a, b]`       | `"a or b"`      |
/// | `[a, b, c]`    | `"a, b, or c"`  |
pub fn join_with_final_conjunction<S: AsRef<str>>(items: &[S], conjunction: &str) -> String {
    match items {
        [] => String::new(),
        [only] => only.as_ref().to_string(),
        [init @ .., last] => {
            let separator = if items.len() > 2 { ", " } else { " " };
            let head = init
                .iter()
                .map(AsRef::as_ref)
                .collect::<Vec<_>>()
                .join(separator);
            format!("{head}{separator}{conjunction} {}", last.as_ref())
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
