//! The specification tree: which keys are sensitive, and how deep.
//!
//! A [`SensitiveKeys`] maps keys to directives. A [`Directive::Keep`] marks a
//! scalar leaf and carries the signed visible length handed to the masking
//! function; a [`Directive::Nested`] carries another `SensitiveKeys` to apply
//! one level down. Keys that are *not* in the tree are still searched at
//! depth: the traversal reuses the current `SensitiveKeys` when descending
//! through an unmatched container, so a sensitive key name is caught at any
//! depth without spelling out its ancestor path.
//!
//! The tree is caller-authored, built once, and read-only afterwards; it is
//! safe to share across concurrent redaction calls.

use std::collections::BTreeMap;
use std::fmt;

/// A key in the specification tree: a field/entry name or an array index.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum SpecKey {
    /// Matches a map entry or record field by name.
    Name(String),
    /// Matches an array element by position.
    Index(usize),
}

impl fmt::Display for SpecKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name(name) => f.write_str(name),
            Self::Index(index) => write!(f, "{index}"),
        }
    }
}

impl From<&str> for SpecKey {
    fn from(name: &str) -> Self {
        Self::Name(name.to_owned())
    }
}

impl From<String> for SpecKey {
    fn from(name: String) -> Self {
        Self::Name(name)
    }
}

impl From<usize> for SpecKey {
    fn from(index: usize) -> Self {
        Self::Index(index)
    }
}

/// What to do with the value found under a matched key.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize), serde(untagged))]
pub enum Directive {
    /// Mask the scalar under this key, keeping this many characters
    /// visible. Positive keeps the prefix, negative the suffix, zero masks
    /// the whole value.
    Keep(i64),
    /// Descend into the container under this key with a narrower
    /// specification.
    Nested(SensitiveKeys),
}

/// The specification tree driving a [`crate::Redactor`].
///
/// Built with the [`keep`](Self::keep) and [`nested`](Self::nested)
/// builders:
///
/// ```
/// use redact_sensitive::SensitiveKeys;
///
/// let keys = SensitiveKeys::new()
///     .keep("api_key", 4)
///     .nested("card", SensitiveKeys::new().keep("number", -4));
/// ```
///
/// With the `serde` feature the original flat-JSON shape deserializes
/// directly: `{"api_key": 4, "card": {"number": -4}}`.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize), serde(transparent))]
pub struct SensitiveKeys {
    entries: BTreeMap<SpecKey, Directive>,
}

impl SensitiveKeys {
    /// An empty specification; nothing matches.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks the scalar under `key` as sensitive, keeping `keep` characters
    /// visible.
    ///
    /// Inserting a key that is already present replaces its directive; keys
    /// are unique within one level.
    #[must_use]
    pub fn keep<K>(mut self, key: K, keep: i64) -> Self
    where
        K: Into<SpecKey>,
    {
        self.entries.insert(key.into(), Directive::Keep(keep));
        self
    }

    /// Applies `keys` one level down, under `key`.
    #[must_use]
    pub fn nested<K>(mut self, key: K, keys: SensitiveKeys) -> Self
    where
        K: Into<SpecKey>,
    {
        self.entries.insert(key.into(), Directive::Nested(keys));
        self
    }

    /// Number of keys at this level.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether this level is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Directive for a named map entry or record field.
    pub(crate) fn for_name(&self, name: &str) -> Option<&Directive> {
        // Avoids building an owned SpecKey per visited entry.
        self.entries
            .iter()
            .find_map(|(key, directive)| match key {
                SpecKey::Name(n) if n == name => Some(directive),
                _ => None,
            })
    }

    /// Directive for an array element.
    pub(crate) fn for_index(&self, index: usize) -> Option<&Directive> {
        self.entries.get(&SpecKey::Index(index))
    }
}

impl<K> FromIterator<(K, Directive)> for SensitiveKeys
where
    K: Into<SpecKey>,
{
    fn from_iter<I: IntoIterator<Item = (K, Directive)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(key, directive)| (key.into(), directive))
                .collect(),
        }
    }
}

#[cfg(feature = "serde")]
mod serde_impls {
    use std::fmt;

    use serde::de::{Deserializer, Error, Visitor};

    use super::SpecKey;

    struct SpecKeyVisitor;

    impl Visitor<'_> for SpecKeyVisitor {
        type Value = SpecKey;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a key name or a non-negative array index")
        }

        fn visit_str<E: Error>(self, name: &str) -> Result<SpecKey, E> {
            Ok(SpecKey::Name(name.to_owned()))
        }

        fn visit_u64<E: Error>(self, index: u64) -> Result<SpecKey, E> {
            usize::try_from(index)
                .map(SpecKey::Index)
                .map_err(|_| E::custom(format!("array index {index} is out of range")))
        }

        fn visit_i64<E: Error>(self, index: i64) -> Result<SpecKey, E> {
            usize::try_from(index)
                .map(SpecKey::Index)
                .map_err(|_| E::custom(format!("array index {index} must be non-negative")))
        }
    }

    /// Map keys deserialize from strings (JSON) or integers (formats that
    /// allow them). JSON object keys are always strings, so index keys are
    /// reachable there only through the builder API.
    impl<'de> serde::Deserialize<'de> for SpecKey {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            deserializer.deserialize_any(SpecKeyVisitor)
        }
    }
}
