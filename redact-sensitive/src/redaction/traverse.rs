//! The traversal engine: walks a context tree under a specification tree.
//!
//! The walk is a pure depth-first recursion over owned values. Each
//! container entry is matched against the current [`SensitiveKeys`] level:
//! matched scalars are masked, matched containers narrow the specification,
//! and unmatched containers are searched with the *same* specification — the
//! wildcard fallback that makes key matching depth-independent.
//!
//! The engine consumes its input and returns a rebuilt tree, so a failed
//! call can never leak a half-redacted payload: the partially rebuilt tree
//! is dropped with the error.
//!
//! It does not log, perform I/O, or retry. Errors propagate to the caller,
//! and it is the integrating pipeline's decision what to do with the record.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;

use thiserror::Error;

use crate::redaction::mask::MaskFormat;
use crate::redaction::spec::{Directive, SensitiveKeys};
use crate::value::{ContextValue, Record, Scalar};

/// Failure raised by [`Redactor::redact`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RedactError {
    /// Traversal had to descend into a value that is neither null, scalar,
    /// nor a recognized container.
    #[error("cannot traverse value at key `{key}`")]
    UnsupportedValue {
        /// The key the untraversable value was found under.
        key: String,
    },
    /// The specification is malformed for the data it was applied to.
    #[error("invalid sensitive-keys specification: {reason}")]
    InvalidSpec {
        /// What is wrong with the specification.
        reason: String,
    },
}

/// The key of the entry currently being visited.
enum EntryKey<'a> {
    Name(&'a str),
    Index(usize),
}

impl fmt::Display for EntryKey<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name(name) => f.write_str(name),
            Self::Index(index) => write!(f, "{index}"),
        }
    }
}

impl EntryKey<'_> {
    fn directive<'k>(&self, keys: &'k SensitiveKeys) -> Option<&'k Directive> {
        match self {
            Self::Name(name) => keys.for_name(name),
            Self::Index(index) => keys.for_index(*index),
        }
    }
}

/// Redacts sensitive values out of structured log context payloads.
///
/// A `Redactor` pairs a [`SensitiveKeys`] specification with a
/// [`MaskFormat`] and applies both to whole context trees:
///
/// ```
/// use redact_sensitive::{ContextValue, Redactor, SensitiveKeys};
///
/// let redactor = Redactor::new(SensitiveKeys::new().keep("api_key", 4));
/// let context: ContextValue = [("api_key", "mysupersecretapikey")].into_iter().collect();
///
/// let redacted = redactor.redact(context)?;
/// assert_eq!(redacted.get("api_key").and_then(ContextValue::as_str), Some("mysu***************"));
/// # Ok::<(), redact_sensitive::RedactError>(())
/// ```
///
/// Both parts are immutable after construction; a `Redactor` can be shared
/// freely across threads, each call operating on its own tree.
#[derive(Clone, Debug)]
pub struct Redactor {
    keys: SensitiveKeys,
    format: MaskFormat,
}

impl Redactor {
    /// Creates a redactor for `keys` with the default [`MaskFormat`].
    #[must_use]
    pub fn new(keys: SensitiveKeys) -> Self {
        Self {
            keys,
            format: MaskFormat::new(),
        }
    }

    /// Replaces the whole mask format.
    #[must_use]
    pub fn with_format(mut self, format: MaskFormat) -> Self {
        self.format = format;
        self
    }

    /// Uses a specific replacement character.
    #[must_use]
    pub fn with_replacement(mut self, replacement: char) -> Self {
        self.format = self.format.with_replacement(replacement);
        self
    }

    /// Renders masked segments through `template`; see
    /// [`MaskFormat::with_template`].
    #[must_use]
    pub fn with_template<T>(mut self, template: T) -> Self
    where
        T: Into<Cow<'static, str>>,
    {
        self.format = self.format.with_template(template);
        self
    }

    /// Caps masked output length; see [`MaskFormat::with_length_limit`].
    #[must_use]
    pub fn with_length_limit(mut self, length_limit: usize) -> Self {
        self.format = self.format.with_length_limit(length_limit);
        self
    }

    /// Redacts every matched value in `context` and returns the rebuilt
    /// tree.
    ///
    /// A root that is not a container (null, scalar, opaque) has no keys to
    /// match and is returned unchanged.
    ///
    /// # Errors
    ///
    /// [`RedactError::UnsupportedValue`] when the walk must descend into an
    /// opaque value, [`RedactError::InvalidSpec`] when a keep directive is
    /// applied to a container.
    pub fn redact(&self, context: ContextValue) -> Result<ContextValue, RedactError> {
        match context {
            ContextValue::Array(items) => {
                Ok(ContextValue::Array(self.redact_items(items, &self.keys)?))
            }
            ContextValue::Map(entries) => {
                Ok(ContextValue::Map(self.redact_fields(entries, &self.keys)?))
            }
            ContextValue::Record(record) => {
                Ok(ContextValue::Record(self.redact_record(record, &self.keys)?))
            }
            other => Ok(other),
        }
    }

    /// Applies the per-entry rule to one `(key, value)` pair.
    fn redact_entry(
        &self,
        key: &EntryKey<'_>,
        value: ContextValue,
        keys: &SensitiveKeys,
    ) -> Result<ContextValue, RedactError> {
        match value {
            // Null is not a redaction target and not traversable.
            ContextValue::Null => Ok(ContextValue::Null),
            ContextValue::Scalar(scalar) => match key.directive(keys) {
                Some(&Directive::Keep(keep)) => {
                    let masked = self.format.apply_to(&scalar.to_string(), keep);
                    Ok(ContextValue::Scalar(Scalar::Str(masked)))
                }
                // A nested directive cannot apply to a scalar leaf.
                _ => Ok(ContextValue::Scalar(scalar)),
            },
            ContextValue::Array(items) => {
                let keys = self.child_keys(key, keys)?;
                Ok(ContextValue::Array(self.redact_items(items, keys)?))
            }
            ContextValue::Map(entries) => {
                let keys = self.child_keys(key, keys)?;
                Ok(ContextValue::Map(self.redact_fields(entries, keys)?))
            }
            ContextValue::Record(record) => {
                let keys = self.child_keys(key, keys)?;
                Ok(ContextValue::Record(self.redact_record(record, keys)?))
            }
            // Not null, not scalar, not a container: descending is the only
            // remaining move, and it is impossible.
            ContextValue::Opaque(_) => Err(RedactError::UnsupportedValue {
                key: key.to_string(),
            }),
        }
    }

    /// Resolves the specification to carry into a container under `key`:
    /// the nested level on a match, the current level otherwise (wildcard
    /// fallback).
    fn child_keys<'k>(
        &self,
        key: &EntryKey<'_>,
        keys: &'k SensitiveKeys,
    ) -> Result<&'k SensitiveKeys, RedactError> {
        match key.directive(keys) {
            Some(Directive::Nested(nested)) => Ok(nested),
            Some(Directive::Keep(_)) => Err(RedactError::InvalidSpec {
                reason: format!("expected nested keys at `{key}`, found a keep directive"),
            }),
            None => Ok(keys),
        }
    }

    fn redact_items(
        &self,
        items: Vec<ContextValue>,
        keys: &SensitiveKeys,
    ) -> Result<Vec<ContextValue>, RedactError> {
        items
            .into_iter()
            .enumerate()
            .map(|(index, value)| self.redact_entry(&EntryKey::Index(index), value, keys))
            .collect()
    }

    fn redact_fields(
        &self,
        fields: BTreeMap<String, ContextValue>,
        keys: &SensitiveKeys,
    ) -> Result<BTreeMap<String, ContextValue>, RedactError> {
        fields
            .into_iter()
            .map(|(name, value)| {
                let value = self.redact_entry(&EntryKey::Name(&name), value, keys)?;
                Ok((name, value))
            })
            .collect()
    }

    /// Record fields cannot be reassigned behind their shared handle:
    /// redact a field-identical copy and let the parent rebind to it.
    fn redact_record(
        &self,
        record: Record,
        keys: &SensitiveKeys,
    ) -> Result<Record, RedactError> {
        let fields = self.redact_fields(record.into_fields(), keys)?;
        Ok(Record::from_fields(fields))
    }
}

#[cfg(test)]
mod tests {
    use super::{RedactError, Redactor};
    use crate::redaction::spec::SensitiveKeys;
    use crate::value::{ContextValue, Opaque, Record};

    fn map<const N: usize>(entries: [(&str, ContextValue); N]) -> ContextValue {
        entries.into_iter().collect()
    }

    #[test]
    fn masks_a_matched_scalar() {
        let redactor = Redactor::new(SensitiveKeys::new().keep("test", 3));
        let redacted = redactor.redact(map([("test", "foobar".into())])).unwrap();
        assert_eq!(redacted.get("test").and_then(ContextValue::as_str), Some("foo***"));
    }

    #[test]
    fn leaves_unmatched_scalars_alone() {
        let redactor = Redactor::new(SensitiveKeys::new().keep("test", 3));
        let redacted = redactor
            .redact(map([("test", "foobar".into()), ("other", "value".into())]))
            .unwrap();
        assert_eq!(redacted.get("other").and_then(ContextValue::as_str), Some("value"));
    }

    #[test]
    fn null_is_never_touched() {
        let redactor = Redactor::new(SensitiveKeys::new().keep("optionalKey", 10));
        let redacted = redactor
            .redact(map([("optionalKey", ContextValue::Null)]))
            .unwrap();
        assert!(redacted.get("optionalKey").is_some_and(ContextValue::is_null));
    }

    #[test]
    fn wildcard_fallback_matches_at_depth() {
        let redactor = Redactor::new(SensitiveKeys::new().keep("nested", 3));
        let context = map([("test", map([("nested", "foobar".into())]))]);

        let redacted = redactor.redact(context).unwrap();
        let inner = redacted.get("test").and_then(|v| v.get("nested"));
        assert_eq!(inner.and_then(ContextValue::as_str), Some("foo***"));
    }

    #[test]
    fn nested_keys_narrow_the_specification() {
        let keys = SensitiveKeys::new().nested("test", SensitiveKeys::new().keep("nested", 3));
        let redactor = Redactor::new(keys);
        let context = map([("test", map([("nested", "foobar".into())]))]);

        let redacted = redactor.redact(context).unwrap();
        let inner = redacted.get("test").and_then(|v| v.get("nested"));
        assert_eq!(inner.and_then(ContextValue::as_str), Some("foo***"));
    }

    #[test]
    fn record_is_rebuilt_not_mutated() {
        let record = Record::new([("value", "foobar")]);
        let original = record.clone();

        let redactor = Redactor::new(SensitiveKeys::new().keep("value", 3));
        let redacted = redactor.redact(map([("nested", record.into())])).unwrap();

        let rebuilt = match redacted.get("nested") {
            Some(ContextValue::Record(rebuilt)) => rebuilt,
            other => panic!("expected record, got {other:?}"),
        };
        assert_eq!(rebuilt.get("value").and_then(ContextValue::as_str), Some("foo***"));
        assert_eq!(original.get("value").and_then(ContextValue::as_str), Some("foobar"));
        assert!(!rebuilt.ptr_eq(&original));
    }

    #[test]
    fn opaque_value_fails_with_its_key() {
        let redactor = Redactor::new(SensitiveKeys::new().keep("test", 3));
        let context = map([("test", Opaque::new(std::fs::File::open("/dev/null")).into())]);

        let err = redactor.redact(context).unwrap_err();
        assert_eq!(err, RedactError::UnsupportedValue { key: "test".to_owned() });
    }

    #[test]
    fn keep_directive_on_a_container_is_an_invalid_spec() {
        let redactor = Redactor::new(SensitiveKeys::new().keep("test", 3));
        let context = map([("test", map([("inner", "foobar".into())]))]);

        match redactor.redact(context) {
            Err(RedactError::InvalidSpec { reason }) => assert!(reason.contains("test")),
            other => panic!("expected invalid spec, got {other:?}"),
        }
    }

    #[test]
    fn non_container_roots_pass_through() {
        let redactor = Redactor::new(SensitiveKeys::new().keep("test", 3));
        assert_eq!(redactor.redact(ContextValue::Null).unwrap(), ContextValue::Null);
        assert_eq!(
            redactor.redact("foobar".into()).unwrap(),
            ContextValue::from("foobar")
        );

        let opaque: ContextValue = Opaque::new(42_u8).into();
        assert_eq!(redactor.redact(opaque.clone()).unwrap(), opaque);
    }
}
