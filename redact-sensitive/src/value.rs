//! The dynamically-shaped context tree the redaction engine walks.
//!
//! Log context payloads have no schema: a value can be a scalar, a keyed
//! container, a fixed-field record, null, or something the engine has no
//! business looking inside. [`ContextValue`] models that space as a closed
//! set of variants so the traversal can dispatch with an exhaustive `match`
//! instead of runtime type probing.
//!
//! This module is responsible for:
//! - the [`ContextValue`] tree and its [`Scalar`] leaves,
//! - [`Record`], a composite whose fields cannot be reassigned once shared
//!   (redaction rebuilds a copy and rebinds the parent reference),
//! - [`Opaque`], an escape hatch for values the engine cannot classify.
//!
//! It does not decide what is sensitive or how masking works; that lives in
//! `crate::redaction`.

use std::{any::Any, collections::BTreeMap, fmt, sync::Arc};

/// A leaf value in the context tree.
///
/// Non-string scalars are stringified through their `Display` form before
/// masking, so a masked number comes back as a masked string.
#[derive(Clone, Debug, PartialEq)]
pub enum Scalar {
    /// A string value.
    Str(String),
    /// A signed integer value.
    Int(i64),
    /// A floating point value.
    Float(f64),
    /// A boolean value.
    Bool(bool),
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Str(s) => f.write_str(s),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::Bool(b) => write!(f, "{b}"),
        }
    }
}

/// A fixed-field composite in the context tree.
///
/// A `Record` models a value whose fields are set at construction and cannot
/// be reassigned afterwards: the field map lives behind an `Arc`, so clones
/// share it. Redaction never writes through the shared reference; it builds
/// a field-identical copy, masks the copy's matched fields, and rebinds the
/// parent slot to the copy. Holders of the original keep the unredacted
/// fields.
#[derive(Clone, Debug, PartialEq)]
pub struct Record {
    fields: Arc<BTreeMap<String, ContextValue>>,
}

impl Record {
    /// Builds a record from `(name, value)` pairs.
    ///
    /// Later duplicates of a field name replace earlier ones.
    pub fn new<K, V, I>(fields: I) -> Self
    where
        K: Into<String>,
        V: Into<ContextValue>,
        I: IntoIterator<Item = (K, V)>,
    {
        Self {
            fields: Arc::new(
                fields
                    .into_iter()
                    .map(|(name, value)| (name.into(), value.into()))
                    .collect(),
            ),
        }
    }

    /// Returns the value of `field`, if present.
    pub fn get(&self, field: &str) -> Option<&ContextValue> {
        self.fields.get(field)
    }

    /// Iterates over the record's fields in name order.
    pub fn fields(&self) -> impl Iterator<Item = (&String, &ContextValue)> {
        self.fields.iter()
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the record has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Whether two records share the same underlying field storage.
    ///
    /// After redaction rebinds a parent to a rebuilt record, this returns
    /// `false` against the original.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.fields, &other.fields)
    }

    /// Takes the fields out for rebuilding.
    ///
    /// A sole owner gives up its map directly; a shared record yields a
    /// field-identical copy, leaving every other holder untouched.
    pub(crate) fn into_fields(self) -> BTreeMap<String, ContextValue> {
        Arc::try_unwrap(self.fields).unwrap_or_else(|shared| (*shared).clone())
    }

    /// Rebuilds a record around an already-processed field map.
    pub(crate) fn from_fields(fields: BTreeMap<String, ContextValue>) -> Self {
        Self {
            fields: Arc::new(fields),
        }
    }
}

/// A value the engine cannot classify as null, scalar, or container.
///
/// Carries the handle and the type name it was constructed from, so
/// traversal errors can say what they refused to descend into. Two opaques
/// compare equal only when they wrap the same allocation.
#[derive(Clone)]
pub struct Opaque {
    type_name: &'static str,
    handle: Arc<dyn Any + Send + Sync>,
}

impl Opaque {
    /// Wraps an arbitrary value as an opaque handle.
    pub fn new<T>(value: T) -> Self
    where
        T: Any + Send + Sync,
    {
        Self {
            type_name: std::any::type_name::<T>(),
            handle: Arc::new(value),
        }
    }

    /// The type name captured at construction.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Borrows the wrapped value, if it is a `T`.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.handle.downcast_ref()
    }
}

impl fmt::Debug for Opaque {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Opaque").field(&self.type_name).finish()
    }
}

impl PartialEq for Opaque {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.handle, &other.handle)
    }
}

/// A node in the context tree handed to [`crate::Redactor::redact`].
#[derive(Clone, Debug, PartialEq)]
pub enum ContextValue {
    /// Absent value. Never redacted, never descended into.
    Null,
    /// A scalar leaf.
    Scalar(Scalar),
    /// A sequence-indexed container; entries are addressed by position.
    Array(Vec<ContextValue>),
    /// A name-keyed container, mutated in place during redaction.
    Map(BTreeMap<String, ContextValue>),
    /// A fixed-field composite, rebuilt copy-on-write during redaction.
    Record(Record),
    /// An unclassifiable value; traversal refuses to descend into it.
    Opaque(Opaque),
}

impl ContextValue {
    /// Whether this value is [`ContextValue::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Borrows the string payload of a string scalar.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Scalar(Scalar::Str(s)) => Some(s),
            _ => None,
        }
    }

    /// Looks up `key` in a map or record.
    pub fn get(&self, key: &str) -> Option<&ContextValue> {
        match self {
            Self::Map(entries) => entries.get(key),
            Self::Record(record) => record.get(key),
            _ => None,
        }
    }

    /// Looks up a position in an array.
    pub fn get_index(&self, index: usize) -> Option<&ContextValue> {
        match self {
            Self::Array(items) => items.get(index),
            _ => None,
        }
    }
}

impl From<Scalar> for ContextValue {
    fn from(scalar: Scalar) -> Self {
        Self::Scalar(scalar)
    }
}

impl From<&str> for ContextValue {
    fn from(s: &str) -> Self {
        Self::Scalar(Scalar::Str(s.to_owned()))
    }
}

impl From<String> for ContextValue {
    fn from(s: String) -> Self {
        Self::Scalar(Scalar::Str(s))
    }
}

impl From<i64> for ContextValue {
    fn from(i: i64) -> Self {
        Self::Scalar(Scalar::Int(i))
    }
}

impl From<f64> for ContextValue {
    fn from(x: f64) -> Self {
        Self::Scalar(Scalar::Float(x))
    }
}

impl From<bool> for ContextValue {
    fn from(b: bool) -> Self {
        Self::Scalar(Scalar::Bool(b))
    }
}

impl From<Vec<ContextValue>> for ContextValue {
    fn from(items: Vec<ContextValue>) -> Self {
        Self::Array(items)
    }
}

impl From<BTreeMap<String, ContextValue>> for ContextValue {
    fn from(entries: BTreeMap<String, ContextValue>) -> Self {
        Self::Map(entries)
    }
}

impl From<Record> for ContextValue {
    fn from(record: Record) -> Self {
        Self::Record(record)
    }
}

impl From<Opaque> for ContextValue {
    fn from(opaque: Opaque) -> Self {
        Self::Opaque(opaque)
    }
}

impl<T> From<Option<T>> for ContextValue
where
    T: Into<ContextValue>,
{
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

/// Collects `(name, value)` pairs into a [`ContextValue::Map`].
impl<K, V> FromIterator<(K, V)> for ContextValue
where
    K: Into<String>,
    V: Into<ContextValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::Map(
            iter.into_iter()
                .map(|(name, value)| (name.into(), value.into()))
                .collect(),
        )
    }
}

#[cfg(feature = "serde")]
mod serde_impls {
    use serde::ser::{Error as _, Serialize, Serializer};
    use serde_json::Value as JsonValue;

    use super::{ContextValue, Scalar};

    impl From<JsonValue> for ContextValue {
        fn from(value: JsonValue) -> Self {
            match value {
                JsonValue::Null => Self::Null,
                JsonValue::Bool(b) => Self::Scalar(Scalar::Bool(b)),
                JsonValue::Number(n) => {
                    let scalar = if let Some(i) = n.as_i64() {
                        Scalar::Int(i)
                    } else if let Some(x) = n.as_f64() {
                        Scalar::Float(x)
                    } else {
                        // arbitrary-precision numbers fall back to their text form
                        Scalar::Str(n.to_string())
                    };
                    Self::Scalar(scalar)
                }
                JsonValue::String(s) => Self::Scalar(Scalar::Str(s)),
                JsonValue::Array(items) => {
                    Self::Array(items.into_iter().map(Into::into).collect())
                }
                JsonValue::Object(entries) => Self::Map(
                    entries
                        .into_iter()
                        .map(|(name, value)| (name, value.into()))
                        .collect(),
                ),
            }
        }
    }

    impl Serialize for Scalar {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            match self {
                Self::Str(s) => serializer.serialize_str(s),
                Self::Int(i) => serializer.serialize_i64(*i),
                Self::Float(x) => serializer.serialize_f64(*x),
                Self::Bool(b) => serializer.serialize_bool(*b),
            }
        }
    }

    /// Records serialize as plain maps; opaque handles refuse to serialize.
    impl Serialize for ContextValue {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            match self {
                Self::Null => serializer.serialize_unit(),
                Self::Scalar(scalar) => scalar.serialize(serializer),
                Self::Array(items) => serializer.collect_seq(items),
                Self::Map(entries) => serializer.collect_map(entries),
                Self::Record(record) => serializer.collect_map(record.fields()),
                Self::Opaque(opaque) => Err(S::Error::custom(format!(
                    "cannot serialize opaque value of type {}",
                    opaque.type_name()
                ))),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ContextValue, Opaque, Record, Scalar};

    #[test]
    fn scalars_stringify_through_display() {
        assert_eq!(Scalar::Str("abc".to_owned()).to_string(), "abc");
        assert_eq!(Scalar::Int(-42).to_string(), "-42");
        assert_eq!(Scalar::Float(1.5).to_string(), "1.5");
        assert_eq!(Scalar::Bool(true).to_string(), "true");
    }

    #[test]
    fn record_clones_share_fields() {
        let record = Record::new([("value", "foobar")]);
        let clone = record.clone();
        assert!(record.ptr_eq(&clone));
    }

    #[test]
    fn shared_record_fields_are_copied_on_take() {
        let record = Record::new([("value", "foobar")]);
        let clone = record.clone();

        let mut fields = clone.into_fields();
        fields.insert("value".to_owned(), ContextValue::from("changed"));
        let rebuilt = Record::from_fields(fields);

        assert_eq!(record.get("value").and_then(ContextValue::as_str), Some("foobar"));
        assert_eq!(rebuilt.get("value").and_then(ContextValue::as_str), Some("changed"));
        assert!(!record.ptr_eq(&rebuilt));
    }

    #[test]
    fn opaque_preserves_type_name_and_downcast() {
        let opaque = Opaque::new(7_u32);
        assert!(opaque.type_name().ends_with("u32"));
        assert_eq!(opaque.downcast_ref::<u32>(), Some(&7));
        assert_eq!(opaque.downcast_ref::<i64>(), None);
    }

    #[test]
    fn option_converts_to_null_or_value() {
        assert_eq!(ContextValue::from(None::<&str>), ContextValue::Null);
        assert_eq!(ContextValue::from(Some("x")), ContextValue::from("x"));
    }

    #[test]
    fn map_collects_from_pairs() {
        let map: ContextValue = [("a", 1_i64), ("b", 2_i64)].into_iter().collect();
        assert_eq!(map.get("a"), Some(&ContextValue::from(1_i64)));
        assert_eq!(map.get("missing"), None);
    }
}
