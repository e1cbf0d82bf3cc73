//! Attribute records shared by every node kind.
//!
//! A node type declares its attributes as a [`Schema`]: an ordered list of
//! names with optional defaults. Records built from a schema have a fixed key
//! set; writes to other keys are ignored and reads of other keys come back
//! absent. Nodes for unregistered tags carry an *open* record that keeps
//! whatever attributes the document supplied, in document order.

use crate::error::{Error, Result};
use serde_json::Value;
use std::borrow::Cow;
use std::ops::Range;

/// A declared attribute and its default value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttributeSpec {
    pub name: &'static str,
    pub default: Option<&'static str>,
}

impl AttributeSpec {
    /// An attribute without a default.
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            default: None,
        }
    }

    /// An attribute that is set to `default` unless the document overrides it.
    pub const fn with_default(name: &'static str, default: &'static str) -> Self {
        Self {
            name,
            default: Some(default),
        }
    }
}

/// Ordered attribute declarations of a node type.
pub type Schema = &'static [AttributeSpec];

type Entry = (Cow<'static, str>, Option<String>);

/// Key/value record holding the attributes of one node.
#[derive(Debug, Clone, Default)]
pub struct Attributes {
    /// `None` for open records.
    schema: Option<Schema>,
    entries: Vec<Entry>,
}

/// Selects values in [`Attributes::values_at`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector<'a> {
    /// Position in key order; negative positions count from the end.
    Index(isize),
    /// A run of positions.
    Range(Range<usize>),
    /// A key name.
    Key(&'a str),
}

impl From<isize> for Selector<'_> {
    fn from(index: isize) -> Self {
        Selector::Index(index)
    }
}

impl From<usize> for Selector<'_> {
    fn from(index: usize) -> Self {
        // Positions past isize::MAX are out of range for any record
        Selector::Index(isize::try_from(index).unwrap_or(isize::MAX))
    }
}

impl From<Range<usize>> for Selector<'_> {
    fn from(range: Range<usize>) -> Self {
        Selector::Range(range)
    }
}

impl<'a> From<&'a str> for Selector<'a> {
    fn from(key: &'a str) -> Self {
        Selector::Key(key)
    }
}

impl Attributes {
    /// A record with the schema's keys, all absent.
    pub fn with_schema(schema: Schema) -> Self {
        Self {
            schema: Some(schema),
            entries: schema
                .iter()
                .map(|spec| (Cow::Borrowed(spec.name), None))
                .collect(),
        }
    }

    /// A record with the schema's keys set to their declared defaults.
    pub fn defaults(schema: Schema) -> Self {
        Self {
            schema: Some(schema),
            entries: schema
                .iter()
                .map(|spec| (Cow::Borrowed(spec.name), spec.default.map(str::to_string)))
                .collect(),
        }
    }

    /// An open record with no keys.
    pub fn open() -> Self {
        Self::default()
    }

    /// An open record holding `pairs` in the given order.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut attributes = Self::open();
        attributes.extend(pairs);
        attributes
    }

    /// The schema this record was built from, if any.
    pub fn schema(&self) -> Option<Schema> {
        self.schema
    }

    /// Whether the key set is fixed by a schema.
    pub fn is_fixed(&self) -> bool {
        self.schema.is_some()
    }

    /// Number of keys, including absent ones.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if every value is absent.
    pub fn is_empty(&self) -> bool {
        self.entries.iter().all(|(_, value)| value.is_none())
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_ref())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.position(key).is_some()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.position(key)
            .and_then(|index| self.entries[index].1.as_deref())
    }

    /// Assigns `value` to `key`.
    ///
    /// Returns `false` and leaves the record untouched when the record is
    /// fixed and `key` is not part of its schema.
    pub fn set(&mut self, key: &str, value: impl Into<String>) -> bool {
        match self.position(key) {
            Some(index) => {
                self.entries[index].1 = Some(value.into());
                true
            }
            None if self.is_fixed() => {
                tracing::trace!(key, "ignoring attribute outside of schema");
                false
            }
            None => {
                self.entries
                    .push((Cow::Owned(key.to_string()), Some(value.into())));
                true
            }
        }
    }

    /// Unsets `key`, returning its previous value.
    pub fn clear(&mut self, key: &str) -> Option<String> {
        let index = self.position(key)?;
        self.entries[index].1.take()
    }

    /// All `(key, value)` pairs in key order, absent values included.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            inner: self.entries.iter(),
        }
    }

    /// The set values only, in key order.
    pub fn values(&self) -> Vec<&str> {
        self.entries
            .iter()
            .filter_map(|(_, value)| value.as_deref())
            .collect()
    }

    /// Every value in key order, absent values included.
    pub fn to_vec(&self) -> Vec<Option<&str>> {
        self.entries.iter().map(|(_, value)| value.as_deref()).collect()
    }

    /// The set `(key, value)` pairs, in key order.
    pub fn assigned(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .filter_map(|(key, value)| value.as_deref().map(|value| (key.as_ref(), value)))
    }

    /// True if `key` holds exactly its schema default.
    pub fn is_default(&self, key: &str) -> bool {
        let declared = self
            .schema
            .and_then(|schema| schema.iter().find(|spec| spec.name == key))
            .and_then(|spec| spec.default);

        match declared {
            Some(default) => self.get(key) == Some(default),
            None => false,
        }
    }

    /// Value of `key`, or `default` when the key is unknown or unset.
    pub fn fetch<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.get(key).unwrap_or(default)
    }

    /// Value of `key`, or the result of `fallback(key)` when unknown or unset.
    pub fn fetch_or_else<F>(&self, key: &str, fallback: F) -> Cow<'_, str>
    where
        F: FnOnce(&str) -> String,
    {
        match self.get(key) {
            Some(value) => Cow::Borrowed(value),
            None => Cow::Owned(fallback(key)),
        }
    }

    /// Values for a mix of positional, range and key selectors.
    ///
    /// Indices and keys that fall outside the record yield `None`; ranges
    /// are clamped to the record's length.
    pub fn values_at<'s, I, S>(&self, selectors: I) -> Vec<Option<&str>>
    where
        I: IntoIterator<Item = S>,
        S: Into<Selector<'s>>,
    {
        let mut values = Vec::new();

        for selector in selectors {
            match selector.into() {
                Selector::Index(index) => values.push(self.at(index)),
                Selector::Range(range) => {
                    let end = range.end.min(self.entries.len());
                    values.extend((range.start..end).map(|index| self.entries[index].1.as_deref()))
                }
                Selector::Key(key) => values.push(self.get(key)),
            }
        }

        values
    }

    /// Copies every set value of `other` into this record.
    ///
    /// Absent values in `other` never clear a value here, and keys this
    /// record cannot hold are skipped.
    pub fn merge(&mut self, other: &Attributes) -> &mut Self {
        for (key, value) in other.assigned() {
            self.set(key, value);
        }
        self
    }

    /// Assigns each pair in order.
    pub fn extend<I, K, V>(&mut self, pairs: I) -> &mut Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (key, value) in pairs {
            let key = key.into();
            self.set(&key, value);
        }
        self
    }

    /// Merges a JSON object, e.g. from a renderer's configuration.
    ///
    /// `null` members are skipped; scalars are stored in their JSON spelling.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MergeType`] if `other` is not an object.
    pub fn merge_value(&mut self, other: &Value) -> Result<&mut Self> {
        let Value::Object(map) = other else {
            return Err(Error::MergeType {
                found: json_type_name(other),
            });
        };

        for (key, value) in map {
            match value {
                Value::Null => {}
                Value::String(s) => {
                    self.set(key, s.as_str());
                }
                other => {
                    self.set(key, other.to_string());
                }
            }
        }

        Ok(self)
    }

    fn position(&self, key: &str) -> Option<usize> {
        self.entries.iter().position(|(k, _)| k == key)
    }

    fn at(&self, index: isize) -> Option<&str> {
        let len = self.entries.len() as isize;
        let index = if index < 0 { len + index } else { index };

        if (0..len).contains(&index) {
            self.entries[index as usize].1.as_deref()
        } else {
            None
        }
    }
}

impl PartialEq for Attributes {
    fn eq(&self, other: &Self) -> bool {
        match (self.schema, other.schema) {
            // Open records are mappings; key order does not matter
            (None, None) => {
                self.entries.len() == other.entries.len()
                    && self.entries.iter().all(|(key, value)| {
                        other
                            .position(key)
                            .is_some_and(|index| other.entries[index].1 == *value)
                    })
            }
            _ => self.entries == other.entries,
        }
    }
}

/// Iterator over `(key, value)` pairs of an [`Attributes`] record.
#[derive(Debug, Clone)]
pub struct Iter<'a> {
    inner: std::slice::Iter<'a, Entry>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = (&'a str, Option<&'a str>);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner
            .next()
            .map(|(key, value)| (key.as_ref(), value.as_deref()))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<'a> IntoIterator for &'a Attributes {
    type Item = (&'a str, Option<&'a str>);
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
