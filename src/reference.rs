//! The normalized reference record model.
//!
//! A [`Reference`] is a mapping from reflib field names to values, where a
//! value is either a single string or an ordered sequence of strings. Field
//! insertion order is preserved because it drives the order of tag lines on
//! encode.
//!
//! The `pages` field is derived: it is synthesized from `startPage`/`endPage`
//! when a decoded record is finalized, and decomposed back into
//! `startPage`/`endPage` before a record is written out.

use compact_str::CompactString;
use indexmap::IndexMap;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::fields;
use crate::regex::Regex;

/// Splits a page range on one or two consecutive hyphens.
static PAGE_RANGE_SEPARATOR: Lazy<Regex> = Lazy::new(|| Regex::new(r"-{1,2}").unwrap());

/// A single field value: one string, or an ordered sequence of strings for
/// array fields such as `authors` and `tags`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Single(String),
    Many(Vec<String>),
}

impl Value {
    /// The string of a scalar value, or `None` for array values.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Single(s) => Some(s),
            Value::Many(_) => None,
        }
    }

    /// The entries of an array value, or `None` for scalar values.
    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            Value::Single(_) => None,
            Value::Many(items) => Some(items),
        }
    }

    /// The scalar string, or the first entry of an array value.
    pub fn first(&self) -> Option<&str> {
        match self {
            Value::Single(s) => Some(s),
            Value::Many(items) => items.first().map(String::as_str),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Single(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Single(s)
    }
}

impl From<Vec<String>> for Value {
    fn from(items: Vec<String>) -> Self {
        Value::Many(items)
    }
}

impl From<Vec<&str>> for Value {
    fn from(items: Vec<&str>) -> Self {
        Value::Many(items.into_iter().map(String::from).collect())
    }
}

/// A normalized bibliographic reference.
///
/// Records are built incrementally while their source lines are consumed, or
/// supplied whole to the encoder; they carry no identity or state beyond the
/// fields themselves.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Reference {
    fields: IndexMap<CompactString, Value>,
}

impl Reference {
    /// Creates an empty reference.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of fields set on this reference.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Get a field value by reflib field name.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Set a field value, keeping the field's existing position when present.
    pub fn set(&mut self, field: impl Into<CompactString>, value: impl Into<Value>) {
        self.fields.insert(field.into(), value.into());
    }

    /// Remove a field, preserving the order of the remaining fields.
    pub fn remove(&mut self, field: &str) -> Option<Value> {
        self.fields.shift_remove(field)
    }

    /// Iterate fields in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// The reflib type name of this reference, if set.
    pub fn ref_type(&self) -> Option<&str> {
        self.get("type").and_then(Value::first)
    }

    /// Append values to an array field, initializing it on first use.
    pub(crate) fn push_values<I>(&mut self, field: impl Into<CompactString>, values: I)
    where
        I: IntoIterator<Item = String>,
    {
        match self
            .fields
            .entry(field.into())
            .or_insert_with(|| Value::Many(Vec::new()))
        {
            Value::Many(items) => items.extend(values),
            // A field's cardinality is fixed by its dictionary entry.
            Value::Single(_) => {}
        }
    }

    /// Join a continuation line onto an open scalar field.
    pub(crate) fn extend_scalar(&mut self, field: &str, line: &str) {
        if let Some(Value::Single(s)) = self.fields.get_mut(field) {
            s.push('\n');
            s.push_str(line);
        }
    }

    /// Trim trailing whitespace from every scalar value.
    pub(crate) fn trim_scalar_values(&mut self) {
        for value in self.fields.values_mut() {
            if let Value::Single(s) = value {
                s.truncate(s.trim_end().len());
            }
        }
    }

    /// Synthesize `pages` from `startPage`/`endPage`, consuming both.
    ///
    /// `"start-end"` when both are present, `start` alone when the end is
    /// missing, `"?"` when only an end page was signaled.
    pub(crate) fn collapse_pages(&mut self) {
        let start = take_scalar(self.remove("startPage"));
        let end = take_scalar(self.remove("endPage"));
        let pages = match (start, end) {
            (Some(start), Some(end)) => format!("{start}-{end}"),
            (Some(start), None) => start,
            (None, Some(_)) => "?".to_string(),
            (None, None) => return,
        };
        self.set("pages", pages);
    }

    /// Decompose `pages` back into `startPage`/`endPage`, consuming it.
    pub(crate) fn expand_pages(&mut self) {
        let Some(pages) = take_scalar(self.remove("pages")) else {
            return;
        };
        let mut parts = PAGE_RANGE_SEPARATOR.splitn(&pages, 3);
        if let Some(start) = parts.next().filter(|s| !s.is_empty()) {
            self.set("startPage", start);
        }
        if let Some(end) = parts.next().filter(|s| !s.is_empty()) {
            self.set("endPage", end);
        }
    }

    /// Resolve the raw RIS type code held in `type` to its reflib type name,
    /// defaulting to `unknown` for absent or unrecognized codes.
    pub(crate) fn resolve_type(&mut self) {
        let name = match self.ref_type() {
            Some(code) => fields::type_name(code),
            None => fields::UNKNOWN_TYPE,
        };
        self.set("type", name);
    }
}

impl<K, V> FromIterator<(K, V)> for Reference
where
    K: Into<CompactString>,
    V: Into<Value>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Non-empty scalar content of a removed value, taking the first entry of an
/// array value.
fn take_scalar(value: Option<Value>) -> Option<String> {
    let scalar = match value {
        Some(Value::Single(s)) => Some(s),
        Some(Value::Many(items)) => items.into_iter().next(),
        None => None,
    };
    scalar.filter(|s| !s.is_empty())
}
