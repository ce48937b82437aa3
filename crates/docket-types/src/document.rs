use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::value::{coerce, Value};

/// Field name to value mapping carried by a document.
pub type Fields = BTreeMap<String, Value>;

/// Store-assigned document identifier.
///
/// Identifiers are unique within their collection for its whole lifetime;
/// a deleted document's id is never handed out again.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocId(u64);

impl DocId {
    /// The first id handed out in a fresh collection.
    pub const FIRST: Self = Self(1);

    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    pub const fn get(self) -> u64 {
        self.0
    }

    /// The id following this one, or `None` at the end of the id space.
    pub const fn checked_next(self) -> Option<Self> {
        match self.0.checked_add(1) {
            Some(n) => Some(Self(n)),
            None => None,
        }
    }
}

impl fmt::Debug for DocId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DocId({})", self.0)
    }
}

impl fmt::Display for DocId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for DocId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

/// A stored document as returned to callers: `{"ID": <int>, "content": {..}}`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Document {
    #[serde(rename = "ID")]
    pub id: DocId,
    pub content: Fields,
}

impl Document {
    pub fn new(id: DocId, content: Fields) -> Self {
        Self { id, content }
    }

    /// Look up a field by name.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.content.get(field)
    }
}

/// Single-field equality predicate: `field == value`.
///
/// There is no range, prefix or boolean composition. A document matches
/// only if it carries `field` and the stored value equals `value` exactly,
/// type included (`Integer(1)` never matches `Text("1")`).
#[derive(Clone, Debug, PartialEq)]
pub struct Query {
    pub field: String,
    pub value: Value,
}

impl Query {
    pub fn new(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Build a query from a textual literal, coercing it first.
    pub fn parse(field: impl Into<String>, literal: &str) -> Self {
        Self {
            field: field.into(),
            value: coerce(literal),
        }
    }

    /// Evaluate the predicate against a document's fields.
    pub fn matches(&self, fields: &Fields) -> bool {
        fields.get(&self.field) == Some(&self.value)
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} == {}", self.field, self.value)
    }
}
