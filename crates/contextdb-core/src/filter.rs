//! Typed payload filters for index search and deletion.
//!
//! A filter is a conjunction of `must` predicates combined with a
//! disjunction of `should` predicates, each an equality check over one
//! payload key. Predicates are typed to the value's kind rather than
//! compared as raw text.

use serde::{Deserialize, Serialize};

use crate::types::DocumentId;

/// The value side of an equality predicate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MatchValue {
    Bool(bool),
    Integer(i64),
    Text(String),
}

impl From<&str> for MatchValue {
    fn from(v: &str) -> Self {
        MatchValue::Text(v.to_string())
    }
}

impl From<String> for MatchValue {
    fn from(v: String) -> Self {
        MatchValue::Text(v)
    }
}

impl From<i64> for MatchValue {
    fn from(v: i64) -> Self {
        MatchValue::Integer(v)
    }
}

impl From<bool> for MatchValue {
    fn from(v: bool) -> Self {
        MatchValue::Bool(v)
    }
}

/// One equality predicate over a payload key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub key: String,
    pub value: MatchValue,
}

impl Condition {
    pub fn equals(key: impl Into<String>, value: impl Into<MatchValue>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Conjunctive (`must`) and disjunctive (`should`) predicates over payload
/// keys. An empty filter matches everything and is rejected by destructive
/// operations.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub must: Vec<Condition>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub should: Vec<Condition>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn must(mut self, condition: Condition) -> Self {
        self.must.push(condition);
        self
    }

    #[must_use]
    pub fn should(mut self, condition: Condition) -> Self {
        self.should.push(condition);
        self
    }

    /// Filter matching every point of one document.
    pub fn for_document(document_id: &DocumentId) -> Self {
        Self::new().must(Condition::equals("document_id", document_id.as_str()))
    }

    /// Filter matching points from any of the given documents.
    pub fn for_any_document<'a>(ids: impl IntoIterator<Item = &'a DocumentId>) -> Self {
        let mut filter = Self::new();
        for id in ids {
            filter.should.push(Condition::equals("document_id", id.as_str()));
        }
        filter
    }

    pub fn is_empty(&self) -> bool {
        self.must.is_empty() && self.should.is_empty()
    }

    /// Local evaluation of the predicate semantics, used by in-memory
    /// test doubles and diagnostics.
    pub fn matches(&self, payload: &serde_json::Value) -> bool {
        let matches_one = |c: &Condition| -> bool {
            let Some(actual) = payload.get(&c.key) else {
                return false;
            };
            match &c.value {
                MatchValue::Bool(b) => actual.as_bool() == Some(*b),
                MatchValue::Integer(i) => actual.as_i64() == Some(*i),
                MatchValue::Text(t) => actual.as_str() == Some(t.as_str()),
            }
        };
        let must_ok = self.must.iter().all(matches_one);
        let should_ok = self.should.is_empty() || self.should.iter().any(matches_one);
        must_ok && should_ok
    }
}
