//! Filter, update and sort documents understood by every store backend.
//!
//! Paths are dotted field names (`user._id`). Values are compared by type:
//! numbers numerically, strings holding RFC 3339 instants as instants, other
//! strings lexically.

use std::cmp::Ordering;

use chrono::{DateTime, FixedOffset, Utc};
use serde_json::{Map, Value};

pub const ID_FIELD: &str = "_id";

#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    Eq(Value),
    Ne(Value),
    Gte(Value),
    Lt(Value),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstantBound {
    AtLeast(DateTime<Utc>),
    Before(DateTime<Utc>),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    conditions: Vec<(String, Condition)>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn by_id(id: impl Into<Value>) -> Self {
        Self::new().eq(ID_FIELD, id)
    }

    pub fn eq(mut self, path: &str, value: impl Into<Value>) -> Self {
        self.conditions
            .push((path.to_string(), Condition::Eq(value.into())));
        self
    }

    pub fn ne(mut self, path: &str, value: impl Into<Value>) -> Self {
        self.conditions
            .push((path.to_string(), Condition::Ne(value.into())));
        self
    }

    pub fn gte(mut self, path: &str, value: impl Into<Value>) -> Self {
        self.conditions
            .push((path.to_string(), Condition::Gte(value.into())));
        self
    }

    pub fn lt(mut self, path: &str, value: impl Into<Value>) -> Self {
        self.conditions
            .push((path.to_string(), Condition::Lt(value.into())));
        self
    }

    /// The storage key of the document this filter pins by `_id`, if any.
    pub fn id_key(&self) -> Option<String> {
        self.conditions.iter().find_map(|(path, cond)| match cond {
            Condition::Eq(value) if path == ID_FIELD => document_key(value),
            _ => None,
        })
    }

    /// Equality conditions other than `_id` folded into one JSONB
    /// containment document. Instant-valued strings are left out since
    /// containment compares them as text. Every document [`Filter::matches`]
    /// accepts also contains this value.
    pub fn containment(&self) -> Option<Value> {
        let mut document = Value::Object(Map::new());
        let mut any = false;
        for (path, cond) in &self.conditions {
            match cond {
                Condition::Eq(value) if path != ID_FIELD && !is_instant(value) => {
                    assign(&mut document, path, value.clone());
                    any = true;
                }
                _ => {}
            }
        }
        any.then_some(document)
    }

    /// Range conditions whose bound is an RFC 3339 instant.
    pub fn instant_bounds(&self) -> Vec<(&str, InstantBound)> {
        self.conditions
            .iter()
            .filter_map(|(path, cond)| {
                let bound = match cond {
                    Condition::Gte(Value::String(s)) => InstantBound::AtLeast(as_utc(s)?),
                    Condition::Lt(Value::String(s)) => InstantBound::Before(as_utc(s)?),
                    _ => return None,
                };
                Some((path.as_str(), bound))
            })
            .collect()
    }

    pub fn matches(&self, document: &Value) -> bool {
        self.conditions.iter().all(|(path, cond)| {
            let field = lookup(document, path);
            match cond {
                Condition::Eq(expected) => field.is_some_and(|v| values_equal(v, expected)),
                Condition::Ne(expected) => !field.is_some_and(|v| values_equal(v, expected)),
                Condition::Gte(bound) => field
                    .and_then(|v| compare(v, bound))
                    .is_some_and(|o| o != Ordering::Less),
                Condition::Lt(bound) => field
                    .and_then(|v| compare(v, bound))
                    .is_some_and(|o| o == Ordering::Less),
            }
        })
    }

    /// Seed document for an upsert: every equality condition becomes a field.
    fn seed(&self) -> Value {
        let mut document = Value::Object(Map::new());
        for (path, cond) in &self.conditions {
            if let Condition::Eq(value) = cond {
                assign(&mut document, path, value.clone());
            }
        }
        document
    }
}

/// A `$set` update.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Update {
    set: Vec<(String, Value)>,
}

impl Update {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, path: &str, value: impl Into<Value>) -> Self {
        self.set.push((path.to_string(), value.into()));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.set.is_empty()
    }

    pub fn apply(&self, document: &mut Value) {
        for (path, value) in &self.set {
            if path == ID_FIELD {
                continue;
            }
            assign(document, path, value.clone());
        }
    }

    pub fn upsert_document(&self, filter: &Filter) -> Value {
        let mut document = filter.seed();
        self.apply(&mut document);
        document
    }
}

/// Descending order on one path; documents missing the field
/// come last.
#[derive(Debug, Clone, PartialEq)]
pub struct Sort {
    path: String,
}

impl Sort {
    pub fn descending(path: &str) -> Self {
        Self {
            path: path.to_string(),
        }
    }

    pub fn apply(&self, documents: &mut [Value]) {
        documents.sort_by(|a, b| {
            let ordering = match (lookup(a, &self.path), lookup(b, &self.path)) {
                (Some(a), Some(b)) => compare(a, b).unwrap_or(Ordering::Equal),
                (Some(_), None) => Ordering::Greater,
                (None, Some(_)) => Ordering::Less,
                (None, None) => Ordering::Equal,
            };
            ordering.reverse()
        });
    }
}

/// Storage key for an `_id` value: strings verbatim, integers in decimal.
pub fn document_key(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

pub fn lookup<'a>(document: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.')
        .try_fold(document, |current, segment| current.get(segment))
        .filter(|v| !v.is_null())
}

fn assign(document: &mut Value, path: &str, value: Value) {
    let mut segments: Vec<&str> = path.split('.').collect();
    let Some(last) = segments.pop() else {
        return;
    };

    let mut current = document;
    for segment in segments {
        if !current.is_object() {
            *current = Value::Object(Map::new());
        }
        current = match current {
            Value::Object(map) => map
                .entry(segment.to_string())
                .or_insert_with(|| Value::Object(Map::new())),
            _ => return,
        };
    }

    if !current.is_object() {
        *current = Value::Object(Map::new());
    }
    if let Value::Object(map) = current {
        map.insert(last.to_string(), value);
    }
}

fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64() == y.as_f64(),
        _ => a == b,
    }
}

fn as_instant(s: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(s).ok()
}

fn as_utc(s: &str) -> Option<DateTime<Utc>> {
    as_instant(s).map(|at| at.with_timezone(&Utc))
}

fn is_instant(value: &Value) -> bool {
    value.as_str().is_some_and(|s| as_instant(s).is_some())
}

fn compare(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64()?.partial_cmp(&y.as_f64()?),
        (Value::String(x), Value::String(y)) => match (as_instant(x), as_instant(y)) {
            (Some(x), Some(y)) => Some(x.cmp(&y)),
            _ => Some(x.cmp(y)),
        },
        (Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
        _ => None,
    }
}
