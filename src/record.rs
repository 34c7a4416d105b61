//! The stored record shape and field matching.

use std::cell::RefCell;
use std::rc::Rc;

use serde_json::{Map, Value};

use crate::error::{CollectionError, Result};
use crate::key::Key;

/// A plain key/value record body, as supplied by callers.
pub type Body = Map<String, Value>;

/// Shared handle to a stored record.
///
/// Updates mutate the record behind the handle, so a handle obtained before
/// an upsert observes the merged fields afterwards.
pub type RecordRef<R> = Rc<RefCell<R>>;

/// A value that can live in a [`Collection`](crate::Collection).
///
/// `Body` implements this directly. Domain structs usually get it from
/// `#[derive(Record)]`.
pub trait Record: Sized {
    /// Build a record from an incoming body on the insert path.
    fn from_body(body: Body) -> Result<Self>;

    /// Current value of a named field, if the record has one.
    fn field(&self, name: &str) -> Option<Value>;

    /// Shallow-merge `fields` onto this record in place.
    fn assign(&mut self, fields: Body) -> Result<()>;

    /// Snapshot of the record as a body.
    fn to_body(&self) -> Body;

    /// The primary-key value stored under `primary_key`.
    ///
    /// Absent or non-scalar values yield `None`; such a record never matches
    /// a lookup.
    fn key(&self, primary_key: &str) -> Option<Key> {
        self.field(primary_key).as_ref().and_then(Key::scalar)
    }
}

impl Record for Body {
    fn from_body(body: Body) -> Result<Self> {
        Ok(body)
    }

    fn field(&self, name: &str) -> Option<Value> {
        self.get(name).cloned()
    }

    fn assign(&mut self, fields: Body) -> Result<()> {
        for (name, value) in fields {
            self.insert(name, value);
        }
        Ok(())
    }

    fn to_body(&self) -> Body {
        self.clone()
    }

    fn key(&self, primary_key: &str) -> Option<Key> {
        self.get(primary_key).and_then(Key::scalar)
    }
}

/// Extract and validate the key of an incoming body.
pub(crate) fn body_key(body: &Body, primary_key: &str) -> Result<Key> {
    match body.get(primary_key) {
        None => Err(CollectionError::MissingPrimaryKey {
            field: primary_key.to_string(),
        }),
        Some(value) => Key::try_from(value),
    }
}

/// Partial deep match of `pattern` against a record.
///
/// Every field named in `pattern` must be present on the record. Nested
/// objects match partially; everything else compares by value, with numbers
/// compared numerically.
pub fn matches_fields<R: Record>(record: &R, pattern: &Body) -> bool {
    pattern.iter().all(|(name, expected)| {
        record
            .field(name)
            .is_some_and(|actual| value_matches(&actual, expected))
    })
}

fn value_matches(actual: &Value, expected: &Value) -> bool {
    match (actual, expected) {
        (Value::Object(actual), Value::Object(expected)) => expected.iter().all(|(k, v)| {
            actual
                .get(k)
                .is_some_and(|inner| value_matches(inner, v))
        }),
        (Value::Array(actual), Value::Array(expected)) => {
            expected.len() <= actual.len()
                && expected
                    .iter()
                    .all(|e| actual.iter().any(|a| value_matches(a, e)))
        }
        (Value::Number(a), Value::Number(b)) => match (a.as_f64(), b.as_f64()) {
            (Some(a), Some(b)) => a == b,
            _ => a == b,
        },
        _ => actual == expected,
    }
}
