//! Primary-key values and the identifier validator.
//!
//! Keys are compared weakly: a number and a string holding the same
//! canonical text are the same key, so `1`, `1.0` and `"1"` all address one
//! record. The comparison normalizes both sides to a string first; strict
//! `PartialEq` is still available when the distinction matters.

use std::borrow::Cow;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

use crate::error::{CollectionError, Result};

/// A scalar primary-key value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Key {
    Number(Number),
    String(String),
}

impl Key {
    /// Canonical text used for weak comparison.
    pub fn normalized(&self) -> Cow<'_, str> {
        match self {
            Key::String(s) => Cow::Borrowed(s.as_str()),
            Key::Number(n) => Cow::Owned(normalize_number(n)),
        }
    }

    /// Cross-type equality: `Key::from(2)` matches `Key::from("2")`.
    pub fn weak_eq(&self, other: &Key) -> bool {
        match (self, other) {
            (Key::String(a), Key::String(b)) => a == b,
            _ => self.normalized() == other.normalized(),
        }
    }

    pub fn to_value(&self) -> Value {
        match self {
            Key::Number(n) => Value::Number(n.clone()),
            Key::String(s) => Value::String(s.clone()),
        }
    }

    /// The key held by `value`, if it is a number or a string.
    pub fn scalar(value: &Value) -> Option<Key> {
        match value {
            Value::Number(n) => Some(Key::Number(n.clone())),
            Value::String(s) => Some(Key::String(s.clone())),
            _ => None,
        }
    }

    /// Validate every element of `values`, failing on the first non-scalar.
    pub fn parse_all(values: &[Value]) -> Result<Vec<Key>> {
        values.iter().map(Key::try_from).collect()
    }
}

fn normalize_number(n: &Number) -> String {
    if n.is_i64() || n.is_u64() {
        return n.to_string();
    }

    match n.as_f64() {
        // 2^53: beyond this, integral floats lose their exact integer text.
        Some(f) if f.fract() == 0.0 && f.abs() < 9_007_199_254_740_992.0 => {
            format!("{}", f as i64)
        }
        Some(f) => format!("{}", f),
        None => n.to_string(),
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.normalized())
    }
}

impl TryFrom<&Value> for Key {
    type Error = CollectionError;

    fn try_from(value: &Value) -> Result<Self> {
        Key::scalar(value).ok_or_else(|| {
            tracing::warn!(value = %value, "rejected identifier");
            CollectionError::InvalidIdentifier {
                value: value.clone(),
            }
        })
    }
}

impl TryFrom<Value> for Key {
    type Error = CollectionError;

    fn try_from(value: Value) -> Result<Self> {
        Key::try_from(&value)
    }
}

macro_rules! key_from_integer {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Key {
                fn from(value: $ty) -> Self {
                    Key::Number(Number::from(value))
                }
            }
        )*
    };
}

key_from_integer!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

impl From<&str> for Key {
    fn from(value: &str) -> Self {
        Key::String(value.to_string())
    }
}

impl From<String> for Key {
    fn from(value: String) -> Self {
        Key::String(value)
    }
}
