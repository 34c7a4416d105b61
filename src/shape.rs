//! Argument and return shapes for operations that take either one item or a
//! sequence and answer in kind.

use serde_json::Value;

use crate::error::{CollectionError, Result};
use crate::key::Key;
use crate::record::Body;

/// Identifier argument for `get` and `remove`.
///
/// Values are validated when the operation runs, so `Ids::One(Value::Null)`
/// is constructible and fails there with `InvalidIdentifier`.
#[derive(Debug, Clone, PartialEq)]
pub enum Ids {
    One(Value),
    Many(Vec<Value>),
}

macro_rules! ids_from_scalar {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Ids {
                fn from(value: $ty) -> Self {
                    Ids::One(Value::from(value))
                }
            }
        )*
    };
}

ids_from_scalar!(i32, i64, u32, u64, usize, f64, &str, String);

impl From<Key> for Ids {
    fn from(key: Key) -> Self {
        Ids::One(key.to_value())
    }
}

impl From<&Key> for Ids {
    fn from(key: &Key) -> Self {
        Ids::One(key.to_value())
    }
}

/// A JSON array becomes `Many`; any other value is a single identifier.
impl From<Value> for Ids {
    fn from(value: Value) -> Self {
        match value {
            Value::Array(values) => Ids::Many(values),
            other => Ids::One(other),
        }
    }
}

impl<T: Into<Value>> From<Vec<T>> for Ids {
    fn from(values: Vec<T>) -> Self {
        Ids::Many(values.into_iter().map(Into::into).collect())
    }
}

impl Ids {
    /// Validate every identifier, failing on the first invalid one.
    pub(crate) fn into_keys(self) -> Result<(Vec<Key>, bool)> {
        match self {
            Ids::One(value) => Ok((vec![Key::try_from(&value)?], false)),
            Ids::Many(values) => Ok((Key::parse_all(&values)?, true)),
        }
    }
}

/// Record bodies for `upsert`, `replace` and construction.
#[derive(Debug, Clone, PartialEq)]
pub enum Batch {
    One(Body),
    Many(Vec<Body>),
}

impl Batch {
    pub fn empty() -> Self {
        Batch::Many(Vec::new())
    }

    pub fn len(&self) -> usize {
        match self {
            Batch::One(_) => 1,
            Batch::Many(bodies) => bodies.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub(crate) fn into_parts(self) -> (Vec<Body>, bool) {
        match self {
            Batch::One(body) => (vec![body], false),
            Batch::Many(bodies) => (bodies, true),
        }
    }
}

impl From<Body> for Batch {
    fn from(body: Body) -> Self {
        Batch::One(body)
    }
}

impl From<Vec<Body>> for Batch {
    fn from(bodies: Vec<Body>) -> Self {
        Batch::Many(bodies)
    }
}

impl TryFrom<Value> for Batch {
    type Error = CollectionError;

    fn try_from(value: Value) -> Result<Self> {
        match value {
            Value::Object(body) => Ok(Batch::One(body)),
            Value::Array(values) => values
                .into_iter()
                .map(|value| match value {
                    Value::Object(body) => Ok(body),
                    other => Err(CollectionError::InvalidBody(format!(
                        "expected an object, got {}",
                        other
                    ))),
                })
                .collect::<Result<Vec<_>>>()
                .map(Batch::Many),
            other => Err(CollectionError::InvalidBody(format!(
                "expected an object or an array of objects, got {}",
                other
            ))),
        }
    }
}

/// Result of `get` and `remove`, mirroring the identifier argument.
#[derive(Debug, Clone, PartialEq)]
pub enum Selection<T> {
    One(Option<T>),
    Many(Vec<T>),
}

impl<T> Selection<T> {
    pub(crate) fn from_parts(mut items: Vec<T>, many: bool) -> Self {
        if many {
            Selection::Many(items)
        } else {
            Selection::One(items.pop())
        }
    }

    /// The single result; for `Many`, the first element.
    pub fn into_one(self) -> Option<T> {
        match self {
            Selection::One(item) => item,
            Selection::Many(items) => items.into_iter().next(),
        }
    }

    pub fn into_vec(self) -> Vec<T> {
        match self {
            Selection::One(item) => item.into_iter().collect(),
            Selection::Many(items) => items,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Selection::One(item) => usize::from(item.is_some()),
            Selection::Many(items) => items.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Result of `upsert`, mirroring the batch argument.
#[derive(Debug, Clone, PartialEq)]
pub enum Merged<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> Merged<T> {
    pub(crate) fn from_parts(mut items: Vec<T>, many: bool) -> Self {
        match items.pop() {
            Some(item) if !many && items.is_empty() => Merged::One(item),
            Some(item) => {
                items.push(item);
                Merged::Many(items)
            }
            None => Merged::Many(items),
        }
    }

    pub fn into_one(self) -> Option<T> {
        match self {
            Merged::One(item) => Some(item),
            Merged::Many(items) => items.into_iter().next(),
        }
    }

    pub fn into_vec(self) -> Vec<T> {
        match self {
            Merged::One(item) => vec![item],
            Merged::Many(items) => items,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Merged::One(_) => 1,
            Merged::Many(items) => items.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
