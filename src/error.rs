use serde_json::Value;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CollectionError {
    /// An identifier argument was not a number or a string.
    #[error("invalid identifier: {value} (expected a number or a string)")]
    InvalidIdentifier { value: Value },

    /// A record body carried no value for the collection's primary key.
    #[error("record body has no primary key field `{field}`")]
    MissingPrimaryKey { field: String },

    #[error("invalid record body: {0}")]
    InvalidBody(String),

    #[error("invalid collection config: {0}")]
    InvalidConfig(String),

    #[error("record serialization error: {0}")]
    Serde(String),

    #[error("index {index} out of bounds for sequence of length {len}")]
    IndexOutOfBounds { index: usize, len: usize },
}

pub type Result<T> = std::result::Result<T, CollectionError>;

impl From<serde_json::Error> for CollectionError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serde(err.to_string())
    }
}
