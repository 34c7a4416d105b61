//! Primary-key indexed record collections with upsert merging.
//!
//! A [`Collection`] keeps records in an ordered sequence with unique,
//! weakly compared keys. Batches of plain JSON bodies are merged in: records
//! with a matching key are updated in place, the rest are appended. Each
//! insert, update and removal is reported to subscribers as a [`Change`].

extern crate self as keyed_collection;

mod collection;
mod config;
#[cfg(feature = "emitter")]
mod emitter;
mod error;
mod hooks;
mod key;
pub mod merge;
mod record;
pub mod sequence;
mod shape;

pub use collection::{Collection, CollectionBuilder, Predicate};
pub use config::{CollectionConfig, DEFAULT_PRIMARY_KEY};
#[cfg(feature = "emitter")]
pub use emitter::{EmitterBridge, CHANGE_EVENT};
pub use error::{CollectionError, Result};
pub use hooks::Hooks;
pub use key::Key;
pub use record::{matches_fields, Body, Record, RecordRef};
pub use sequence::{Change, ChangeKind, ObservableSequence, ObservableVec, SubscriptionId};
pub use shape::{Batch, Ids, Merged, Selection};

// Derive macro for `Record`
pub use keyed_collection_macros::Record;

#[cfg(feature = "emitter")]
pub use event_emitter_rs::EventEmitter;

/// Support code for `#[derive(Record)]`. Not public API.
#[doc(hidden)]
pub mod __private {
    use serde::de::DeserializeOwned;
    use serde::Serialize;

    pub use serde_json::Value;

    use crate::error::{CollectionError, Result};
    use crate::record::Body;

    /// Take a field out of `body`; a missing field deserializes from `null`.
    pub fn take_field<T: DeserializeOwned>(body: &mut Body, name: &str) -> Result<T> {
        let value = body.remove(name).unwrap_or(Value::Null);
        from_value(name, value)
    }

    pub fn from_value<T: DeserializeOwned>(name: &str, value: Value) -> Result<T> {
        serde_json::from_value(value)
            .map_err(|err| CollectionError::Serde(format!("field `{}`: {}", name, err)))
    }

    /// Serialize a field; a field that fails to serialize is left out.
    pub fn to_value<T: Serialize>(name: &str, value: &T) -> Option<Value> {
        match serde_json::to_value(value) {
            Ok(value) => Some(value),
            Err(err) => {
                tracing::warn!(field = name, %err, "field failed to serialize");
                None
            }
        }
    }
}
