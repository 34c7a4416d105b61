use serde::{Deserialize, Serialize};

use crate::key::Key;
use crate::record::Body;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Insert,
    Update,
    Remove,
}

impl ChangeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeKind::Insert => "insert",
            ChangeKind::Update => "update",
            ChangeKind::Remove => "remove",
        }
    }
}

/// A single mutation of an observable sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Change {
    pub kind: ChangeKind,
    /// Position of the record when the mutation happened. For `Remove` this
    /// is the index it occupied just before it was taken out.
    pub index: usize,
    pub key: Option<Key>,
    /// Record after the mutation; the removed record for `Remove`.
    pub record: Body,
}

/// Callback receiving every change, synchronously.
pub type Observer = Box<dyn Fn(&Change)>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub(crate) u64);
