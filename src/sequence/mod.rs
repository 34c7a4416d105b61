//! Mutation-observable sequences.
//!
//! The merge engine never replaces the record sequence wholesale. It appends,
//! updates in place and removes through [`ObservableSequence`], and each of
//! those mutations is reported to subscribers as a [`Change`]. Replaying the
//! changes in order against a mirror vector reproduces the sequence.

mod change;
mod observable_vec;

pub use change::{Change, ChangeKind, Observer, SubscriptionId};
pub use observable_vec::ObservableVec;

use crate::error::Result;
use crate::record::{Body, Record, RecordRef};

/// An ordered record sequence that reports every mutation.
pub trait ObservableSequence<R: Record> {
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Handle to the record at `index`.
    fn get(&self, index: usize) -> Option<&RecordRef<R>>;

    /// Iterate the records in storage order.
    fn iter(&self) -> std::slice::Iter<'_, RecordRef<R>>;

    /// Push a record to the end and emit `Insert`.
    fn append(&mut self, record: R) -> RecordRef<R>;

    /// Merge `fields` into the record at `index` in place and emit `Update`.
    fn update_at(&mut self, index: usize, fields: Body) -> Result<RecordRef<R>>;

    /// Remove every record matching `predicate`, keeping the order of the
    /// rest, and emit one `Remove` per record. Returns the removed records in
    /// storage order.
    fn remove_where(&mut self, predicate: &dyn Fn(&R) -> bool) -> Vec<RecordRef<R>>;

    fn subscribe(&mut self, observer: Observer) -> SubscriptionId;

    /// Detach an observer. Returns false if the id was not subscribed.
    fn unsubscribe(&mut self, id: SubscriptionId) -> bool;
}
