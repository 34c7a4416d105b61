use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use super::{Change, ChangeKind, ObservableSequence, Observer, SubscriptionId};
use crate::error::{CollectionError, Result};
use crate::record::{Body, Record, RecordRef};

/// `Vec`-backed [`ObservableSequence`].
///
/// Observers are called synchronously, in subscription order, after the
/// mutation has been applied.
pub struct ObservableVec<R: Record> {
    records: Vec<RecordRef<R>>,
    primary_key: String,
    observers: Vec<(SubscriptionId, Observer)>,
    next_subscription: u64,
}

impl<R: Record> ObservableVec<R> {
    /// `primary_key` names the field reported as `Change::key`.
    pub fn new(primary_key: impl Into<String>) -> Self {
        Self {
            records: Vec::new(),
            primary_key: primary_key.into(),
            observers: Vec::new(),
            next_subscription: 1,
        }
    }

    pub fn as_slice(&self) -> &[RecordRef<R>] {
        &self.records
    }

    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    fn notify(&self, kind: ChangeKind, index: usize, record: &R) {
        if self.observers.is_empty() {
            return;
        }

        let change = Change {
            kind,
            index,
            key: record.key(&self.primary_key),
            record: record.to_body(),
        };

        for (_, observer) in &self.observers {
            observer(&change);
        }
    }
}

impl<R: Record> ObservableSequence<R> for ObservableVec<R> {
    fn len(&self) -> usize {
        self.records.len()
    }

    fn get(&self, index: usize) -> Option<&RecordRef<R>> {
        self.records.get(index)
    }

    fn iter(&self) -> std::slice::Iter<'_, RecordRef<R>> {
        self.records.iter()
    }

    fn append(&mut self, record: R) -> RecordRef<R> {
        let record = Rc::new(RefCell::new(record));
        self.records.push(Rc::clone(&record));
        self.notify(ChangeKind::Insert, self.records.len() - 1, &record.borrow());
        record
    }

    fn update_at(&mut self, index: usize, fields: Body) -> Result<RecordRef<R>> {
        let record = self
            .records
            .get(index)
            .map(Rc::clone)
            .ok_or(CollectionError::IndexOutOfBounds {
                index,
                len: self.records.len(),
            })?;

        record.borrow_mut().assign(fields)?;
        self.notify(ChangeKind::Update, index, &record.borrow());
        Ok(record)
    }

    fn remove_where(&mut self, predicate: &dyn Fn(&R) -> bool) -> Vec<RecordRef<R>> {
        let mut kept = Vec::with_capacity(self.records.len());
        let mut removed = Vec::new();

        for record in self.records.drain(..) {
            if predicate(&record.borrow()) {
                // Earlier removals have already shifted this record down to
                // the slot just past the records kept so far.
                removed.push((kept.len(), record));
            } else {
                kept.push(record);
            }
        }
        self.records = kept;

        removed
            .into_iter()
            .map(|(index, record)| {
                self.notify(ChangeKind::Remove, index, &record.borrow());
                record
            })
            .collect()
    }

    fn subscribe(&mut self, observer: Observer) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.observers.push((id, observer));
        id
    }

    fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(existing, _)| *existing != id);
        self.observers.len() != before
    }
}

impl<R: Record + fmt::Debug> fmt::Debug for ObservableVec<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObservableVec")
            .field("records", &self.records)
            .field("primary_key", &self.primary_key)
            .field("observers", &self.observers.len())
            .finish()
    }
}
