//! Collection - an ordered, primary-key indexed record sequence.
//!
//! Records are kept in insertion order. Upserts update records with a
//! weakly equal key in place and append everything else. Every mutation goes
//! through the observable sequence, so subscribers see inserts, updates and
//! removals individually rather than a replaced collection.
//!
//! ## Example
//!
//! ```ignore
//! use keyed_collection::{Batch, Collection};
//! use serde_json::json;
//!
//! let mut todos = Collection::with_records(Batch::try_from(json!([
//!     {"id": 1, "text": "write"},
//!     {"id": 2, "text": "test"},
//! ]))?)?;
//!
//! todos.upsert(Batch::try_from(json!({"id": "2", "done": true}))?)?;
//! let done = todos.get(2)?.into_one();
//! ```

use std::fmt;

use crate::config::CollectionConfig;
use crate::error::Result;
use crate::hooks::Hooks;
use crate::key::Key;
use crate::merge::{self, MergePath};
use crate::record::{matches_fields, Body, Record, RecordRef};
use crate::sequence::{Change, ObservableSequence, ObservableVec, Observer, SubscriptionId};
use crate::shape::{Batch, Ids, Merged, Selection};

/// Predicate for [`Collection::find`] and [`Collection::filter`].
pub enum Predicate<'a, R> {
    /// Arbitrary test on the stored record.
    Func(&'a dyn Fn(&R) -> bool),
    /// Partial field match; see [`matches_fields`].
    Fields(&'a Body),
}

impl<'a, R: Record> Predicate<'a, R> {
    pub fn test(&self, record: &R) -> bool {
        match self {
            Predicate::Func(f) => f(record),
            Predicate::Fields(fields) => matches_fields(record, fields),
        }
    }
}

impl<'a, R> From<&'a Body> for Predicate<'a, R> {
    fn from(fields: &'a Body) -> Self {
        Predicate::Fields(fields)
    }
}

/// An ordered record collection with unique primary keys.
///
/// Single-threaded: records are shared as `Rc<RefCell<R>>`. Holding a
/// `borrow_mut` of a record across a call that updates it panics.
pub struct Collection<R: Record = Body> {
    records: ObservableVec<R>,
    primary_key: String,
    hooks: Hooks<R>,
}

impl<R: Record> Default for Collection<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Record> Collection<R> {
    /// Create an empty collection keyed by `id`.
    pub fn new() -> Self {
        Self::with_config(CollectionConfig::default(), Hooks::default())
    }

    /// Create a collection seeded through the merge engine.
    pub fn with_records(batch: impl Into<Batch>) -> Result<Self> {
        let mut collection = Self::new();
        collection.upsert(batch)?;
        Ok(collection)
    }

    pub fn builder() -> CollectionBuilder<R> {
        CollectionBuilder::new()
    }

    fn with_config(config: CollectionConfig, hooks: Hooks<R>) -> Self {
        Self {
            records: ObservableVec::new(config.primary_key.clone()),
            primary_key: config.primary_key,
            hooks,
        }
    }

    pub fn primary_key(&self) -> &str {
        &self.primary_key
    }

    pub fn hooks(&self) -> &Hooks<R> {
        &self.hooks
    }

    /// Swap the hook set used by later merges.
    pub fn set_hooks(&mut self, hooks: Hooks<R>) {
        self.hooks = hooks;
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// All records in storage order.
    pub fn records(&self) -> &[RecordRef<R>] {
        self.records.as_slice()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RecordRef<R>> {
        self.records.iter()
    }

    /// Every record as a body, in storage order.
    pub fn snapshot(&self) -> Vec<Body> {
        self.records.iter().map(|r| r.borrow().to_body()).collect()
    }

    // Queries

    /// Look up one key or a list of keys.
    ///
    /// A list answers in request order and skips keys with no record. Any
    /// identifier that is not a number or a string fails the whole call.
    pub fn get(&self, ids: impl Into<Ids>) -> Result<Selection<RecordRef<R>>> {
        let (keys, many) = Into::<Ids>::into(ids).into_keys()?;
        Ok(Selection::from_parts(self.get_many(&keys), many))
    }

    pub fn get_one(&self, key: impl Into<Key>) -> Option<RecordRef<R>> {
        let key = key.into();
        merge::find_by_key(&self.records, &self.primary_key, &key).map(|(_, record)| record)
    }

    /// Records for `keys`, in the order of `keys`, skipping misses.
    pub fn get_many(&self, keys: &[Key]) -> Vec<RecordRef<R>> {
        keys.iter()
            .filter_map(|key| {
                merge::find_by_key(&self.records, &self.primary_key, key).map(|(_, record)| record)
            })
            .collect()
    }

    /// First record in storage order matching `predicate`.
    pub fn find(&self, predicate: Predicate<'_, R>) -> Option<RecordRef<R>> {
        self.records
            .iter()
            .find(|record| predicate.test(&record.borrow()))
            .cloned()
    }

    /// All records matching `predicate`, in storage order.
    pub fn filter(&self, predicate: Predicate<'_, R>) -> Vec<RecordRef<R>> {
        self.records
            .iter()
            .filter(|record| predicate.test(&record.borrow()))
            .cloned()
            .collect()
    }

    // Merging

    /// Insert or update records, answering in the shape of `batch`.
    ///
    /// Returned records follow batch order. Existing records keep their
    /// position and identity; new ones are appended.
    pub fn upsert(&mut self, batch: impl Into<Batch>) -> Result<Merged<RecordRef<R>>> {
        let (bodies, many) = Into::<Batch>::into(batch).into_parts();
        let outcome =
            merge::merge_items(&mut self.records, bodies, &self.primary_key, &self.hooks)?;
        Ok(Merged::from_parts(outcome.records, many))
    }

    /// Alias of [`upsert`](Self::upsert).
    pub fn inject(&mut self, batch: impl Into<Batch>) -> Result<Merged<RecordRef<R>>> {
        self.upsert(batch)
    }

    pub fn upsert_one(&mut self, body: Body) -> Result<RecordRef<R>> {
        let (record, path) =
            merge::merge_one(&mut self.records, body, &self.primary_key, &self.hooks)?;
        tracing::debug!(inserted = (path == MergePath::Inserted), "merged record");
        Ok(record)
    }

    pub fn upsert_many(&mut self, bodies: Vec<Body>) -> Result<Vec<RecordRef<R>>> {
        merge::merge_items(&mut self.records, bodies, &self.primary_key, &self.hooks)
            .map(|outcome| outcome.records)
    }

    // Removal

    /// Remove one key or a list of keys.
    ///
    /// A list answers with the removed records in storage order. Identifiers
    /// are validated before anything is removed.
    pub fn remove(&mut self, ids: impl Into<Ids>) -> Result<Selection<RecordRef<R>>> {
        let (keys, many) = Into::<Ids>::into(ids).into_keys()?;
        Ok(Selection::from_parts(self.remove_many(&keys), many))
    }

    /// Alias of [`remove`](Self::remove).
    pub fn eject(&mut self, ids: impl Into<Ids>) -> Result<Selection<RecordRef<R>>> {
        self.remove(ids)
    }

    pub fn remove_one(&mut self, key: impl Into<Key>) -> Option<RecordRef<R>> {
        self.remove_many(&[key.into()]).into_iter().next()
    }

    /// Remove every record whose key weakly equals one of `keys`.
    pub fn remove_many(&mut self, keys: &[Key]) -> Vec<RecordRef<R>> {
        if keys.is_empty() {
            return Vec::new();
        }

        let primary_key = self.primary_key.as_str();
        let removed = self.records.remove_where(&|record: &R| {
            record
                .key(primary_key)
                .is_some_and(|key| keys.iter().any(|k| k.weak_eq(&key)))
        });

        tracing::debug!(requested = keys.len(), removed = removed.len(), "removed records");
        removed
    }

    /// Remove every record. Returns how many were removed.
    pub fn clear(&mut self) -> usize {
        let removed = self.records.remove_where(&|_: &R| true).len();
        tracing::debug!(removed, "cleared collection");
        removed
    }

    /// Clear, then upsert `batch` into the empty collection.
    ///
    /// Returns the number of records removed by the clear, not the number
    /// inserted. Without map hooks, keys are validated before the clear, so a
    /// bad batch leaves the collection as it was.
    pub fn replace(&mut self, batch: impl Into<Batch>) -> Result<usize> {
        let (bodies, _) = Into::<Batch>::into(batch).into_parts();
        merge::precheck_batch(&bodies, &self.primary_key, &self.hooks)?;

        let removed = self.clear();
        merge::apply_batch(&mut self.records, bodies, &self.primary_key, &self.hooks)?;

        tracing::debug!(removed, len = self.len(), "replaced collection");
        Ok(removed)
    }

    // Observation

    /// Observe every insert, update and removal from now on.
    pub fn subscribe<F>(&mut self, observer: F) -> SubscriptionId
    where
        F: Fn(&Change) + 'static,
    {
        self.records.subscribe(Box::new(observer))
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.records.unsubscribe(id)
    }

    /// Republish every change through an `EventEmitter`.
    #[cfg(feature = "emitter")]
    pub fn subscribe_emitter(&mut self, emitter: event_emitter_rs::EventEmitter) -> SubscriptionId {
        self.records
            .subscribe(crate::emitter::EmitterBridge::new(emitter).into_observer())
    }
}

impl<R: Record + fmt::Debug> fmt::Debug for Collection<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Collection")
            .field("primary_key", &self.primary_key)
            .field("records", &self.records)
            .field("hooks", &self.hooks)
            .finish()
    }
}

/// Builder for a configured [`Collection`].
pub struct CollectionBuilder<R: Record = Body> {
    config: CollectionConfig,
    hooks: Hooks<R>,
    observers: Vec<Observer>,
    seed: Option<Batch>,
}

impl<R: Record> Default for CollectionBuilder<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Record> CollectionBuilder<R> {
    pub fn new() -> Self {
        Self {
            config: CollectionConfig::default(),
            hooks: Hooks::default(),
            observers: Vec::new(),
            seed: None,
        }
    }

    pub fn config(mut self, config: CollectionConfig) -> Self {
        self.config = config;
        self
    }

    pub fn primary_key(mut self, primary_key: impl Into<String>) -> Self {
        self.config.primary_key = primary_key.into();
        self
    }

    pub fn hooks(mut self, hooks: Hooks<R>) -> Self {
        self.hooks = hooks;
        self
    }

    /// Subscribe before seeding, so the seed shows up as inserts.
    pub fn observer<F>(mut self, observer: F) -> Self
    where
        F: Fn(&Change) + 'static,
    {
        self.observers.push(Box::new(observer));
        self
    }

    pub fn seed(mut self, batch: impl Into<Batch>) -> Self {
        self.seed = Some(batch.into());
        self
    }

    pub fn build(self) -> Result<Collection<R>> {
        self.config.validate()?;

        let mut collection = Collection::with_config(self.config, self.hooks);
        for observer in self.observers {
            collection.records.subscribe(observer);
        }
        if let Some(seed) = self.seed {
            collection.upsert(seed)?;
        }

        Ok(collection)
    }
}
