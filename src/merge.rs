//! The upsert engine.
//!
//! Bodies are merged one at a time, in batch order, against the live
//! sequence: a later body with the same key as an earlier one sees the
//! earlier body's result. Matching records are updated in place; everything
//! else is appended.

use std::rc::Rc;

use crate::error::Result;
use crate::hooks::Hooks;
use crate::key::Key;
use crate::record::{body_key, Body, Record, RecordRef};
use crate::sequence::ObservableSequence;

/// What one call to [`merge_items`] did.
#[derive(Debug)]
pub struct MergeOutcome<R> {
    /// Resulting record for each body, in batch order.
    pub records: Vec<RecordRef<R>>,
    pub inserted: usize,
    pub updated: usize,
}

impl<R> Default for MergeOutcome<R> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            inserted: 0,
            updated: 0,
        }
    }
}

/// Position and handle of the record whose key weakly equals `key`.
pub fn find_by_key<R, S>(seq: &S, primary_key: &str, key: &Key) -> Option<(usize, RecordRef<R>)>
where
    R: Record,
    S: ObservableSequence<R> + ?Sized,
{
    seq.iter()
        .enumerate()
        .find(|(_, record)| {
            record
                .borrow()
                .key(primary_key)
                .is_some_and(|existing| existing.weak_eq(key))
        })
        .map(|(index, record)| (index, Rc::clone(record)))
}

/// Which path a body took through the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergePath {
    Inserted,
    Updated,
}

/// Check every body's key up front when no map hook can rewrite it.
///
/// With `map_record` or `map_upsert` installed the key is only known once the
/// hooks have run, so each body is checked as it is merged instead.
pub fn precheck_batch<R: Record>(
    bodies: &[Body],
    primary_key: &str,
    hooks: &Hooks<R>,
) -> Result<()> {
    if hooks.maps_bodies() {
        return Ok(());
    }
    bodies
        .iter()
        .try_for_each(|body| body_key(body, primary_key).map(drop))
}

/// Merge one body: update the record with a weakly equal key in place, or
/// append a new one.
///
/// The stored key is kept on update, so `{"id": "2"}` merged onto a record
/// keyed `2` leaves it keyed `2`.
pub fn merge_one<R, S>(
    seq: &mut S,
    body: Body,
    primary_key: &str,
    hooks: &Hooks<R>,
) -> Result<(RecordRef<R>, MergePath)>
where
    R: Record,
    S: ObservableSequence<R> + ?Sized,
{
    let body = hooks.prepare(body);
    let key = body_key(&body, primary_key)?;

    match find_by_key(seq, primary_key, &key) {
        Some((index, existing)) => {
            tracing::trace!(%key, index, "update");
            let mut fields = hooks.update(&existing.borrow(), body);
            let same_key = fields
                .get(primary_key)
                .and_then(Key::scalar)
                .is_some_and(|incoming| incoming.weak_eq(&key));
            if same_key {
                fields.remove(primary_key);
            }
            let record = seq.update_at(index, fields)?;
            hooks.updated(&record.borrow());
            Ok((record, MergePath::Updated))
        }
        None => {
            tracing::trace!(%key, "insert");
            let record = seq.append(hooks.insert(body)?);
            hooks.inserted(&record.borrow());
            Ok((record, MergePath::Inserted))
        }
    }
}

/// Merge `bodies` one at a time, in order, each running through every hook
/// before the next one starts.
///
/// Errors raised while merging (a key left missing by a map hook, a failing
/// `map_insert`, or a record rejecting its fields) stop the batch at that
/// body, leaving earlier bodies applied.
pub fn apply_batch<R, S>(
    seq: &mut S,
    bodies: Vec<Body>,
    primary_key: &str,
    hooks: &Hooks<R>,
) -> Result<MergeOutcome<R>>
where
    R: Record,
    S: ObservableSequence<R> + ?Sized,
{
    if bodies.is_empty() {
        return Ok(MergeOutcome::default());
    }

    let span = tracing::debug_span!("merge_items", primary_key, batch = bodies.len());
    let _enter = span.enter();

    let mut outcome = MergeOutcome {
        records: Vec::with_capacity(bodies.len()),
        ..MergeOutcome::default()
    };

    for body in bodies {
        let (record, path) = merge_one(seq, body, primary_key, hooks)?;
        match path {
            MergePath::Inserted => outcome.inserted += 1,
            MergePath::Updated => outcome.updated += 1,
        }
        outcome.records.push(record);
    }

    tracing::debug!(
        inserted = outcome.inserted,
        updated = outcome.updated,
        len = seq.len(),
        "merged batch"
    );

    Ok(outcome)
}

/// Upsert `bodies` into `seq`.
///
/// See [`precheck_batch`] for when keys are validated before anything is
/// mutated, and [`apply_batch`] for the merge itself.
pub fn merge_items<R, S>(
    seq: &mut S,
    bodies: Vec<Body>,
    primary_key: &str,
    hooks: &Hooks<R>,
) -> Result<MergeOutcome<R>>
where
    R: Record,
    S: ObservableSequence<R> + ?Sized,
{
    precheck_batch(&bodies, primary_key, hooks)?;
    apply_batch(seq, bodies, primary_key, hooks)
}
