use std::rc::Rc;

use keyed_collection::{Body, Collection, CollectionError, Merged};
use serde_json::json;

use crate::support::{batch, body, dump, dump_one, sample};

#[test]
fn injects_single_record() {
    let mut coll = sample();

    coll.inject(body(json!({"id": 4}))).unwrap();
    coll.inject(body(json!({"id": 2, "name": "foo"}))).unwrap();

    assert_eq!(
        dump(coll.records()),
        json!([{"id": 1}, {"id": 2, "name": "foo"}, {"id": 3}, {"id": 4}])
    );
}

#[test]
fn injects_many_records() {
    let mut coll = sample();

    let merged = coll
        .upsert(batch(json!([{"id": 4}, {"id": 2, "name": "foo"}])))
        .unwrap();

    assert_eq!(
        dump(coll.records()),
        json!([{"id": 1}, {"id": 2, "name": "foo"}, {"id": 3}, {"id": 4}])
    );
    assert!(matches!(merged, Merged::Many(_)));
    assert_eq!(dump(&merged.into_vec()), json!([{"id": 4}, {"id": 2, "name": "foo"}]));
}

#[test]
fn single_body_answers_with_single_record() {
    let mut coll = sample();

    let merged = coll.upsert(body(json!({"id": 5}))).unwrap();
    match merged {
        Merged::One(record) => assert_eq!(dump_one(&record), json!({"id": 5})),
        other => panic!("expected one record, got {:?}", other),
    }
}

#[test]
fn update_keeps_record_identity() {
    let mut coll = sample();
    let before = coll.get_one(2).unwrap();

    let after = coll
        .upsert(body(json!({"id": 2, "name": "foo"})))
        .unwrap()
        .into_one()
        .unwrap();

    assert!(Rc::ptr_eq(&before, &after));
    assert_eq!(before.borrow()["name"], json!("foo"));
}

#[test]
fn string_key_updates_numeric_record() {
    let mut coll: Collection = Collection::with_records(body(json!({"id": 2}))).unwrap();

    coll.upsert(body(json!({"id": "2", "name": "x"}))).unwrap();

    assert_eq!(coll.len(), 1);
    assert_eq!(dump(coll.records()), json!([{"id": 2, "name": "x"}]));
}

#[test]
fn upsert_is_idempotent_per_key() {
    let mut coll = sample();
    let payload = body(json!({"id": 3, "name": "same"}));

    let first = coll.upsert_one(payload.clone()).unwrap();
    let state = coll.snapshot();
    let second = coll.upsert_one(payload).unwrap();

    assert_eq!(coll.snapshot(), state);
    assert!(Rc::ptr_eq(&first, &second));
}

#[test]
fn order_is_preserved_across_upserts() {
    let mut coll = sample();

    coll.upsert_many(vec![body(json!({"id": 6})), body(json!({"id": 1, "x": 1}))])
        .unwrap();
    coll.upsert_many(vec![body(json!({"id": 5})), body(json!({"id": 6, "y": 2}))])
        .unwrap();

    let ids: Vec<_> = coll.iter().map(|r| r.borrow()["id"].clone()).collect();
    assert_eq!(ids, vec![json!(1), json!(2), json!(3), json!(6), json!(5)]);
}

#[test]
fn empty_batch_changes_nothing() {
    let mut coll = sample();

    let merged = coll.upsert(Vec::<Body>::new()).unwrap();

    assert!(merged.is_empty());
    assert_eq!(coll.len(), 3);
}

#[test]
fn body_without_key_is_rejected() {
    let mut coll = sample();

    let err = coll
        .upsert(batch(json!([{"id": 4}, {"name": "no key"}])))
        .unwrap_err();

    assert_eq!(err, CollectionError::MissingPrimaryKey { field: "id".into() });
    assert_eq!(coll.len(), 3);
}

#[test]
fn body_with_non_scalar_key_is_rejected() {
    let mut coll = sample();

    let err = coll.upsert(body(json!({"id": [1]}))).unwrap_err();

    assert!(matches!(err, CollectionError::InvalidIdentifier { .. }));
    assert_eq!(coll.len(), 3);
}
