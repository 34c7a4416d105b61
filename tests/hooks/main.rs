//! Integration tests for merge hooks, including domain records built on the
//! insert path.

#[path = "../support/mod.rs"]
mod support;


use std::cell::RefCell;
use std::rc::Rc;

use keyed_collection::{Body, Collection, CollectionError, Hooks, Record};
use serde_json::json;
use support::{batch, body};

use domain::Foo;

#[test]
fn map_insert_maps_records() {
    let coll: Collection<Foo> = Collection::builder()
        .hooks(Hooks::new().map_insert(|body| Foo::from_body(body).map(Foo::computed)))
        .seed(batch(json!([{"id": 1}, {"id": 2}, {"id": 3}])))
        .build()
        .unwrap();

    assert_eq!(coll.len(), 3);
    let a: Vec<i64> = coll.iter().map(|foo| foo.borrow().a).collect();
    assert_eq!(a, vec![3, 6, 9]);
}

#[test]
fn domain_records_update_in_place() {
    let mut coll: Collection<Foo> =
        Collection::with_records(batch(json!([{"id": 1, "label": "one"}, {"id": 2}]))).unwrap();
    let before = coll.get_one(1).unwrap();

    coll.upsert(body(json!({"id": 1, "label": "uno", "extra": true})))
        .unwrap();

    assert!(Rc::ptr_eq(&before, &coll.get_one("1").unwrap()));
    assert_eq!(before.borrow().label.as_deref(), Some("uno"));
    assert_eq!(before.borrow().id, 1);
    assert_eq!(coll.len(), 2);
}

#[test]
fn string_key_updates_domain_record() {
    let mut coll: Collection<Foo> = Collection::with_records(body(json!({"id": 2}))).unwrap();

    let merged = coll
        .upsert(body(json!({"id": "2", "label": "x"})))
        .unwrap()
        .into_one()
        .unwrap();

    assert_eq!(coll.len(), 1);
    assert_eq!(merged.borrow().id, 2);
    assert_eq!(merged.borrow().label.as_deref(), Some("x"));
}

#[test]
fn domain_record_rejecting_fields_stays_untouched() {
    let mut coll: Collection<Foo> =
        Collection::with_records(body(json!({"id": 1, "label": "one"}))).unwrap();

    let err = coll
        .upsert(body(json!({"id": 1, "label": 5})))
        .unwrap_err();

    assert!(matches!(err, CollectionError::Serde(_)));
    assert_eq!(coll.get_one(1).unwrap().borrow().label.as_deref(), Some("one"));
}

#[test]
fn map_update_chooses_merged_fields() {
    let mut coll: Collection = Collection::builder()
        .hooks(Hooks::new().map_update(|existing: &Body, incoming: Body| {
            let revision = existing.get("rev").and_then(|v| v.as_u64()).unwrap_or(0);
            let mut fields = incoming;
            fields.remove("locked");
            fields.insert("rev".into(), json!(revision + 1));
            fields
        }))
        .seed(body(json!({"id": 1, "locked": "keep"})))
        .build()
        .unwrap();

    coll.upsert(body(json!({"id": 1, "locked": "overwrite", "name": "a"})))
        .unwrap();
    coll.upsert(body(json!({"id": 1}))).unwrap();

    assert_eq!(
        coll.snapshot(),
        vec![body(json!({"id": 1, "locked": "keep", "name": "a", "rev": 2}))]
    );
}

#[test]
fn after_hooks_fire_per_path_and_for_every_body() {
    let log = Rc::new(RefCell::new(Vec::new()));
    let (on_insert, on_update, on_upsert) = (Rc::clone(&log), Rc::clone(&log), Rc::clone(&log));

    let mut coll: Collection = Collection::builder()
        .hooks(
            Hooks::new()
                .after_insert(move |r: &Body| {
                    on_insert.borrow_mut().push(format!("insert {}", r["id"]))
                })
                .after_update(move |r: &Body| {
                    on_update.borrow_mut().push(format!("update {}", r["id"]))
                })
                .after_upsert(move |r: &Body| {
                    on_upsert.borrow_mut().push(format!("upsert {}", r["id"]))
                }),
        )
        .seed(body(json!({"id": 1})))
        .build()
        .unwrap();

    log.borrow_mut().clear();
    coll.upsert(batch(json!([{"id": 2}, {"id": 1, "x": true}])))
        .unwrap();

    assert_eq!(
        *log.borrow(),
        vec!["insert 2", "upsert 2", "update 1", "upsert 1"]
    );
}

#[test]
fn hooks_run_body_by_body() {
    let log = Rc::new(RefCell::new(Vec::new()));
    let (on_map, on_upsert) = (Rc::clone(&log), Rc::clone(&log));

    let mut coll: Collection = Collection::builder()
        .hooks(
            Hooks::new()
                .map_upsert(move |body: Body| {
                    on_map.borrow_mut().push(format!("map {}", body["id"]));
                    body
                })
                .after_upsert(move |r: &Body| {
                    on_upsert.borrow_mut().push(format!("upsert {}", r["id"]))
                }),
        )
        .build()
        .unwrap();

    coll.upsert(batch(json!([{"id": 1}, {"id": 2}]))).unwrap();

    assert_eq!(*log.borrow(), vec!["map 1", "upsert 1", "map 2", "upsert 2"]);
}

#[test]
fn key_dropped_by_map_hook_stops_the_batch() {
    let mut coll: Collection = Collection::builder()
        .hooks(Hooks::new().map_record(|mut body: Body| {
            if body.contains_key("drop") {
                body.remove("id");
            }
            body
        }))
        .build()
        .unwrap();

    let err = coll
        .upsert(batch(json!([{"id": 1}, {"id": 2, "drop": true}, {"id": 3}])))
        .unwrap_err();

    assert_eq!(err, CollectionError::MissingPrimaryKey { field: "id".into() });
    assert_eq!(coll.snapshot(), vec![body(json!({"id": 1}))]);
}

#[test]
fn map_record_and_map_upsert_see_every_body() {
    let seen = Rc::new(RefCell::new(0));
    let counter = Rc::clone(&seen);

    let mut coll: Collection = Collection::builder()
        .hooks(
            Hooks::new()
                .map_record(|mut body: Body| {
                    if let Some(name) = body.get("name").and_then(|v| v.as_str()) {
                        let trimmed = name.trim().to_string();
                        body.insert("name".into(), json!(trimmed));
                    }
                    body
                })
                .map_upsert(move |body: Body| {
                    *counter.borrow_mut() += 1;
                    body
                }),
        )
        .build()
        .unwrap();

    coll.upsert(batch(json!([{"id": 1, "name": "  a "}, {"id": 1, "name": "b"}])))
        .unwrap();

    assert_eq!(*seen.borrow(), 2);
    assert_eq!(coll.snapshot(), vec![body(json!({"id": 1, "name": "b"}))]);
}

#[test]
fn failing_map_insert_stops_the_batch() {
    let mut coll: Collection = Collection::builder()
        .hooks(Hooks::new().map_insert(|body: Body| {
            if body.contains_key("poison") {
                Err(CollectionError::InvalidBody("poisoned".into()))
            } else {
                Ok(body)
            }
        }))
        .build()
        .unwrap();

    let err = coll
        .upsert(batch(json!([{"id": 1}, {"id": 2, "poison": true}, {"id": 3}])))
        .unwrap_err();

    assert_eq!(err, CollectionError::InvalidBody("poisoned".into()));
    assert_eq!(coll.snapshot(), vec![body(json!({"id": 1}))]);
}
