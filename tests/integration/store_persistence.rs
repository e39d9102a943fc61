use std::fs;

use serde_json::json;

use maestro::store::OrchestrationStore;
use maestro::Error;

use crate::fixtures::TestStore;

#[test]
fn test_definition_key_order_survives_save() {
    let test_store = TestStore::new();
    let definition = json!({"tasks": {"zeta": {}, "alpha": {}}, "name": "Ordered"});

    test_store.store.upsert("ordered", definition).unwrap();

    let contents = fs::read_to_string(test_store.path()).unwrap();
    let zeta = contents.find("zeta").unwrap();
    let alpha = contents.find("alpha").unwrap();
    assert!(zeta < alpha, "task order was not preserved:\n{}", contents);
    assert!(contents.find("\"tasks\"").unwrap() < contents.find("\"name\"").unwrap());

    let loaded = test_store.store.load().orchestrations;
    let tasks: Vec<&String> = loaded["ordered"]["tasks"]
        .as_object()
        .unwrap()
        .keys()
        .collect();
    assert_eq!(tasks, vec!["zeta", "alpha"]);
}

#[test]
fn test_hand_edited_file_is_read() {
    let test_store = TestStore::new();
    fs::write(
        test_store.path(),
        r#"{"b": {"tasks": {}}, "a": {"name": "A", "tasks": {"t": {"prompt": "p"}}}}"#,
    )
    .unwrap();

    let load = test_store.store.load();

    assert!(load.error.is_none());
    assert_eq!(load.names(), vec!["a".to_string(), "b".to_string()]);
}

#[test]
fn test_save_over_unreadable_file_replaces_it() {
    let test_store = TestStore::new();
    fs::write(test_store.path(), "not json at all").unwrap();
    assert!(matches!(
        test_store.store.load().error,
        Some(Error::StoreRead { .. })
    ));

    test_store.store.upsert("fresh", json!({"tasks": {}})).unwrap();

    let load = test_store.store.load();
    assert!(load.error.is_none());
    assert_eq!(load.names(), vec!["fresh".to_string()]);
}

#[test]
fn test_read_error_names_the_file() {
    let test_store = TestStore::new();
    fs::write(test_store.path(), "{").unwrap();

    let err = test_store.store.load().error.unwrap();

    assert!(err
        .to_string()
        .starts_with(&format!("Error reading {}", test_store.path().display())));
}

/// Test: two handles on one file see each other's writes
#[test]
fn test_writers_reload_before_writing() {
    let test_store = TestStore::with(&[("shared", json!({"tasks": {}}))]);
    let other = OrchestrationStore::new(test_store.path());

    other.upsert("from_other", json!({"tasks": {}})).unwrap();
    let saved = test_store.store.upsert("from_first", json!({})).unwrap();

    let names: Vec<&String> = saved.keys().collect();
    assert_eq!(names, vec!["from_first", "from_other", "shared"]);
}

#[test]
fn test_last_writer_wins_for_same_name() {
    let test_store = TestStore::new();
    let other = OrchestrationStore::new(test_store.path());

    test_store.store.upsert("n", json!({"v": "first"})).unwrap();
    other.upsert("n", json!({"v": "second"})).unwrap();

    assert_eq!(
        test_store.store.load().orchestrations["n"],
        json!({"v": "second"})
    );
}

#[test]
fn test_delete_by_other_writer_is_not_found() {
    let test_store = TestStore::with(&[("gone", json!({}))]);
    let other = OrchestrationStore::new(test_store.path());

    other.remove("gone").unwrap();
    let err = test_store.store.remove("gone").unwrap_err();

    assert!(matches!(err, Error::OrchestrationNotFound(_)));
}
