// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serde_json::json;
use tempfile::TempDir;

#[test]
fn put_then_get() {
    let dir = TempDir::new().unwrap();
    let store = FsStateStore::new(dir.path());

    store
        .put("launches", "demo", &json!({"application_id": "application_1_0001"}))
        .unwrap();
    let value = store.get("launches", "demo").unwrap().unwrap();
    assert_eq!(value["application_id"], "application_1_0001");
    assert!(store.get("launches", "other").unwrap().is_none());
}

#[test]
fn alias_resolves_to_latest_value() {
    let dir = TempDir::new().unwrap();
    let store = FsStateStore::new(dir.path());

    store.put("launches", "demo", &json!({"n": 1})).unwrap();
    store.create_alias("launches", "demo", "current").unwrap();
    store.put("launches", "demo", &json!({"n": 2})).unwrap();

    assert_eq!(store.get("launches", "current").unwrap().unwrap()["n"], 2);
}

#[test]
fn alias_to_missing_key_is_rejected() {
    let dir = TempDir::new().unwrap();
    let store = FsStateStore::new(dir.path());
    let err = store.create_alias("launches", "ghost", "current").unwrap_err();
    assert!(matches!(err, StoreError::MissingTarget { .. }));
}

#[yare::parameterized(
    empty     = { "" },
    dot_dot   = { ".." },
    separator = { "a/b" },
)]
fn invalid_names_are_rejected(name: &str) {
    let dir = TempDir::new().unwrap();
    let store = FsStateStore::new(dir.path());
    assert!(matches!(
        store.put("launches", name, &json!(1)),
        Err(StoreError::InvalidName(_))
    ));
}

#[test]
fn no_temp_files_left_behind() {
    let dir = TempDir::new().unwrap();
    let store = FsStateStore::new(dir.path());
    store.put("launches", "demo", &json!({})).unwrap();

    let names: Vec<_> = std::fs::read_dir(dir.path().join("launches"))
        .unwrap()
        .map(|e| e.unwrap().file_name().into_string().unwrap())
        .collect();
    assert_eq!(names, vec!["demo.json"]);
}
