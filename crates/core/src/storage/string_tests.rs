// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use tempfile::TempDir;

fn backend(dir: &TempDir) -> StringBackend<FileStringStorage> {
    StringBackend::new(FileStringStorage::open(&dir.path().join("storage.json")).unwrap())
}

#[test]
fn storage_items_round_trip() {
    let dir = TempDir::new().unwrap();
    let storage = FileStringStorage::open(&dir.path().join("storage.json")).unwrap();

    assert!(storage.get_item("a").unwrap().is_none());
    storage.set_item("a", "1").unwrap();
    assert_eq!(storage.get_item("a").unwrap().as_deref(), Some("1"));
    storage.remove_item("a").unwrap();
    assert!(storage.get_item("a").unwrap().is_none());
}

#[test]
fn storage_leaves_no_temp_file() {
    let dir = TempDir::new().unwrap();
    let storage = FileStringStorage::open(&dir.path().join("storage.json")).unwrap();
    storage.set_item("a", "1").unwrap();

    assert!(storage.path().exists());
    assert!(!dir.path().join("storage.json.tmp").exists());
}

#[test]
fn kv_keys_are_namespaced() {
    let dir = TempDir::new().unwrap();
    let db = backend(&dir);

    db.set(Namespace::Kv, "settings", r#"{"v":1}"#).unwrap();

    let raw = std::fs::read_to_string(dir.path().join("storage.json")).unwrap();
    let map: BTreeMap<String, String> = serde_json::from_str(&raw).unwrap();
    assert!(map.contains_key("ls.kv.settings"));
    assert_eq!(db.get(Namespace::Kv, "settings").unwrap().as_deref(), Some(r#"{"v":1}"#));
}

#[test]
fn queue_is_one_array_under_fixed_key() {
    let dir = TempDir::new().unwrap();
    let db = backend(&dir);

    db.set(Namespace::Queue, "a", r#"{"id":"a","attempts":0}"#).unwrap();
    db.set(Namespace::Queue, "b", r#"{"id":"b","attempts":0}"#).unwrap();
    db.set(Namespace::Queue, "a", r#"{"id":"a","attempts":1}"#).unwrap();

    let raw = std::fs::read_to_string(dir.path().join("storage.json")).unwrap();
    let map: BTreeMap<String, String> = serde_json::from_str(&raw).unwrap();
    let items: Vec<Value> = serde_json::from_str(&map[QUEUE_KEY]).unwrap();
    assert_eq!(items.len(), 2);

    let a: Value = serde_json::from_str(&db.get(Namespace::Queue, "a").unwrap().unwrap()).unwrap();
    assert_eq!(a["attempts"], 1);
}

#[test]
fn queue_delete_filters_by_id() {
    let dir = TempDir::new().unwrap();
    let db = backend(&dir);
    db.set(Namespace::Queue, "a", r#"{"id":"a"}"#).unwrap();
    db.set(Namespace::Queue, "b", r#"{"id":"b"}"#).unwrap();

    db.delete(Namespace::Queue, "a").unwrap();

    let rows = db.list_all(Namespace::Queue).unwrap();
    assert_eq!(rows.len(), 1);
    assert!(rows[0].contains(r#""b""#));
}

#[test]
fn list_all_kv_skips_other_keys() {
    let dir = TempDir::new().unwrap();
    let db = backend(&dir);
    db.set(Namespace::Kv, "x", "1").unwrap();
    db.set(Namespace::Queue, "a", r#"{"id":"a"}"#).unwrap();

    assert_eq!(db.list_all(Namespace::Kv).unwrap(), vec!["1"]);
}

#[test]
fn corrupt_queue_array_reads_as_empty() {
    let dir = TempDir::new().unwrap();
    let db = backend(&dir);
    db.storage.set_item(QUEUE_KEY, "not json").unwrap();

    assert!(db.list_all(Namespace::Queue).unwrap().is_empty());

    db.set(Namespace::Queue, "a", r#"{"id":"a"}"#).unwrap();
    assert_eq!(db.list_all(Namespace::Queue).unwrap().len(), 1);
}

#[test]
fn queue_set_rejects_non_json_value() {
    let dir = TempDir::new().unwrap();
    let db = backend(&dir);

    assert!(db.set(Namespace::Queue, "a", "{oops").is_err());
}

#[test]
fn remove_where_drops_unaddressable_queue_records() {
    let dir = TempDir::new().unwrap();
    let db = backend(&dir);
    db.set(Namespace::Queue, "keep", r#"{"id":"keep"}"#).unwrap();
    db.set(Namespace::Queue, "", r#"{"type":"workout_finish"}"#).unwrap();

    let removed = db
        .remove_where(Namespace::Queue, &|raw| !raw.contains("keep"))
        .unwrap();

    assert_eq!(removed, 1);
    assert_eq!(db.list_all(Namespace::Queue).unwrap().len(), 1);
    assert!(db.get(Namespace::Queue, "keep").unwrap().is_some());
}

#[test]
fn remove_where_only_touches_kv_prefix() {
    let dir = TempDir::new().unwrap();
    let db = backend(&dir);
    db.set(Namespace::Kv, "a", "stale").unwrap();
    db.set(Namespace::Kv, "b", "fresh").unwrap();
    db.set(Namespace::Queue, "q", r#"{"id":"q"}"#).unwrap();

    let removed = db.remove_where(Namespace::Kv, &|raw| raw == "stale").unwrap();

    assert_eq!(removed, 1);
    assert!(db.get(Namespace::Kv, "a").unwrap().is_none());
    assert!(db.get(Namespace::Kv, "b").unwrap().is_some());
    assert!(db.get(Namespace::Queue, "q").unwrap().is_some());
}
