// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use crate::job::WORKOUT_FINISH;
use crate::storage::{FileStringStorage, SqliteBackend, StringBackend};
use serde_json::json;
use tempfile::TempDir;

const NOW: i64 = 1_700_000_000_000;

fn job(id: &str) -> Job {
    Job::new(id.to_string(), WORKOUT_FINISH, "u1", format!("key-{id}"), json!({"n": 1}), NOW)
}

fn sqlite() -> Arc<dyn StorageBackend> {
    Arc::new(SqliteBackend::open_in_memory().unwrap())
}

#[test]
fn put_get_delete() {
    let store = QueueStore::new(sqlite(), SnapshotMirror::disabled());

    assert!(store.put(&job("a")));
    assert_eq!(store.get("a").unwrap().idempotency_key, "key-a");
    assert_eq!(store.get_all().len(), 1);

    assert!(store.delete("a"));
    assert!(store.get("a").is_none());
    assert!(store.get_all().is_empty());
}

#[test]
fn put_replaces_by_id() {
    let store = QueueStore::new(sqlite(), SnapshotMirror::disabled());
    let mut j = job("a");
    store.put(&j);
    j.attempts = 2;
    store.put(&j);

    let all = store.get_all();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].attempts, 2);
}

#[test]
fn empty_id_is_rejected() {
    let dir = TempDir::new().unwrap();
    let store = QueueStore::new(sqlite(), SnapshotMirror::detect(dir.path()));

    assert!(!store.put(&job("")));
    assert!(!store.put(&job("   ")));
    assert!(!store.delete(""));
    assert!(store.get_all().is_empty());
    assert!(store.mirror().mirror_read_all().is_empty());
}

#[test]
fn writes_are_mirrored() {
    let dir = TempDir::new().unwrap();
    let store = QueueStore::new(sqlite(), SnapshotMirror::detect(dir.path()));

    store.put(&job("a"));
    store.put(&job("b"));
    store.delete("a");

    let mirrored = store.mirror().mirror_read_all();
    assert_eq!(mirrored.len(), 1);
    assert_eq!(mirrored[0].id, "b");
}

#[test]
fn empty_primary_recovers_from_mirror() {
    let dir = TempDir::new().unwrap();
    let mirror = SnapshotMirror::detect(dir.path());
    mirror.mirror_put(&job("a"));
    mirror.mirror_put(&job("b"));

    let backend = sqlite();
    let store = QueueStore::new(backend.clone(), mirror);

    let first = store.get_all();
    assert_eq!(first.len(), 2);

    // Second read comes from the repopulated primary.
    assert_eq!(backend.list_all(Namespace::Queue).unwrap().len(), 2);
    let second = store.get_all();
    let mut ids: Vec<_> = second.into_iter().map(|j| j.id).collect();
    ids.sort();
    assert_eq!(ids, vec!["a", "b"]);
}

#[test]
fn non_empty_primary_ignores_mirror() {
    let dir = TempDir::new().unwrap();
    let mirror = SnapshotMirror::detect(dir.path());
    mirror.mirror_put(&job("stale"));

    let store = QueueStore::new(sqlite(), mirror);
    store.put(&job("fresh"));

    let ids: Vec<_> = store.get_all().into_iter().map(|j| j.id).collect();
    assert_eq!(ids, vec!["fresh"]);
}

#[test]
fn unreadable_records_are_skipped() {
    let backend = sqlite();
    backend.set(Namespace::Queue, "bad", "{not json").unwrap();
    let store = QueueStore::new(backend, SnapshotMirror::disabled());
    store.put(&job("good"));

    let all = store.get_all();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].id, "good");
}

#[test]
fn works_over_string_storage() {
    let dir = TempDir::new().unwrap();
    let storage = FileStringStorage::open(&dir.path().join("storage.json")).unwrap();
    let store = QueueStore::new(Arc::new(StringBackend::new(storage)), SnapshotMirror::disabled());

    store.put(&job("a"));
    store.put(&job("b"));
    store.delete("a");

    let all = store.get_all();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].id, "b");
}

#[test]
fn records_without_id_are_hidden_and_purged() {
    let backend = sqlite();
    let store = QueueStore::new(backend.clone(), SnapshotMirror::disabled());
    store.put(&job("a"));
    backend.set(Namespace::Queue, "", r#"{"id":"","type":"workout_finish"}"#).unwrap();
    backend.set(Namespace::Queue, "orphan", r#"{"type":"workout_finish"}"#).unwrap();
    backend.set(Namespace::Queue, "numeric", r#"{"id":7}"#).unwrap();

    let ids: Vec<_> = store.get_all().into_iter().map(|j| j.id).collect();
    assert_eq!(ids, vec!["a"]);

    assert_eq!(store.purge_unkeyed(), 3);
    assert_eq!(backend.list_all(Namespace::Queue).unwrap().len(), 1);
    assert_eq!(store.purge_unkeyed(), 0);
}

#[test]
fn purge_over_string_storage() {
    let dir = TempDir::new().unwrap();
    let backend: Arc<dyn StorageBackend> = Arc::new(StringBackend::new(
        FileStringStorage::open(&dir.path().join("storage.json")).unwrap(),
    ));
    let store = QueueStore::new(backend.clone(), SnapshotMirror::disabled());
    store.put(&job("a"));
    backend.set(Namespace::Queue, "", r#"{"id":"  ","type":"workout_finish"}"#).unwrap();

    assert_eq!(store.purge_unkeyed(), 1);
    assert_eq!(store.get_all().len(), 1);
}
