// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use tempfile::TempDir;
use yare::parameterized;

#[parameterized(
    auto = { "auto", BackendPreference::Auto },
    sqlite = { "sqlite", BackendPreference::Sqlite },
    file = { "file", BackendPreference::File },
    upper = { "SQLite", BackendPreference::Sqlite },
    padded = { " file ", BackendPreference::File },
)]
fn preference_from_str(input: &str, expected: BackendPreference) {
    assert_eq!(input.parse::<BackendPreference>().unwrap(), expected);
}

#[test]
fn preference_rejects_unknown() {
    let err = "indexeddb".parse::<BackendPreference>().unwrap_err();
    assert!(err.to_string().contains("indexeddb"));
}

#[test]
fn preference_display_round_trips() {
    for pref in [BackendPreference::Auto, BackendPreference::Sqlite, BackendPreference::File] {
        assert_eq!(pref.to_string().parse::<BackendPreference>().unwrap(), pref);
    }
}

#[parameterized(
    auto = { BackendPreference::Auto, "sqlite" },
    sqlite = { BackendPreference::Sqlite, "sqlite" },
    file = { BackendPreference::File, "file" },
)]
fn select_backend_by_preference(pref: BackendPreference, expected: &str) {
    let dir = TempDir::new().unwrap();
    let backend = select_backend(dir.path(), pref).unwrap();
    assert_eq!(backend.name(), expected);
}

#[test]
fn auto_falls_back_when_sqlite_cannot_open() {
    let dir = TempDir::new().unwrap();
    // A directory where the database file should be makes SQLite fail to open.
    std::fs::create_dir_all(dir.path().join(SQLITE_FILE_NAME)).unwrap();

    let backend = select_backend(dir.path(), BackendPreference::Auto).unwrap();
    assert_eq!(backend.name(), "file");

    backend.set(Namespace::Queue, "a", r#"{"id":"a"}"#).unwrap();
    backend.set(Namespace::Kv, "k", "v").unwrap();
    assert_eq!(backend.list_all(Namespace::Queue).unwrap().len(), 1);
    assert_eq!(backend.get(Namespace::Kv, "k").unwrap().as_deref(), Some("v"));
}

#[test]
fn forced_sqlite_propagates_open_error() {
    let dir = TempDir::new().unwrap();
    std::fs::create_dir_all(dir.path().join(SQLITE_FILE_NAME)).unwrap();

    assert!(select_backend(dir.path(), BackendPreference::Sqlite).is_err());
}
