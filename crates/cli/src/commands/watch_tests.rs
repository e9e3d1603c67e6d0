// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use serde_json::json;
use tempfile::TempDir;

use super::*;
use crate::sync::test_helpers::test_engine;

#[tokio::test]
async fn idle_when_online_and_empty() {
    let t = test_engine();
    assert!(tick(&t.engine).await.is_none());
    assert!(t.transport().calls().is_empty());
}

#[tokio::test]
async fn flushes_when_online_with_pending() {
    let t = test_engine();
    t.engine.enqueue("u1", liftsync_core::WORKOUT_FINISH, json!({}), None).unwrap();

    let report = tick(&t.engine).await.unwrap();
    assert_eq!(report.flushed, 1);
    assert!(!t.engine.has_pending());
}

#[tokio::test]
async fn stays_idle_while_probe_fails() {
    let t = test_engine();
    t.engine.enqueue("u1", liftsync_core::WORKOUT_FINISH, json!({}), None).unwrap();
    t.network().set_online(false);
    t.transport().set_probe_ok(false);

    assert!(tick(&t.engine).await.is_none());
    assert!(t.transport().calls().is_empty());
    assert!(!t.engine.is_online());
}

#[tokio::test]
async fn flushes_after_reconnect() {
    let t = test_engine();
    t.engine.enqueue("u1", liftsync_core::WORKOUT_FINISH, json!({}), None).unwrap();
    t.network().set_online(false);

    let report = tick(&t.engine).await.unwrap();
    assert!(t.engine.is_online());
    assert_eq!(report.flushed, 1);
    assert_eq!(t.transport().calls().len(), 1);
}

#[test]
fn second_watcher_is_refused() {
    let temp = TempDir::new().unwrap();
    let _held = acquire_lock(temp.path()).unwrap();

    let second = acquire_lock(temp.path());
    assert!(matches!(second, Err(Error::WatchLocked(_))));
}

#[test]
fn lock_is_released_on_drop() {
    let temp = TempDir::new().unwrap();
    drop(acquire_lock(temp.path()).unwrap());
    assert!(acquire_lock(temp.path()).is_ok());
}
