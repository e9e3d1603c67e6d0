// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Persisted key-value cache.
//!
//! Read-through caches that survive restarts but carry no retry semantics.
//! Every failure path reads as a cache miss: callers refetch instead of
//! handling storage errors.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::clock::{ClockSource, SystemClock};
use crate::storage::{Namespace, StorageBackend};

/// One stored cache record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KvEntry {
    pub key: String,
    pub value: Value,
    /// Epoch millis of the last write.
    pub ts: i64,
}

/// Key-value store over the active backend.
#[derive(Clone)]
pub struct KvStore {
    backend: Arc<dyn StorageBackend>,
    clock: Arc<dyn ClockSource>,
}

impl KvStore {
    pub fn new(backend: Arc<dyn StorageBackend>) -> Self {
        Self::with_clock(backend, Arc::new(SystemClock))
    }

    pub fn with_clock(backend: Arc<dyn StorageBackend>, clock: Arc<dyn ClockSource>) -> Self {
        KvStore { backend, clock }
    }

    /// Reads the full entry for `key`.
    pub fn get_entry(&self, key: &str) -> Option<KvEntry> {
        if key.is_empty() {
            return None;
        }
        let raw = match self.backend.get(Namespace::Kv, key) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                tracing::debug!("kv miss for '{}'", key);
                return None;
            }
            Err(e) => {
                tracing::warn!("kv read of '{}' failed: {}", key, e);
                return None;
            }
        };
        match serde_json::from_str::<KvEntry>(&raw) {
            Ok(entry) => Some(entry),
            Err(e) => {
                tracing::warn!("kv entry '{}' is corrupt: {}", key, e);
                None
            }
        }
    }

    /// Reads and decodes the value for `key`.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let entry = self.get_entry(key)?;
        match serde_json::from_value(entry.value) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::debug!("kv value '{}' has unexpected shape: {}", key, e);
                None
            }
        }
    }

    /// Overwrites `key` with `value`. Returns `false` if nothing was stored.
    pub fn set<T: Serialize>(&self, key: &str, value: &T) -> bool {
        if key.is_empty() {
            return false;
        }
        let entry = match serde_json::to_value(value) {
            Ok(value) => KvEntry { key: key.to_string(), value, ts: self.clock.now_ms() },
            Err(e) => {
                tracing::warn!("kv value for '{}' is not serializable: {}", key, e);
                return false;
            }
        };
        let result = serde_json::to_string(&entry)
            .map_err(crate::Error::from)
            .and_then(|raw| self.backend.set(Namespace::Kv, key, &raw));
        match result {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("kv write of '{}' failed: {}", key, e);
                false
            }
        }
    }

    fn now_ms(&self) -> i64 {
        self.clock.now_ms()
    }
}

/// A cached list with the time it was fetched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedList {
    pub ts: i64,
    pub items: Vec<Value>,
}

/// Per-user list cache stored as `<name>Cache.v1.<userId>`.
#[derive(Clone)]
pub struct ListCache {
    name: String,
    kv: KvStore,
}

impl ListCache {
    pub fn new(name: impl Into<String>, kv: KvStore) -> Self {
        ListCache { name: name.into(), kv }
    }

    /// Cache of the user's finished workouts.
    pub fn workouts(kv: KvStore) -> Self {
        Self::new("workouts", kv)
    }

    /// Cache of the user's workout templates.
    pub fn templates(kv: KvStore) -> Self {
        Self::new("templates", kv)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn key(&self, user_id: &str) -> String {
        format!("{}Cache.v1.{}", self.name, user_id)
    }

    pub fn get(&self, user_id: &str) -> Option<CachedList> {
        if user_id.is_empty() {
            return None;
        }
        let value: Value = self.kv.get(&self.key(user_id))?;
        let items = value.get("items")?.as_array()?.clone();
        let ts = value.get("ts").and_then(Value::as_i64).unwrap_or(0);
        Some(CachedList { ts, items })
    }

    pub fn set(&self, user_id: &str, items: Vec<Value>) -> bool {
        if user_id.is_empty() {
            return false;
        }
        let list = CachedList { ts: self.kv.now_ms(), items };
        self.kv.set(&self.key(user_id), &list)
    }
}

#[cfg(test)]
#[path = "kv_tests.rs"]
mod tests;
