// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! String-storage fallback backend.
//!
//! Models a synchronous string-keyed store (one flat map of string keys to
//! string values) persisted as a single JSON object file. KV records live under
//! namespaced keys; the entire queue is one JSON array under a fixed key and
//! every queue write rewrites that array.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use serde_json::Value;

use super::{Namespace, StorageBackend};
use crate::error::Result;

/// Prefix for KV keys, keeping them apart from unrelated application state.
pub const KV_KEY_PREFIX: &str = "ls.kv.";
/// Key holding the serialized queue array.
pub const QUEUE_KEY: &str = "ls.queue.v1";

/// A flat string-keyed storage, persisted to one file.
///
/// Every write rewrites the whole file through a temp file, fsync, and
/// rename, so readers only ever see a complete map.
pub struct FileStringStorage {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileStringStorage {
    /// Opens the storage file at `path`, creating parent directories.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        Ok(FileStringStorage { path: path.to_path_buf(), lock: Mutex::new(()) })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn guard(&self) -> MutexGuard<'_, ()> {
        self.lock.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn read_map(&self) -> Result<BTreeMap<String, String>> {
        match fs::read_to_string(&self.path) {
            Ok(text) if text.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(text) => Ok(serde_json::from_str(&text)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn write_map(&self, map: &BTreeMap<String, String>) -> Result<()> {
        let tmp = self.path.with_extension("json.tmp");
        {
            let mut file = File::create(&tmp)?;
            file.write_all(serde_json::to_string(map)?.as_bytes())?;
            file.sync_all()?;
        }
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    pub fn get_item(&self, key: &str) -> Result<Option<String>> {
        let _guard = self.guard();
        Ok(self.read_map()?.remove(key))
    }

    pub fn set_item(&self, key: &str, value: &str) -> Result<()> {
        let _guard = self.guard();
        let mut map = self.read_map()?;
        map.insert(key.to_string(), value.to_string());
        self.write_map(&map)
    }

    pub fn remove_item(&self, key: &str) -> Result<()> {
        let _guard = self.guard();
        let mut map = self.read_map()?;
        if map.remove(key).is_some() {
            self.write_map(&map)?;
        }
        Ok(())
    }

    /// Applies `f` to the value under `key` as one read-modify-write.
    fn update_item<F>(&self, key: &str, f: F) -> Result<()>
    where
        F: FnOnce(Option<&str>) -> Result<String>,
    {
        let _guard = self.guard();
        let mut map = self.read_map()?;
        let next = f(map.get(key).map(String::as_str))?;
        map.insert(key.to_string(), next);
        self.write_map(&map)
    }
}

/// [`StorageBackend`] over a [`FileStringStorage`].
pub struct StringBackend<S = FileStringStorage> {
    storage: S,
}

impl<S> StringBackend<S> {
    pub fn new(storage: S) -> Self {
        StringBackend { storage }
    }
}

/// Parses the stored queue array, treating a missing or corrupt value as empty.
fn parse_queue(raw: Option<&str>) -> Vec<Value> {
    match raw.map(serde_json::from_str::<Value>) {
        Some(Ok(Value::Array(items))) => items,
        Some(Ok(_)) | Some(Err(_)) => {
            tracing::warn!("discarding unreadable queue array under '{}'", QUEUE_KEY);
            Vec::new()
        }
        None => Vec::new(),
    }
}

fn record_id(record: &Value) -> Option<&str> {
    record.get("id").and_then(Value::as_str)
}

impl StorageBackend for StringBackend<FileStringStorage> {
    fn name(&self) -> &'static str {
        "file"
    }

    fn get(&self, ns: Namespace, key: &str) -> Result<Option<String>> {
        match ns {
            Namespace::Kv => self.storage.get_item(&format!("{KV_KEY_PREFIX}{key}")),
            Namespace::Queue => {
                let raw = self.storage.get_item(QUEUE_KEY)?;
                let found = parse_queue(raw.as_deref())
                    .into_iter()
                    .find(|record| record_id(record) == Some(key));
                Ok(found.map(|record| record.to_string()))
            }
        }
    }

    fn set(&self, ns: Namespace, key: &str, value: &str) -> Result<()> {
        match ns {
            Namespace::Kv => self.storage.set_item(&format!("{KV_KEY_PREFIX}{key}"), value),
            Namespace::Queue => {
                let record: Value = serde_json::from_str(value)?;
                self.storage.update_item(QUEUE_KEY, |raw| {
                    let mut items: Vec<Value> = parse_queue(raw)
                        .into_iter()
                        .filter(|existing| record_id(existing) != Some(key))
                        .collect();
                    items.push(record);
                    Ok(serde_json::to_string(&items)?)
                })
            }
        }
    }

    fn delete(&self, ns: Namespace, key: &str) -> Result<()> {
        match ns {
            Namespace::Kv => self.storage.remove_item(&format!("{KV_KEY_PREFIX}{key}")),
            Namespace::Queue => self.storage.update_item(QUEUE_KEY, |raw| {
                let items: Vec<Value> = parse_queue(raw)
                    .into_iter()
                    .filter(|existing| record_id(existing) != Some(key))
                    .collect();
                Ok(serde_json::to_string(&items)?)
            }),
        }
    }

    fn remove_where(&self, ns: Namespace, discard: &dyn Fn(&str) -> bool) -> Result<usize> {
        match ns {
            Namespace::Kv => {
                let _guard = self.storage.guard();
                let mut map = self.storage.read_map()?;
                let before = map.len();
                map.retain(|key, value| !(key.starts_with(KV_KEY_PREFIX) && discard(value)));
                let removed = before - map.len();
                if removed > 0 {
                    self.storage.write_map(&map)?;
                }
                Ok(removed)
            }
            Namespace::Queue => {
                let mut removed = 0;
                self.storage.update_item(QUEUE_KEY, |raw| {
                    let items = parse_queue(raw);
                    let before = items.len();
                    let kept: Vec<Value> = items
                        .into_iter()
                        .filter(|record| !discard(&record.to_string()))
                        .collect();
                    removed = before - kept.len();
                    Ok(serde_json::to_string(&kept)?)
                })?;
                Ok(removed)
            }
        }
    }

    fn list_all(&self, ns: Namespace) -> Result<Vec<String>> {
        match ns {
            Namespace::Kv => {
                let _guard = self.storage.guard();
                Ok(self
                    .storage
                    .read_map()?
                    .into_iter()
                    .filter(|(key, _)| key.starts_with(KV_KEY_PREFIX))
                    .map(|(_, value)| value)
                    .collect())
            }
            Namespace::Queue => {
                let raw = self.storage.get_item(QUEUE_KEY)?;
                Ok(parse_queue(raw.as_deref()).iter().map(Value::to_string).collect())
            }
        }
    }
}

#[cfg(test)]
#[path = "string_tests.rs"]
mod tests;
