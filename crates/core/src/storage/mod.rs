// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Persistence backends.
//!
//! Every backend exposes the same small record interface over two namespaces,
//! so the key-value cache and the queue store never branch on which backend
//! is live. The backend is chosen once, at startup, by probing in rank order:
//!
//! ```text
//! ┌──────────────────┐  open fails  ┌──────────────────────┐
//! │  SqliteBackend   │─────────────►│ StringBackend        │
//! │  (queue.db)      │              │ (storage.json)       │
//! └──────────────────┘              └──────────────────────┘
//! ```

mod sqlite;
mod string;

use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use crate::error::{Error, Result};

pub use sqlite::SqliteBackend;
pub use string::{FileStringStorage, StringBackend};

/// SQLite database file name inside the data directory.
pub const SQLITE_FILE_NAME: &str = "queue.db";
/// String storage file name inside the data directory.
pub const STRING_STORAGE_FILE_NAME: &str = "storage.json";

/// Record namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Namespace {
    /// Read-through caches (`{ key, value, ts }` entries).
    Kv,
    /// Queued jobs keyed by job id.
    Queue,
}

/// Common interface of every persistence backend.
///
/// Values are JSON text. Each call is a single atomic operation against the
/// backend: a record is either fully written or not written at all.
pub trait StorageBackend: Send + Sync {
    /// Short backend name for logs and status output.
    fn name(&self) -> &'static str;

    /// Reads one record.
    fn get(&self, ns: Namespace, key: &str) -> Result<Option<String>>;

    /// Inserts or replaces one record.
    fn set(&self, ns: Namespace, key: &str, value: &str) -> Result<()>;

    /// Removes one record. Removing a missing key is not an error.
    fn delete(&self, ns: Namespace, key: &str) -> Result<()>;

    /// Removes every record whose value satisfies `discard`, including
    /// records that cannot be addressed by key. Returns the number removed.
    fn remove_where(&self, ns: Namespace, discard: &dyn Fn(&str) -> bool) -> Result<usize>;

    /// Reads every record in the namespace.
    fn list_all(&self, ns: Namespace) -> Result<Vec<String>>;
}

/// Which backend to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackendPreference {
    /// Probe in rank order and take the first that opens.
    #[default]
    Auto,
    Sqlite,
    File,
}

impl BackendPreference {
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendPreference::Auto => "auto",
            BackendPreference::Sqlite => "sqlite",
            BackendPreference::File => "file",
        }
    }
}

impl fmt::Display for BackendPreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for BackendPreference {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "auto" => Ok(BackendPreference::Auto),
            "sqlite" => Ok(BackendPreference::Sqlite),
            "file" => Ok(BackendPreference::File),
            _ => Err(Error::InvalidBackend(s.to_string())),
        }
    }
}

/// Opens the backend for `dir` according to `preference`.
///
/// `Auto` falls back from SQLite to the string storage when the database
/// cannot be opened; forced choices propagate their open error.
pub fn select_backend(dir: &Path, preference: BackendPreference) -> Result<Arc<dyn StorageBackend>> {
    match preference {
        BackendPreference::Sqlite => Ok(Arc::new(SqliteBackend::open(&dir.join(SQLITE_FILE_NAME))?)),
        BackendPreference::File => Ok(Arc::new(open_string_backend(dir)?)),
        BackendPreference::Auto => match SqliteBackend::open(&dir.join(SQLITE_FILE_NAME)) {
            Ok(backend) => {
                tracing::debug!("using sqlite backend in {}", dir.display());
                Ok(Arc::new(backend))
            }
            Err(e) => {
                tracing::warn!("sqlite backend unavailable ({}), falling back to string storage", e);
                Ok(Arc::new(open_string_backend(dir)?))
            }
        },
    }
}

fn open_string_backend(dir: &Path) -> Result<StringBackend<FileStringStorage>> {
    let storage = FileStringStorage::open(&dir.join(STRING_STORAGE_FILE_NAME))?;
    Ok(StringBackend::new(storage))
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
