// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! SQLite backend: one row per record, keyed by record key.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use rusqlite::{params, Connection, OptionalExtension};

use super::{Namespace, StorageBackend};
use crate::error::Result;

/// SQL schema for the queue database.
pub const SCHEMA: &str = r#"
-- Read-through cache entries
CREATE TABLE IF NOT EXISTS kv (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL,
    updated_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
);

-- Pending mutation jobs, full JSON body per row
CREATE TABLE IF NOT EXISTS queue (
    id TEXT PRIMARY KEY,
    body TEXT NOT NULL,
    updated_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
);
"#;

/// SQLite-backed record storage.
pub struct SqliteBackend {
    conn: Mutex<Connection>,
}

impl SqliteBackend {
    /// Opens (creating if needed) the database at `path`.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = FULL;
             PRAGMA busy_timeout = 5000;",
        )?;
        conn.execute_batch(SCHEMA)?;
        Ok(SqliteBackend { conn: Mutex::new(conn) })
    }

    /// Opens a private in-memory database.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;
        Ok(SqliteBackend { conn: Mutex::new(conn) })
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|e| e.into_inner())
    }
}

fn table(ns: Namespace) -> (&'static str, &'static str, &'static str) {
    match ns {
        Namespace::Kv => ("kv", "key", "value"),
        Namespace::Queue => ("queue", "id", "body"),
    }
}

impl StorageBackend for SqliteBackend {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn get(&self, ns: Namespace, key: &str) -> Result<Option<String>> {
        let (table, key_col, value_col) = table(ns);
        let sql = format!("SELECT {value_col} FROM {table} WHERE {key_col} = ?1");
        let value = self
            .conn()
            .query_row(&sql, params![key], |row| row.get::<_, String>(0))
            .optional()?;
        Ok(value)
    }

    fn set(&self, ns: Namespace, key: &str, value: &str) -> Result<()> {
        let (table, key_col, value_col) = table(ns);
        let sql = format!(
            "INSERT INTO {table} ({key_col}, {value_col}, updated_at)
             VALUES (?1, ?2, CURRENT_TIMESTAMP)
             ON CONFLICT({key_col}) DO UPDATE SET
                {value_col} = excluded.{value_col},
                updated_at = excluded.updated_at"
        );
        self.conn().execute(&sql, params![key, value])?;
        Ok(())
    }

    fn delete(&self, ns: Namespace, key: &str) -> Result<()> {
        let (table, key_col, _) = table(ns);
        let sql = format!("DELETE FROM {table} WHERE {key_col} = ?1");
        self.conn().execute(&sql, params![key])?;
        Ok(())
    }

    fn remove_where(&self, ns: Namespace, discard: &dyn Fn(&str) -> bool) -> Result<usize> {
        let (table, key_col, value_col) = table(ns);
        let conn = self.conn();
        let doomed: Vec<String> = {
            let sql = format!("SELECT {key_col}, {value_col} FROM {table}");
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            rows.into_iter()
                .filter(|(_, value)| discard(value))
                .map(|(key, _)| key)
                .collect()
        };

        let sql = format!("DELETE FROM {table} WHERE {key_col} = ?1");
        for key in &doomed {
            conn.execute(&sql, params![key])?;
        }
        Ok(doomed.len())
    }

    fn list_all(&self, ns: Namespace) -> Result<Vec<String>> {
        let (table, key_col, value_col) = table(ns);
        let sql = format!("SELECT {value_col} FROM {table} ORDER BY {key_col}");
        let conn = self.conn();
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }
}

#[cfg(test)]
#[path = "sqlite_tests.rs"]
mod tests;
