// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Durable queue store.
//!
//! Jobs live in the primary backend, one record per job id, and every accepted
//! write is copied to the [`SnapshotMirror`]. Reads never fail: a storage error
//! reads as an empty queue and a write error reads as `false`.

use std::sync::Arc;

use serde_json::Value;

use crate::job::Job;
use crate::mirror::SnapshotMirror;
use crate::storage::{Namespace, StorageBackend};

/// The persisted list of queued jobs.
#[derive(Clone)]
pub struct QueueStore {
    backend: Arc<dyn StorageBackend>,
    mirror: SnapshotMirror,
}

impl QueueStore {
    pub fn new(backend: Arc<dyn StorageBackend>, mirror: SnapshotMirror) -> Self {
        QueueStore { backend, mirror }
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    pub fn mirror(&self) -> &SnapshotMirror {
        &self.mirror
    }

    /// Inserts or replaces `job`. Returns `true` when the primary write landed.
    pub fn put(&self, job: &Job) -> bool {
        if job.id.trim().is_empty() {
            return false;
        }

        let stored = serde_json::to_string(job)
            .map_err(crate::Error::from)
            .and_then(|raw| self.backend.set(Namespace::Queue, &job.id, &raw));

        // Mirror regardless of the primary outcome; it is the recovery copy.
        self.mirror.mirror_put(job);

        match stored {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("queue write of job {} failed: {}", job.id, e);
                false
            }
        }
    }

    /// Removes the job with `id` from the primary backend and the mirror.
    pub fn delete(&self, id: &str) -> bool {
        if id.trim().is_empty() {
            return false;
        }
        let removed = self.backend.delete(Namespace::Queue, id);
        self.mirror.mirror_delete(id);
        match removed {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("queue delete of job {} failed: {}", id, e);
                false
            }
        }
    }

    /// Reads one job.
    pub fn get(&self, id: &str) -> Option<Job> {
        if id.trim().is_empty() {
            return None;
        }
        match self.backend.get(Namespace::Queue, id) {
            Ok(raw) => raw.and_then(|raw| decode(&raw)),
            Err(e) => {
                tracing::warn!("queue read of job {} failed: {}", id, e);
                None
            }
        }
    }

    /// Reads every job.
    ///
    /// An empty primary is reconciled against the mirror: mirrored jobs are
    /// written back to the primary and returned as-is.
    pub fn get_all(&self) -> Vec<Job> {
        let rows = match self.backend.list_all(Namespace::Queue) {
            Ok(rows) => rows,
            Err(e) => {
                tracing::warn!("queue read failed: {}", e);
                Vec::new()
            }
        };
        if !rows.is_empty() {
            return rows
                .iter()
                .filter_map(|raw| decode(raw))
                .filter(Job::has_id)
                .collect();
        }

        let mirrored = self.mirror.mirror_read_all();
        if mirrored.is_empty() {
            return Vec::new();
        }

        tracing::info!("restoring {} job(s) from snapshot mirror", mirrored.len());
        for job in &mirrored {
            let restored = serde_json::to_string(job)
                .map_err(crate::Error::from)
                .and_then(|raw| self.backend.set(Namespace::Queue, &job.id, &raw));
            if let Err(e) = restored {
                tracing::warn!("could not restore job {}: {}", job.id, e);
            }
        }
        mirrored
    }

    /// Removes stored records that carry no usable job id.
    ///
    /// Such records can be neither delivered nor deleted by id. Returns the
    /// number removed.
    pub fn purge_unkeyed(&self) -> usize {
        match self.backend.remove_where(Namespace::Queue, &is_unkeyed) {
            Ok(removed) => removed,
            Err(e) => {
                tracing::warn!("queue purge failed: {}", e);
                0
            }
        }
    }
}

/// True for a JSON record whose `id` is missing, not a string, or blank.
fn is_unkeyed(raw: &str) -> bool {
    match serde_json::from_str::<Value>(raw) {
        Ok(record) => record
            .get("id")
            .and_then(Value::as_str)
            .map_or(true, |id| id.trim().is_empty()),
        Err(_) => false,
    }
}

fn decode(raw: &str) -> Option<Job> {
    match serde_json::from_str::<Job>(raw) {
        Ok(job) => Some(job),
        Err(e) => {
            tracing::warn!("skipping unreadable queue record: {}", e);
            None
        }
    }
}

#[cfg(test)]
#[path = "queue_tests.rs"]
mod tests;
