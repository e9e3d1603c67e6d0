// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Snapshot mirror: a best-effort copy of the queue on the filesystem.
//!
//! The mirror exists for crash recovery only. When the primary backend comes
//! back empty after an abnormal termination, the queue store repopulates it
//! from here. Nothing in this module ever fails loudly.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::job::Job;

const PROBE_FILE_NAME: &str = ".probe";

/// Filesystem mirror capability, probed once at startup.
#[derive(Debug, Clone)]
pub struct SnapshotMirror {
    /// `None` when the mirror is disabled or the probe failed.
    dir: Option<PathBuf>,
}

impl SnapshotMirror {
    /// Probes `dir` once: it must be creatable and writable.
    ///
    /// An unavailable mirror is cached as such; later calls are no-ops.
    pub fn detect(dir: &Path) -> Self {
        match probe(dir) {
            Ok(()) => {
                tracing::debug!("snapshot mirror enabled at {}", dir.display());
                SnapshotMirror { dir: Some(dir.to_path_buf()) }
            }
            Err(e) => {
                tracing::warn!("snapshot mirror unavailable at {}: {}", dir.display(), e);
                SnapshotMirror { dir: None }
            }
        }
    }

    /// A mirror that does nothing.
    pub fn disabled() -> Self {
        SnapshotMirror { dir: None }
    }

    pub fn is_available(&self) -> bool {
        self.dir.is_some()
    }

    pub fn dir(&self) -> Option<&Path> {
        self.dir.as_deref()
    }

    /// Writes `job` to its mirror file. Returns `false` on any failure.
    pub fn mirror_put(&self, job: &Job) -> bool {
        let Some(dir) = &self.dir else {
            return false;
        };
        if job.id.trim().is_empty() {
            return false;
        }
        match write_job(dir, job) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("mirror write of job {} failed: {}", job.id, e);
                false
            }
        }
    }

    /// Removes the mirror file for `id`. A missing file counts as removed.
    pub fn mirror_delete(&self, id: &str) -> bool {
        let Some(dir) = &self.dir else {
            return false;
        };
        if id.trim().is_empty() {
            return false;
        }
        match fs::remove_file(dir.join(file_name(id))) {
            Ok(()) => true,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => true,
            Err(e) => {
                tracing::warn!("mirror delete of job {} failed: {}", id, e);
                false
            }
        }
    }

    /// Reads every mirrored job, skipping unreadable or corrupt files.
    pub fn mirror_read_all(&self) -> Vec<Job> {
        let Some(dir) = &self.dir else {
            return Vec::new();
        };
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::debug!("mirror directory unreadable: {}", e);
                return Vec::new();
            }
        };

        let mut paths: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
            .collect();
        paths.sort();

        paths
            .iter()
            .filter_map(|path| {
                let text = fs::read_to_string(path).ok()?;
                match serde_json::from_str::<Job>(&text) {
                    Ok(job) if job.has_id() => Some(job),
                    Ok(_) | Err(_) => {
                        tracing::debug!("skipping corrupt mirror file {}", path.display());
                        None
                    }
                }
            })
            .collect()
    }
}

fn probe(dir: &Path) -> std::io::Result<()> {
    fs::create_dir_all(dir)?;
    let probe = dir.join(PROBE_FILE_NAME);
    fs::write(&probe, b"ok")?;
    fs::remove_file(&probe)
}

fn write_job(dir: &Path, job: &Job) -> std::io::Result<()> {
    fs::create_dir_all(dir)?;
    let name = file_name(&job.id);
    let tmp = dir.join(format!("{name}.tmp"));
    {
        let mut file = File::create(&tmp)?;
        file.write_all(serde_json::to_string(job)?.as_bytes())?;
        file.sync_all()?;
    }
    fs::rename(&tmp, dir.join(name))
}

/// Mirror file name for a job id.
pub fn file_name(id: &str) -> String {
    format!("{}.json", encode_component(id))
}

/// Percent-encodes everything except `A-Z a-z 0-9 - _ . ! ~ * ' ( )`.
pub fn encode_component(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for byte in input.bytes() {
        match byte {
            b'A'..=b'Z'
            | b'a'..=b'z'
            | b'0'..=b'9'
            | b'-'
            | b'_'
            | b'.'
            | b'!'
            | b'~'
            | b'*'
            | b'\''
            | b'('
            | b')' => out.push(char::from(byte)),
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}

#[cfg(test)]
#[path = "mirror_tests.rs"]
mod tests;
