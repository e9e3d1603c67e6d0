// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

pub mod bump;
pub mod cache;
pub mod clear;
pub mod enqueue;
pub mod flush;
pub mod gc;
pub mod init;
pub mod list;
pub mod status;
pub mod watch;

use std::future::Future;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use liftsync_core::{select_backend, KvStore, QueueStore, SnapshotMirror, StorageBackend};
use serde_json::Value;

use crate::cli::PayloadArgs;
use crate::config::{require_data_dir, Config};
use crate::error::{Error, Result};
use crate::sync::{HttpTransport, NetworkStatus, SyncConfig, SyncEngine};

/// Everything a command needs, opened once per invocation.
pub struct Context {
    pub data_dir: PathBuf,
    pub config: Config,
    pub backend: Arc<dyn StorageBackend>,
    pub engine: SyncEngine,
}

impl Context {
    pub fn kv(&self) -> KvStore {
        KvStore::new(self.backend.clone())
    }
}

/// Helper to open storage, mirror, and engine for an initialized data dir.
pub fn open(data_dir: &Path, offline: bool) -> Result<Context> {
    require_data_dir(data_dir)?;
    let config = Config::load(data_dir)?;

    let backend = select_backend(data_dir, config.storage.preference()?)?;
    tracing::debug!(backend = backend.name(), "storage opened");

    let mirror = if config.mirror.enabled {
        SnapshotMirror::detect(&config.mirror.resolve_dir(data_dir))
    } else {
        SnapshotMirror::disabled()
    };

    let network = NetworkStatus::new(!offline);
    let transport = HttpTransport::new(&config.server, network.clone())?;
    let engine = SyncEngine::new(
        QueueStore::new(backend.clone(), mirror),
        transport,
        network,
        config.queue.retry_policy(),
        sync_config(&config),
    );

    Ok(Context { data_dir: data_dir.to_path_buf(), config, backend, engine })
}

pub fn sync_config(config: &Config) -> SyncConfig {
    SyncConfig {
        endpoints: config.server.endpoints.clone(),
        batch_size: config.queue.batch_size,
        max_batch: config.queue.max_batch,
    }
}

/// Runs `future` to completion on a fresh current-thread runtime.
pub fn block_on<F: Future>(future: F) -> Result<F::Output> {
    let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build()?;
    Ok(runtime.block_on(future))
}

/// Reads JSON from `--payload` or `--file`, defaulting to `{}`.
pub fn read_payload(input: &PayloadArgs) -> Result<Value> {
    let text = match (&input.payload, &input.file) {
        (Some(inline), _) => inline.clone(),
        (None, Some(path)) if path.as_os_str() == "-" => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        }
        (None, Some(path)) => std::fs::read_to_string(path)
            .map_err(|e| Error::InvalidPayload(format!("cannot read {}: {}", path.display(), e)))?,
        (None, None) => return Ok(Value::Object(Default::default())),
    };
    serde_json::from_str(&text).map_err(|e| Error::InvalidPayload(e.to_string()))
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
