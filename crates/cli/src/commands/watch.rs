// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Long-running trigger loop.
//!
//! Stands in for the application's periodic timer and reconnect listener:
//! every tick either probes for connectivity (when offline) or flushes (when
//! online with work queued). Only one watcher may run per data directory.

use std::fs::{self, File};
use std::path::Path;
use std::time::Duration;

use tokio::sync::broadcast::error::RecvError;

use super::{block_on, Context};
use crate::error::{Error, Result};
use crate::sync::{FlushOptions, FlushReport, SyncEngine, Transport};

pub const WATCH_LOCK_FILE: &str = "watch.lock";

pub fn run(ctx: &Context, interval: Option<u64>) -> Result<()> {
    let _lock = acquire_lock(&ctx.data_dir)?;
    let secs = interval.unwrap_or(ctx.config.watch.interval_secs).max(1);
    tracing::info!(
        "watching {} every {}s (backend {})",
        ctx.data_dir.display(),
        secs,
        ctx.engine.store().backend_name()
    );
    block_on(watch_loop(&ctx.engine, Duration::from_secs(secs)))?;
    tracing::info!("watcher stopped");
    Ok(())
}

/// Takes the per-directory watcher lock. Held until the file is dropped.
pub fn acquire_lock(data_dir: &Path) -> Result<File> {
    use fs2::FileExt;

    let file = fs::OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(data_dir.join(WATCH_LOCK_FILE))?;
    file.try_lock_exclusive()
        .map_err(|_| Error::WatchLocked(data_dir.display().to_string()))?;
    Ok(file)
}

async fn watch_loop<T: Transport>(engine: &SyncEngine<T>, period: Duration) {
    let mut events = engine.subscribe();
    let mut ticker = tokio::time::interval(period);
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => break,
            _ = ticker.tick() => {
                if let Some(report) = tick(engine).await {
                    tracing::info!(
                        flushed = report.flushed,
                        failed = report.failed,
                        offline = report.offline,
                        "flush finished"
                    );
                }
            }
            event = events.recv() => match event {
                Ok(event) => tracing::info!(?event, "queue changed"),
                Err(RecvError::Lagged(skipped)) => tracing::warn!("missed {} queue events", skipped),
                Err(RecvError::Closed) => break,
            },
        }
    }
}

/// One watcher step. Returns the flush report when a flush ran.
pub async fn tick<T: Transport>(engine: &SyncEngine<T>) -> Option<FlushReport> {
    if !engine.is_online() {
        if !engine.probe().await {
            tracing::debug!("still offline");
            return None;
        }
        tracing::info!("reconnected, flushing");
        return Some(engine.flush(FlushOptions::default()).await);
    }
    if engine.has_pending() {
        return Some(engine.flush(FlushOptions::default()).await);
    }
    None
}

#[cfg(test)]
#[path = "watch_tests.rs"]
mod tests;
