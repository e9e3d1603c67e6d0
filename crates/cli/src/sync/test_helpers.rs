// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers for sync module tests.

#![allow(clippy::unwrap_used)]

use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use liftsync_core::storage::SqliteBackend;
use liftsync_core::{
    FixedJitter, Job, ManualClock, Namespace, QueueStore, RetryPolicy, SnapshotMirror,
    StorageBackend,
};

use super::connectivity::NetworkStatus;
use super::engine::{SyncConfig, SyncEngine};
use super::transport::{Transport, TransportError, TransportResult};

/// Fixed test epoch (2023-11-14T22:13:20Z).
pub const NOW: i64 = 1_700_000_000_000;

/// One recorded submission.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmitCall {
    pub endpoint: String,
    pub job_id: String,
    pub idempotency_key: String,
}

/// Mock transport for testing without real sockets.
///
/// Scripted results are consumed in order; once exhausted every submission
/// succeeds.
pub struct MockTransport {
    responses: Mutex<VecDeque<TransportResult<()>>>,
    calls: Mutex<Vec<SubmitCall>>,
    probe_ok: AtomicBool,
    network: NetworkStatus,
}

impl MockTransport {
    pub fn new(network: NetworkStatus) -> Self {
        MockTransport {
            responses: Mutex::new(VecDeque::new()),
            calls: Mutex::new(Vec::new()),
            probe_ok: AtomicBool::new(true),
            network,
        }
    }

    /// Queue a result for the next submission.
    pub fn push_response(&self, result: TransportResult<()>) {
        self.responses.lock().unwrap().push_back(result);
    }

    /// Queue an HTTP 500 failure.
    pub fn push_server_error(&self) {
        self.push_response(Err(TransportError::Status {
            status: 500,
            message: "http_500".to_string(),
        }));
    }

    pub fn calls(&self) -> Vec<SubmitCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn set_probe_ok(&self, ok: bool) {
        self.probe_ok.store(ok, Ordering::SeqCst);
    }
}

impl Transport for MockTransport {
    fn submit<'a>(
        &'a self,
        endpoint: &'a str,
        job: &'a Job,
    ) -> Pin<Box<dyn Future<Output = TransportResult<()>> + Send + 'a>> {
        Box::pin(async move {
            self.calls.lock().unwrap().push(SubmitCall {
                endpoint: endpoint.to_string(),
                job_id: job.id.clone(),
                idempotency_key: job.idempotency_key.clone(),
            });
            // Let concurrent callers interleave, as a real request would.
            tokio::task::yield_now().await;

            let result = self.responses.lock().unwrap().pop_front().unwrap_or(Ok(()));
            let reached = !matches!(result, Err(ref e) if e.is_connectivity());
            self.network.set_online(reached);
            result
        })
    }

    fn probe(&self) -> Pin<Box<dyn Future<Output = TransportResult<()>> + Send + '_>> {
        Box::pin(async move {
            if self.probe_ok.load(Ordering::SeqCst) {
                Ok(())
            } else {
                Err(TransportError::Unreachable("connection refused".to_string()))
            }
        })
    }
}

/// An engine wired to a mock transport, an in-memory database, and a manual
/// clock starting at [`NOW`].
pub struct TestEngine {
    pub engine: SyncEngine<MockTransport>,
    pub clock: Arc<ManualClock>,
    pub backend: Arc<dyn StorageBackend>,
}

impl TestEngine {
    pub fn transport(&self) -> &MockTransport {
        self.engine.transport()
    }

    pub fn network(&self) -> &NetworkStatus {
        self.engine.network()
    }
}

pub fn test_engine() -> TestEngine {
    test_engine_with(SnapshotMirror::disabled(), SyncConfig::default())
}

pub fn test_engine_with(mirror: SnapshotMirror, config: SyncConfig) -> TestEngine {
    let backend: Arc<dyn StorageBackend> = Arc::new(SqliteBackend::open_in_memory().unwrap());
    test_engine_over(backend, mirror, config)
}

pub fn test_engine_over(
    backend: Arc<dyn StorageBackend>,
    mirror: SnapshotMirror,
    config: SyncConfig,
) -> TestEngine {
    let clock = Arc::new(ManualClock::new(NOW));
    let network = NetworkStatus::new(true);
    let engine = SyncEngine::with_sources(
        QueueStore::new(backend.clone(), mirror),
        MockTransport::new(network.clone()),
        network,
        RetryPolicy::default(),
        config,
        clock.clone(),
        Arc::new(FixedJitter(0.0)),
    );
    TestEngine { engine, clock, backend }
}

/// In-memory backend whose writes can be switched to fail.
pub struct FlakyBackend {
    inner: SqliteBackend,
    pub fail_writes: AtomicBool,
}

impl FlakyBackend {
    pub fn new() -> Self {
        FlakyBackend {
            inner: SqliteBackend::open_in_memory().unwrap(),
            fail_writes: AtomicBool::new(false),
        }
    }

    fn check(&self) -> liftsync_core::Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            Err(std::io::Error::other("disk full").into())
        } else {
            Ok(())
        }
    }
}

impl StorageBackend for FlakyBackend {
    fn name(&self) -> &'static str {
        "flaky"
    }

    fn get(&self, ns: Namespace, key: &str) -> liftsync_core::Result<Option<String>> {
        self.inner.get(ns, key)
    }

    fn set(&self, ns: Namespace, key: &str, value: &str) -> liftsync_core::Result<()> {
        self.check()?;
        self.inner.set(ns, key, value)
    }

    fn delete(&self, ns: Namespace, key: &str) -> liftsync_core::Result<()> {
        self.check()?;
        self.inner.delete(ns, key)
    }

    fn remove_where(
        &self,
        ns: Namespace,
        discard: &dyn Fn(&str) -> bool,
    ) -> liftsync_core::Result<usize> {
        self.check()?;
        self.inner.remove_where(ns, discard)
    }

    fn list_all(&self, ns: Namespace) -> liftsync_core::Result<Vec<String>> {
        self.inner.list_all(ns)
    }
}
