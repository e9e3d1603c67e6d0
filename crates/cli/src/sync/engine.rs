// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Sync engine: enqueue, flush, expiry, and inspection.
//!
//! A job moves through a small state machine:
//!
//! ```text
//! pending(0) ──attempt ok──► deleted
//!     │
//!     └─attempt fails─► pending(n+1, backoff) ──…──► failed(max) ──bump──► pending(0)
//! ```
//!
//! Flushes are single-flight: a caller that arrives while a flush is running
//! waits for it and receives its report instead of starting a second batch.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use liftsync_core::summary::{sort_oldest_first, sort_recent_first};
use liftsync_core::{
    ClockSource, GcReason, JitterSource, Job, JobStatus, QueueStore, QueueSummary, RandomJitter,
    RetryPolicy, SystemClock, WORKOUT_FINISH,
};
use serde::Serialize;
use serde_json::Value;
use tokio::sync::{broadcast, Mutex};

use super::connectivity::NetworkStatus;
use super::events::{EventBus, QueueEvent};
use super::transport::{HttpTransport, Transport};
use crate::error::{Error, Result};

/// Configuration for the sync engine.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Endpoint path per job type.
    pub endpoints: BTreeMap<String, String>,
    /// Jobs attempted per flush when no limit is given.
    pub batch_size: usize,
    /// Upper bound on any flush limit.
    pub max_batch: usize,
}

impl Default for SyncConfig {
    fn default() -> Self {
        SyncConfig {
            endpoints: BTreeMap::from([(
                WORKOUT_FINISH.to_string(),
                "/api/workouts/finish".to_string(),
            )]),
            batch_size: 6,
            max_batch: 30,
        }
    }
}

impl SyncConfig {
    /// Clamps a requested flush limit into `1..=max_batch`.
    pub fn batch_limit(&self, requested: Option<usize>) -> usize {
        let max_batch = self.max_batch.max(1);
        requested.unwrap_or(self.batch_size).clamp(1, max_batch)
    }

    pub fn endpoint_for(&self, job_type: &str) -> Option<&str> {
        self.endpoints.get(job_type).map(String::as_str)
    }
}

/// Flush parameters.
#[derive(Debug, Clone, Copy, Default)]
pub struct FlushOptions {
    /// Maximum jobs to attempt; clamped to the configured batch bounds.
    pub max: Option<usize>,
    /// Ignore the offline flag and backoff gates.
    ///
    /// A forced caller that arrives during an unforced flush runs its own
    /// batch once that flush completes.
    pub force: bool,
}

/// Outcome of one flush.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FlushReport {
    /// The flush short-circuited because the device is offline.
    pub offline: bool,
    /// Jobs acknowledged and removed.
    pub flushed: usize,
    /// Attempts that failed.
    pub failed: usize,
}

/// Outcome of a garbage-collection pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GcReport {
    pub expired: usize,
    pub malformed: usize,
}

impl GcReport {
    pub fn total(&self) -> usize {
        self.expired + self.malformed
    }
}

/// Sync engine over a queue store and a transport.
pub struct SyncEngine<T: Transport = HttpTransport> {
    store: QueueStore,
    transport: T,
    network: NetworkStatus,
    policy: RetryPolicy,
    config: SyncConfig,
    clock: Arc<dyn ClockSource>,
    jitter: Arc<dyn JitterSource>,
    events: EventBus,
    /// Last completed flush and whether it was forced; held for the
    /// duration of a flush.
    flight: Mutex<(FlushReport, bool)>,
    /// Count of completed flushes.
    generation: AtomicU64,
}

impl<T: Transport> SyncEngine<T> {
    /// Create an engine on the system clock with random jitter.
    pub fn new(
        store: QueueStore,
        transport: T,
        network: NetworkStatus,
        policy: RetryPolicy,
        config: SyncConfig,
    ) -> Self {
        Self::with_sources(
            store,
            transport,
            network,
            policy,
            config,
            Arc::new(SystemClock),
            Arc::new(RandomJitter),
        )
    }

    /// Create an engine with explicit time and jitter sources (for testing).
    pub fn with_sources(
        store: QueueStore,
        transport: T,
        network: NetworkStatus,
        policy: RetryPolicy,
        config: SyncConfig,
        clock: Arc<dyn ClockSource>,
        jitter: Arc<dyn JitterSource>,
    ) -> Self {
        SyncEngine {
            store,
            transport,
            network,
            policy,
            config,
            clock,
            jitter,
            events: EventBus::new(),
            flight: Mutex::new((FlushReport::default(), false)),
            generation: AtomicU64::new(0),
        }
    }

    pub fn store(&self) -> &QueueStore {
        &self.store
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn network(&self) -> &NetworkStatus {
        &self.network
    }

    pub fn is_online(&self) -> bool {
        self.network.is_online()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<QueueEvent> {
        self.events.subscribe()
    }

    /// Queues a mutation for delivery.
    ///
    /// An empty or missing idempotency key is replaced with a fresh one.
    pub fn enqueue(
        &self,
        user_id: &str,
        job_type: &str,
        payload: Value,
        idempotency_key: Option<String>,
    ) -> Result<Job> {
        let user_id = user_id.trim();
        if user_id.is_empty() {
            return Err(Error::MissingUser);
        }
        let key = idempotency_key
            .filter(|k| !k.trim().is_empty())
            .unwrap_or_else(Job::generate_idempotency_key);

        let mut job = Job::new(
            Job::generate_id(),
            job_type,
            user_id,
            key,
            payload,
            self.clock.now_ms(),
        );
        job.max_attempts = self.policy.max_attempts;
        if !self.store.put(&job) {
            return Err(Error::Storage(format!("could not persist job {}", job.id)));
        }

        tracing::info!(id = %job.id, job_type, "enqueued job");
        self.events.emit(QueueEvent::Enqueued {
            id: job.id.clone(),
            user_id: job.user_id.clone(),
        });
        Ok(job)
    }

    /// Queues a finished workout.
    pub fn enqueue_workout_finish(
        &self,
        user_id: &str,
        payload: Value,
        idempotency_key: Option<String>,
    ) -> Result<Job> {
        self.enqueue(user_id, WORKOUT_FINISH, payload, idempotency_key)
    }

    /// Attempts due jobs, one at a time, oldest first.
    pub async fn flush(&self, opts: FlushOptions) -> FlushReport {
        if !opts.force && !self.network.is_online() {
            tracing::debug!("offline, skipping flush");
            return FlushReport { offline: true, ..FlushReport::default() };
        }

        let seen = self.generation.load(Ordering::SeqCst);
        let mut last = self.flight.lock().await;
        let (joined, joined_forced) = &*last;
        if self.generation.load(Ordering::SeqCst) != seen && (*joined_forced || !opts.force) {
            // A flush completed while we waited; its report stands for ours.
            return joined.clone();
        }

        let report = self.run_flush(opts).await;
        *last = (report.clone(), opts.force);
        self.generation.fetch_add(1, Ordering::SeqCst);
        report
    }

    async fn run_flush(&self, opts: FlushOptions) -> FlushReport {
        let mut report = FlushReport::default();
        let now = self.clock.now_ms();
        self.gc_at(now);

        let mut jobs: Vec<Job> = self
            .store
            .get_all()
            .into_iter()
            .filter(|job| job.has_id())
            .filter(|job| self.config.endpoint_for(&job.job_type).is_some())
            .filter(|job| !job.is_failed())
            .filter(|job| opts.force || job.is_due(now))
            .collect();
        sort_oldest_first(&mut jobs);
        jobs.truncate(self.config.batch_limit(opts.max));

        for mut job in jobs {
            let Some(endpoint) = self.config.endpoint_for(&job.job_type) else {
                continue;
            };

            match self.transport.submit(endpoint, &job).await {
                Ok(()) => {
                    if !self.store.delete(&job.id) {
                        tracing::warn!(id = %job.id, "acknowledged job could not be removed");
                        continue;
                    }
                    report.flushed += 1;
                    tracing::info!(id = %job.id, "job delivered");
                    self.events.emit(QueueEvent::Flushed { id: job.id.clone() });
                }
                Err(e) => {
                    let now = self.clock.now_ms();
                    self.policy.record_failure(&mut job, &e.to_string(), now, self.jitter.as_ref());
                    if !self.store.put(&job) {
                        tracing::warn!(id = %job.id, "failed attempt could not be recorded");
                    }
                    report.failed += 1;
                    tracing::info!(
                        id = %job.id,
                        attempts = job.attempts,
                        status = %job.status,
                        "attempt failed: {}",
                        e
                    );
                    self.events.emit(QueueEvent::AttemptFailed {
                        id: job.id.clone(),
                        attempts: job.attempts,
                        exhausted: job.is_failed(),
                    });
                    if !self.network.is_online() {
                        tracing::info!("went offline, stopping flush");
                        break;
                    }
                }
            }
        }

        report
    }

    /// Deletes expired and malformed jobs.
    pub fn gc(&self) -> GcReport {
        self.gc_at(self.clock.now_ms())
    }

    fn gc_at(&self, now: i64) -> GcReport {
        let mut report = GcReport {
            malformed: self.store.purge_unkeyed(),
            ..GcReport::default()
        };
        for job in self.store.get_all() {
            let Some(reason) = self.policy.gc_verdict(&job, now) else {
                continue;
            };
            if !self.store.delete(&job.id) {
                continue;
            }
            match reason {
                GcReason::Expired => report.expired += 1,
                GcReason::Malformed => report.malformed += 1,
            }
            tracing::debug!(id = %job.id, ?reason, "collected job");
        }
        if report.total() > 0 {
            tracing::info!(expired = report.expired, malformed = report.malformed, "gc removed jobs");
        }
        report
    }

    /// Checks connectivity and updates the network flag.
    pub async fn probe(&self) -> bool {
        let online = self.transport.probe().await.is_ok();
        self.network.set_online(online);
        online
    }

    /// The user's jobs within the retention window, newest first.
    fn user_jobs(&self, user_id: &str) -> Vec<Job> {
        let now = self.clock.now_ms();
        let mut jobs: Vec<Job> = self
            .store
            .get_all()
            .into_iter()
            .filter(|job| job.user_id == user_id)
            .filter(|job| self.policy.is_retained(job, now))
            .collect();
        sort_recent_first(&mut jobs);
        jobs
    }

    pub fn summary(&self, user_id: &str) -> QueueSummary {
        QueueSummary::from_jobs(self.user_jobs(user_id), self.clock.now_ms(), self.is_online())
    }

    pub fn list_jobs(&self, user_id: &str, include_failed: bool) -> Vec<Job> {
        let mut jobs = self.user_jobs(user_id);
        if !include_failed {
            jobs.retain(|job| !job.is_failed());
        }
        jobs
    }

    /// Number of the user's jobs still awaiting delivery.
    pub fn pending_count(&self, user_id: &str) -> usize {
        self.store
            .get_all()
            .iter()
            .filter(|job| job.user_id == user_id && !job.is_failed())
            .count()
    }

    /// True when any job, for any user, is awaiting delivery.
    pub fn has_pending(&self) -> bool {
        self.store.get_all().iter().any(|job| !job.is_failed())
    }

    /// Makes one job eligible for the next flush.
    pub fn bump(&self, id: &str) -> Result<Job> {
        let mut job = self
            .store
            .get(id)
            .ok_or_else(|| Error::JobNotFound(id.to_string()))?;
        job.bump(self.clock.now_ms());
        if !self.store.put(&job) {
            return Err(Error::Storage(format!("could not persist job {}", job.id)));
        }
        self.events.emit(QueueEvent::Bumped { id: job.id.clone() });
        Ok(job)
    }

    /// Deletes the user's jobs, optionally only those with `status`.
    pub fn clear(&self, user_id: &str, status: Option<JobStatus>) -> Result<usize> {
        let user_id = user_id.trim();
        if user_id.is_empty() {
            return Err(Error::MissingUser);
        }

        let mut removed = 0;
        for job in self.store.get_all() {
            if job.user_id != user_id || status.is_some_and(|s| s != job.status) {
                continue;
            }
            if self.store.delete(&job.id) {
                removed += 1;
            }
        }

        self.events.emit(QueueEvent::Cleared { user_id: user_id.to_string(), removed });
        Ok(removed)
    }
}
