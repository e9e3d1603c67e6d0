// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! liftsync-core: durable storage for the offline mutation queue
//!
//! This crate provides the job model, the retry and expiry policy, and the
//! persistence tiers (storage backends, key-value cache, snapshot mirror,
//! queue store) used by the liftsync sync engine and CLI.

pub mod clock;
pub mod error;
pub mod job;
pub mod kv;
pub mod mirror;
pub mod policy;
pub mod queue;
pub mod storage;
pub mod summary;

pub use clock::{ClockSource, ManualClock, SystemClock};
pub use error::{Error, Result};
pub use job::{Job, JobStatus, WORKOUT_FINISH};
pub use kv::{CachedList, KvEntry, KvStore, ListCache};
pub use mirror::SnapshotMirror;
pub use policy::{FixedJitter, GcReason, JitterSource, RandomJitter, RetryPolicy};
pub use queue::QueueStore;
pub use storage::{select_backend, BackendPreference, Namespace, StorageBackend};
pub use summary::QueueSummary;
