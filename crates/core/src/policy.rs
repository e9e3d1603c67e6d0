// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Retry, backoff, and expiry rules for queued jobs.
//!
//! Backoff doubles from a 5s floor up to a 300s ceiling, with ±15% jitter so
//! many clients reconnecting at once do not retry in lockstep:
//!
//! ```text
//! failures before this one:  0    1    2    3    4     5     6+
//! base delay (s):            5   10   20   40   80   160   300 (cap)
//! ```
//!
//! Expiry: any job older than the TTL (14 days) is collected; a failed job
//! gets a further grace window (7 days) so the user can inspect or bump it.

use rand::Rng;

use crate::clock::{from_millis, DAY_MS};
use crate::job::{Job, JobStatus};

/// Source of jitter samples in `[-1.0, 1.0]`.
pub trait JitterSource: Send + Sync {
    fn sample(&self) -> f64;
}

/// Uniform random jitter from the thread-local RNG.
#[derive(Debug, Default)]
pub struct RandomJitter;

impl JitterSource for RandomJitter {
    fn sample(&self) -> f64 {
        rand::rng().random_range(-1.0..=1.0)
    }
}

/// Constant jitter, for tests and deterministic callers.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedJitter(pub f64);

impl JitterSource for FixedJitter {
    fn sample(&self) -> f64 {
        self.0.clamp(-1.0, 1.0)
    }
}

/// Why a garbage-collection pass removes a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GcReason {
    /// Older than its time-to-live.
    Expired,
    /// Missing the fields needed to ever deliver it.
    Malformed,
}

/// Tunable retry and expiry policy.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff_base_ms: i64,
    pub backoff_max_ms: i64,
    /// Jitter amplitude as a fraction of the base delay.
    pub jitter: f64,
    /// Floor applied after jitter.
    pub min_delay_ms: i64,
    pub job_ttl_ms: i64,
    /// Extra lifetime for failed jobs on top of `job_ttl_ms`.
    pub failed_grace_ms: i64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            max_attempts: crate::job::DEFAULT_MAX_ATTEMPTS,
            backoff_base_ms: 5_000,
            backoff_max_ms: 300_000,
            jitter: 0.15,
            min_delay_ms: 1_000,
            job_ttl_ms: 14 * DAY_MS,
            failed_grace_ms: 7 * DAY_MS,
        }
    }
}

impl RetryPolicy {
    /// Base delay before jitter for a job that had `failures` earlier failures.
    pub fn base_delay_ms(&self, failures: u32) -> i64 {
        // 2^30 already overflows any sane cap; clamp the exponent first.
        let exp = 1_i64 << failures.min(30);
        self.backoff_base_ms
            .saturating_mul(exp)
            .clamp(self.backoff_base_ms, self.backoff_max_ms.max(self.backoff_base_ms))
    }

    /// Delay with jitter applied, never below `min_delay_ms`.
    pub fn delay_ms(&self, failures: u32, jitter: &dyn JitterSource) -> i64 {
        let base = self.base_delay_ms(failures) as f64;
        let delay = base * (1.0 + self.jitter * jitter.sample());
        (delay.round() as i64).max(self.min_delay_ms)
    }

    /// The epoch-millis gate for the next attempt.
    pub fn next_attempt_at(&self, now_ms: i64, failures: u32, jitter: &dyn JitterSource) -> i64 {
        now_ms.saturating_add(self.delay_ms(failures, jitter))
    }

    /// Maximum age of a job with the given status.
    pub fn ttl_ms(&self, status: JobStatus) -> i64 {
        match status {
            JobStatus::Pending => self.job_ttl_ms,
            JobStatus::Failed => self.job_ttl_ms.saturating_add(self.failed_grace_ms),
        }
    }

    /// Age beyond which no job is shown or kept, whatever its status.
    pub fn retention_ms(&self) -> i64 {
        self.ttl_ms(JobStatus::Failed)
    }

    /// Decides whether a garbage-collection pass should remove `job`.
    ///
    /// Jobs without a parseable creation time never age out.
    pub fn gc_verdict(&self, job: &Job, now_ms: i64) -> Option<GcReason> {
        if !job.has_id() {
            return Some(GcReason::Malformed);
        }
        if let Some(created) = job.created_ms() {
            if now_ms.saturating_sub(created) > self.ttl_ms(job.status) {
                return Some(GcReason::Expired);
            }
        }
        if job.job_type.trim().is_empty() {
            return Some(GcReason::Malformed);
        }
        None
    }

    /// Whether `job` is still inside the listing window.
    pub fn is_retained(&self, job: &Job, now_ms: i64) -> bool {
        job.created_ms()
            .map_or(true, |created| now_ms.saturating_sub(created) <= self.retention_ms())
    }

    /// Records a failed delivery attempt on `job`.
    ///
    /// Exhausting the budget marks the job failed and removes its gate, so it
    /// is never retried automatically. Otherwise the gate moves out by the
    /// backoff for the failures seen before this one.
    pub fn record_failure(&self, job: &mut Job, message: &str, now_ms: i64, jitter: &dyn JitterSource) {
        let previous = job.attempts;
        let ceiling = if job.max_attempts == 0 { self.max_attempts } else { job.max_attempts };
        let attempts = previous.saturating_add(1).min(ceiling);
        let now = from_millis(now_ms);

        job.attempts = attempts;
        job.max_attempts = ceiling;
        job.updated_at = Some(now);
        job.last_attempt_at = Some(now);
        job.set_last_error(message);

        if attempts >= ceiling {
            job.status = JobStatus::Failed;
            job.next_attempt_at = None;
        } else {
            job.status = JobStatus::Pending;
            job.next_attempt_at = Some(self.next_attempt_at(now_ms, previous, jitter));
        }
    }
}

#[cfg(test)]
#[path = "policy_tests.rs"]
mod tests;
