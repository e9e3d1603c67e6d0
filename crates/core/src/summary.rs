// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Aggregate queue view for the "pending sync" indicator.

use serde::Serialize;

use crate::job::{Job, JobStatus};

/// Maximum number of jobs carried in a summary.
pub const SUMMARY_JOB_LIMIT: usize = 25;

/// Counts and a short job listing for one user's queue.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueSummary {
    pub online: bool,
    pub pending: usize,
    pub failed: usize,
    /// Pending jobs whose backoff gate has elapsed.
    pub due: usize,
    /// Earliest backoff gate among pending jobs.
    pub next_due_at: Option<i64>,
    /// Most recently updated jobs, newest first.
    pub jobs: Vec<Job>,
}

impl QueueSummary {
    /// Builds a summary from jobs already sorted newest-updated first.
    pub fn from_jobs(jobs: Vec<Job>, now_ms: i64, online: bool) -> Self {
        let mut pending = 0;
        let mut failed = 0;
        let mut due = 0;
        let mut next_due_at: Option<i64> = None;

        for job in &jobs {
            match job.status {
                JobStatus::Failed => failed += 1,
                JobStatus::Pending => {
                    pending += 1;
                    if job.is_due(now_ms) {
                        due += 1;
                    }
                    if let Some(at) = job.next_attempt_at {
                        next_due_at = Some(next_due_at.map_or(at, |cur| cur.min(at)));
                    }
                }
            }
        }

        let mut jobs = jobs;
        jobs.truncate(SUMMARY_JOB_LIMIT);

        QueueSummary { online, pending, failed, due, next_due_at, jobs }
    }
}

/// Sorts jobs newest-updated first (falling back to creation time).
pub fn sort_recent_first(jobs: &mut [Job]) {
    jobs.sort_by(|a, b| b.touched_at().cmp(&a.touched_at()));
}

/// Sorts jobs oldest-created first; jobs without a creation time go first.
pub fn sort_oldest_first(jobs: &mut [Job]) {
    jobs.sort_by(|a, b| a.created_at.cmp(&b.created_at));
}

#[cfg(test)]
#[path = "summary_tests.rs"]
mod tests;
