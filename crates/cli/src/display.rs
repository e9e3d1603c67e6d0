// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use liftsync_core::{Job, JobStatus, QueueSummary};

use crate::sync::{FlushReport, GcReport};

/// Maximum characters of `lastError` shown in a job line.
const ERROR_PREVIEW: usize = 60;

/// Format a millisecond offset as a short relative time ("in 5s", "3m ago").
pub fn format_relative(delta_ms: i64) -> String {
    let secs = delta_ms.unsigned_abs() / 1000;
    let amount = if secs < 60 {
        format!("{}s", secs)
    } else if secs < 3600 {
        format!("{}m", secs / 60)
    } else if secs < 86_400 {
        format!("{}h", secs / 3600)
    } else {
        format!("{}d", secs / 86_400)
    };
    if delta_ms >= 0 {
        format!("in {}", amount)
    } else {
        format!("{} ago", amount)
    }
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", cut)
    }
}

/// One line per job: `- [status] id (type) attempts N/M, <gate>: <error>`
pub fn format_job_line(job: &Job, now_ms: i64) -> String {
    let gate = match (job.status, job.next_attempt_at) {
        (JobStatus::Failed, _) => "needs bump".to_string(),
        (JobStatus::Pending, None) => "due".to_string(),
        (JobStatus::Pending, Some(at)) if at <= now_ms => "due".to_string(),
        (JobStatus::Pending, Some(at)) => format!("next {}", format_relative(at - now_ms)),
    };
    let mut line = format!(
        "- [{}] {} ({}) attempts {}/{}, {}",
        job.status, job.id, job.job_type, job.attempts, job.max_attempts, gate
    );
    if !job.last_error.is_empty() {
        line.push_str(": ");
        line.push_str(&truncate(&job.last_error, ERROR_PREVIEW));
    }
    line
}

pub fn format_summary(summary: &QueueSummary, now_ms: i64) -> String {
    let mut out = format!(
        "{} | pending: {}, failed: {}, due: {}",
        if summary.online { "online" } else { "offline" },
        summary.pending,
        summary.failed,
        summary.due
    );
    if let Some(at) = summary.next_due_at {
        out.push_str(&format!("\nnext attempt {}", format_relative(at - now_ms)));
    }
    for job in &summary.jobs {
        out.push('\n');
        out.push_str(&format_job_line(job, now_ms));
    }
    out
}

pub fn format_flush_report(report: &FlushReport) -> String {
    if report.offline {
        return "offline: nothing sent".to_string();
    }
    format!("flushed {}, failed {}", report.flushed, report.failed)
}

pub fn format_gc_report(report: &GcReport) -> String {
    format!("removed {} expired, {} malformed", report.expired, report.malformed)
}

#[cfg(test)]
#[path = "display_tests.rs"]
mod tests;
