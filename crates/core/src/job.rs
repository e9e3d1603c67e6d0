// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Queued mutation jobs.
//!
//! A [`Job`] is one mutation waiting for durable delivery to the server. The
//! serialized form (camelCase JSON) is shared by every storage backend and by
//! the snapshot mirror files, so a job written by one tier can be read back by
//! any other.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::clock::from_millis;

/// Job type for a finished workout session.
pub const WORKOUT_FINISH: &str = "workout_finish";

/// Default attempt ceiling for new jobs.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 7;

/// Maximum stored length of `last_error`, in characters.
pub const MAX_ERROR_LEN: usize = 400;

/// Delivery status of a job.
///
/// `Pending` covers both "never tried" and "failed but eligible for another
/// attempt". `Failed` is terminal until the job is bumped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    #[default]
    Pending,
    Failed,
}

impl JobStatus {
    /// Returns the string representation used in storage and display.
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// Stored records may carry statuses from older writers ("processing", "done",
// or nothing at all). Only "failed" is terminal; everything else is retryable.
impl<'de> Deserialize<'de> for JobStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = Option::<Value>::deserialize(deserializer)?;
        Ok(match raw {
            Some(Value::String(s)) if s.trim() == "failed" => JobStatus::Failed,
            _ => JobStatus::Pending,
        })
    }
}

/// One queued mutation attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    #[serde(default)]
    pub id: String,
    /// Mutation kind; selects the endpoint the job is submitted to.
    #[serde(rename = "type", default)]
    pub job_type: String,
    #[serde(default)]
    pub user_id: String,
    /// Sent with every attempt so the server applies the mutation at most once.
    #[serde(default)]
    pub idempotency_key: String,
    #[serde(default)]
    pub payload: Value,
    #[serde(default)]
    pub status: JobStatus,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub last_attempt_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub attempts: u32,
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default)]
    pub last_error: String,
    /// Epoch millis before which the job is not eligible for a flush attempt.
    #[serde(default, deserialize_with = "lenient_millis")]
    pub next_attempt_at: Option<i64>,
}

fn default_max_attempts() -> u32 {
    DEFAULT_MAX_ATTEMPTS
}

/// Reads an RFC 3339 timestamp, mapping anything unparseable to `None`.
fn lenient_timestamp<'de, D>(deserializer: D) -> std::result::Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(match raw {
        Some(Value::String(s)) => DateTime::parse_from_rfc3339(&s)
            .ok()
            .map(|dt| dt.with_timezone(&Utc)),
        _ => None,
    })
}

/// Reads epoch millis from a number or numeric string; zero and negatives
/// mean "no gate".
fn lenient_millis<'de, D>(deserializer: D) -> std::result::Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    let ms = match raw {
        Some(Value::Number(n)) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Some(Value::String(s)) => s.trim().parse::<i64>().ok(),
        _ => None,
    };
    Ok(ms.filter(|ms| *ms > 0))
}

impl Job {
    /// Creates a fresh pending job, immediately eligible for a flush attempt.
    pub fn new(
        id: String,
        job_type: &str,
        user_id: &str,
        idempotency_key: String,
        payload: Value,
        now_ms: i64,
    ) -> Self {
        let now = from_millis(now_ms);
        Job {
            id,
            job_type: job_type.to_string(),
            user_id: user_id.to_string(),
            idempotency_key,
            payload,
            status: JobStatus::Pending,
            created_at: Some(now),
            updated_at: Some(now),
            last_attempt_at: None,
            attempts: 0,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            last_error: String::new(),
            next_attempt_at: Some(now_ms),
        }
    }

    /// Generates a new time-ordered job id.
    pub fn generate_id() -> String {
        uuid::Uuid::now_v7().to_string()
    }

    /// Generates a new random idempotency key.
    pub fn generate_idempotency_key() -> String {
        uuid::Uuid::new_v4().to_string()
    }

    /// Whether the job carries an id it can be stored and deleted under.
    pub fn has_id(&self) -> bool {
        !self.id.trim().is_empty()
    }

    pub fn is_failed(&self) -> bool {
        self.status == JobStatus::Failed
    }

    /// Creation time in epoch millis, if the record carries a parseable one.
    pub fn created_ms(&self) -> Option<i64> {
        self.created_at.map(|dt| dt.timestamp_millis())
    }

    /// Whether the job's backoff gate has elapsed. A missing gate counts as due.
    pub fn is_due(&self, now_ms: i64) -> bool {
        self.next_attempt_at.map_or(true, |at| at <= now_ms)
    }

    /// Sort key for "most recently touched" listings.
    pub fn touched_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at.or(self.created_at)
    }

    /// Resets the job to immediately eligible for a manual retry.
    ///
    /// A failed job also gets its attempt budget back, otherwise the next
    /// failure would push `attempts` past `max_attempts`.
    pub fn bump(&mut self, now_ms: i64) {
        if self.is_failed() {
            self.attempts = 0;
        }
        self.status = JobStatus::Pending;
        self.updated_at = Some(from_millis(now_ms));
        self.next_attempt_at = Some(now_ms);
    }

    /// Stores a failure message, truncated to [`MAX_ERROR_LEN`] characters.
    pub fn set_last_error(&mut self, message: &str) {
        self.last_error = message.chars().take(MAX_ERROR_LEN).collect();
    }
}

#[cfg(test)]
#[path = "job_tests.rs"]
mod tests;
