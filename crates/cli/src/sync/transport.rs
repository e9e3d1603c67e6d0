// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Transport abstraction for submitting queued mutations.
//!
//! Provides a trait-based transport layer that enables:
//! - Real HTTP submission for production
//! - Mock transports for unit testing

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use liftsync_core::Job;
use serde_json::{json, Value};

use super::connectivity::NetworkStatus;
use crate::config::ServerConfig;

/// Header carrying the job's idempotency key.
pub const IDEMPOTENCY_HEADER: &str = "Idempotency-Key";

/// Error type for transport operations.
///
/// Every variant is retriable; the message becomes the job's `lastError`.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TransportError {
    /// The server could not be reached (connect failure, timeout, reset).
    #[error("network error: {0}")]
    Unreachable(String),

    /// The server answered with a non-2xx status.
    #[error("{message}")]
    Status { status: u16, message: String },

    /// 2xx response whose body did not report `ok`.
    #[error("{0}")]
    Rejected(String),

    /// 2xx response whose body was not JSON.
    #[error("{0}")]
    MalformedBody(String),
}

impl TransportError {
    /// True when the failure says nothing about the request, only the link.
    pub fn is_connectivity(&self) -> bool {
        matches!(self, TransportError::Unreachable(_))
    }
}

/// Result type for transport operations.
pub type TransportResult<T> = Result<T, TransportError>;

/// Transport trait for delivering jobs to the server.
///
/// This trait abstracts over the actual transport mechanism, allowing
/// for easy testing with mock implementations.
pub trait Transport: Send + Sync {
    /// Submits one job to `endpoint`. `Ok` means the server acknowledged it.
    fn submit<'a>(
        &'a self,
        endpoint: &'a str,
        job: &'a Job,
    ) -> Pin<Box<dyn Future<Output = TransportResult<()>> + Send + 'a>>;

    /// Checks whether the server is reachable.
    fn probe(&self) -> Pin<Box<dyn Future<Output = TransportResult<()>> + Send + '_>>;
}

/// HTTP transport implementation using reqwest.
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
    health_path: String,
    network: NetworkStatus,
}

impl HttpTransport {
    /// Create a new HTTP transport that reports reachability into `network`.
    pub fn new(config: &ServerConfig, network: NetworkStatus) -> TransportResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .build()
            .map_err(|e| TransportError::Unreachable(e.to_string()))?;
        Ok(HttpTransport {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            health_path: config.health_path.clone(),
            network,
        })
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    /// Records what a failed send says about connectivity.
    fn send_failed(&self, e: reqwest::Error) -> TransportError {
        if e.is_connect() || e.is_timeout() {
            self.network.set_online(false);
        }
        TransportError::Unreachable(e.to_string())
    }
}

impl Transport for HttpTransport {
    fn submit<'a>(
        &'a self,
        endpoint: &'a str,
        job: &'a Job,
    ) -> Pin<Box<dyn Future<Output = TransportResult<()>> + Send + 'a>> {
        Box::pin(async move {
            let body = json!({
                "payload": job.payload,
                "idempotencyKey": job.idempotency_key,
            });

            let resp = self
                .client
                .post(self.url(endpoint))
                .header(IDEMPOTENCY_HEADER, &job.idempotency_key)
                .json(&body)
                .send()
                .await
                .map_err(|e| self.send_failed(e))?;
            self.network.set_online(true);

            let status = resp.status().as_u16();
            let text = resp.text().await.map_err(|e| self.send_failed(e))?;
            interpret_response(status, &text)
        })
    }

    fn probe(&self) -> Pin<Box<dyn Future<Output = TransportResult<()>> + Send + '_>> {
        Box::pin(async move {
            self.client
                .get(self.url(&self.health_path))
                .send()
                .await
                .map_err(|e| self.send_failed(e))?;
            // Any response at all means the link is up.
            self.network.set_online(true);
            Ok(())
        })
    }
}

/// Maps a server response onto the acknowledgment contract: 2xx and a JSON
/// body whose `ok` is truthy.
pub fn interpret_response(status: u16, body: &str) -> TransportResult<()> {
    let parsed: Option<Value> = serde_json::from_str(body).ok();
    let message = parsed
        .as_ref()
        .and_then(|v| v.get("error"))
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .unwrap_or_else(|| format!("http_{}", status));

    if !(200..300).contains(&status) {
        return Err(TransportError::Status { status, message });
    }
    match parsed {
        None => Err(TransportError::MalformedBody(message)),
        Some(v) if v.get("ok").is_some_and(is_truthy) => Ok(()),
        Some(_) => Err(TransportError::Rejected(message)),
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
