// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for liftsync-core operations.

use thiserror::Error;

/// All possible errors that can occur in liftsync-core operations.
///
/// Most store-facing APIs swallow these and degrade to a safe default; the
/// error type exists for the backends and for callers that want the detail.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid storage backend: '{0}'\n  hint: valid backends are: auto, sqlite, file")]
    InvalidBackend(String),

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A specialized Result type for liftsync-core operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
