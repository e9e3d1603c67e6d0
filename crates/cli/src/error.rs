// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

use crate::sync::TransportError;

/// All possible errors that can occur in the liftsync library.
///
/// Errors provide user-friendly messages with hints for common issues.
#[derive(Debug, Error)]
pub enum Error {
    #[error("not initialized: {0} does not exist\n  hint: run 'liftsync init' first")]
    NotInitialized(String),

    #[error("already initialized at {0}")]
    AlreadyInitialized(String),

    #[error("user id is required\n  hint: pass --user <id>")]
    MissingUser,

    #[error("job not found: {0}")]
    JobNotFound(String),

    #[error("storage error: {0}")]
    Storage(String),

    #[error("invalid payload: {0}")]
    InvalidPayload(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("another watcher is already running for {0}")]
    WatchLocked(String),

    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A specialized Result type for liftsync operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<liftsync_core::Error> for Error {
    fn from(e: liftsync_core::Error) -> Self {
        match e {
            liftsync_core::Error::InvalidBackend(s) => {
                Error::Config(format!("invalid storage backend '{}'", s))
            }
            liftsync_core::Error::Database(e) => Error::Storage(e.to_string()),
            liftsync_core::Error::Io(e) => Error::Io(e),
            liftsync_core::Error::Json(e) => Error::Json(e),
        }
    }
}

impl From<toml::de::Error> for Error {
    fn from(e: toml::de::Error) -> Self {
        Error::Config(format!("failed to parse config: {}", e))
    }
}

impl From<toml::ser::Error> for Error {
    fn from(e: toml::ser::Error) -> Self {
        Error::Config(format!("failed to serialize config: {}", e))
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
