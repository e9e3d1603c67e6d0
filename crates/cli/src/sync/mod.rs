// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Delivery of queued mutations to the API server.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │   Engine    │────►│  Transport  │────►│    API      │
//! │ (SyncEngine)│◄────│   (trait)   │◄────│   Server    │
//! └─────────────┘     └─────────────┘     └─────────────┘
//!        │                   │
//!        ▼                   ▼
//! ┌─────────────┐     ┌───────────────┐
//! │ QueueStore  │     │ NetworkStatus │
//! └─────────────┘     └───────────────┘
//! ```
//!
//! # Features
//!
//! - Idempotent submission (key in body and header)
//! - Exponential backoff with jitter and an attempt ceiling
//! - TTL garbage collection on every flush
//! - Single-flight flushes
//! - Injectable transport, clock, and jitter for testing

mod connectivity;
mod engine;
mod events;
mod transport;

pub use connectivity::NetworkStatus;
pub use engine::{FlushOptions, FlushReport, GcReport, SyncConfig, SyncEngine};
pub use events::{EventBus, QueueEvent};
pub use transport::{
    interpret_response, HttpTransport, Transport, TransportError, TransportResult,
    IDEMPOTENCY_HEADER,
};

#[cfg(test)]
pub(crate) mod test_helpers;
