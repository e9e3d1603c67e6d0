// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Queue change notifications.

use serde::Serialize;
use tokio::sync::broadcast;

const EVENT_BUFFER: usize = 256;

/// Something observable happened to the queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum QueueEvent {
    Enqueued { id: String, user_id: String },
    /// The server acknowledged the job and it was removed.
    Flushed { id: String },
    /// An attempt failed; `exhausted` is set when the job became `failed`.
    AttemptFailed { id: String, attempts: u32, exhausted: bool },
    Bumped { id: String },
    Cleared { user_id: String, removed: usize },
}

/// Broadcast fan-out of [`QueueEvent`]s.
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<QueueEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(EVENT_BUFFER);
        EventBus { tx }
    }

    /// Sends `event` to current subscribers. Having none is not an error.
    pub fn emit(&self, event: QueueEvent) {
        tracing::debug!(?event, "queue event");
        let _ = self.tx.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<QueueEvent> {
        self.tx.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
