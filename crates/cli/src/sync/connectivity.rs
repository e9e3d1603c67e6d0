// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Shared online/offline flag.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Whether the device currently believes it can reach the server.
///
/// Clones share one flag: the transport writes it as requests succeed or
/// fail to connect, and the engine reads it to short-circuit flushes.
#[derive(Debug, Clone)]
pub struct NetworkStatus {
    online: Arc<AtomicBool>,
}

impl NetworkStatus {
    pub fn new(online: bool) -> Self {
        NetworkStatus { online: Arc::new(AtomicBool::new(online)) }
    }

    pub fn is_online(&self) -> bool {
        self.online.load(Ordering::SeqCst)
    }

    /// Sets the flag and returns the previous value.
    pub fn set_online(&self, online: bool) -> bool {
        let previous = self.online.swap(online, Ordering::SeqCst);
        if previous != online {
            tracing::info!("network is now {}", if online { "online" } else { "offline" });
        }
        previous
    }
}

impl Default for NetworkStatus {
    fn default() -> Self {
        Self::new(true)
    }
}
