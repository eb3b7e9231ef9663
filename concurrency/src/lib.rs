// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

#![deny(
    unsafe_code,
    missing_docs,
    clippy::all,
    clippy::pedantic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic
)]

//! Cancellation shared by the runner components.
//!
//! A single [`Shutdown`] is created by the process entry point and cloned into every component
//! that must stop cooperatively. The signal handler only calls [`Shutdown::trigger`]; components
//! poll [`Shutdown::is_triggered`] at their own cancellation points or await
//! [`Shutdown::triggered`] while idle.

use std::sync::Arc;
use tokio::sync::watch;

/// A cloneable, one-way cancellation flag.
#[derive(Debug, Clone)]
pub struct Shutdown {
    tx: Arc<watch::Sender<bool>>,
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

impl Shutdown {
    /// Create a new, untriggered [`Shutdown`].
    #[must_use]
    pub fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    /// Request shutdown. Idempotent and callable from any thread.
    pub fn trigger(&self) {
        self.tx.send_replace(true);
    }

    /// Tell if shutdown has been requested.
    #[must_use]
    pub fn is_triggered(&self) -> bool {
        *self.tx.borrow()
    }

    /// Wait until shutdown is requested. Returns immediately if it already was.
    pub async fn triggered(&self) {
        let mut rx = self.tx.subscribe();
        // the sender is owned by self, so the channel cannot close while we wait
        let _ = rx.wait_for(|stop| *stop).await;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::Shutdown;
    use std::time::Duration;
    use tokio::time::{Instant, sleep, timeout};

    #[test]
    fn trigger_is_seen_by_clones() {
        let shutdown = Shutdown::new();
        let clone = shutdown.clone();
        assert!(!clone.is_triggered());
        shutdown.trigger();
        assert!(clone.is_triggered());
        shutdown.trigger();
        assert!(clone.is_triggered());
    }

    #[tokio::test(start_paused = true)]
    async fn triggered_wakes_waiter() {
        let shutdown = Shutdown::new();
        let trigger = shutdown.clone();
        let start = Instant::now();
        tokio::spawn(async move {
            sleep(Duration::from_secs(5)).await;
            trigger.trigger();
        });
        timeout(Duration::from_secs(60), shutdown.triggered())
            .await
            .unwrap();
        assert_eq!(start.elapsed(), Duration::from_secs(5));
    }

    #[tokio::test]
    async fn triggered_returns_when_already_set() {
        let shutdown = Shutdown::new();
        shutdown.trigger();
        shutdown.triggered().await;
    }
}
