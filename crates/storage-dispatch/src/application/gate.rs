//! # Initialization Gate
//!
//! One-shot barrier between the subscription feed and the application's
//! startup. The feed may start delivering before the initial snapshot has
//! been loaded; changes wait here until the application opens the gate.

use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, info};

use crate::domain::DispatchError;

/// One-shot, idempotent ready signal.
///
/// Built on a `watch` channel so every waiter observes the transition and
/// waits can be bounded or cancelled by dropping the future.
#[derive(Debug)]
pub struct InitializationGate {
    tx: watch::Sender<bool>,
}

impl InitializationGate {
    /// Create a closed gate.
    pub fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self { tx }
    }

    /// Open the gate. Returns `true` only for the call that opened it.
    pub fn open(&self) -> bool {
        let opened = self.tx.send_if_modified(|open| {
            if *open {
                false
            } else {
                *open = true;
                true
            }
        });
        if opened {
            info!("[lw-dispatch] Initialization gate opened");
        }
        opened
    }

    /// Whether the gate has been opened.
    pub fn is_open(&self) -> bool {
        *self.tx.borrow()
    }

    /// Wait until the gate is open; returns immediately once it is.
    pub async fn wait_open(&self) {
        let mut rx = self.tx.subscribe();
        let opened = rx.wait_for(|open| *open).await.is_ok();
        if !opened {
            debug!("[lw-dispatch] Gate sender dropped while waiting");
        }
    }

    /// Wait until the gate is open, at most `timeout`.
    pub async fn wait_open_timeout(&self, timeout: Duration) -> Result<(), DispatchError> {
        tokio::time::timeout(timeout, self.wait_open())
            .await
            .map_err(|_| DispatchError::GateTimeout {
                timeout_ms: timeout.as_millis() as u64,
            })
    }
}

impl Default for InitializationGate {
    fn default() -> Self {
        Self::new()
    }
}
