//! # Change Dispatcher
//!
//! Per change-set entry point: waits on the initialization gate, decodes
//! every change's key through the metadata index and routes it to its
//! registered listener.
//!
//! ## Thread Safety
//!
//! Two async mutexes (tokio's are FIFO):
//!
//! - `queue` is taken first by every change-set and held across the gate
//!   wait, so sets that arrive while the gate is closed are released in
//!   arrival order.
//! - `routing` is held while a set is decoded and routed, so handler
//!   invocations never overlap. The bootstrap snapshot takes only `routing`
//!   and can therefore run while queued sets still wait on the gate.
//!
//! The index and registry are read-only and shared without locks.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use super::gate::InitializationGate;
use super::stats::DispatchStats;
use crate::algorithms::{decode_key, split_key};
use crate::config::DispatchConfig;
use crate::domain::{
    ChangeEvent, ChangeOutcome, DecodeError, DecodedChange, DispatchError, DispatchReport,
    ListenerRegistry, MetadataIndex,
};
use crate::ports::ChangeSetSink;

/// Decodes and routes change-sets to listeners.
pub struct ChangeDispatcher {
    /// Hashed address → storage metadata.
    index: Arc<MetadataIndex>,
    /// `module.item` → listener.
    registry: Arc<ListenerRegistry>,
    /// Ready signal from the application.
    gate: Arc<InitializationGate>,
    /// Raw key prefix.
    key_prefix: String,
    /// Bound on the gate wait.
    gate_timeout: Option<Duration>,
    /// Arrival order of change-sets, held across the gate wait.
    queue: Mutex<()>,
    /// Serializes decode and routing.
    routing: Mutex<()>,
    /// Cumulative counters.
    stats: DispatchStats,
}

impl ChangeDispatcher {
    /// Create a dispatcher over a built index and registry.
    pub fn new(
        index: Arc<MetadataIndex>,
        registry: Arc<ListenerRegistry>,
        gate: Arc<InitializationGate>,
        config: &DispatchConfig,
    ) -> Self {
        Self {
            index,
            registry,
            gate,
            key_prefix: config.key_prefix.to_ascii_lowercase(),
            gate_timeout: config.gate_timeout(),
            queue: Mutex::new(()),
            routing: Mutex::new(()),
            stats: DispatchStats::default(),
        }
    }

    /// Process one change-set from the subscription feed.
    ///
    /// Blocks until the gate is open; sets are processed in call order.
    /// Per-change failures are logged and counted; only a gate timeout
    /// fails the whole set.
    pub async fn on_change_set(
        &self,
        changes: &[ChangeEvent],
    ) -> Result<DispatchReport, DispatchError> {
        let _queued = self.queue.lock().await;

        if let Err(e) = self.await_gate().await {
            self.stats.record_rejected();
            warn!(
                "[lw-dispatch] Rejecting change-set of {} changes: {}",
                changes.len(),
                e
            );
            return Err(e);
        }

        let _routing = self.routing.lock().await;
        let report = self.route_all(changes);
        self.stats.record(&report);
        Ok(report)
    }

    /// Route the bootstrap snapshot without waiting on the gate or behind
    /// queued change-sets.
    pub async fn apply_snapshot(&self, changes: &[ChangeEvent]) -> DispatchReport {
        let _routing = self.routing.lock().await;
        let report = self.route_all(changes);
        self.stats.record(&report);
        report
    }

    /// Resolve a change to its storage address and key parts.
    pub fn decode_change(&self, change: &ChangeEvent) -> Result<DecodedChange, DecodeError> {
        let key = change.key.to_ascii_lowercase();
        let split = split_key(&key, &self.key_prefix, self.index.segment_width())?;

        let module_name = self
            .index
            .resolve_module(split.module_hash)
            .ok_or_else(|| DecodeError::UnknownModule(split.module_hash.to_string()))?;
        let entry = self
            .index
            .resolve_item(split.item_hash)
            .ok_or_else(|| DecodeError::UnknownItem(split.item_hash.to_string()))?;

        let key_parts = decode_key(split.remainder, entry)?;

        Ok(DecodedChange {
            module_name: module_name.to_string(),
            item_name: entry.display_name.clone(),
            key_parts,
            value: change.value().map(str::to_string),
        })
    }

    /// The initialization gate.
    pub fn gate(&self) -> &Arc<InitializationGate> {
        &self.gate
    }

    /// The metadata index.
    pub fn index(&self) -> &MetadataIndex {
        &self.index
    }

    /// The listener registry.
    pub fn registry(&self) -> &ListenerRegistry {
        &self.registry
    }

    /// Cumulative counters.
    pub fn stats(&self) -> &DispatchStats {
        &self.stats
    }

    async fn await_gate(&self) -> Result<(), DispatchError> {
        if self.gate.is_open() {
            return Ok(());
        }

        debug!("[lw-dispatch] Change-set waiting for initialization gate");
        match self.gate_timeout {
            Some(timeout) => self.gate.wait_open_timeout(timeout).await,
            None => {
                self.gate.wait_open().await;
                Ok(())
            }
        }
    }

    fn route_all(&self, changes: &[ChangeEvent]) -> DispatchReport {
        let mut report = DispatchReport::default();
        for change in changes {
            report.record(&self.route(change));
        }
        report
    }

    fn route(&self, change: &ChangeEvent) -> ChangeOutcome {
        let decoded = match self.decode_change(change) {
            Ok(decoded) => decoded,
            Err(e) => {
                debug!(key = %change.key, "[lw-dispatch] Dropping change: {}", e);
                return ChangeOutcome::Dropped(e);
            }
        };

        let Some(binding) = self
            .registry
            .resolve(&decoded.module_name, &decoded.item_name)
        else {
            return ChangeOutcome::Unrouted;
        };

        match binding
            .handler
            .invoke(&decoded.key_parts, decoded.value.as_deref())
        {
            Ok(()) => ChangeOutcome::Delivered,
            Err(e) => {
                warn!(
                    "[lw-dispatch] Listener {} failed: {}",
                    binding.address(),
                    e
                );
                ChangeOutcome::HandlerFailed
            }
        }
    }
}

#[async_trait]
impl ChangeSetSink for ChangeDispatcher {
    async fn on_change_set(
        &self,
        changes: &[ChangeEvent],
    ) -> Result<DispatchReport, DispatchError> {
        ChangeDispatcher::on_change_set(self, changes).await
    }
}
