//! # Dispatch Statistics
//!
//! Cumulative counters across all change-sets.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

use crate::domain::DispatchReport;

/// Lock-free cumulative counters.
#[derive(Debug, Default)]
pub struct DispatchStats {
    change_sets: AtomicU64,
    rejected_sets: AtomicU64,
    delivered: AtomicU64,
    unrouted: AtomicU64,
    dropped: AtomicU64,
    handler_failures: AtomicU64,
}

/// Point-in-time copy of [`DispatchStats`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    /// Change-sets processed.
    pub change_sets: u64,
    /// Change-sets rejected before processing (gate timeout).
    pub rejected_sets: u64,
    /// Changes delivered to a handler.
    pub delivered: u64,
    /// Changes without a handler.
    pub unrouted: u64,
    /// Changes dropped on decode failure.
    pub dropped: u64,
    /// Handler errors.
    pub handler_failures: u64,
}

impl DispatchStats {
    /// Add one processed change-set.
    pub fn record(&self, report: &DispatchReport) {
        self.change_sets.fetch_add(1, Ordering::Relaxed);
        self.delivered
            .fetch_add(report.delivered as u64, Ordering::Relaxed);
        self.unrouted
            .fetch_add(report.unrouted as u64, Ordering::Relaxed);
        self.dropped.fetch_add(report.dropped as u64, Ordering::Relaxed);
        self.handler_failures
            .fetch_add(report.handler_failures as u64, Ordering::Relaxed);
    }

    /// Add one rejected change-set.
    pub fn record_rejected(&self) {
        self.rejected_sets.fetch_add(1, Ordering::Relaxed);
    }

    /// Read all counters.
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            change_sets: self.change_sets.load(Ordering::Relaxed),
            rejected_sets: self.rejected_sets.load(Ordering::Relaxed),
            delivered: self.delivered.load(Ordering::Relaxed),
            unrouted: self.unrouted.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
            handler_failures: self.handler_failures.load(Ordering::Relaxed),
        }
    }
}
