//! # Domain Value Objects
//!
//! Outcomes of routing changes.

use serde::{Deserialize, Serialize};

use super::errors::DecodeError;

/// What happened to a single change.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ChangeOutcome {
    /// A handler was invoked and succeeded.
    Delivered,
    /// Address resolved but no handler is registered.
    Unrouted,
    /// Key could not be decoded; change dropped.
    Dropped(DecodeError),
    /// Handler was invoked and returned an error.
    HandlerFailed,
}

/// Per change-set tally.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchReport {
    /// Changes delivered to a handler.
    pub delivered: usize,
    /// Changes without a registered handler.
    pub unrouted: usize,
    /// Changes dropped on decode failure.
    pub dropped: usize,
    /// Handler invocations that returned an error.
    pub handler_failures: usize,
}

impl DispatchReport {
    /// Count one outcome.
    pub fn record(&mut self, outcome: &ChangeOutcome) {
        match outcome {
            ChangeOutcome::Delivered => self.delivered += 1,
            ChangeOutcome::Unrouted => self.unrouted += 1,
            ChangeOutcome::Dropped(_) => self.dropped += 1,
            ChangeOutcome::HandlerFailed => self.handler_failures += 1,
        }
    }

    /// Total changes seen.
    pub fn total(&self) -> usize {
        self.delivered + self.unrouted + self.dropped + self.handler_failures
    }

    /// Add another report into this one.
    pub fn merge(&mut self, other: &DispatchReport) {
        self.delivered += other.delivered;
        self.unrouted += other.unrouted;
        self.dropped += other.dropped;
        self.handler_failures += other.handler_failures;
    }
}
