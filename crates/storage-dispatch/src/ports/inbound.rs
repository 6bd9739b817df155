//! # Inbound Ports
//!
//! What the transport calls to hand change-sets to the dispatcher.

use async_trait::async_trait;

use crate::domain::{ChangeEvent, DispatchError, DispatchReport};

/// Change-set sink - inbound port.
///
/// Implementations process one change-set at a time, in call order, and never
/// deliver a change before the application has signalled it is ready.
#[async_trait]
pub trait ChangeSetSink: Send + Sync {
    /// Decode and route every change of one change-set.
    async fn on_change_set(&self, changes: &[ChangeEvent]) -> Result<DispatchReport, DispatchError>;
}
