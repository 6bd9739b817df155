//! # Application Module
//!
//! The dispatcher, its initialization gate and the service that owns them.

pub mod dispatcher;
pub mod gate;
pub mod service;
pub mod stats;

pub use dispatcher::ChangeDispatcher;
pub use gate::InitializationGate;
pub use service::{FeedSummary, StorageWatchService};
pub use stats::{DispatchStats, StatsSnapshot};
