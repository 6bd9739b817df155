//! # Outbound Ports
//!
//! Traits for external collaborators: the ledger's addressing scheme, the
//! subscription transport, the bulk state load and typed value decoding.

use std::collections::VecDeque;

use async_trait::async_trait;

use crate::domain::{ChangeEvent, FeedError, HandlerError};

/// Ledger addressing scheme - outbound port.
///
/// Treated as a black box: a deterministic one-way digest of a module or
/// storage item name, rendered as lowercase hex of fixed width.
pub trait AddressHasher: Send + Sync {
    /// Width of one hashed name in hex characters.
    fn segment_width(&self) -> usize;

    /// Lowercase hex digest of a name, exactly `segment_width()` characters.
    fn hash_name(&self, name: &str) -> String;

    /// Full address prefix of a storage item: hash(module) ++ hash(item).
    fn storage_prefix(&self, module: &str, item: &str) -> String {
        format!("{}{}", self.hash_name(module), self.hash_name(item))
    }
}

/// Subscription transport - outbound port.
#[async_trait]
pub trait ChangeFeed: Send {
    /// Next change-set, `Ok(None)` once the feed has ended.
    async fn next_change_set(&mut self) -> Result<Option<Vec<ChangeEvent>>, FeedError>;

    /// Feed identifier (for logging).
    fn feed_id(&self) -> &str;
}

/// Bulk "load all current state" call - outbound port.
#[async_trait]
pub trait SnapshotSource: Send + Sync {
    /// Every current key/value pair.
    async fn load_all(&self) -> Result<Vec<ChangeEvent>, FeedError>;
}

/// Typed value decoding - outbound port.
pub trait ValueDecoder<T>: Send + Sync {
    /// Decode raw value bytes into `T`.
    fn decode(&self, bytes: &[u8]) -> Result<T, HandlerError>;
}

// =============================================================================
// Mock Implementations for Testing
// =============================================================================

/// Mock feed replaying a fixed list of change-sets.
#[derive(Clone, Debug, Default)]
pub struct MockChangeFeed {
    /// Remaining change-sets.
    pub sets: VecDeque<Vec<ChangeEvent>>,
    /// Fail instead of ending once the sets are exhausted.
    pub should_fail: bool,
}

impl MockChangeFeed {
    /// Feed that yields `sets` in order, then ends.
    pub fn new(sets: Vec<Vec<ChangeEvent>>) -> Self {
        Self {
            sets: sets.into(),
            should_fail: false,
        }
    }
}

#[async_trait]
impl ChangeFeed for MockChangeFeed {
    async fn next_change_set(&mut self) -> Result<Option<Vec<ChangeEvent>>, FeedError> {
        match self.sets.pop_front() {
            Some(set) => Ok(Some(set)),
            None if self.should_fail => Err(FeedError::Malformed("Mock failure".to_string())),
            None => Ok(None),
        }
    }

    fn feed_id(&self) -> &str {
        "mock-feed"
    }
}

/// Mock snapshot returning a fixed key/value set.
#[derive(Clone, Debug, Default)]
pub struct MockSnapshotSource {
    /// Current state.
    pub entries: Vec<ChangeEvent>,
    /// Should return errors?
    pub should_fail: bool,
}

#[async_trait]
impl SnapshotSource for MockSnapshotSource {
    async fn load_all(&self) -> Result<Vec<ChangeEvent>, FeedError> {
        if self.should_fail {
            return Err(FeedError::Malformed("Mock failure".to_string()));
        }
        Ok(self.entries.clone())
    }
}
