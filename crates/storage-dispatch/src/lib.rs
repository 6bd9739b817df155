//! # Storage Dispatch
//!
//! Decode-and-dispatch engine for raw ledger storage change notifications.
//!
//! **Architecture:** Hexagonal (DDD + Ports/Adapters)
//!
//! ## Purpose
//!
//! A ledger node streams storage changes as opaque hex keys. This crate turns
//! each key back into the storage item it belongs to and the user-level keys
//! that address it, then calls the handler the application registered for
//! that item:
//! - Address hashes are resolved through a [`MetadataIndex`] built once from
//!   the ledger schema
//! - Key parts are recovered according to the storage shape and the hasher of
//!   every key slot
//! - Delivery waits on a one-shot [`InitializationGate`] and is serialized
//!   across all change-sets
//!
//! ## Key Layout
//!
//! | Segment | Width (hex chars) |
//! |---------|-------------------|
//! | Prefix | `0x` |
//! | Module hash | `2 * address_hash_bytes` |
//! | Item hash | `2 * address_hash_bytes` |
//! | Key slots | Per hasher, see [`HasherKind::prefix_width`] |
//!
//! ## Module Structure
//!
//! ```text
//! storage-dispatch/
//! ├── domain/          # Metadata entries, index, listener registry, errors
//! ├── algorithms/      # Key splitting, key slot decoding
//! ├── ports/           # Change-set sink (inbound) + feed/snapshot/hasher (outbound)
//! ├── adapters/        # SHA-256 hasher, channel + JSON feeds, typed bindings
//! ├── application/     # ChangeDispatcher, InitializationGate, StorageWatchService
//! └── config.rs        # DispatchConfig
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod algorithms;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;

// Re-exports
pub use adapters::{
    decode_value_hex, load_schema, parse_schema, typed_double_map, typed_map, typed_plain,
    ChangeFeedSender, ChannelChangeFeed, JsonDecoder, JsonFileSnapshot, JsonLinesFeed,
    LeU128Decoder, LeU64Decoder, RawBytesDecoder, Sha256AddressHasher, StreamChangeFeed,
    Utf8Decoder,
};
pub use algorithms::{decode_key, split_key, SplitKey};
pub use application::{
    ChangeDispatcher, DispatchStats, FeedSummary, InitializationGate, StatsSnapshot,
    StorageWatchService,
};
pub use config::DispatchConfig;
pub use domain::{
    address_key, invariant_binding_arity, min_key_len, ChangeEvent, ChangeOutcome, ConfigError,
    DecodeError, DecodedChange, DispatchError, DispatchReport, FeedError, HandlerError,
    HandlerResult, HasherKind, ListenerBinding, ListenerRegistry, MetadataIndex, SchemaItem,
    SchemaModule, StorageHandler, StorageMetadataEntry, StorageShape, ADDRESS_SEPARATOR,
    DEFAULT_ADDRESS_HASH_BYTES, DEFAULT_KEY_PREFIX, UNDECLARED_HASHER,
};
pub use ports::{
    AddressHasher, ChangeFeed, ChangeSetSink, MockChangeFeed, MockSnapshotSource, SnapshotSource,
    ValueDecoder,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
