//! # Domain Errors
//!
//! Error types for storage change decoding and dispatch.
//!
//! Only [`ConfigError`] is allowed to escape startup. Everything that goes
//! wrong with a single change is a [`DecodeError`] and stays contained in the
//! processing of that change.

use thiserror::Error;

/// Error returned by application handlers.
pub type HandlerError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result type returned by application handlers.
pub type HandlerResult = Result<(), HandlerError>;

/// Startup-time configuration errors.
///
/// Any of these prevents the dispatcher from reaching the ready state.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A second listener was registered for the same `module.item`.
    #[error("Duplicate listener for {address}")]
    DuplicateListener {
        /// Storage address (`module.item`)
        address: String,
    },

    /// The listener's arity does not match the storage shape.
    #[error("Arity mismatch for {address}: listener takes {listener} key(s), storage has {storage}")]
    ArityMismatch {
        /// Storage address (`module.item`)
        address: String,
        /// Keys accepted by the listener
        listener: usize,
        /// Keys produced by the storage shape
        storage: usize,
    },

    /// The listener's storage item shares its address hash with another item
    /// and can never be routed.
    #[error("Storage item {address} collides with {winner}")]
    ShadowedItem {
        /// Storage address (`module.item`)
        address: String,
        /// Item that holds the hash
        winner: String,
    },

    /// A configuration value is out of range.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The schema could not be read or parsed.
    #[error("Schema error: {0}")]
    Schema(String),
}

/// Per-change decode failures.
///
/// These are recoverable: the change is logged and dropped.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DecodeError {
    /// Key does not start with the expected prefix.
    #[error("Key is missing the {expected:?} prefix")]
    MissingPrefix {
        /// Expected prefix
        expected: String,
    },

    /// Key contains non-hex characters.
    #[error("Key contains non-hex characters")]
    InvalidHex,

    /// Key is shorter than the layout requires.
    #[error("Key too short: {actual} < {required} hex chars")]
    KeyTooShort {
        /// Required length in hex characters
        required: usize,
        /// Actual length in hex characters
        actual: usize,
    },

    /// Module address hash is not in the metadata index.
    #[error("Unknown module hash {0}")]
    UnknownModule(String),

    /// Item address hash is not in the metadata index.
    #[error("Unknown storage item hash {0}")]
    UnknownItem(String),

    /// Storage shape the decoder does not recognize.
    #[error("Unsupported storage shape for {address}")]
    UnsupportedShape {
        /// Storage address (`module.item`)
        address: String,
    },

    /// The hasher of a key slot has no known width.
    #[error("Unknown hasher width for key slot {slot}")]
    UnknownHasherWidth {
        /// Zero-based key slot index
        slot: usize,
    },
}

/// Change-set level failures.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DispatchError {
    /// The initialization gate did not open within the configured bound.
    #[error("Initialization gate not opened within {timeout_ms} ms")]
    GateTimeout {
        /// Configured bound in milliseconds
        timeout_ms: u64,
    },
}

/// Transport and bulk-load failures.
#[derive(Debug, Error)]
pub enum FeedError {
    /// The feed was closed by its producer.
    #[error("Feed closed")]
    Closed,

    /// A change-set could not be parsed.
    #[error("Malformed change-set: {0}")]
    Malformed(String),

    /// Underlying I/O failure.
    #[error("Feed I/O error: {0}")]
    Io(#[from] std::io::Error),
}
