//! # Domain Invariants
//!
//! Rules that must hold before the dispatcher may reach the ready state.

use super::entities::StorageShape;
use super::errors::ConfigError;

/// Prefix carried by every raw storage key on the feed.
pub const DEFAULT_KEY_PREFIX: &str = "0x";

/// Default address hash length in bytes (16 hex characters per segment).
pub const DEFAULT_ADDRESS_HASH_BYTES: usize = 8;

/// Separator between module and item in a listener address.
pub const ADDRESS_SEPARATOR: char = '.';

/// Build the `module.item` address key.
pub fn address_key(module: &str, item: &str) -> String {
    format!("{}{}{}", module, ADDRESS_SEPARATOR, item)
}

/// Minimum raw key length: prefix plus module and item hash segments.
pub fn min_key_len(prefix: &str, segment_width: usize) -> usize {
    prefix.len() + 2 * segment_width
}

/// Invariant: listener arity equals the number of key parts of the shape.
///
/// Unsupported shapes accept no listener at all.
pub fn invariant_binding_arity(
    address: &str,
    listener_arity: usize,
    shape: StorageShape,
) -> Result<(), ConfigError> {
    match shape.arity() {
        Some(storage) if storage == listener_arity => Ok(()),
        Some(storage) => Err(ConfigError::ArityMismatch {
            address: address.to_string(),
            listener: listener_arity,
            storage,
        }),
        None => Err(ConfigError::InvalidConfig(format!(
            "{} has an unsupported storage shape",
            address
        ))),
    }
}
