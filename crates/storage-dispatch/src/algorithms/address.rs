//! # Address Splitting
//!
//! Splits a raw storage key into its module hash, item hash and the key
//! slot remainder.

use crate::domain::{min_key_len, DecodeError};

/// Raw key split at the fixed address widths.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SplitKey<'a> {
    /// hash(module).
    pub module_hash: &'a str,
    /// hash(module) ++ hash(item), the metadata index key.
    pub item_hash: &'a str,
    /// Encoded key slots.
    pub remainder: &'a str,
}

/// Split `key` into address segments of `segment_width` hex characters each.
///
/// The key must already be lowercase.
pub fn split_key<'a>(
    key: &'a str,
    prefix: &str,
    segment_width: usize,
) -> Result<SplitKey<'a>, DecodeError> {
    let body = key.strip_prefix(prefix).ok_or_else(|| DecodeError::MissingPrefix {
        expected: prefix.to_string(),
    })?;

    let required = min_key_len(prefix, segment_width);
    if key.len() < required {
        return Err(DecodeError::KeyTooShort {
            required,
            actual: key.len(),
        });
    }

    if !body.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(DecodeError::InvalidHex);
    }

    Ok(SplitKey {
        module_hash: &body[..segment_width],
        item_hash: &body[..2 * segment_width],
        remainder: &body[2 * segment_width..],
    })
}
