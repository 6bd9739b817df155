//! # Key Decoder
//!
//! Recovers key parts from the encoded key slots that follow the storage
//! address.
//!
//! Slots are consumed in declared order:
//!
//! ```text
//! non-recoverable : [ fixed-width digest ]            -> ""   (cursor += width)
//! recoverable     : [ fixed-width digest ][ key ... ] -> key  (stop)
//! ```
//!
//! A recoverable slot has no end marker, so it swallows the rest of the key
//! and every later slot is reported as an empty placeholder.

use crate::domain::{DecodeError, StorageMetadataEntry};

/// Decode the key slots of `remainder` according to `entry`'s shape.
///
/// Returns exactly one part per key slot of the shape. Slot widths are byte
/// offsets, so a remainder that is not ASCII is rejected as `InvalidHex`.
pub fn decode_key(
    remainder: &str,
    entry: &StorageMetadataEntry,
) -> Result<Vec<String>, DecodeError> {
    if !remainder.is_ascii() {
        return Err(DecodeError::InvalidHex);
    }

    let hashers = entry
        .key_hashers()
        .ok_or_else(|| DecodeError::UnsupportedShape {
            address: entry.address(),
        })?;

    let slots = hashers.len();
    let mut parts = Vec::with_capacity(slots);
    let mut cursor = 0usize;

    for (slot, hasher) in hashers.into_iter().enumerate() {
        let width = hasher
            .prefix_width()
            .ok_or(DecodeError::UnknownHasherWidth { slot })?;

        let end = cursor + width;
        if remainder.len() < end {
            return Err(DecodeError::KeyTooShort {
                required: end,
                actual: remainder.len(),
            });
        }

        if hasher.is_recoverable() {
            parts.push(remainder[end..].to_string());
            break;
        }

        parts.push(String::new());
        cursor = end;
    }

    parts.resize(slots, String::new());
    Ok(parts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{HasherKind, StorageShape};
    use proptest::prelude::*;

    fn entry(shape: StorageShape, key1: HasherKind, key2: HasherKind) -> StorageMetadataEntry {
        StorageMetadataEntry {
            module_name: "Game".into(),
            display_name: "Item".into(),
            shape,
            key1_hasher: key1,
            key2_hasher: key2,
        }
    }

    fn map(hasher: HasherKind) -> StorageMetadataEntry {
        entry(StorageShape::Map, hasher, HasherKind::Identity)
    }

    #[test]
    fn test_plain_ignores_remainder() {
        let plain = entry(StorageShape::Plain, HasherKind::Identity, HasherKind::Identity);
        assert!(decode_key("", &plain).unwrap().is_empty());
        assert!(decode_key("abcdef", &plain).unwrap().is_empty());
    }

    #[test]
    fn test_map_non_recoverable() {
        let key = "0".repeat(32);
        assert_eq!(
            decode_key(&key, &map(HasherKind::Blake2_128)).unwrap(),
            vec![String::new()]
        );
    }

    #[test]
    fn test_map_recoverable_empty_suffix() {
        let key = "f".repeat(16);
        assert_eq!(
            decode_key(&key, &map(HasherKind::Twox64Concat)).unwrap(),
            vec![String::new()]
        );
    }

    #[test]
    fn test_map_identity() {
        assert_eq!(
            decode_key("cafe", &map(HasherKind::Identity)).unwrap(),
            vec!["cafe".to_string()]
        );
    }

    #[test]
    fn test_map_too_short() {
        let result = decode_key("abcd", &map(HasherKind::Blake2_128Concat));
        assert_eq!(
            result,
            Err(DecodeError::KeyTooShort {
                required: 32,
                actual: 4
            })
        );
    }

    #[test]
    fn test_double_map_both_non_recoverable() {
        let dm = entry(StorageShape::DoubleMap, HasherKind::Twox128, HasherKind::Blake2_256);
        let key = format!("{}{}", "1".repeat(32), "2".repeat(64));
        assert_eq!(decode_key(&key, &dm).unwrap(), vec![String::new(), String::new()]);
    }

    #[test]
    fn test_double_map_recoverable_first_slot() {
        let dm = entry(
            StorageShape::DoubleMap,
            HasherKind::Blake2_128Concat,
            HasherKind::Twox64Concat,
        );
        let key = format!("{}{}", "0".repeat(32), "beefbeef");
        assert_eq!(
            decode_key(&key, &dm).unwrap(),
            vec!["beefbeef".to_string(), String::new()]
        );
    }

    #[test]
    fn test_double_map_unknown_first_width() {
        let dm = entry(
            StorageShape::DoubleMap,
            HasherKind::Unknown("Opaque".into()),
            HasherKind::Identity,
        );
        assert_eq!(
            decode_key("abcdef", &dm),
            Err(DecodeError::UnknownHasherWidth { slot: 0 })
        );
    }

    #[test]
    fn test_non_ascii_remainder_rejected() {
        // 31 ASCII chars + a two-byte char straddling the 32-char slot edge
        let key = format!("{}é", "0".repeat(31));
        assert_eq!(
            decode_key(&key, &map(HasherKind::Blake2_128Concat)),
            Err(DecodeError::InvalidHex)
        );
    }

    #[test]
    fn test_unsupported_shape() {
        let nmap = entry(StorageShape::Unsupported, HasherKind::Identity, HasherKind::Identity);
        assert!(matches!(
            decode_key("", &nmap),
            Err(DecodeError::UnsupportedShape { .. })
        ));
    }

    proptest! {
        #[test]
        fn prop_plain_always_empty(rest in "[0-9a-f]{0,80}") {
            let plain = entry(StorageShape::Plain, HasherKind::Identity, HasherKind::Identity);
            prop_assert!(decode_key(&rest, &plain).unwrap().is_empty());
        }

        #[test]
        fn prop_map_recoverable_returns_suffix(
            prefix in "[0-9a-f]{32}",
            suffix in "[0-9a-f]{0,64}",
        ) {
            let key = format!("{}{}", prefix, suffix);
            let parts = decode_key(&key, &map(HasherKind::Blake2_128Concat)).unwrap();
            prop_assert_eq!(parts, vec![suffix]);
        }

        #[test]
        fn prop_double_map_splits_at_first_width(
            key1 in "[0-9a-f]{32}",
            key2_hash in "[0-9a-f]{16}",
            key2 in "[0-9a-f]{0,40}",
        ) {
            let dm = entry(StorageShape::DoubleMap, HasherKind::Twox128, HasherKind::Twox64Concat);
            let key = format!("{}{}{}", key1, key2_hash, key2);
            let parts = decode_key(&key, &dm).unwrap();
            prop_assert_eq!(parts, vec![String::new(), key2]);
        }
    }
}
