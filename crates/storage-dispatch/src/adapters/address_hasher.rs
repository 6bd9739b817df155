//! SHA-256 Address Hasher Adapter
//!
//! Implements the `AddressHasher` port with a truncated SHA-256 digest.

use sha2::{Digest, Sha256};

use crate::domain::DEFAULT_ADDRESS_HASH_BYTES;
use crate::ports::AddressHasher;

/// Truncated SHA-256 of the UTF-8 name, lowercase hex.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Sha256AddressHasher {
    /// Digest bytes kept (1..=32).
    bytes: usize,
}

impl Sha256AddressHasher {
    /// Keep the first `bytes` bytes of the digest, clamped to 1..=32.
    pub fn new(bytes: usize) -> Self {
        Self {
            bytes: bytes.clamp(1, 32),
        }
    }
}

impl Default for Sha256AddressHasher {
    fn default() -> Self {
        Self::new(DEFAULT_ADDRESS_HASH_BYTES)
    }
}

impl AddressHasher for Sha256AddressHasher {
    fn segment_width(&self) -> usize {
        self.bytes * 2
    }

    fn hash_name(&self, name: &str) -> String {
        let digest = Sha256::digest(name.as_bytes());
        hex::encode(&digest[..self.bytes])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_width_matches_output() {
        let hasher = Sha256AddressHasher::default();
        assert_eq!(hasher.segment_width(), 16);
        assert_eq!(hasher.hash_name("Game").len(), 16);
    }

    #[test]
    fn test_deterministic_and_distinct() {
        let hasher = Sha256AddressHasher::new(16);
        assert_eq!(hasher.hash_name("Score"), hasher.hash_name("Score"));
        assert_ne!(hasher.hash_name("Score"), hasher.hash_name("Round"));
    }

    #[test]
    fn test_lowercase_hex() {
        let digest = Sha256AddressHasher::default().hash_name("System");
        assert!(digest
            .chars()
            .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
    }

    #[test]
    fn test_clamped_length() {
        assert_eq!(Sha256AddressHasher::new(0).segment_width(), 2);
        assert_eq!(Sha256AddressHasher::new(64).segment_width(), 64);
    }

    #[test]
    fn test_storage_prefix() {
        let hasher = Sha256AddressHasher::default();
        let prefix = hasher.storage_prefix("Game", "Score");
        assert_eq!(prefix.len(), 32);
        assert!(prefix.starts_with(&hasher.hash_name("Game")));
    }
}
