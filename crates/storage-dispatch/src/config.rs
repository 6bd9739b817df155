//! # Dispatch Configuration
//!
//! Configuration for the storage dispatch service.

use std::env;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::domain::{ConfigError, DEFAULT_ADDRESS_HASH_BYTES, DEFAULT_KEY_PREFIX};

/// Storage dispatch configuration.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct DispatchConfig {
    /// Prefix carried by every raw key.
    pub key_prefix: String,

    /// Length of one address hash in bytes.
    pub address_hash_bytes: usize,

    /// Bound on the initialization gate wait in milliseconds (0 = unbounded).
    pub gate_timeout_ms: u64,

    /// Capacity of channel-backed feeds.
    pub feed_buffer: usize,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            key_prefix: DEFAULT_KEY_PREFIX.to_string(),
            address_hash_bytes: DEFAULT_ADDRESS_HASH_BYTES,
            gate_timeout_ms: 0,
            feed_buffer: 1000,
        }
    }
}

impl DispatchConfig {
    /// Create a config for testing (short gate bound, small buffers).
    pub fn for_testing() -> Self {
        Self {
            gate_timeout_ms: 500,
            feed_buffer: 16,
            ..Self::default()
        }
    }

    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `LW_KEY_PREFIX`: Raw key prefix (default: 0x)
    /// - `LW_ADDRESS_HASH_BYTES`: Address hash length in bytes (default: 8)
    /// - `LW_GATE_TIMEOUT_MS`: Gate wait bound, 0 = unbounded (default: 0)
    /// - `LW_FEED_BUFFER`: Feed channel capacity (default: 1000)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            key_prefix: env::var("LW_KEY_PREFIX").unwrap_or(defaults.key_prefix),

            address_hash_bytes: env::var("LW_ADDRESS_HASH_BYTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.address_hash_bytes),

            gate_timeout_ms: env::var("LW_GATE_TIMEOUT_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.gate_timeout_ms),

            feed_buffer: env::var("LW_FEED_BUFFER")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.feed_buffer),
        }
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.address_hash_bytes == 0 || self.address_hash_bytes > 32 {
            return Err(ConfigError::InvalidConfig(format!(
                "address_hash_bytes must be in 1..=32, got {}",
                self.address_hash_bytes
            )));
        }
        if self.feed_buffer == 0 {
            return Err(ConfigError::InvalidConfig(
                "feed_buffer must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Gate wait bound, `None` when unbounded.
    pub fn gate_timeout(&self) -> Option<Duration> {
        (self.gate_timeout_ms > 0).then(|| Duration::from_millis(self.gate_timeout_ms))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = DispatchConfig::default();
        assert_eq!(config.key_prefix, "0x");
        assert_eq!(config.address_hash_bytes, 8);
        assert!(config.gate_timeout().is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_testing_config() {
        let config = DispatchConfig::for_testing();
        assert_eq!(config.gate_timeout(), Some(Duration::from_millis(500)));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_hash_bytes() {
        let config = DispatchConfig {
            address_hash_bytes: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::InvalidConfig(_))));
    }

    #[test]
    fn test_config_json() {
        let config: DispatchConfig = serde_json::from_str(
            r#"{"key_prefix":"0x","address_hash_bytes":16,"gate_timeout_ms":0,"feed_buffer":8}"#,
        )
        .unwrap();
        assert_eq!(config.address_hash_bytes, 16);
    }
}
