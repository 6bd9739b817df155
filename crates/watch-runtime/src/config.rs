//! Runtime configuration from environment variables.

use std::env;
use std::path::PathBuf;

use storage_dispatch::{DispatchConfig, ADDRESS_SEPARATOR};

/// Configuration for the watch runtime.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Schema file (array of modules with their storage items)
    pub schema_path: PathBuf,

    /// Optional snapshot file routed before the gate opens
    pub snapshot_path: Option<PathBuf>,

    /// Watched `(module, item)` pairs; empty watches every item
    pub watch: Vec<(String, String)>,

    /// Log level filter (trace, debug, info, warn, error)
    pub log_level: String,

    /// Whether to emit JSON formatted logs
    pub json_logs: bool,

    /// Dispatcher settings
    pub dispatch: DispatchConfig,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            schema_path: PathBuf::from("schema.json"),
            snapshot_path: None,
            watch: Vec::new(),
            log_level: "info".to_string(),
            json_logs: false,
            dispatch: DispatchConfig::default(),
        }
    }
}

impl RuntimeConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `LW_SCHEMA_PATH`: Schema file (default: schema.json)
    /// - `LW_SNAPSHOT_PATH`: Snapshot file (default: none, gate opens at once)
    /// - `LW_WATCH`: Comma-separated `Module.Item` list (default: all items)
    /// - `LW_LOG_LEVEL`: Log level when `RUST_LOG` is unset (default: info)
    /// - `LW_JSON_LOGS`: Enable JSON logs (default: false)
    /// - `LW_KEY_PREFIX`, `LW_ADDRESS_HASH_BYTES`, `LW_GATE_TIMEOUT_MS`,
    ///   `LW_FEED_BUFFER`: see [`DispatchConfig::from_env`]
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            schema_path: env::var("LW_SCHEMA_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.schema_path),

            snapshot_path: env::var("LW_SNAPSHOT_PATH")
                .ok()
                .filter(|p| !p.trim().is_empty())
                .map(PathBuf::from),

            watch: env::var("LW_WATCH")
                .map(|v| parse_watch_list(&v))
                .unwrap_or_default(),

            log_level: env::var("LW_LOG_LEVEL").unwrap_or(defaults.log_level),

            json_logs: env::var("LW_JSON_LOGS")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(defaults.json_logs),

            dispatch: DispatchConfig::from_env(),
        }
    }

    /// Whether `module.item` is watched.
    pub fn watches(&self, module: &str, item: &str) -> bool {
        self.watch.is_empty() || self.watch.iter().any(|(m, i)| m == module && i == item)
    }
}

/// Parse `Module.Item,Module.Item`. Entries without a separator are ignored.
pub fn parse_watch_list(raw: &str) -> Vec<(String, String)> {
    raw.split(',')
        .map(str::trim)
        .filter_map(|entry| entry.split_once(ADDRESS_SEPARATOR))
        .filter(|(module, item)| !module.is_empty() && !item.is_empty())
        .map(|(module, item)| (module.to_string(), item.to_string()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_watch_list() {
        let watch = parse_watch_list(" Game.Score, Game.Round ,bogus,.Item,");
        assert_eq!(
            watch,
            vec![
                ("Game".to_string(), "Score".to_string()),
                ("Game".to_string(), "Round".to_string()),
            ]
        );
    }

    #[test]
    fn test_empty_watch_list_watches_all() {
        let config = RuntimeConfig::default();
        assert!(config.watches("Any", "Thing"));
    }

    #[test]
    fn test_watch_list_filters() {
        let config = RuntimeConfig {
            watch: parse_watch_list("Game.Score"),
            ..RuntimeConfig::default()
        };
        assert!(config.watches("Game", "Score"));
        assert!(!config.watches("Game", "Round"));
    }
}
