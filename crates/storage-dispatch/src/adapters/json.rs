//! JSON Adapters
//!
//! Schema loading, file-backed snapshots and a JSON-lines change feed.
//!
//! Formats:
//! - schema file: array of `SchemaModule`
//! - snapshot file: array of `ChangeEvent`
//! - feed: one JSON array of `ChangeEvent` per line

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, Lines};
use tracing::{debug, info};

use crate::domain::{ChangeEvent, ConfigError, FeedError, SchemaModule};
use crate::ports::{ChangeFeed, SnapshotSource};

/// Parse a schema document.
pub fn parse_schema(json: &str) -> Result<Vec<SchemaModule>, ConfigError> {
    serde_json::from_str(json).map_err(|e| ConfigError::Schema(e.to_string()))
}

/// Read and parse a schema file.
pub fn load_schema(path: impl AsRef<Path>) -> Result<Vec<SchemaModule>, ConfigError> {
    let path = path.as_ref();
    let json = std::fs::read_to_string(path)
        .map_err(|e| ConfigError::Schema(format!("{}: {}", path.display(), e)))?;
    let schema = parse_schema(&json)?;
    info!(
        "[lw-dispatch] Loaded schema {}: {} modules",
        path.display(),
        schema.len()
    );
    Ok(schema)
}

/// Snapshot read from a JSON file on every load.
#[derive(Clone, Debug)]
pub struct JsonFileSnapshot {
    path: PathBuf,
}

impl JsonFileSnapshot {
    /// Snapshot backed by `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl SnapshotSource for JsonFileSnapshot {
    async fn load_all(&self) -> Result<Vec<ChangeEvent>, FeedError> {
        let json = tokio::fs::read_to_string(&self.path).await?;
        serde_json::from_str(&json).map_err(|e| FeedError::Malformed(e.to_string()))
    }
}

/// Feed reading one change-set per line.
pub struct JsonLinesFeed<R> {
    id: String,
    lines: Lines<R>,
}

impl<R> JsonLinesFeed<R>
where
    R: AsyncBufRead + Unpin + Send,
{
    /// Feed over a buffered reader.
    pub fn new(id: impl Into<String>, reader: R) -> Self {
        Self {
            id: id.into(),
            lines: reader.lines(),
        }
    }
}

#[async_trait]
impl<R> ChangeFeed for JsonLinesFeed<R>
where
    R: AsyncBufRead + Unpin + Send,
{
    async fn next_change_set(&mut self) -> Result<Option<Vec<ChangeEvent>>, FeedError> {
        loop {
            let Some(line) = self.lines.next_line().await? else {
                debug!("[lw-dispatch] Feed {} reached end of input", self.id);
                return Ok(None);
            };

            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            return serde_json::from_str(line)
                .map(Some)
                .map_err(|e| FeedError::Malformed(e.to_string()));
        }
    }

    fn feed_id(&self) -> &str {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{HasherKind, StorageShape};

    const SCHEMA: &str = r#"[
        {"name": "Game", "storage": [
            {"name": "Round", "shape": "Plain"},
            {"name": "Score", "shape": "Map", "key1_hasher": "Blake2_128Concat"},
            {"name": "Board", "shape": "DoubleMap", "key1_hasher": "Twox128", "key2_hasher": "Twox64Concat"}
        ]},
        {"name": "Empty"}
    ]"#;

    #[test]
    fn test_parse_schema() {
        let schema = parse_schema(SCHEMA).unwrap();
        assert_eq!(schema.len(), 2);
        assert!(schema[1].storage.is_empty());

        let board = &schema[0].storage[2];
        assert_eq!(board.shape, StorageShape::DoubleMap);
        assert_eq!(board.key1_hasher, HasherKind::Twox128);
        assert_eq!(board.key2_hasher, HasherKind::Twox64Concat);
    }

    #[test]
    fn test_parse_schema_error() {
        assert!(matches!(parse_schema("{"), Err(ConfigError::Schema(_))));
    }

    #[test]
    fn test_load_schema_missing_file() {
        let result = load_schema("/nonexistent/schema.json");
        assert!(matches!(result, Err(ConfigError::Schema(_))));
    }

    #[tokio::test]
    async fn test_json_lines_feed() {
        let input: &[u8] = b"[{\"key\":\"0x01\",\"value\":\"0x2a\"}]\n\n[{\"key\":\"0x02\",\"value\":null}]\n";
        let mut feed = JsonLinesFeed::new("stdin", input);

        let first = feed.next_change_set().await.unwrap().unwrap();
        assert_eq!(first[0].value(), Some("0x2a"));

        let second = feed.next_change_set().await.unwrap().unwrap();
        assert!(second[0].is_deletion());

        assert!(feed.next_change_set().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_json_lines_malformed() {
        let input: &[u8] = b"not json\n";
        let mut feed = JsonLinesFeed::new("stdin", input);
        assert!(matches!(
            feed.next_change_set().await,
            Err(FeedError::Malformed(_))
        ));
    }

    #[tokio::test]
    async fn test_json_snapshot_missing_file() {
        let snapshot = JsonFileSnapshot::new("/nonexistent/snapshot.json");
        assert!(matches!(snapshot.load_all().await, Err(FeedError::Io(_))));
    }
}
