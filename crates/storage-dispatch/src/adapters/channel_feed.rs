//! Channel and Stream Feed Adapters
//!
//! Implement the `ChangeFeed` port on top of a tokio channel (for transports
//! that push change-sets) and on top of any `Stream` of change-sets (for
//! transports that expose a subscription stream).

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio_stream::{Stream, StreamExt};
use tracing::debug;

use crate::domain::{ChangeEvent, FeedError};
use crate::ports::ChangeFeed;

/// Producer side of a [`ChannelChangeFeed`].
#[derive(Clone, Debug)]
pub struct ChangeFeedSender {
    tx: mpsc::Sender<Vec<ChangeEvent>>,
}

impl ChangeFeedSender {
    /// Push one change-set, waiting for buffer space.
    pub async fn send(&self, changes: Vec<ChangeEvent>) -> Result<(), FeedError> {
        self.tx.send(changes).await.map_err(|_| FeedError::Closed)
    }

    /// Push one change-set without waiting.
    pub fn try_send(&self, changes: Vec<ChangeEvent>) -> Result<(), FeedError> {
        self.tx.try_send(changes).map_err(|e| match e {
            mpsc::error::TrySendError::Closed(_) => FeedError::Closed,
            mpsc::error::TrySendError::Full(_) => {
                FeedError::Malformed("feed buffer full".to_string())
            }
        })
    }
}

/// Feed fed through a bounded tokio channel.
pub struct ChannelChangeFeed {
    id: String,
    rx: mpsc::Receiver<Vec<ChangeEvent>>,
}

impl ChannelChangeFeed {
    /// Create a feed and its sender with the given buffer capacity.
    pub fn new(id: impl Into<String>, capacity: usize) -> (ChangeFeedSender, Self) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (ChangeFeedSender { tx }, Self { id: id.into(), rx })
    }
}

#[async_trait]
impl ChangeFeed for ChannelChangeFeed {
    async fn next_change_set(&mut self) -> Result<Option<Vec<ChangeEvent>>, FeedError> {
        let next = self.rx.recv().await;
        if next.is_none() {
            debug!("[lw-dispatch] Feed {} closed by all senders", self.id);
        }
        Ok(next)
    }

    fn feed_id(&self) -> &str {
        &self.id
    }
}

/// Feed over any stream of change-sets.
pub struct StreamChangeFeed<S> {
    id: String,
    stream: S,
}

impl<S> StreamChangeFeed<S>
where
    S: Stream<Item = Vec<ChangeEvent>> + Send + Unpin,
{
    /// Wrap a change-set stream.
    pub fn new(id: impl Into<String>, stream: S) -> Self {
        Self {
            id: id.into(),
            stream,
        }
    }
}

#[async_trait]
impl<S> ChangeFeed for StreamChangeFeed<S>
where
    S: Stream<Item = Vec<ChangeEvent>> + Send + Unpin,
{
    async fn next_change_set(&mut self) -> Result<Option<Vec<ChangeEvent>>, FeedError> {
        Ok(self.stream.next().await)
    }

    fn feed_id(&self) -> &str {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_channel_feed_delivers_in_order() {
        let (sender, mut feed) = ChannelChangeFeed::new("chan", 4);
        sender.send(vec![ChangeEvent::deletion("0x01")]).await.unwrap();
        sender.send(vec![ChangeEvent::deletion("0x02")]).await.unwrap();
        drop(sender);

        assert_eq!(feed.next_change_set().await.unwrap().unwrap()[0].key, "0x01");
        assert_eq!(feed.next_change_set().await.unwrap().unwrap()[0].key, "0x02");
        assert!(feed.next_change_set().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_try_send_full() {
        let (sender, _feed) = ChannelChangeFeed::new("chan", 1);
        sender.try_send(vec![]).unwrap();
        assert!(sender.try_send(vec![]).is_err());
    }

    #[tokio::test]
    async fn test_send_after_close() {
        let (sender, feed) = ChannelChangeFeed::new("chan", 1);
        drop(feed);
        assert!(matches!(sender.send(vec![]).await, Err(FeedError::Closed)));
    }

    #[tokio::test]
    async fn test_stream_feed() {
        let stream = tokio_stream::iter(vec![vec![ChangeEvent::deletion("0x01")]]);
        let mut feed = StreamChangeFeed::new("stream", stream);
        assert_eq!(feed.feed_id(), "stream");
        assert_eq!(feed.next_change_set().await.unwrap().unwrap().len(), 1);
        assert!(feed.next_change_set().await.unwrap().is_none());
    }
}
