//! # Storage Watch Service
//!
//! Application service wiring startup, bootstrap and the subscription feed
//! around a [`ChangeDispatcher`].
//!
//! Lifecycle:
//! 1. `initialize` builds the metadata index, validates and registers every
//!    listener binding. Any `ConfigError` aborts startup.
//! 2. `spawn_feed` may start at any point; change-sets wait on the gate.
//! 3. `bootstrap` (or `mark_ready`) opens the gate.
//! 4. `shutdown` stops the feed task and returns its summary.

use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::dispatcher::ChangeDispatcher;
use super::gate::InitializationGate;
use crate::adapters::{ChangeFeedSender, ChannelChangeFeed, Sha256AddressHasher};
use crate::config::DispatchConfig;
use crate::domain::{
    invariant_binding_arity, ConfigError, DispatchReport, FeedError, ListenerBinding,
    ListenerRegistry, MetadataIndex, SchemaModule,
};
use crate::ports::{AddressHasher, ChangeFeed, SnapshotSource};

/// Outcome of one feed task.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedSummary {
    /// Change-sets processed.
    pub change_sets: u64,
    /// Change-sets rejected by a gate timeout.
    pub rejected_sets: u64,
    /// Change-sets the transport could not parse.
    pub malformed: u64,
    /// Per-change totals across all processed sets.
    pub report: DispatchReport,
}

/// Storage Watch Service - owns the dispatcher and its feed task.
pub struct StorageWatchService {
    /// Configuration.
    config: DispatchConfig,
    /// Shared dispatcher.
    dispatcher: Arc<ChangeDispatcher>,
    /// Stop signal for the feed task.
    shutdown_tx: watch::Sender<bool>,
    /// Running feed task, if any.
    feed_task: Mutex<Option<JoinHandle<FeedSummary>>>,
}

impl StorageWatchService {
    /// Build the service with the default SHA-256 address hasher.
    pub fn initialize(
        config: DispatchConfig,
        schema: &[SchemaModule],
        bindings: Vec<ListenerBinding>,
    ) -> Result<Self, ConfigError> {
        let hasher = Sha256AddressHasher::new(config.address_hash_bytes);
        Self::with_hasher(config, schema, bindings, &hasher)
    }

    /// Build the service with a custom address hasher.
    pub fn with_hasher(
        config: DispatchConfig,
        schema: &[SchemaModule],
        bindings: Vec<ListenerBinding>,
        hasher: &dyn AddressHasher,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        let index = MetadataIndex::build(schema, hasher);
        let mut registry = ListenerRegistry::new();

        for binding in bindings {
            let address = binding.address();
            if let Some(winner) = index.shadowed_by(&binding.module, &binding.item) {
                return Err(ConfigError::ShadowedItem {
                    address,
                    winner: winner.to_string(),
                });
            }
            match index.entry_by_name(&binding.module, &binding.item) {
                Some(entry) => invariant_binding_arity(&address, binding.arity(), entry.shape)?,
                None => warn!(
                    "[lw-dispatch] Listener {} has no storage item in the schema",
                    address
                ),
            }
            registry.register(binding)?;
        }

        info!(
            "[lw-dispatch] Initialized: {} modules, {} storage items, {} listeners",
            index.module_count(),
            index.item_count(),
            registry.len()
        );

        let dispatcher = ChangeDispatcher::new(
            Arc::new(index),
            Arc::new(registry),
            Arc::new(InitializationGate::new()),
            &config,
        );
        let (shutdown_tx, _) = watch::channel(false);

        Ok(Self {
            config,
            dispatcher: Arc::new(dispatcher),
            shutdown_tx,
            feed_task: Mutex::new(None),
        })
    }

    /// Signal that the application has finished its own initialization.
    pub fn mark_ready(&self) -> bool {
        self.dispatcher.gate().open()
    }

    /// Whether the gate is open.
    pub fn is_ready(&self) -> bool {
        self.dispatcher.gate().is_open()
    }

    /// Load the current state, route it, then open the gate.
    ///
    /// On a load failure the gate stays closed.
    pub async fn bootstrap<S>(&self, source: &S) -> Result<DispatchReport, FeedError>
    where
        S: SnapshotSource + ?Sized,
    {
        let snapshot = source.load_all().await?;
        let report = self.dispatcher.apply_snapshot(&snapshot).await;
        info!(
            "[lw-dispatch] Bootstrap routed {} of {} entries",
            report.delivered,
            snapshot.len()
        );
        self.mark_ready();
        Ok(report)
    }

    /// Drive `feed` on a background task. Returns `false` if a feed is
    /// already running.
    pub fn spawn_feed<F>(&self, feed: F) -> bool
    where
        F: ChangeFeed + 'static,
    {
        let mut slot = self.feed_task.lock();
        if slot.as_ref().is_some_and(|task| !task.is_finished()) {
            warn!("[lw-dispatch] Feed already running, ignoring {}", feed.feed_id());
            return false;
        }

        let dispatcher = self.dispatcher.clone();
        let shutdown = self.shutdown_tx.subscribe();
        *slot = Some(tokio::spawn(run_feed(feed, dispatcher, shutdown)));
        true
    }

    /// Start an in-process channel feed sized by `feed_buffer`.
    pub fn spawn_channel_feed(&self, id: impl Into<String>) -> Option<ChangeFeedSender> {
        let (sender, feed) = ChannelChangeFeed::new(id, self.config.feed_buffer);
        self.spawn_feed(feed).then_some(sender)
    }

    /// Whether the feed task has finished (or was never started).
    pub fn feed_finished(&self) -> bool {
        self.feed_task
            .lock()
            .as_ref()
            .map_or(true, |task| task.is_finished())
    }

    /// Stop the feed task and wait for it.
    pub async fn shutdown(&self) -> Option<FeedSummary> {
        self.shutdown_tx.send_replace(true);

        let task = self.feed_task.lock().take()?;
        match task.await {
            Ok(summary) => {
                info!(
                    "[lw-dispatch] Feed stopped after {} change-sets",
                    summary.change_sets
                );
                Some(summary)
            }
            Err(e) => {
                warn!("[lw-dispatch] Feed task failed: {}", e);
                None
            }
        }
    }

    /// The dispatcher.
    pub fn dispatcher(&self) -> &Arc<ChangeDispatcher> {
        &self.dispatcher
    }

    /// Configuration.
    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }
}

async fn run_feed<F>(
    mut feed: F,
    dispatcher: Arc<ChangeDispatcher>,
    mut shutdown: watch::Receiver<bool>,
) -> FeedSummary
where
    F: ChangeFeed,
{
    let mut summary = FeedSummary::default();
    info!("[lw-dispatch] Feed {} started", feed.feed_id());

    loop {
        if *shutdown.borrow() {
            break;
        }

        let next = tokio::select! {
            _ = shutdown.changed() => break,
            next = feed.next_change_set() => next,
        };

        let changes = match next {
            Ok(Some(changes)) => changes,
            Ok(None) => {
                info!("[lw-dispatch] Feed {} ended", feed.feed_id());
                break;
            }
            Err(FeedError::Malformed(reason)) => {
                summary.malformed += 1;
                warn!("[lw-dispatch] Skipping malformed change-set: {}", reason);
                continue;
            }
            Err(e) => {
                warn!("[lw-dispatch] Feed {} failed: {}", feed.feed_id(), e);
                break;
            }
        };

        let result = tokio::select! {
            _ = shutdown.changed() => break,
            result = dispatcher.on_change_set(&changes) => result,
        };

        match result {
            Ok(report) => {
                summary.change_sets += 1;
                summary.report.merge(&report);
            }
            Err(_) => summary.rejected_sets += 1,
        }
    }

    debug!(
        "[lw-dispatch] Feed {} summary: {:?}",
        feed.feed_id(),
        summary
    );
    summary
}
