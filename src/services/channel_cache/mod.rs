//! Channel snapshot cache.
//!
//! Holds the local node's channel list for a fixed time. Reloads are
//! single-flight: readers that find the snapshot stale join the one load in
//! flight for the current invalidation generation and all receive its result,
//! success or failure. Every channel write drops the snapshot.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use std::time::{Duration, Instant};

use futures::future::{BoxFuture, FutureExt, Shared};
use tracing::{debug, warn};

use super::clock::{Clock, SystemClock};
use crate::model::{Channel, NodeChannel};
use crate::storage::{ChannelStore, Result, StorageError};

/// How long a channel snapshot stays fresh by default.
pub const DEFAULT_CHANNEL_TTL: Duration = Duration::from_secs(60);

type Load = Shared<BoxFuture<'static, std::result::Result<Arc<Vec<NodeChannel>>, Arc<StorageError>>>>;

struct Snapshot {
    channels: Arc<Vec<NodeChannel>>,
    loaded_at: Instant,
    /// Invalidation generation the load started under.
    generation: u64,
}

struct InFlight {
    generation: u64,
    load: Load,
}

pub struct ChannelCache {
    store: Arc<dyn ChannelStore>,
    node_id: String,
    ttl: Duration,
    clock: Arc<dyn Clock>,
    snapshot: Arc<RwLock<Option<Snapshot>>>,
    generation: AtomicU64,
    in_flight: Arc<Mutex<Option<InFlight>>>,
}

impl ChannelCache {
    pub fn new(store: Arc<dyn ChannelStore>, node_id: &str) -> Self {
        Self::with_clock(store, node_id, DEFAULT_CHANNEL_TTL, Arc::new(SystemClock))
    }

    pub fn with_clock(
        store: Arc<dyn ChannelStore>,
        node_id: &str,
        ttl: Duration,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            node_id: node_id.to_string(),
            ttl,
            clock,
            snapshot: Arc::new(RwLock::new(None)),
            generation: AtomicU64::new(0),
            in_flight: Arc::new(Mutex::new(None)),
        }
    }

    pub fn node_id(&self) -> &str {
        &self.node_id
    }

    /// The channel list, reloaded when missing, expired or invalidated.
    pub async fn channels(&self) -> Result<Arc<Vec<NodeChannel>>> {
        if let Some(channels) = self.fresh() {
            return Ok(channels);
        }

        let load = {
            let mut in_flight = self
                .in_flight
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            // A load may have finished between the fast path and the lock.
            if let Some(channels) = self.fresh() {
                return Ok(channels);
            }
            let generation = self.generation.load(Ordering::Acquire);
            match in_flight.as_ref().filter(|f| f.generation == generation) {
                Some(current) => current.load.clone(),
                None => {
                    let load = self.start_load(generation);
                    *in_flight = Some(InFlight {
                        generation,
                        load: load.clone(),
                    });
                    load
                }
            }
        };

        load.await.map_err(StorageError::Shared)
    }

    /// One channel by id, or `None`.
    pub async fn channel(&self, channel_id: &str) -> Result<Option<NodeChannel>> {
        Ok(self
            .channels()
            .await?
            .iter()
            .find(|c| c.id() == channel_id)
            .cloned())
    }

    /// Drop the snapshot. The next read reloads.
    pub fn invalidate(&self) {
        self.generation.fetch_add(1, Ordering::AcqRel);
        debug!(node_id = %self.node_id, "Channel cache invalidated");
    }

    pub async fn save_channel(&self, channel: &Channel) -> Result<()> {
        let result = self.store.save_channel(channel).await;
        self.invalidate();
        result
    }

    pub async fn delete_channel(&self, channel_id: &str) -> Result<()> {
        let result = self.store.delete_channel(channel_id).await;
        self.invalidate();
        result
    }

    /// Set the suspend/ignore flags of a channel for one node.
    pub async fn save_channel_control(
        &self,
        node_id: &str,
        channel_id: &str,
        suspended: bool,
        ignored: bool,
    ) -> Result<()> {
        let result = self
            .store
            .save_channel_control(node_id, channel_id, suspended, ignored)
            .await;
        self.invalidate();
        result
    }

    fn fresh(&self) -> Option<Arc<Vec<NodeChannel>>> {
        let snapshot = self
            .snapshot
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let snapshot = snapshot.as_ref()?;
        let current = self.generation.load(Ordering::Acquire);
        let age = self.clock.now().saturating_duration_since(snapshot.loaded_at);
        (snapshot.generation == current && age < self.ttl).then(|| snapshot.channels.clone())
    }

    /// Build the shared load for `generation`. It installs its snapshot and
    /// then leaves the in-flight slot, so a finished load is never joined.
    fn start_load(&self, generation: u64) -> Load {
        let store = self.store.clone();
        let node_id = self.node_id.clone();
        let clock = self.clock.clone();
        let snapshot = self.snapshot.clone();
        let in_flight = self.in_flight.clone();

        async move {
            let result = store
                .node_channels(&node_id)
                .await
                .map(Arc::new)
                .map_err(Arc::new);

            match &result {
                Ok(channels) => {
                    debug!(node_id = %node_id, count = channels.len(), "Channel cache reloaded");
                    let mut current = snapshot
                        .write()
                        .unwrap_or_else(|poisoned| poisoned.into_inner());
                    // A slower load from an older generation must not win.
                    if current.as_ref().map_or(true, |s| s.generation <= generation) {
                        *current = Some(Snapshot {
                            channels: channels.clone(),
                            loaded_at: clock.now(),
                            generation,
                        });
                    }
                }
                Err(e) => warn!(node_id = %node_id, error = %e, "Channel cache reload failed"),
            }

            let mut slot = in_flight
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            if slot.as_ref().is_some_and(|f| f.generation == generation) {
                *slot = None;
            }
            result
        }
        .boxed()
        .shared()
    }
}
