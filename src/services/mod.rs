//! Resolution services and the caches they share.

pub mod channel_cache;
pub mod clock;
pub mod history_cache;
pub mod trigger_resolver;
pub mod virtual_triggers;

use std::sync::Arc;

pub use channel_cache::{ChannelCache, DEFAULT_CHANNEL_TTL};
pub use clock::{Clock, ManualClock, SystemClock};
pub use history_cache::TriggerHistoryCache;
pub use trigger_resolver::{ResolveError, TriggerResolver};
pub use virtual_triggers::{virtual_trigger_id, ConfigTables, VirtualTriggerBuilder};

use crate::config::Config;
use crate::model::Trigger;
use crate::parameters::ParameterService;
use crate::storage::Stores;

/// The services of one node, sharing one set of caches.
#[derive(Clone)]
pub struct ConfigurationServices {
    pub resolver: Arc<TriggerResolver>,
    pub channels: Arc<ChannelCache>,
    pub history: Arc<TriggerHistoryCache>,
    pub stores: Stores,
    group_id: String,
}

impl ConfigurationServices {
    pub fn new(config: &Config, stores: Stores, parameters: Arc<dyn ParameterService>) -> Self {
        Self::with_clock(config, stores, parameters, Arc::new(SystemClock))
    }

    pub fn with_clock(
        config: &Config,
        stores: Stores,
        parameters: Arc<dyn ParameterService>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let history = Arc::new(TriggerHistoryCache::new(stores.history.clone()));
        let channels = Arc::new(ChannelCache::with_clock(
            stores.channels.clone(),
            &config.node.node_id,
            config.cache.channel_ttl(),
            clock,
        ));
        let builder = VirtualTriggerBuilder::new(
            ConfigTables::from_config(&config.sync),
            parameters,
            config.build_version(),
        );
        let resolver = Arc::new(TriggerResolver::new(
            stores.triggers.clone(),
            stores.links.clone(),
            history.clone(),
            builder,
        ));

        Self {
            resolver,
            channels,
            history,
            stores,
            group_id: config.node.group_id.clone(),
        }
    }

    /// Node group of the local node.
    pub fn group_id(&self) -> &str {
        &self.group_id
    }

    /// Active triggers of the local node's group.
    pub async fn local_triggers(&self) -> trigger_resolver::Result<Vec<Trigger>> {
        self.resolver
            .active_triggers_for_source_group(&self.group_id)
            .await
    }
}
