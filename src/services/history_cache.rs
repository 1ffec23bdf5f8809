//! Trigger history cache.
//!
//! History rows never change after insert, so a row fetched by id is kept
//! for the life of the cache. Concurrent misses on one id share a single
//! store read and its outcome; misses on different ids do not wait on each
//! other. Lookups for the latest row of a trigger or table always go to the
//! store: a new row may have been appended since.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

use futures::future::{BoxFuture, FutureExt, Shared};
use tracing::{debug, warn};

use crate::model::TriggerHistory;
use crate::storage::{Result, StorageError, TriggerHistoryStore};

type Entries = Arc<RwLock<HashMap<i64, Arc<TriggerHistory>>>>;

type Fill =
    Shared<BoxFuture<'static, std::result::Result<Option<Arc<TriggerHistory>>, Arc<StorageError>>>>;

pub struct TriggerHistoryCache {
    store: Arc<dyn TriggerHistoryStore>,
    entries: Entries,
    /// Store reads in flight, by history id.
    fills: Arc<Mutex<HashMap<i64, Fill>>>,
}

impl TriggerHistoryCache {
    pub fn new(store: Arc<dyn TriggerHistoryStore>) -> Self {
        Self {
            store,
            entries: Arc::new(RwLock::new(HashMap::new())),
            fills: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// History row by id. Negative ids are never assigned and return `None`
    /// without a query. Misses are not cached.
    pub async fn history_by_id(&self, trigger_history_id: i64) -> Result<Option<Arc<TriggerHistory>>> {
        if trigger_history_id < 0 {
            return Ok(None);
        }
        if let Some(hit) = self.cached(trigger_history_id) {
            return Ok(Some(hit));
        }

        let fill = {
            let mut fills = self
                .fills
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            if let Some(hit) = self.cached(trigger_history_id) {
                return Ok(Some(hit));
            }
            fills
                .entry(trigger_history_id)
                .or_insert_with(|| self.start_fill(trigger_history_id))
                .clone()
        };

        fill.await.map_err(StorageError::Shared)
    }

    /// Most recent history row for a trigger, read from the store.
    pub async fn latest_for_trigger(&self, trigger_id: i64) -> Result<Option<Arc<TriggerHistory>>> {
        Ok(self
            .store
            .latest_for_trigger(trigger_id)
            .await?
            .map(|history| remember(&self.entries, history)))
    }

    /// Most recent history row for a source table, read from the store.
    pub async fn history_for_source_table(
        &self,
        source_table_name: &str,
    ) -> Result<Option<Arc<TriggerHistory>>> {
        Ok(self
            .store
            .latest_for_source_table(source_table_name)
            .await?
            .map(|history| remember(&self.entries, history)))
    }

    /// Every history row, keyed by id. Also warms the cache.
    pub async fn all_history(&self) -> Result<HashMap<i64, TriggerHistory>> {
        let all = self.store.all_history().await?;
        let mut entries = self
            .entries
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        for (id, history) in &all {
            entries
                .entry(*id)
                .or_insert_with(|| Arc::new(history.clone()));
        }
        Ok(all)
    }

    /// Insert a new history row and cache it under the id the store assigned.
    pub async fn insert_history(&self, history: &TriggerHistory) -> Result<i64> {
        let id = self.store.insert_history(history).await?;
        remember(
            &self.entries,
            TriggerHistory {
                trigger_history_id: id,
                ..history.clone()
            },
        );
        Ok(id)
    }

    /// Number of rows currently held.
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn cached(&self, trigger_history_id: i64) -> Option<Arc<TriggerHistory>> {
        self.entries
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(&trigger_history_id)
            .cloned()
    }

    /// Shared read of one id. Caches a hit before leaving the in-flight map.
    fn start_fill(&self, trigger_history_id: i64) -> Fill {
        let store = self.store.clone();
        let entries = self.entries.clone();
        let fills = self.fills.clone();

        async move {
            let result = store
                .history_by_id(trigger_history_id)
                .await
                .map(|found| {
                    found.map(|history| {
                        debug!(trigger_history_id, "History cache fill");
                        remember(&entries, history)
                    })
                })
                .map_err(Arc::new);
            if let Err(e) = &result {
                warn!(trigger_history_id, error = %e, "History lookup failed");
            }

            fills
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner())
                .remove(&trigger_history_id);
            result
        }
        .boxed()
        .shared()
    }
}

fn remember(entries: &Entries, history: TriggerHistory) -> Arc<TriggerHistory> {
    entries
        .write()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
        .entry(history.trigger_history_id)
        .or_insert_with(|| Arc::new(history))
        .clone()
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use chrono::Utc;

    use super::*;
    use crate::model::TriggerRebuildReason;
    use crate::storage::mock::MockConfigStore;

    fn history(trigger_id: i64, table: &str) -> TriggerHistory {
        TriggerHistory {
            trigger_history_id: 0,
            trigger_id,
            source_table_name: table.to_string(),
            table_hash: 7,
            create_time: Utc::now(),
            column_names: "id,name".to_string(),
            pk_column_names: "id".to_string(),
            last_trigger_build_reason: TriggerRebuildReason::NewTriggers,
            name_for_insert_trigger: None,
            name_for_update_trigger: None,
            name_for_delete_trigger: None,
            source_schema_name: None,
            source_catalog_name: None,
            trigger_row_hash: 0,
        }
    }

    fn setup() -> (Arc<MockConfigStore>, TriggerHistoryCache) {
        let store = Arc::new(MockConfigStore::new());
        let cache = TriggerHistoryCache::new(store.clone());
        (store, cache)
    }

    #[tokio::test]
    async fn test_history_by_id_queries_once() {
        let (store, cache) = setup();
        let id = store.insert_history(&history(1, "item")).await.unwrap();

        for _ in 0..3 {
            let found = cache.history_by_id(id).await.unwrap().unwrap();
            assert_eq!(found.trigger_history_id, id);
        }
        assert_eq!(store.history_by_id_count(), 1);
    }

    #[tokio::test]
    async fn test_history_by_id_concurrent_miss_queries_once() {
        let (store, cache) = setup();
        let id = store.insert_history(&history(1, "item")).await.unwrap();
        let cache = Arc::new(cache);

        let lookups = (0..8).map(|_| {
            let cache = cache.clone();
            async move { cache.history_by_id(id).await }
        });
        for result in futures::future::join_all(lookups).await {
            assert!(result.unwrap().is_some());
        }
        assert_eq!(store.history_by_id_count(), 1);
    }

    #[tokio::test]
    async fn test_misses_are_not_cached() {
        let (store, cache) = setup();
        assert!(cache.history_by_id(5).await.unwrap().is_none());
        assert!(cache.history_by_id(5).await.unwrap().is_none());
        assert_eq!(store.history_by_id_count(), 2);
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_negative_id_skips_store() {
        let (store, cache) = setup();
        assert!(cache.history_by_id(-1).await.unwrap().is_none());
        assert_eq!(store.history_by_id_count(), 0);
    }

    #[tokio::test]
    async fn test_latest_sees_new_rows() {
        let (store, cache) = setup();
        let first = cache.insert_history(&history(3, "item")).await.unwrap();
        assert_eq!(
            cache.latest_for_trigger(3).await.unwrap().unwrap().trigger_history_id,
            first
        );

        let second = store.insert_history(&history(3, "item")).await.unwrap();
        assert_eq!(
            cache.latest_for_trigger(3).await.unwrap().unwrap().trigger_history_id,
            second
        );
        assert_eq!(store.history_latest_count(), 2);
    }

    #[tokio::test]
    async fn test_insert_caches_new_row() {
        let (store, cache) = setup();
        let id = cache.insert_history(&history(3, "item")).await.unwrap();

        let found = cache.history_by_id(id).await.unwrap().unwrap();
        assert_eq!(found.trigger_id, 3);
        assert_eq!(store.history_by_id_count(), 0);
    }

    #[tokio::test]
    async fn test_history_for_source_table() {
        let (_store, cache) = setup();
        cache.insert_history(&history(1, "item")).await.unwrap();
        let latest = cache.insert_history(&history(2, "item")).await.unwrap();
        cache.insert_history(&history(3, "sale")).await.unwrap();

        let found = cache.history_for_source_table("item").await.unwrap().unwrap();
        assert_eq!(found.trigger_history_id, latest);
        assert!(cache.history_for_source_table("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_all_history_warms_cache() {
        let (store, cache) = setup();
        store.insert_history(&history(1, "item")).await.unwrap();
        store.insert_history(&history(2, "sale")).await.unwrap();

        assert_eq!(cache.all_history().await.unwrap().len(), 2);
        assert_eq!(cache.len(), 2);
    }

    #[tokio::test]
    async fn test_concurrent_miss_shares_one_failure() {
        let (store, cache) = setup();
        store.set_load_delay(Duration::from_millis(20)).await;
        store.set_fail_on_read(true);
        let cache = Arc::new(cache);

        let lookups = (0..8).map(|_| {
            let cache = cache.clone();
            async move { cache.history_by_id(1).await }
        });
        for result in futures::future::join_all(lookups).await {
            assert!(matches!(result, Err(StorageError::Shared(_))));
        }
        assert_eq!(store.history_by_id_count(), 1);

        store.set_fail_on_read(false);
        assert!(cache.history_by_id(1).await.unwrap().is_none());
        assert_eq!(store.history_by_id_count(), 2);
    }

    #[tokio::test]
    async fn test_misses_on_different_ids_run_in_parallel() {
        let (store, cache) = setup();
        let mut ids = Vec::new();
        for trigger_id in 0..4 {
            ids.push(store.insert_history(&history(trigger_id, "item")).await.unwrap());
        }
        store.set_load_delay(Duration::from_millis(100)).await;
        let cache = Arc::new(cache);

        let started = Instant::now();
        let lookups = ids.iter().map(|id| {
            let cache = cache.clone();
            let id = *id;
            async move { cache.history_by_id(id).await }
        });
        for result in futures::future::join_all(lookups).await {
            assert!(result.unwrap().is_some());
        }

        // One read per id, overlapping rather than queued behind each other.
        assert_eq!(store.history_by_id_count(), 4);
        assert!(started.elapsed() < Duration::from_millis(300));
        assert_eq!(cache.len(), 4);
    }

    #[tokio::test]
    async fn test_store_failure_propagates() {
        let (store, cache) = setup();
        store.set_fail_on_read(true);
        assert!(cache.history_by_id(1).await.is_err());
        assert!(cache.latest_for_trigger(1).await.is_err());
    }
}
