//! Research cache
//!
//! TTL cache for research lookups keyed by subject and timeframe class.
//! Storage failures never reach callers: reads degrade to misses, writes
//! and invalidations to no-ops, each with a warning. Hit bookkeeping runs
//! in the background; its failures are logged as warnings and never
//! affect the returned payload.

use crate::ports::research_source::{NoResearchSource, ResearchSource};
use crate::ports::storage::ResearchStore;
use chrono::Utc;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, warn};
use verdict_domain::{CacheEntry, CacheKey, InvalidateScope, TimeframeClass};

#[derive(Clone)]
pub struct ResearchCache {
    store: Arc<dyn ResearchStore>,
    source: Arc<dyn ResearchSource>,
}

impl ResearchCache {
    pub fn new(store: Arc<dyn ResearchStore>) -> Self {
        Self {
            store,
            source: Arc::new(NoResearchSource),
        }
    }

    pub fn with_source(mut self, source: Arc<dyn ResearchSource>) -> Self {
        self.source = source;
        self
    }

    /// Fresh payload for `subject`, if any
    pub async fn get(&self, subject: &str, timeframe: TimeframeClass) -> Option<Value> {
        let key = CacheKey::new(subject, timeframe);
        let entry = match self.store.get(&key).await {
            Ok(Some(entry)) => entry,
            Ok(None) => {
                debug!("Research cache miss: {}", key);
                return None;
            }
            Err(e) => {
                warn!("Research cache read failed for {}: {}", key, e);
                return None;
            }
        };

        let now = Utc::now();
        if !entry.is_fresh(now) {
            debug!("Research cache entry {} is stale or expired", key);
            return None;
        }

        let store = self.store.clone();
        tokio::spawn(async move {
            if let Err(e) = store.touch(&key, now).await {
                warn!("Research cache touch failed for {}: {}", key, e);
            }
        });
        Some(entry.payload)
    }

    /// Store `payload`; returns whether the write landed
    pub async fn set(&self, subject: &str, timeframe: TimeframeClass, payload: Value) -> bool {
        let key = CacheKey::new(subject, timeframe);
        let entry = CacheEntry::new(key.clone(), payload, Utc::now());
        match self.store.upsert(entry).await {
            Ok(()) => true,
            Err(e) => {
                warn!("Research cache write failed for {}: {}", key, e);
                false
            }
        }
    }

    /// Mark a subject's entries stale; returns how many were marked
    pub async fn invalidate(&self, subject: &str, scope: InvalidateScope, reason: &str) -> usize {
        let subject = subject.trim().to_uppercase();
        match self.store.mark_stale(&subject, scope, reason).await {
            Ok(count) => {
                info!("Invalidated {} research entries for {} ({})", count, subject, reason);
                count
            }
            Err(e) => {
                warn!("Research cache invalidation failed for {}: {}", subject, e);
                0
            }
        }
    }

    /// Cached payload, or a fresh lookup from the research source
    pub async fn fetch_through(&self, subject: &str, timeframe: TimeframeClass) -> Option<Value> {
        if let Some(payload) = self.get(subject, timeframe).await {
            return Some(payload);
        }
        match self.source.fetch(subject, timeframe).await {
            Ok(payload) => {
                self.set(subject, timeframe, payload.clone()).await;
                Some(payload)
            }
            Err(e) => {
                warn!("Research lookup failed for {}: {}", subject, e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::storage::StoreError;
    use crate::use_cases::test_support::MapStore;
    use async_trait::async_trait;
    use chrono::Duration;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingSource {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl ResearchSource for CountingSource {
        async fn fetch(&self, subject: &str, _timeframe: TimeframeClass) -> Result<Value, StoreError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(json!({"subject": subject, "headlines": ["Beat estimates"]}))
        }
    }

    #[tokio::test]
    async fn test_set_then_get_case_insensitive() {
        let cache = ResearchCache::new(Arc::new(MapStore::default()));
        assert!(cache.set("aapl", TimeframeClass::Short, json!({"pe": 30})).await);
        assert_eq!(
            cache.get("AAPL", TimeframeClass::Short).await,
            Some(json!({"pe": 30}))
        );
        assert_eq!(cache.get("AAPL", TimeframeClass::Long).await, None);
    }

    #[tokio::test]
    async fn test_expired_entry_is_miss() {
        let store = Arc::new(MapStore::default());
        let key = CacheKey::new("AAPL", TimeframeClass::Short);
        let old = Utc::now() - Duration::minutes(16);
        store
            .upsert(CacheEntry::new(key, json!({}), old))
            .await
            .unwrap();

        let cache = ResearchCache::new(store);
        assert_eq!(cache.get("AAPL", TimeframeClass::Short).await, None);
    }

    #[tokio::test]
    async fn test_invalidate_scopes() {
        let cache = ResearchCache::new(Arc::new(MapStore::default()));
        for timeframe in TimeframeClass::ALL {
            cache.set("NVDA", timeframe, json!({})).await;
        }

        let marked = cache
            .invalidate("nvda", InvalidateScope::Timeframe(TimeframeClass::Short), "news")
            .await;
        assert_eq!(marked, 1);
        assert_eq!(cache.get("NVDA", TimeframeClass::Short).await, None);
        assert!(cache.get("NVDA", TimeframeClass::Medium).await.is_some());

        assert_eq!(cache.invalidate("NVDA", InvalidateScope::All, "earnings").await, 4);
        assert_eq!(cache.get("NVDA", TimeframeClass::VeryLong).await, None);
    }

    #[tokio::test]
    async fn test_store_failures_are_swallowed() {
        let cache = ResearchCache::new(Arc::new(MapStore::broken()));
        assert_eq!(cache.get("AAPL", TimeframeClass::Short).await, None);
        assert!(!cache.set("AAPL", TimeframeClass::Short, json!({})).await);
        assert_eq!(cache.invalidate("AAPL", InvalidateScope::All, "x").await, 0);
    }

    /// Reads and writes work; hit bookkeeping always fails
    struct NoTouchStore(MapStore);

    #[async_trait]
    impl ResearchStore for NoTouchStore {
        async fn get(&self, key: &CacheKey) -> Result<Option<CacheEntry>, StoreError> {
            self.0.get(key).await
        }

        async fn upsert(&self, entry: CacheEntry) -> Result<(), StoreError> {
            self.0.upsert(entry).await
        }

        async fn mark_stale(
            &self,
            subject: &str,
            scope: InvalidateScope,
            reason: &str,
        ) -> Result<usize, StoreError> {
            self.0.mark_stale(subject, scope, reason).await
        }

        async fn touch(&self, _key: &CacheKey, _at: chrono::DateTime<Utc>) -> Result<(), StoreError> {
            Err(StoreError::Unavailable("read-only replica".to_string()))
        }
    }

    #[tokio::test]
    async fn test_touch_failure_keeps_hit() {
        let cache = ResearchCache::new(Arc::new(NoTouchStore(MapStore::default())));
        cache.set("AMD", TimeframeClass::Long, json!({"pe": 40})).await;
        assert_eq!(
            cache.get("amd", TimeframeClass::Long).await,
            Some(json!({"pe": 40}))
        );
        tokio::task::yield_now().await;
        assert_eq!(
            cache.get("AMD", TimeframeClass::Long).await,
            Some(json!({"pe": 40}))
        );
    }

    #[tokio::test]
    async fn test_fetch_through_populates_cache() {
        let source = Arc::new(CountingSource {
            calls: AtomicUsize::new(0),
        });
        let cache = ResearchCache::new(Arc::new(MapStore::default())).with_source(source.clone());

        let first = cache.fetch_through("tsla", TimeframeClass::Medium).await;
        let second = cache.fetch_through("TSLA", TimeframeClass::Medium).await;
        assert!(first.is_some());
        assert_eq!(first, second);
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_no_source_is_none() {
        let cache = ResearchCache::new(Arc::new(MapStore::default()));
        assert_eq!(cache.fetch_through("AAPL", TimeframeClass::Short).await, None);
    }
}
