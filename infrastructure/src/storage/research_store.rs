//! In-memory research cache store
//!
//! Whole-entry upserts under a write lock; concurrent writers to one key
//! resolve last-writer-wins. Every upsert first evicts stale and expired
//! entries, so the map holds at most the live working set.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;
use verdict_application::{ResearchStore, StoreError};
use verdict_domain::{CacheEntry, CacheKey, InvalidateScope};

#[derive(Default)]
pub struct InMemoryResearchStore {
    entries: RwLock<HashMap<CacheKey, CacheEntry>>,
}

impl InMemoryResearchStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

}

fn evict(entries: &mut HashMap<CacheKey, CacheEntry>, now: DateTime<Utc>) -> usize {
    let before = entries.len();
    entries.retain(|_, entry| entry.is_fresh(now));
    let removed = before - entries.len();
    if removed > 0 {
        debug!(removed, "Evicted research cache entries");
    }
    removed
}

#[async_trait]
impl ResearchStore for InMemoryResearchStore {
    async fn get(&self, key: &CacheKey) -> Result<Option<CacheEntry>, StoreError> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn upsert(&self, entry: CacheEntry) -> Result<(), StoreError> {
        let mut entries = self.entries.write().await;
        evict(&mut entries, Utc::now());
        entries.insert(entry.key.clone(), entry);
        Ok(())
    }

    async fn mark_stale(
        &self,
        subject: &str,
        scope: InvalidateScope,
        reason: &str,
    ) -> Result<usize, StoreError> {
        let mut entries = self.entries.write().await;
        let mut count = 0;
        for entry in entries.values_mut() {
            if entry.key.subject == subject && scope.matches(entry.key.timeframe) && !entry.stale {
                entry.mark_stale(reason);
                count += 1;
            }
        }
        Ok(count)
    }

    async fn touch(&self, key: &CacheKey, at: DateTime<Utc>) -> Result<(), StoreError> {
        if let Some(entry) = self.entries.write().await.get_mut(key) {
            entry.touch(at);
        }
        Ok(())
    }
}
