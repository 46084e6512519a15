//! Storage ports: research cache store and result records.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use thiserror::Error;
use verdict_domain::{CacheEntry, CacheKey, InvalidateScope};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    #[error("Storage backend unavailable: {0}")]
    Unavailable(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Lookup failed: {0}")]
    Lookup(String),
}

/// Backing store for the research cache
///
/// Upserts replace the whole entry; concurrent writers to one key are
/// last-writer-wins.
#[async_trait]
pub trait ResearchStore: Send + Sync {
    async fn get(&self, key: &CacheKey) -> Result<Option<CacheEntry>, StoreError>;

    async fn upsert(&self, entry: CacheEntry) -> Result<(), StoreError>;

    /// Mark matching entries stale; returns how many were marked
    async fn mark_stale(
        &self,
        subject: &str,
        scope: InvalidateScope,
        reason: &str,
    ) -> Result<usize, StoreError>;

    /// Access bookkeeping for a hit
    async fn touch(&self, key: &CacheKey, at: DateTime<Utc>) -> Result<(), StoreError>;
}

/// A structured result record (consensus result, debate session).
pub struct ResultRecord {
    /// Record type (e.g. "consensus_result", "debate_session")
    pub record_type: &'static str,
    pub id: String,
    pub payload: Value,
}

impl ResultRecord {
    pub fn new(record_type: &'static str, id: impl Into<String>, payload: Value) -> Self {
        Self {
            record_type,
            id: id.into(),
            payload,
        }
    }
}

/// Optional external persistence for results.
///
/// `save` is synchronous and non-fallible; implementations log their own
/// failures so persistence never breaks a request.
pub trait ResultStore: Send + Sync {
    fn save(&self, record: ResultRecord);
}

/// No-op store used when persistence is disabled.
pub struct NoResultStore;

impl ResultStore for NoResultStore {
    fn save(&self, _record: ResultRecord) {}
}
