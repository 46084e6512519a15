//! External research lookup port

use super::storage::StoreError;
use async_trait::async_trait;
use serde_json::Value;
use verdict_domain::TimeframeClass;

/// Source of research notes for a subject (news, fundamentals, sentiment)
#[async_trait]
pub trait ResearchSource: Send + Sync {
    async fn fetch(&self, subject: &str, timeframe: TimeframeClass) -> Result<Value, StoreError>;
}

/// Source that never has anything
pub struct NoResearchSource;

#[async_trait]
impl ResearchSource for NoResearchSource {
    async fn fetch(&self, subject: &str, _timeframe: TimeframeClass) -> Result<Value, StoreError> {
        Err(StoreError::Lookup(format!("no research source configured for {}", subject)))
    }
}
