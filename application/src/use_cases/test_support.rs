//! Hand-written mocks shared by use case tests.

use crate::ports::adapter_resolver::{AdapterResolver, Resolution};
use crate::ports::backend_adapter::{AdapterError, BackendAdapter, Completion};
use crate::ports::health_history::HealthHistory;
use crate::ports::storage::{ResearchStore, ResultRecord, ResultStore, StoreError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use verdict_domain::{
    AdapterClass, BackendKind, CacheEntry, CacheKey, CallOutcome, DomainError, InvalidateScope,
    ModelHealth, QueryConfig, TierPolicy, TokenUsage,
};

pub enum Behavior {
    Reply(String),
    /// Replies in order; the last one repeats
    Sequence(Mutex<VecDeque<String>>),
    Fail(AdapterError),
    Slow(Duration, String),
}

pub struct MockAdapter {
    pub name: String,
    pub backend: BackendKind,
    pub class: AdapterClass,
    pub behavior: Behavior,
    pub prompts: Mutex<Vec<String>>,
}

impl MockAdapter {
    pub fn new(backend: BackendKind, class: AdapterClass, behavior: Behavior) -> Self {
        Self {
            name: format!("mock-{}", backend),
            backend,
            class,
            behavior,
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn reply(backend: BackendKind, text: &str) -> Self {
        Self::new(backend, AdapterClass::Metered, Behavior::Reply(text.to_string()))
    }

    pub fn sequence(backend: BackendKind, replies: &[&str]) -> Self {
        Self::new(
            backend,
            AdapterClass::Metered,
            Behavior::Sequence(Mutex::new(replies.iter().map(|s| s.to_string()).collect())),
        )
    }

    pub fn failing(backend: BackendKind, error: AdapterError) -> Self {
        Self::new(backend, AdapterClass::Metered, Behavior::Fail(error))
    }

    pub fn with_class(mut self, class: AdapterClass) -> Self {
        self.class = class;
        self
    }

    pub fn call_count(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }
}

#[async_trait]
impl BackendAdapter for MockAdapter {
    fn name(&self) -> &str {
        &self.name
    }

    fn backend(&self) -> &BackendKind {
        &self.backend
    }

    fn class(&self) -> AdapterClass {
        self.class
    }

    async fn complete(
        &self,
        _system: Option<&str>,
        prompt: &str,
        _config: &QueryConfig,
    ) -> Result<Completion, AdapterError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        let text = match &self.behavior {
            Behavior::Reply(text) => text.clone(),
            Behavior::Sequence(queue) => {
                let mut queue = queue.lock().unwrap();
                if queue.len() > 1 {
                    queue.pop_front().unwrap()
                } else {
                    queue.front().cloned().unwrap_or_default()
                }
            }
            Behavior::Fail(error) => return Err(error.clone()),
            Behavior::Slow(delay, text) => {
                tokio::time::sleep(*delay).await;
                text.clone()
            }
        };
        Ok(Completion::new(text).with_tokens(TokenUsage::new(10, 5)))
    }
}

/// Resolver over a fixed adapter map, checked against the built-in tiers
pub struct MockResolver {
    pub adapters: HashMap<BackendKind, Arc<MockAdapter>>,
    pub policy: TierPolicy,
    /// Force the pre-call recheck to fail
    pub reject_at_call: bool,
}

impl MockResolver {
    pub fn new(adapters: Vec<Arc<MockAdapter>>) -> Self {
        Self {
            adapters: adapters
                .into_iter()
                .map(|a| (a.backend.clone(), a))
                .collect(),
            policy: TierPolicy::default(),
            reject_at_call: false,
        }
    }
}

impl AdapterResolver for MockResolver {
    fn resolve(&self, tier: &str, backend: &BackendKind) -> Resolution {
        let tier = match self.policy.get(tier) {
            Ok(tier) => tier,
            Err(e) => return Resolution::rejected(e),
        };
        match self.adapters.get(backend) {
            Some(adapter) => match tier.check(adapter.class) {
                Ok(()) => Resolution::found(adapter.clone() as Arc<dyn BackendAdapter>),
                Err(e) => Resolution::rejected(e),
            },
            None => Resolution::rejected(DomainError::NoAdapter(backend.to_string())),
        }
    }

    fn assert_binding(&self, tier: &str, adapter: &dyn BackendAdapter) -> Result<(), DomainError> {
        if self.reject_at_call {
            return Err(DomainError::BillingInvariantViolation(format!(
                "{} changed class before the call",
                adapter.name()
            )));
        }
        self.policy.get(tier)?.check(adapter.class())
    }
}

#[derive(Default)]
pub struct RecordingHealth {
    pub outcomes: Mutex<Vec<(String, bool)>>,
}

impl HealthHistory for RecordingHealth {
    fn record(&self, _backend: &BackendKind, model: &str, outcome: CallOutcome) {
        self.outcomes
            .lock()
            .unwrap()
            .push((model.to_string(), outcome.success));
    }

    fn snapshot(&self) -> Vec<ModelHealth> {
        Vec::new()
    }
}

#[derive(Default)]
pub struct RecordingStore {
    pub records: Mutex<Vec<(&'static str, String)>>,
}

impl ResultStore for RecordingStore {
    fn save(&self, record: ResultRecord) {
        self.records
            .lock()
            .unwrap()
            .push((record.record_type, record.id));
    }
}

/// Research store over a plain map; `broken` fails every operation
#[derive(Default)]
pub struct MapStore {
    pub entries: Mutex<HashMap<CacheKey, CacheEntry>>,
    pub broken: bool,
}

impl MapStore {
    pub fn broken() -> Self {
        Self {
            broken: true,
            ..Default::default()
        }
    }

    fn check(&self) -> Result<(), StoreError> {
        if self.broken {
            Err(StoreError::Unavailable("connection refused".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl ResearchStore for MapStore {
    async fn get(&self, key: &CacheKey) -> Result<Option<CacheEntry>, StoreError> {
        self.check()?;
        Ok(self.entries.lock().unwrap().get(key).cloned())
    }

    async fn upsert(&self, entry: CacheEntry) -> Result<(), StoreError> {
        self.check()?;
        self.entries.lock().unwrap().insert(entry.key.clone(), entry);
        Ok(())
    }

    async fn mark_stale(
        &self,
        subject: &str,
        scope: InvalidateScope,
        reason: &str,
    ) -> Result<usize, StoreError> {
        self.check()?;
        let mut entries = self.entries.lock().unwrap();
        let mut count = 0;
        for entry in entries.values_mut() {
            if entry.key.subject == subject && scope.matches(entry.key.timeframe) {
                entry.mark_stale(reason);
                count += 1;
            }
        }
        Ok(count)
    }

    async fn touch(&self, key: &CacheKey, at: DateTime<Utc>) -> Result<(), StoreError> {
        self.check()?;
        if let Some(entry) = self.entries.lock().unwrap().get_mut(key) {
            entry.touch(at);
        }
        Ok(())
    }
}
