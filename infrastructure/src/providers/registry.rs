//! Adapter registry and tier gate
//!
//! Holds every registered adapter instance keyed by backend kind. A backend
//! may be served by several instances with different billing classes (a
//! subscription CLI and a metered API key, say); the caller's tier decides
//! which one is used.

use super::anthropic::AnthropicAdapter;
use super::cli::CliAdapter;
use super::http::api_key_from_env;
use super::openai::OpenAiCompatibleAdapter;
use crate::config::{BackendProtocol, ConfigError, FileBackendConfig, FileConfig};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};
use verdict_application::{AdapterResolver, BackendAdapter, Resolution};
use verdict_domain::{BackendKind, DomainError, TierPolicy};

pub struct AdapterRegistry {
    entries: HashMap<BackendKind, Vec<Arc<dyn BackendAdapter>>>,
    policy: TierPolicy,
}

impl AdapterRegistry {
    pub fn new(policy: TierPolicy) -> Self {
        Self {
            entries: HashMap::new(),
            policy,
        }
    }

    /// Build adapters for every enabled `[backends.*]` table.
    ///
    /// HTTP backends whose API key is missing and CLI backends whose program
    /// is not installed are skipped with a warning.
    pub fn from_config(config: &FileConfig) -> Result<Self, ConfigError> {
        let mut registry = Self::new(config.tier_policy()?);
        for (name, backend) in &config.backends {
            if !backend.enabled {
                debug!(backend = %name, "Backend disabled");
                continue;
            }
            match build_adapter(name, backend)? {
                Some(adapter) => registry.register(adapter),
                None => warn!(backend = %name, "Backend unavailable, not registered"),
            }
        }
        info!(
            adapters = registry.len(),
            backends = registry.entries.len(),
            "Adapter registry ready"
        );
        Ok(registry)
    }

    pub fn register(&mut self, adapter: Arc<dyn BackendAdapter>) {
        debug!(
            adapter = adapter.name(),
            backend = %adapter.backend(),
            class = %adapter.class(),
            "Registering adapter"
        );
        self.entries
            .entry(adapter.backend().clone())
            .or_default()
            .push(adapter);
    }

    pub fn with_adapter(mut self, adapter: Arc<dyn BackendAdapter>) -> Self {
        self.register(adapter);
        self
    }

    pub fn policy(&self) -> &TierPolicy {
        &self.policy
    }

    pub fn len(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Every registered adapter, sorted by backend then name
    pub fn adapters(&self) -> Vec<Arc<dyn BackendAdapter>> {
        let mut all: Vec<_> = self.entries.values().flatten().cloned().collect();
        all.sort_by(|a, b| {
            a.backend()
                .cmp(b.backend())
                .then_with(|| a.name().cmp(b.name()))
        });
        all
    }
}

fn build_adapter(
    name: &str,
    backend: &FileBackendConfig,
) -> Result<Option<Arc<dyn BackendAdapter>>, ConfigError> {
    let kind = backend.backend_kind(name);
    let class = backend.class(&kind);
    let invalid = |reason: &str| ConfigError::Backend {
        name: name.to_string(),
        reason: reason.to_string(),
    };

    match backend.protocol(&kind) {
        BackendProtocol::Cli => {
            let (program, args) = backend
                .command(&kind)
                .ok_or_else(|| invalid("CLI backends need a command"))?;
            let model_flag = backend.model_flag(&kind);
            Ok(CliAdapter::try_new(name, kind, class, program, args).map(|adapter| {
                let adapter = match model_flag {
                    Some(flag) => adapter.with_model_flag(flag),
                    None => adapter,
                };
                Arc::new(adapter) as Arc<dyn BackendAdapter>
            }))
        }
        BackendProtocol::Anthropic => {
            let base_url = backend
                .base_url(&kind)
                .ok_or_else(|| invalid("no base_url"))?;
            let Some(key) = backend.api_key_env(&kind).and_then(|env| api_key_from_env(&env))
            else {
                return Ok(None);
            };
            Ok(Some(Arc::new(AnthropicAdapter::new(name, class, base_url, key))))
        }
        BackendProtocol::OpenAi => {
            let base_url = backend
                .base_url(&kind)
                .ok_or_else(|| invalid("no base_url"))?;
            let mut adapter = OpenAiCompatibleAdapter::new(name, kind.clone(), class, base_url);
            // Backends without a key variable are keyless (local models)
            if let Some(env) = backend.api_key_env(&kind) {
                match api_key_from_env(&env) {
                    Some(key) => adapter = adapter.with_api_key(key),
                    None => return Ok(None),
                }
            }
            Ok(Some(Arc::new(adapter)))
        }
    }
}

impl AdapterResolver for AdapterRegistry {
    fn resolve(&self, tier: &str, backend: &BackendKind) -> Resolution {
        let tier = match self.policy.get(tier) {
            Ok(tier) => tier,
            Err(e) => return Resolution::rejected(e),
        };
        let Some(candidates) = self.entries.get(backend).filter(|c| !c.is_empty()) else {
            return Resolution::rejected(DomainError::NoAdapter(backend.to_string()));
        };

        // First allowed class wins; within a class, registration order
        for class in &tier.allowed {
            if let Some(adapter) = candidates.iter().find(|a| a.class() == *class) {
                return Resolution::found(adapter.clone());
            }
        }

        match tier.check(candidates[0].class()) {
            Err(e) => Resolution::rejected(e),
            Ok(()) => Resolution::rejected(DomainError::NoAdapter(backend.to_string())),
        }
    }

    fn assert_binding(&self, tier: &str, adapter: &dyn BackendAdapter) -> Result<(), DomainError> {
        self.policy.get(tier)?.check(adapter.class())
    }
}
