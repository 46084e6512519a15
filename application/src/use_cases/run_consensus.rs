//! Run Consensus use case
//!
//! Fans one prompt out to every enabled backend config and scores the
//! responses. A failing or slow branch never cancels its siblings; its slot
//! holds an errored [`Response`] instead.

use crate::config::ExecutionParams;
use crate::ports::adapter_resolver::AdapterResolver;
use crate::ports::backend_adapter::BackendAdapter;
use crate::ports::health_history::{HealthHistory, NoHealthHistory};
use crate::ports::progress::{NoProgress, ProgressNotifier};
use crate::ports::storage::{NoResultStore, ResultRecord, ResultStore};
use crate::use_cases::shared::{call_adapter, with_defaults};
use std::sync::Arc;
use thiserror::Error;
use tokio::task::JoinSet;
use tracing::{error, info, warn};
use verdict_domain::{ConsensusResult, DomainError, Prompt, QueryConfig, Response};

/// Errors that fail a whole consensus request
#[derive(Error, Debug)]
pub enum RunConsensusError {
    /// Rejected before any adapter call
    #[error("Invalid request: {0}")]
    Invalid(DomainError),

    #[error("{0}")]
    Billing(DomainError),
}

impl From<DomainError> for RunConsensusError {
    fn from(error: DomainError) -> Self {
        if error.is_billing_violation() {
            RunConsensusError::Billing(error)
        } else {
            RunConsensusError::Invalid(error)
        }
    }
}

/// Input for the RunConsensus use case
#[derive(Debug, Clone)]
pub struct RunConsensusInput {
    pub prompt: String,
    pub configs: Vec<QueryConfig>,
    /// Billing tier; the execution default when absent
    pub tier: Option<String>,
}

impl RunConsensusInput {
    pub fn new(prompt: impl Into<String>, configs: Vec<QueryConfig>) -> Self {
        Self {
            prompt: prompt.into(),
            configs,
            tier: None,
        }
    }

    pub fn with_tier(mut self, tier: impl Into<String>) -> Self {
        self.tier = Some(tier.into());
        self
    }
}

/// Reject blank model or backend identifiers
pub(crate) fn validate_config(config: &QueryConfig) -> Result<(), DomainError> {
    if config.backend.as_str().trim().is_empty() {
        return Err(DomainError::InvalidIdentifier(format!(
            "empty backend id for model '{}'",
            config.model
        )));
    }
    if config.model.trim().is_empty() {
        return Err(DomainError::InvalidIdentifier(format!(
            "empty model id for backend '{}'",
            config.backend
        )));
    }
    Ok(())
}

/// Use case for running a fan-out consensus
pub struct RunConsensusUseCase<R: AdapterResolver + 'static> {
    resolver: Arc<R>,
    health: Arc<dyn HealthHistory>,
    results: Arc<dyn ResultStore>,
    params: ExecutionParams,
}

impl<R: AdapterResolver + 'static> RunConsensusUseCase<R> {
    pub fn new(resolver: Arc<R>) -> Self {
        Self {
            resolver,
            health: Arc::new(NoHealthHistory),
            results: Arc::new(NoResultStore),
            params: ExecutionParams::default(),
        }
    }

    pub fn with_health(mut self, health: Arc<dyn HealthHistory>) -> Self {
        self.health = health;
        self
    }

    pub fn with_results(mut self, results: Arc<dyn ResultStore>) -> Self {
        self.results = results;
        self
    }

    pub fn with_params(mut self, params: ExecutionParams) -> Self {
        self.params = params;
        self
    }

    /// Execute the use case with default (no-op) progress
    pub async fn execute(
        &self,
        input: RunConsensusInput,
    ) -> Result<ConsensusResult, RunConsensusError> {
        self.execute_with_progress(input, &NoProgress).await
    }

    /// Execute the use case with progress callbacks
    pub async fn execute_with_progress(
        &self,
        input: RunConsensusInput,
        progress: &dyn ProgressNotifier,
    ) -> Result<ConsensusResult, RunConsensusError> {
        let prompt = Prompt::new(input.prompt)?;
        let configs: Vec<QueryConfig> = input
            .configs
            .iter()
            .filter(|c| c.enabled)
            .map(|c| with_defaults(c, &self.params))
            .collect();
        if configs.is_empty() {
            return Err(DomainError::NoEnabledConfigs.into());
        }
        for config in &configs {
            validate_config(config)?;
        }

        let tier = self.params.tier_or_default(input.tier.as_deref()).to_string();
        info!("Starting consensus over {} configs (tier {})", configs.len(), tier);

        // Resolve every binding before any call is issued
        let mut bindings: Vec<Result<Arc<dyn BackendAdapter>, DomainError>> =
            Vec::with_capacity(configs.len());
        for config in &configs {
            match self.resolver.resolve(&tier, &config.backend).into_result() {
                Ok(adapter) => bindings.push(Ok(adapter)),
                Err(e) if e.is_billing_violation() || e.is_validation() => {
                    error!("Rejecting request for {}: {}", config.label(), e);
                    return Err(e.into());
                }
                Err(e) => bindings.push(Err(e)),
            }
        }

        let responses = self
            .fan_out(&prompt, &configs, bindings, &tier, progress)
            .await?;

        let result = ConsensusResult::from_responses(prompt.into_content(), responses);
        info!(
            "Consensus {} finished: {}/{} succeeded, agreement {:.2}",
            result.id,
            result.successful_responses().count(),
            result.responses.len(),
            result.consensus.agreement
        );

        match serde_json::to_value(&result) {
            Ok(payload) => self
                .results
                .save(ResultRecord::new("consensus_result", result.id.clone(), payload)),
            Err(e) => warn!("Failed to serialize consensus result: {}", e),
        }

        Ok(result)
    }

    /// One concurrent call per config; output is index-aligned with `configs`.
    async fn fan_out(
        &self,
        prompt: &Prompt,
        configs: &[QueryConfig],
        bindings: Vec<Result<Arc<dyn BackendAdapter>, DomainError>>,
        tier: &str,
        progress: &dyn ProgressNotifier,
    ) -> Result<Vec<Response>, RunConsensusError> {
        progress.on_fanout_start(configs.len());

        let mut slots: Vec<Option<Response>> = vec![None; configs.len()];
        let mut join_set = JoinSet::new();

        for (index, (config, binding)) in configs.iter().zip(bindings).enumerate() {
            let adapter = match binding {
                Ok(adapter) => adapter,
                Err(e) => {
                    warn!("No adapter for {}: {}", config.label(), e);
                    progress.on_backend_complete(&config.label(), false);
                    slots[index] = Some(Response::failure(config, e.to_string(), 0));
                    continue;
                }
            };

            let resolver = Arc::clone(&self.resolver);
            let health = Arc::clone(&self.health);
            let tier = tier.to_string();
            let prompt = prompt.content().to_string();
            let config = config.clone();
            let timeout = self.params.call_timeout;

            join_set.spawn(async move {
                if let Err(e) = resolver.assert_binding(&tier, adapter.as_ref()) {
                    return (index, Err(e));
                }
                let call =
                    call_adapter(adapter.as_ref(), None, &prompt, &config, timeout, health.as_ref())
                        .await;
                (index, Ok(call.into_response(&config)))
            });
        }

        let mut violation: Option<DomainError> = None;
        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok((index, Ok(response))) => {
                    if let Some(e) = &response.error {
                        warn!("{} failed: {}", configs[index].label(), e);
                    }
                    progress.on_backend_complete(&configs[index].label(), response.is_success());
                    slots[index] = Some(response);
                }
                Ok((index, Err(e))) => {
                    error!("Aborted call to {}: {}", configs[index].label(), e);
                    progress.on_backend_complete(&configs[index].label(), false);
                    violation.get_or_insert(e);
                }
                Err(e) => warn!("Task join error: {}", e),
            }
        }
        progress.on_fanout_complete();

        if let Some(e) = violation {
            return Err(RunConsensusError::Billing(e));
        }

        Ok(slots
            .into_iter()
            .zip(configs)
            .map(|(slot, config)| {
                slot.unwrap_or_else(|| {
                    Response::failure(config, "call task ended without a response", 0)
                })
            })
            .collect())
    }
}
