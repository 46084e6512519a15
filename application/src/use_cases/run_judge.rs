//! Run Judge use case
//!
//! Asks one judge model to compare the successful answers of a consensus
//! result. Unreadable judge output degrades to documented defaults; only
//! resolution and transport failures are errors.

use crate::config::ExecutionParams;
use crate::ports::adapter_resolver::AdapterResolver;
use crate::ports::backend_adapter::AdapterError;
use crate::ports::health_history::{HealthHistory, NoHealthHistory};
use crate::ports::progress::{NoProgress, ProgressNotifier};
use crate::use_cases::shared::{call_adapter, with_defaults};
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};
use verdict_domain::{
    ConsensusResult, DomainError, JudgeMode, JudgeVerdict, PersonaBinding, PromptTemplate,
    QueryConfig, QueryDomain, parse_concise, parse_detailed,
};

#[derive(Error, Debug)]
pub enum JudgeError {
    #[error("No successful responses to judge")]
    NoResponses,

    #[error("Judge unavailable: {0}")]
    Unavailable(DomainError),

    #[error("{0}")]
    Billing(DomainError),

    #[error("Judge call failed: {0}")]
    Adapter(AdapterError),
}

impl From<DomainError> for JudgeError {
    fn from(error: DomainError) -> Self {
        if error.is_billing_violation() {
            JudgeError::Billing(error)
        } else {
            JudgeError::Unavailable(error)
        }
    }
}

/// Input for the RunJudge use case
#[derive(Debug, Clone)]
pub struct RunJudgeInput {
    pub judge: PersonaBinding,
    pub mode: JudgeMode,
    pub tier: Option<String>,
}

impl RunJudgeInput {
    pub fn new(judge: PersonaBinding) -> Self {
        Self {
            judge,
            mode: JudgeMode::default(),
            tier: None,
        }
    }

    pub fn with_mode(mut self, mode: JudgeMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_tier(mut self, tier: Option<String>) -> Self {
        self.tier = tier;
        self
    }
}

/// Use case for judging a consensus result
pub struct RunJudgeUseCase<R: AdapterResolver + 'static> {
    resolver: Arc<R>,
    health: Arc<dyn HealthHistory>,
    params: ExecutionParams,
}

impl<R: AdapterResolver + 'static> RunJudgeUseCase<R> {
    pub fn new(resolver: Arc<R>) -> Self {
        Self {
            resolver,
            health: Arc::new(NoHealthHistory),
            params: ExecutionParams::default(),
        }
    }

    pub fn with_health(mut self, health: Arc<dyn HealthHistory>) -> Self {
        self.health = health;
        self
    }

    pub fn with_params(mut self, params: ExecutionParams) -> Self {
        self.params = params;
        self
    }

    pub async fn execute(
        &self,
        result: &ConsensusResult,
        input: RunJudgeInput,
    ) -> Result<JudgeVerdict, JudgeError> {
        self.execute_with_progress(result, input, &NoProgress).await
    }

    pub async fn execute_with_progress(
        &self,
        result: &ConsensusResult,
        input: RunJudgeInput,
        progress: &dyn ProgressNotifier,
    ) -> Result<JudgeVerdict, JudgeError> {
        let answers: Vec<(String, String)> = result
            .successful_responses()
            .map(|r| (format!("{}/{}", r.backend, r.model), r.text.clone()))
            .collect();
        if answers.is_empty() {
            return Err(JudgeError::NoResponses);
        }

        let domain = QueryDomain::classify(&result.prompt);
        let tier = self.params.tier_or_default(input.tier.as_deref());
        let adapter = self
            .resolver
            .resolve(tier, &input.judge.backend)
            .into_result()?;
        self.resolver.assert_binding(tier, adapter.as_ref())?;

        info!(
            "Judging {} answers with {} ({} mode, {} domain)",
            answers.len(),
            input.judge.label(),
            input.mode,
            domain
        );
        progress.on_judge_start(&input.judge.label());

        let prompt = PromptTemplate::judge_prompt(&result.prompt, domain, input.mode, &answers);
        let config = with_defaults(
            &QueryConfig::new(input.judge.backend.clone(), input.judge.model.clone()),
            &self.params,
        );
        let call = call_adapter(
            adapter.as_ref(),
            Some(PromptTemplate::judge_system()),
            &prompt,
            &config,
            self.params.call_timeout,
            self.health.as_ref(),
        )
        .await;

        let completion = match call.completion {
            Ok(completion) => completion,
            Err(e) => {
                progress.on_judge_complete(false);
                return Err(JudgeError::Adapter(e));
            }
        };

        let verdict = match input.mode {
            JudgeMode::Concise => parse_concise(&completion.text),
            JudgeMode::Detailed => parse_detailed(&completion.text),
        };
        if verdict.fallback {
            warn!("Judge output unreadable; using defaults");
        }
        progress.on_judge_complete(true);
        Ok(verdict.with_domain(domain))
    }
}
