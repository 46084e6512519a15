//! Run Debate use case
//!
//! Drives analyst, critic and synthesizer through the configured rounds as
//! an explicit state machine. Each stage calls its bound backend and parses
//! a [`Decision`]; any stage failure aborts the whole debate and nothing
//! partial is returned or persisted.

use crate::config::ExecutionParams;
use crate::ports::adapter_resolver::AdapterResolver;
use crate::ports::backend_adapter::{AdapterError, BackendAdapter};
use crate::ports::health_history::{HealthHistory, NoHealthHistory};
use crate::ports::progress::{NoProgress, ProgressNotifier};
use crate::ports::storage::{NoResultStore, ResultRecord, ResultStore};
use crate::use_cases::research_cache::ResearchCache;
use crate::use_cases::run_judge::JudgeError;
use crate::use_cases::run_trading_judge::TradingJudgeUseCase;
use crate::use_cases::shared::{call_adapter, with_defaults};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info, warn};
use verdict_domain::{
    DebateBindings, DebateSession, DebateStage, DebateState, DebateTurn, DecisionError,
    DomainError, ModelWeights, Persona, PersonaBinding, PromptTemplate, QueryConfig,
    ScreeningMetrics, ScreeningVerdict, SessionError, TimeframeClass, TradingVerdict,
    estimate_cost, parse_decision,
};

/// Debate failures; stage-level variants name the stage that failed
#[derive(Error, Debug)]
pub enum RunDebateError {
    #[error("Invalid debate request: {0}")]
    Invalid(DomainError),

    #[error("{0}")]
    Billing(DomainError),

    #[error("Stage {stage} unavailable: {error}")]
    Unavailable {
        stage: DebateStage,
        error: DomainError,
    },

    #[error("Stage {stage} call failed: {error}")]
    Adapter {
        stage: DebateStage,
        error: AdapterError,
    },

    #[error("Stage {stage} produced no usable decision: {error}")]
    Parse {
        stage: DebateStage,
        error: DecisionError,
    },

    #[error("Debate session error: {0}")]
    Session(#[from] SessionError),

    #[error("Verdict failed: {0}")]
    Verdict(#[from] JudgeError),
}

impl RunDebateError {
    /// Stage that failed, when the failure belongs to one
    pub fn stage(&self) -> Option<DebateStage> {
        match self {
            RunDebateError::Unavailable { stage, .. }
            | RunDebateError::Adapter { stage, .. }
            | RunDebateError::Parse { stage, .. } => Some(*stage),
            _ => None,
        }
    }

    fn resolution(stage: DebateStage, error: DomainError) -> Self {
        if error.is_billing_violation() {
            RunDebateError::Billing(error)
        } else {
            RunDebateError::Unavailable { stage, error }
        }
    }
}

/// Input for the RunDebate use case
#[derive(Debug, Clone)]
pub struct RunDebateInput {
    pub question: String,
    pub bindings: DebateBindings,
    /// Research subject (ticker, topic); enables the research lookup
    pub subject: Option<String>,
    pub timeframe: TimeframeClass,
    /// Overrides the configured round count
    pub rounds: Option<u32>,
    /// Judge that rules on the finished transcript
    pub judge: Option<PersonaBinding>,
    /// Screening candidate; the judge then rules BUY/WATCH/SKIP
    pub screening: Option<ScreeningMetrics>,
    pub tier: Option<String>,
}

impl RunDebateInput {
    pub fn new(question: impl Into<String>, bindings: DebateBindings) -> Self {
        Self {
            question: question.into(),
            bindings,
            subject: None,
            timeframe: TimeframeClass::Medium,
            rounds: None,
            judge: None,
            screening: None,
            tier: None,
        }
    }

    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    pub fn with_timeframe(mut self, timeframe: TimeframeClass) -> Self {
        self.timeframe = timeframe;
        self
    }

    pub fn with_rounds(mut self, rounds: u32) -> Self {
        self.rounds = Some(rounds);
        self
    }

    pub fn with_judge(mut self, judge: PersonaBinding) -> Self {
        self.judge = Some(judge);
        self
    }

    pub fn with_screening(mut self, candidate: ScreeningMetrics) -> Self {
        self.screening = Some(candidate);
        self
    }

    pub fn with_tier(mut self, tier: Option<String>) -> Self {
        self.tier = tier;
        self
    }
}

/// Sealed session plus the optional judge verdict
#[derive(Debug, Clone, Serialize)]
pub struct RunDebateOutput {
    pub session: DebateSession,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verdict: Option<TradingVerdict>,
    /// Set instead of `verdict` when the debate screened a candidate
    #[serde(skip_serializing_if = "Option::is_none")]
    pub screening: Option<ScreeningVerdict>,
}

/// Use case for running a multi-persona debate
pub struct RunDebateUseCase<R: AdapterResolver + 'static> {
    resolver: Arc<R>,
    health: Arc<dyn HealthHistory>,
    results: Arc<dyn ResultStore>,
    research: Option<ResearchCache>,
    weights: ModelWeights,
    params: ExecutionParams,
}

impl<R: AdapterResolver + 'static> RunDebateUseCase<R> {
    pub fn new(resolver: Arc<R>) -> Self {
        Self {
            resolver,
            health: Arc::new(NoHealthHistory),
            results: Arc::new(NoResultStore),
            research: None,
            weights: ModelWeights::default(),
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

    pub fn with_research(mut self, research: ResearchCache) -> Self {
        self.research = Some(research);
        self
    }

    pub fn with_weights(mut self, weights: ModelWeights) -> Self {
        self.weights = weights;
        self
    }

    pub fn with_params(mut self, params: ExecutionParams) -> Self {
        self.params = params;
        self
    }

    pub async fn execute(&self, input: RunDebateInput) -> Result<RunDebateOutput, RunDebateError> {
        self.execute_with_progress(input, &NoProgress).await
    }

    pub async fn execute_with_progress(
        &self,
        input: RunDebateInput,
        progress: &dyn ProgressNotifier,
    ) -> Result<RunDebateOutput, RunDebateError> {
        if input.question.trim().is_empty() {
            return Err(RunDebateError::Invalid(DomainError::MissingPrompt));
        }
        input.bindings.validate().map_err(RunDebateError::Invalid)?;
        let rounds = input.rounds.unwrap_or(self.params.debate_rounds);
        if rounds == 0 {
            return Err(RunDebateError::Invalid(DomainError::InvalidIdentifier(
                "debate needs at least one round".to_string(),
            )));
        }

        let tier = self.params.tier_or_default(input.tier.as_deref()).to_string();
        let adapters = self.resolve_personas(&tier, &input.bindings)?;

        let mut session = DebateSession::new(input.question.clone(), rounds, input.bindings.clone());
        if let Some(subject) = &input.subject {
            session = session.with_subject(subject.trim().to_uppercase());
        }
        let research = self.research_notes(&input).await;

        info!(
            "Starting debate {} ({} rounds, tier {})",
            session.id, rounds, tier
        );

        while let DebateState::Stage(stage) = session.state() {
            let adapter = &adapters[&stage.persona];
            let (turn, cost) = self
                .run_stage(&session, stage, adapter.as_ref(), &tier, research.as_deref(), progress)
                .await?;
            session.record(turn, cost)?;
        }

        let summary = session.seal()?.decision.summary_line();
        info!("Debate {} finished: {}", session.id, summary);

        let mut output = RunDebateOutput {
            session,
            verdict: None,
            screening: None,
        };
        if let Some(judge) = &input.judge {
            let judge_uc = self.judge();
            let (transcript, models) = transcript_and_models(&output.session);
            match &input.screening {
                Some(candidate) => {
                    let verdict = judge_uc
                        .screening_verdict(candidate, &transcript, &models, judge, Some(&tier))
                        .await?;
                    output.screening = Some(verdict);
                }
                None => {
                    let verdict = judge_uc
                        .trading_verdict(&transcript, &models, judge, Some(&tier))
                        .await?;
                    output.verdict = Some(verdict);
                }
            }
        }

        match serde_json::to_value(&output) {
            Ok(payload) => self.results.save(ResultRecord::new(
                "debate_session",
                output.session.id.clone(),
                payload,
            )),
            Err(e) => warn!("Failed to serialize debate session: {}", e),
        }
        Ok(output)
    }

    /// Resolve every persona before the first call
    fn resolve_personas(
        &self,
        tier: &str,
        bindings: &DebateBindings,
    ) -> Result<HashMap<Persona, Arc<dyn BackendAdapter>>, RunDebateError> {
        let mut adapters = HashMap::new();
        for persona in Persona::ORDER {
            let binding = bindings.get(persona);
            let adapter = self
                .resolver
                .resolve(tier, &binding.backend)
                .into_result()
                .map_err(|e| {
                    error!("Cannot bind {} to {}: {}", persona, binding.label(), e);
                    RunDebateError::resolution(DebateStage::new(1, persona), e)
                })?;
            adapters.insert(persona, adapter);
        }
        Ok(adapters)
    }

    async fn research_notes(&self, input: &RunDebateInput) -> Option<String> {
        let cache = self.research.as_ref()?;
        let subject = input.subject.as_deref()?;
        let payload = cache.fetch_through(subject, input.timeframe).await?;
        Some(payload.to_string())
    }

    async fn run_stage(
        &self,
        session: &DebateSession,
        stage: DebateStage,
        adapter: &dyn BackendAdapter,
        tier: &str,
        research: Option<&str>,
        progress: &dyn ProgressNotifier,
    ) -> Result<(DebateTurn, f64), RunDebateError> {
        let binding = session.bindings.get(stage.persona);
        let previous: Vec<&DebateTurn> = if stage.is_refinement() {
            session.round(stage.round - 1).collect()
        } else {
            Vec::new()
        };
        let current: Vec<&DebateTurn> = session.round(stage.round).collect();
        let prompt =
            PromptTemplate::debate_stage(stage, &session.question, research, &previous, &current);
        let system = PromptTemplate::debate_system(stage.persona);

        self.resolver
            .assert_binding(tier, adapter)
            .map_err(|e| RunDebateError::resolution(stage, e))?;

        progress.on_stage_start(&stage, &binding.model);
        let config = with_defaults(
            &QueryConfig::new(binding.backend.clone(), binding.model.clone()),
            &self.params,
        );
        let call = call_adapter(
            adapter,
            Some(system.as_str()),
            &prompt,
            &config,
            self.params.call_timeout,
            self.health.as_ref(),
        )
        .await;

        let completion = call.completion.map_err(|error| {
            error!("Debate stage {} failed: {}", stage, error);
            progress.on_stage_complete(&stage, false);
            RunDebateError::Adapter { stage, error }
        })?;

        let (mut decision, strategy) = parse_decision(&completion.text).map_err(|error| {
            error!("Debate stage {} returned no decision: {}", stage, error);
            progress.on_stage_complete(&stage, false);
            RunDebateError::Parse { stage, error }
        })?;
        if decision.symbol.is_none()
            && let Some(subject) = &session.subject
        {
            decision = decision.with_symbol(subject.clone());
        }
        progress.on_stage_complete(&stage, true);
        info!(
            "{} ({}): {} [{}]",
            stage,
            binding.label(),
            decision.action,
            strategy
        );

        let cost = estimate_cost(&binding.backend, adapter.class(), completion.tokens);
        let turn = DebateTurn {
            round: stage.round,
            persona: stage.persona,
            backend: binding.backend.to_string(),
            model: binding.model.clone(),
            decision,
            tokens: completion.tokens,
            elapsed_ms: call.elapsed_ms,
        };
        Ok((turn, cost))
    }

    fn judge(&self) -> TradingJudgeUseCase<R> {
        TradingJudgeUseCase::new(Arc::clone(&self.resolver))
            .with_health(Arc::clone(&self.health))
            .with_weights(self.weights.clone())
            .with_params(self.params.clone())
    }
}

/// Transcript lines and the distinct models that spoke, in order
fn transcript_and_models(session: &DebateSession) -> (String, Vec<String>) {
    let transcript = session
        .turns()
        .iter()
        .map(DebateTurn::transcript_line)
        .collect::<Vec<_>>()
        .join("\n");
    let mut models: Vec<String> = Vec::new();
    for turn in session.turns() {
        if !models.contains(&turn.model) {
            models.push(turn.model.clone());
        }
    }
    (transcript, models)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::research_source::ResearchSource;
    use crate::ports::storage::StoreError;
    use crate::use_cases::test_support::{MapStore, MockAdapter, MockResolver, RecordingStore};
    use async_trait::async_trait;
    use serde_json::{Value, json};
    use verdict_domain::{BackendKind, DebateStatus, ScreeningAction, TradeAction};

    const BUY: &str = r#"{"action": "BUY", "symbol": "NVDA", "reasoning": "Momentum is strong", "confidence": 0.8}"#;
    const HOLD: &str = r#"Here is my view: {"action": "HOLD", "reasoning": "Valuation stretched", "confidence": 0.6}"#;
    const SELL: &str = r#"```json
{"action": "SELL", "symbol": "NVDA", "reasoning": "Risk outweighs upside", "confidence": 0.7}
```"#;

    struct Panel {
        analyst: Arc<MockAdapter>,
        critic: Arc<MockAdapter>,
        synthesizer: Arc<MockAdapter>,
    }

    impl Panel {
        fn new(analyst: MockAdapter, critic: MockAdapter, synthesizer: MockAdapter) -> Self {
            Self {
                analyst: Arc::new(analyst),
                critic: Arc::new(critic),
                synthesizer: Arc::new(synthesizer),
            }
        }

        fn resolver(&self) -> Arc<MockResolver> {
            Arc::new(MockResolver::new(vec![
                self.analyst.clone(),
                self.critic.clone(),
                self.synthesizer.clone(),
            ]))
        }
    }

    fn bindings() -> DebateBindings {
        DebateBindings {
            analyst: PersonaBinding::new(BackendKind::OpenAi, "gpt-4o"),
            critic: PersonaBinding::new(BackendKind::Google, "gemini-2.5-pro"),
            synthesizer: PersonaBinding::new(BackendKind::Anthropic, "claude-opus-4"),
        }
    }

    fn default_panel() -> Panel {
        Panel::new(
            MockAdapter::reply(BackendKind::OpenAi, BUY),
            MockAdapter::reply(BackendKind::Google, HOLD),
            MockAdapter::sequence(BackendKind::Anthropic, &[BUY, SELL]),
        )
    }

    #[tokio::test]
    async fn test_final_decision_is_round_two_synthesizer() {
        let panel = default_panel();
        let store = Arc::new(RecordingStore::default());
        let uc = RunDebateUseCase::new(panel.resolver()).with_results(store.clone());

        let output = uc
            .execute(RunDebateInput::new("Should I buy NVDA?", bindings()))
            .await
            .unwrap();
        let session = output.session;

        assert_eq!(session.turns().len(), 6);
        assert_eq!(session.status, DebateStatus::Completed);
        let final_decision = session.final_decision.as_ref().unwrap();
        assert_eq!(final_decision.decision.action, TradeAction::Sell);
        assert_eq!(final_decision.decision.reasoning, "Risk outweighs upside");
        assert!(final_decision.narrative.contains("2 rounds"));
        assert_eq!(session.turns()[2].decision.action, TradeAction::Buy);
        assert_eq!(session.total_tokens.total(), 90);
        assert!(session.estimated_cost > 0.0);

        let records = store.records.lock().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].0, "debate_session");
    }

    #[tokio::test]
    async fn test_refine_round_sees_whole_previous_round() {
        let panel = default_panel();
        let uc = RunDebateUseCase::new(panel.resolver());
        uc.execute(RunDebateInput::new("Should I buy NVDA?", bindings()))
            .await
            .unwrap();

        let prompts = panel.analyst.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 2);
        assert!(!prompts[0].contains("[Round 1"));
        for persona in ["ANALYST", "CRITIC", "SYNTHESIZER"] {
            assert!(prompts[1].contains(&format!("[Round 1 {}", persona)));
        }

        let critic_prompts = panel.critic.prompts.lock().unwrap();
        assert!(critic_prompts[0].contains("[Round 1 ANALYST - gpt-4o] BUY NVDA"));
    }

    #[tokio::test]
    async fn test_stage_parse_failure_aborts_debate() {
        let panel = Panel::new(
            MockAdapter::reply(BackendKind::OpenAi, BUY),
            MockAdapter::reply(BackendKind::Google, "I would rather not say."),
            MockAdapter::reply(BackendKind::Anthropic, SELL),
        );
        let store = Arc::new(RecordingStore::default());
        let uc = RunDebateUseCase::new(panel.resolver()).with_results(store.clone());

        let err = uc
            .execute(RunDebateInput::new("Should I buy NVDA?", bindings()))
            .await
            .unwrap_err();

        assert!(matches!(err, RunDebateError::Parse { .. }));
        assert_eq!(err.stage().unwrap().label(), "R1-critic");
        assert_eq!(panel.synthesizer.call_count(), 0);
        assert!(store.records.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_stage_adapter_failure_aborts_debate() {
        let panel = Panel::new(
            MockAdapter::reply(BackendKind::OpenAi, BUY),
            MockAdapter::reply(BackendKind::Google, HOLD),
            MockAdapter::failing(BackendKind::Anthropic, AdapterError::Quota("limit".into())),
        );
        let uc = RunDebateUseCase::new(panel.resolver());
        let err = uc
            .execute(RunDebateInput::new("q", bindings()))
            .await
            .unwrap_err();
        assert!(matches!(err, RunDebateError::Adapter { .. }));
        assert_eq!(err.stage().unwrap().label(), "R1-synthesizer");
    }

    #[tokio::test]
    async fn test_subscription_tier_rejects_before_any_call() {
        let panel = default_panel();
        let uc = RunDebateUseCase::new(panel.resolver());
        let err = uc
            .execute(RunDebateInput::new("q", bindings()).with_tier(Some("pro".into())))
            .await
            .unwrap_err();
        assert!(matches!(err, RunDebateError::Billing(_)));
        assert_eq!(panel.analyst.call_count(), 0);
    }

    #[tokio::test]
    async fn test_invalid_requests() {
        let panel = default_panel();
        let uc = RunDebateUseCase::new(panel.resolver());

        let err = uc
            .execute(RunDebateInput::new("  ", bindings()))
            .await
            .unwrap_err();
        assert!(matches!(err, RunDebateError::Invalid(DomainError::MissingPrompt)));

        let err = uc
            .execute(RunDebateInput::new("q", bindings()).with_rounds(0))
            .await
            .unwrap_err();
        assert!(matches!(err, RunDebateError::Invalid(_)));
        assert_eq!(panel.analyst.call_count(), 0);
    }

    struct StaticSource;

    #[async_trait]
    impl ResearchSource for StaticSource {
        async fn fetch(&self, _subject: &str, _timeframe: TimeframeClass) -> Result<Value, StoreError> {
            Ok(json!({"headline": "Record data-center revenue"}))
        }
    }

    #[tokio::test]
    async fn test_subject_pulls_research_and_fills_symbol() {
        let panel = Panel::new(
            MockAdapter::reply(BackendKind::OpenAi, HOLD),
            MockAdapter::reply(BackendKind::Google, HOLD),
            MockAdapter::reply(BackendKind::Anthropic, HOLD),
        );
        let cache =
            ResearchCache::new(Arc::new(MapStore::default())).with_source(Arc::new(StaticSource));
        let uc = RunDebateUseCase::new(panel.resolver()).with_research(cache);

        let output = uc
            .execute(
                RunDebateInput::new("Hold or sell?", bindings())
                    .with_subject("nvda")
                    .with_rounds(1),
            )
            .await
            .unwrap();

        assert_eq!(output.session.turns().len(), 3);
        assert_eq!(output.session.subject.as_deref(), Some("NVDA"));
        let final_decision = output.session.final_decision.unwrap();
        assert_eq!(final_decision.decision.symbol.as_deref(), Some("NVDA"));

        let prompts = panel.analyst.prompts.lock().unwrap();
        assert!(prompts[0].contains("Record data-center revenue"));
    }

    #[tokio::test]
    async fn test_judge_rules_on_transcript() {
        let judge = Arc::new(MockAdapter::reply(
            BackendKind::Mistral,
            r#"{"action": "HOLD", "confidence": 0.55, "risk_level": "Medium", "reasoning": "Mixed"}"#,
        ));
        let panel = default_panel();
        let resolver = Arc::new(MockResolver::new(vec![
            panel.analyst.clone(),
            panel.critic.clone(),
            panel.synthesizer.clone(),
            judge.clone(),
        ]));
        let uc = RunDebateUseCase::new(resolver);

        let output = uc
            .execute(
                RunDebateInput::new("q", bindings())
                    .with_judge(PersonaBinding::new(BackendKind::Mistral, "mistral-large")),
            )
            .await
            .unwrap();

        let verdict = output.verdict.unwrap();
        assert_eq!(verdict.action, TradeAction::Hold);
        assert!(!verdict.fallback);
        let prompt = judge.prompts.lock().unwrap()[0].clone();
        assert!(prompt.contains("[Round 2 SYNTHESIZER - claude-opus-4] SELL NVDA"));
        assert!(prompt.contains("gemini-2.5-pro"));
    }

    #[tokio::test]
    async fn test_screening_candidate_gets_screening_verdict() {
        let judge = Arc::new(MockAdapter::reply(
            BackendKind::Mistral,
            r#"{"action": "WATCH", "confidence": 0.6, "risk_level": "High", "reasoning": "Gap may fade"}"#,
        ));
        let panel = default_panel();
        let resolver = Arc::new(MockResolver::new(vec![
            panel.analyst.clone(),
            panel.critic.clone(),
            panel.synthesizer.clone(),
            judge.clone(),
        ]));
        let uc = RunDebateUseCase::new(resolver);
        let candidate = ScreeningMetrics {
            symbol: "nvda".to_string(),
            gap_percent: 6.0,
            premarket_volume: 2_500_000,
            ..Default::default()
        };

        let output = uc
            .execute(
                RunDebateInput::new("Trade the gap?", bindings())
                    .with_judge(PersonaBinding::new(BackendKind::Mistral, "mistral-large"))
                    .with_screening(candidate),
            )
            .await
            .unwrap();

        assert!(output.verdict.is_none());
        let screening = output.screening.unwrap();
        assert_eq!(screening.action, ScreeningAction::Watch);
        assert_eq!(screening.symbol.as_deref(), Some("NVDA"));
        let prompt = judge.prompts.lock().unwrap()[0].clone();
        assert!(prompt.contains("composite screening score 40.0/100"));
        assert!(prompt.contains("BUY|WATCH|SKIP"));
    }
}
