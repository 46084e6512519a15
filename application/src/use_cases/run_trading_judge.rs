//! Trading judge use cases
//!
//! - [`TradingJudgeUseCase::heuristic`] folds fan-out answers into one
//!   weighted decision without calling any model
//! - [`TradingJudgeUseCase::trading_verdict`] / [`TradingJudgeUseCase::screening_verdict`]
//!   ask a judge model to rule on a debate transcript
//!
//! The model-backed verdicts fall back to HOLD / SKIP with `Critical` risk
//! whenever the judge cannot be heard or understood. Billing violations are
//! still errors.

use crate::config::ExecutionParams;
use crate::ports::adapter_resolver::AdapterResolver;
use crate::ports::health_history::{HealthHistory, NoHealthHistory};
use crate::use_cases::run_judge::JudgeError;
use crate::use_cases::shared::{call_adapter, with_defaults};
use std::sync::Arc;
use tracing::{info, warn};
use verdict_domain::judge::synthesize;
use verdict_domain::{
    ConsensusResult, ModelDecision, ModelMeta, ModelWeights, PersonaBinding, PromptTemplate,
    QueryConfig, ScreeningMetrics, ScreeningVerdict, TradingConsensus, TradingVerdict, Verdict,
    VerdictAction, VoteTally, parse_decision, parse_verdict,
};

/// Use case for trading-style judgments
pub struct TradingJudgeUseCase<R: AdapterResolver + 'static> {
    resolver: Arc<R>,
    health: Arc<dyn HealthHistory>,
    weights: ModelWeights,
    params: ExecutionParams,
}

impl<R: AdapterResolver + 'static> TradingJudgeUseCase<R> {
    pub fn new(resolver: Arc<R>) -> Self {
        Self {
            resolver,
            health: Arc::new(NoHealthHistory),
            weights: ModelWeights::default(),
            params: ExecutionParams::default(),
        }
    }

    pub fn with_health(mut self, health: Arc<dyn HealthHistory>) -> Self {
        self.health = health;
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

    pub fn weights(&self) -> &ModelWeights {
        &self.weights
    }

    /// Deterministic consensus over the parseable decisions in `result`.
    ///
    /// Answers that do not parse into a decision are left out of the vote.
    pub fn heuristic(&self, result: &ConsensusResult) -> TradingConsensus {
        let decisions: Vec<ModelDecision> = result
            .successful_responses()
            .filter_map(|r| match parse_decision(&r.text) {
                Ok((decision, _)) => Some(ModelDecision::new(r.model.clone(), decision)),
                Err(e) => {
                    warn!("Skipping {} in vote: {}", r.model, e);
                    None
                }
            })
            .collect();
        let votes = VoteTally::from_actions(decisions.iter().map(|d| d.decision.action));
        synthesize(&decisions, &votes, &self.weights)
    }

    /// Weight metadata for the models that took part
    pub fn model_meta(&self, models: &[String]) -> Vec<ModelMeta> {
        models
            .iter()
            .map(|m| ModelMeta {
                model: m.clone(),
                weight: self.weights.weight(m),
                tier: self.weights.tier_label(m),
            })
            .collect()
    }

    /// BUY/SELL/HOLD verdict over a debate transcript
    pub async fn trading_verdict(
        &self,
        transcript: &str,
        models: &[String],
        judge: &PersonaBinding,
        tier: Option<&str>,
    ) -> Result<TradingVerdict, JudgeError> {
        let prompt = PromptTemplate::trading_verdict(transcript, &self.model_meta(models));
        self.verdict(&prompt, judge, tier).await
    }

    /// BUY/WATCH/SKIP verdict for one screening candidate
    pub async fn screening_verdict(
        &self,
        candidate: &ScreeningMetrics,
        transcript: &str,
        models: &[String],
        judge: &PersonaBinding,
        tier: Option<&str>,
    ) -> Result<ScreeningVerdict, JudgeError> {
        let prompt =
            PromptTemplate::screening_verdict(transcript, &self.model_meta(models), candidate);
        let mut verdict: ScreeningVerdict = self.verdict(&prompt, judge, tier).await?;
        if verdict.symbol.is_none() {
            verdict.symbol = Some(candidate.symbol.to_uppercase());
        }
        Ok(verdict)
    }

    async fn verdict<A: VerdictAction>(
        &self,
        prompt: &str,
        judge: &PersonaBinding,
        tier: Option<&str>,
    ) -> Result<Verdict<A>, JudgeError> {
        let tier = self.params.tier_or_default(tier);
        let adapter = self.resolver.resolve(tier, &judge.backend).into_result()?;
        self.resolver.assert_binding(tier, adapter.as_ref())?;

        let config = with_defaults(
            &QueryConfig::new(judge.backend.clone(), judge.model.clone()),
            &self.params,
        );
        let call = call_adapter(
            adapter.as_ref(),
            Some(PromptTemplate::verdict_system()),
            prompt,
            &config,
            self.params.call_timeout,
            self.health.as_ref(),
        )
        .await;

        let verdict = match call.completion {
            Ok(completion) => parse_verdict::<A>(&completion.text),
            Err(e) => {
                warn!("Verdict call to {} failed: {}", judge.label(), e);
                Verdict::conservative(format!("Judge call failed ({}); defaulting to {}", e, A::CONSERVATIVE))
            }
        };
        if verdict.fallback {
            warn!("Judge verdict fell back to {}", verdict.action);
        } else {
            info!("Judge verdict: {} ({:.2})", verdict.action, verdict.confidence);
        }
        Ok(verdict)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::backend_adapter::AdapterError;
    use crate::use_cases::test_support::{MockAdapter, MockResolver};
    use verdict_domain::{
        BackendKind, RiskLevel, ScreeningAction, TokenUsage, TradeAction, Response,
    };

    fn judge() -> PersonaBinding {
        PersonaBinding::new(BackendKind::Anthropic, "claude-opus-4")
    }

    fn use_case(adapter: MockAdapter) -> TradingJudgeUseCase<MockResolver> {
        TradingJudgeUseCase::new(Arc::new(MockResolver::new(vec![Arc::new(adapter)])))
    }

    #[test]
    fn test_heuristic_over_fanout() {
        let texts = [
            (r#"{"action": "BUY", "symbol": "NVDA", "reasoning": "Bullish breakout", "confidence": 0.8}"#, "gpt-4o"),
            (r#"{"action": "BUY", "symbol": "NVDA", "reasoning": "Bullish trend", "confidence": 0.7}"#, "claude-opus-4"),
            ("I can't decide.", "llama-3"),
        ];
        let responses = texts
            .iter()
            .map(|(text, model)| {
                let config = QueryConfig::new(BackendKind::OpenAi, *model);
                Response::success(&config, *text, 0.8, TokenUsage::default(), 1)
            })
            .collect();
        let result = ConsensusResult::from_responses("Buy NVDA?", responses);

        let uc = use_case(MockAdapter::reply(BackendKind::Anthropic, ""));
        let consensus = uc.heuristic(&result);

        assert_eq!(consensus.action, TradeAction::Buy);
        assert_eq!(consensus.votes, VoteTally::new(2, 0, 0));
        assert!(consensus.agreements.iter().any(|a| a.contains("agree on NVDA")));
        assert!(consensus.agreements.iter().any(|a| a.contains("bullish")));
    }

    #[tokio::test]
    async fn test_trading_verdict_parsed() {
        let uc = use_case(MockAdapter::reply(
            BackendKind::Anthropic,
            r#"{"action": "SELL", "confidence": 0.7, "risk_level": "High", "reasoning": "Breakdown"}"#,
        ));
        let verdict = uc
            .trading_verdict("transcript", &["gpt-4o".to_string()], &judge(), None)
            .await
            .unwrap();
        assert_eq!(verdict.action, TradeAction::Sell);
        assert!(!verdict.fallback);
    }

    #[tokio::test]
    async fn test_trading_verdict_unparseable_is_hold() {
        let uc = use_case(MockAdapter::reply(BackendKind::Anthropic, "BUY BUY BUY!!!"));
        let verdict = uc
            .trading_verdict("transcript", &[], &judge(), None)
            .await
            .unwrap();
        assert_eq!(verdict.action, TradeAction::Hold);
        assert_eq!(verdict.risk_level, RiskLevel::Critical);
    }

    #[tokio::test]
    async fn test_judge_failure_is_skip() {
        let uc = use_case(MockAdapter::failing(
            BackendKind::Anthropic,
            AdapterError::Connection("reset".to_string()),
        ));
        let candidate = ScreeningMetrics {
            symbol: "abc".to_string(),
            ..Default::default()
        };
        let verdict = uc
            .screening_verdict(&candidate, "t", &[], &judge(), None)
            .await
            .unwrap();
        assert_eq!(verdict.action, ScreeningAction::Skip);
        assert_eq!(verdict.symbol.as_deref(), Some("ABC"));
        assert!(verdict.fallback);
    }

    #[tokio::test]
    async fn test_billing_violation_is_error() {
        let uc = use_case(MockAdapter::reply(BackendKind::Anthropic, "{}"));
        let err = uc
            .trading_verdict("t", &[], &judge(), Some("pro"))
            .await
            .unwrap_err();
        assert!(matches!(err, JudgeError::Billing(_)));
    }

    #[test]
    fn test_model_meta() {
        let uc = use_case(MockAdapter::reply(BackendKind::Anthropic, ""));
        let meta = uc.model_meta(&["claude-opus-4".to_string(), "unknown".to_string()]);
        assert_eq!(meta[0].tier, "flagship");
        assert_eq!(meta[1].weight, 0.7);
    }
}
