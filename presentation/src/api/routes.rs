//! Router and request handlers

use super::error::ApiError;
use super::state::ApiState;
use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use verdict_application::{AdapterResolver, RunConsensusInput, RunDebateInput, RunDebateOutput};
use verdict_domain::{
    ConsensusResult, DebateBindings, DomainError, ModelHealth, PersonaBinding, QueryConfig,
    ScreeningMetrics, TimeframeClass,
};

#[derive(Debug, Clone, Deserialize)]
pub struct ConsensusRequest {
    #[serde(default)]
    pub prompt: String,
    #[serde(default)]
    pub configs: Vec<QueryConfig>,
    pub tier: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DebateRequest {
    #[serde(default)]
    pub question: String,
    /// Falls back to the server's `[debate]` bindings
    pub bindings: Option<DebateBindings>,
    pub subject: Option<String>,
    pub timeframe: Option<TimeframeClass>,
    pub rounds: Option<u32>,
    pub judge: Option<PersonaBinding>,
    /// Screening candidate; with a judge the verdict is BUY/WATCH/SKIP
    pub screening: Option<ScreeningMetrics>,
    pub tier: Option<String>,
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

async fn run_consensus<R: AdapterResolver + 'static>(
    State(state): State<ApiState<R>>,
    Json(req): Json<ConsensusRequest>,
) -> Result<Json<ConsensusResult>, ApiError> {
    info!(
        configs = req.configs.len(),
        "Received consensus request"
    );
    let mut input = RunConsensusInput::new(req.prompt, req.configs);
    if let Some(tier) = req.tier {
        input = input.with_tier(tier);
    }
    let result = state.consensus.execute(input).await?;
    Ok(Json(result))
}

async fn run_debate<R: AdapterResolver + 'static>(
    State(state): State<ApiState<R>>,
    Json(req): Json<DebateRequest>,
) -> Result<Json<RunDebateOutput>, ApiError> {
    info!(subject = ?req.subject, "Received debate request");
    let Some(bindings) = req.bindings.or_else(|| state.default_bindings.clone()) else {
        return Err(ApiError::BadRequest(
            DomainError::InvalidIdentifier("no persona bindings given or configured".to_string())
                .to_string(),
        ));
    };

    let mut input = RunDebateInput::new(req.question, bindings).with_tier(req.tier);
    if let Some(subject) = req.subject {
        input = input.with_subject(subject);
    }
    if let Some(timeframe) = req.timeframe {
        input = input.with_timeframe(timeframe);
    }
    if let Some(rounds) = req.rounds {
        input = input.with_rounds(rounds);
    }
    if let Some(candidate) = req.screening {
        input = input.with_screening(candidate);
    }
    if let Some(judge) = req.judge {
        input = input.with_judge(judge);
    }

    let output = state.debate.execute(input).await?;
    Ok(Json(output))
}

async fn model_health<R: AdapterResolver + 'static>(
    State(state): State<ApiState<R>>,
) -> Json<Vec<ModelHealth>> {
    Json(state.health.snapshot())
}

pub fn create_router<R: AdapterResolver + 'static>(state: ApiState<R>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/consensus", post(run_consensus::<R>))
        .route("/debate", post(run_debate::<R>))
        .route("/model-health", get(model_health::<R>))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn start_server<R: AdapterResolver + 'static>(
    state: ApiState<R>,
    address: &str,
) -> std::io::Result<()> {
    let router = create_router(state);
    let listener = tokio::net::TcpListener::bind(address).await?;
    info!("HTTP API listening on {}", listener.local_addr()?);
    axum::serve(listener, router).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use std::sync::Arc;
    use verdict_application::{
        AdapterError, BackendAdapter, Completion, HealthHistory, Resolution, RunConsensusUseCase,
        RunDebateUseCase,
    };
    use verdict_domain::{
        AdapterClass, BackendKind, CallOutcome, DomainError, HealthWindow, ScreeningAction,
        TierPolicy,
    };

    /// Answers with `text`, or fails every call when `text` is `None`
    struct FixedAdapter {
        backend: BackendKind,
        text: Option<String>,
    }

    #[async_trait]
    impl BackendAdapter for FixedAdapter {
        fn name(&self) -> &str {
            "fixed"
        }

        fn backend(&self) -> &BackendKind {
            &self.backend
        }

        fn class(&self) -> AdapterClass {
            AdapterClass::Metered
        }

        async fn complete(
            &self,
            _system: Option<&str>,
            _prompt: &str,
            _config: &QueryConfig,
        ) -> Result<Completion, AdapterError> {
            match &self.text {
                Some(text) => Ok(Completion::new(text.clone())),
                None => Err(AdapterError::Connection("refused".to_string())),
            }
        }
    }

    /// Serves OpenAI and Anthropic; everything else is unregistered
    struct TestResolver {
        text: Option<String>,
        policy: TierPolicy,
    }

    impl AdapterResolver for TestResolver {
        fn resolve(&self, tier: &str, backend: &BackendKind) -> Resolution {
            let tier = match self.policy.get(tier) {
                Ok(tier) => tier,
                Err(e) => return Resolution::rejected(e),
            };
            if !matches!(backend, BackendKind::OpenAi | BackendKind::Anthropic) {
                return Resolution::rejected(DomainError::NoAdapter(backend.to_string()));
            }
            if let Err(e) = tier.check(AdapterClass::Metered) {
                return Resolution::rejected(e);
            }
            Resolution::found(Arc::new(FixedAdapter {
                backend: backend.clone(),
                text: self.text.clone(),
            }))
        }

        fn assert_binding(
            &self,
            tier: &str,
            adapter: &dyn BackendAdapter,
        ) -> Result<(), DomainError> {
            self.policy.get(tier)?.check(adapter.class())
        }
    }

    #[derive(Default)]
    struct SharedHealth {
        window: std::sync::Mutex<HealthWindow>,
    }

    impl HealthHistory for SharedHealth {
        fn record(&self, _backend: &BackendKind, _model: &str, outcome: CallOutcome) {
            self.window.lock().unwrap().record(outcome);
        }

        fn snapshot(&self) -> Vec<ModelHealth> {
            let window = self.window.lock().unwrap();
            if window.is_empty() {
                return Vec::new();
            }
            vec![window.snapshot(&BackendKind::OpenAi, "gpt-4o")]
        }
    }

    fn state(text: Option<&str>) -> ApiState<TestResolver> {
        let resolver = Arc::new(TestResolver {
            text: text.map(str::to_string),
            policy: TierPolicy::default(),
        });
        let health: Arc<dyn HealthHistory> = Arc::new(SharedHealth::default());
        ApiState::new(
            RunConsensusUseCase::new(Arc::clone(&resolver)).with_health(Arc::clone(&health)),
            RunDebateUseCase::new(resolver).with_health(Arc::clone(&health)),
            health,
        )
    }

    fn consensus_request(prompt: &str, configs: Vec<QueryConfig>) -> ConsensusRequest {
        ConsensusRequest {
            prompt: prompt.to_string(),
            configs,
            tier: None,
        }
    }

    fn bindings() -> DebateBindings {
        DebateBindings {
            analyst: PersonaBinding::new(BackendKind::OpenAi, "gpt-4o"),
            critic: PersonaBinding::new(BackendKind::Anthropic, "claude-sonnet-4-5"),
            synthesizer: PersonaBinding::new(BackendKind::OpenAi, "gpt-4o"),
        }
    }

    fn debate_request() -> DebateRequest {
        DebateRequest {
            question: "Buy NVDA this week?".to_string(),
            bindings: Some(bindings()),
            subject: Some("nvda".to_string()),
            timeframe: None,
            rounds: Some(1),
            judge: None,
            screening: None,
            tier: None,
        }
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_consensus_validation_is_400() {
        let state = state(Some("4"));
        let configs = vec![QueryConfig::new(BackendKind::OpenAi, "gpt-4o")];

        let err = run_consensus(State(state.clone()), Json(consensus_request("", configs)))
            .await
            .unwrap_err();
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);

        let err = run_consensus(State(state), Json(consensus_request("2+2?", vec![])))
            .await
            .unwrap_err();
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_consensus_all_failed_is_still_200() {
        let state = state(None);
        let configs = vec![
            QueryConfig::new(BackendKind::OpenAi, "gpt-4o"),
            QueryConfig::new(BackendKind::Groq, "llama-3.3-70b"),
        ];
        let Json(result) = run_consensus(State(state), Json(consensus_request("2+2?", configs)))
            .await
            .unwrap();
        assert_eq!(result.responses.len(), 2);
        assert!(result.responses.iter().all(|r| !r.is_success()));
        assert_eq!(result.consensus.confidence, 0.0);
    }

    #[tokio::test]
    async fn test_consensus_pro_tier_forbidden() {
        let state = state(Some("4"));
        let mut request =
            consensus_request("2+2?", vec![QueryConfig::new(BackendKind::OpenAi, "gpt-4o")]);
        request.tier = Some("pro".to_string());
        let err = run_consensus(State(state), Json(request)).await.unwrap_err();
        assert_eq!(err.into_response().status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_debate_success() {
        let state = state(Some(
            r#"{"action": "BUY", "reasoning": "Momentum", "confidence": 0.7}"#,
        ));
        let Json(output) = run_debate(State(state), Json(debate_request()))
            .await
            .unwrap();
        assert_eq!(output.session.turns().len(), 3);
        let last = output.session.final_decision.unwrap();
        assert_eq!(last.decision.symbol.as_deref(), Some("NVDA"));
    }

    #[tokio::test]
    async fn test_debate_screening_request() {
        let state = state(Some(
            r#"{"action": "BUY", "reasoning": "Gap and volume line up", "confidence": 0.7}"#,
        ));
        let request: DebateRequest = serde_json::from_value(serde_json::json!({
            "question": "Trade the gap?",
            "bindings": bindings(),
            "subject": "gme",
            "rounds": 1,
            "judge": {"backend": "openai", "model": "gpt-4o"},
            "screening": {"symbol": "GME", "gap_percent": 12.0, "premarket_volume": 6000000}
        }))
        .unwrap();

        let Json(output) = run_debate(State(state), Json(request)).await.unwrap();
        assert!(output.verdict.is_none());
        let screening = output.screening.unwrap();
        assert_eq!(screening.action, ScreeningAction::Buy);
        assert_eq!(screening.symbol.as_deref(), Some("GME"));
    }

    #[tokio::test]
    async fn test_debate_stage_failure_is_500_without_transcript() {
        let state = state(None);
        let err = run_debate(State(state), Json(debate_request()))
            .await
            .unwrap_err();
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(response).await;
        assert_eq!(body["stage"], "R1-analyst");
        assert!(body.get("session").is_none());
    }

    #[tokio::test]
    async fn test_debate_without_bindings_is_400() {
        let state = state(Some("{}"));
        let mut request = debate_request();
        request.bindings = None;
        let err = run_debate(State(state), Json(request)).await.unwrap_err();
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_model_health_after_calls() {
        let state = state(Some("4"));
        let Json(empty) = model_health(State(state.clone())).await;
        assert!(empty.is_empty());

        let configs = vec![QueryConfig::new(BackendKind::OpenAi, "gpt-4o")];
        run_consensus(State(state.clone()), Json(consensus_request("2+2?", configs)))
            .await
            .unwrap();
        let Json(health) = model_health(State(state)).await;
        assert_eq!(health.len(), 1);
        assert_eq!(health[0].total, 1);
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let Json(body) = health().await;
        assert_eq!(body["status"], "healthy");
    }
}
