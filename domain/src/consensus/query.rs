//! Per-backend request configuration and per-call response value objects.
//!
//! - [`QueryConfig`] - which backend/model to call and with which sampling settings
//! - [`Response`] - the immutable, normalized outcome of one adapter call

use crate::core::backend::BackendKind;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

fn default_enabled() -> bool {
    true
}

/// Configuration for one backend call within a fan-out request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryConfig {
    /// Backend to route the call to
    pub backend: BackendKind,
    /// Vendor model identifier (e.g. "claude-sonnet-4-5", "gpt-4o")
    pub model: String,
    /// Disabled configs are skipped entirely
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

impl QueryConfig {
    pub fn new(backend: BackendKind, model: impl Into<String>) -> Self {
        Self {
            backend,
            model: model.into(),
            enabled: true,
            temperature: None,
            max_tokens: None,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature.clamp(0.0, 2.0));
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// "backend/model" label used in logs and reports
    pub fn label(&self) -> String {
        format!("{}/{}", self.backend, self.model)
    }
}

/// Token accounting for one call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub input: u32,
    pub output: u32,
}

impl TokenUsage {
    pub fn new(input: u32, output: u32) -> Self {
        Self { input, output }
    }

    /// Saturates at `u32::MAX`
    pub fn total(&self) -> u32 {
        self.input.saturating_add(self.output)
    }
}

impl std::ops::Add for TokenUsage {
    type Output = TokenUsage;

    fn add(self, rhs: TokenUsage) -> TokenUsage {
        TokenUsage {
            input: self.input.saturating_add(rhs.input),
            output: self.output.saturating_add(rhs.output),
        }
    }
}

/// Normalized response from a single adapter call
///
/// Created once per call and never mutated afterwards. A set `error` means
/// `text` is unusable and `confidence` is 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub id: String,
    pub backend: BackendKind,
    pub model: String,
    pub text: String,
    pub confidence: f64,
    /// Wall-clock time until success or failure
    pub elapsed_ms: u64,
    pub tokens: TokenUsage,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Response {
    /// Creates a successful response; confidence is clamped into [0, 1].
    pub fn success(
        config: &QueryConfig,
        text: impl Into<String>,
        confidence: f64,
        tokens: TokenUsage,
        elapsed_ms: u64,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            backend: config.backend.clone(),
            model: config.model.clone(),
            text: text.into(),
            confidence: confidence.clamp(0.0, 1.0),
            elapsed_ms,
            tokens,
            timestamp: Utc::now(),
            error: None,
        }
    }

    /// Creates a failed response: empty text, zero confidence.
    pub fn failure(config: &QueryConfig, error: impl Into<String>, elapsed_ms: u64) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            backend: config.backend.clone(),
            model: config.model.clone(),
            text: String::new(),
            confidence: 0.0,
            elapsed_ms,
            tokens: TokenUsage::default(),
            timestamp: Utc::now(),
            error: Some(error.into()),
        }
    }

    /// Returns `true` if the text is usable.
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}
