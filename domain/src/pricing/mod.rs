//! Static per-backend pricing for cost estimates.

use crate::consensus::TokenUsage;
use crate::core::backend::{AdapterClass, BackendKind};
use serde::{Deserialize, Serialize};

/// USD per 1K tokens
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Price {
    pub input_per_1k: f64,
    pub output_per_1k: f64,
}

impl Price {
    pub const fn new(input_per_1k: f64, output_per_1k: f64) -> Self {
        Self {
            input_per_1k,
            output_per_1k,
        }
    }

    pub const ZERO: Price = Price::new(0.0, 0.0);

    pub fn cost(&self, tokens: TokenUsage) -> f64 {
        tokens.input as f64 / 1000.0 * self.input_per_1k
            + tokens.output as f64 / 1000.0 * self.output_per_1k
    }
}

/// List price for a backend's metered API
pub fn list_price(backend: &BackendKind) -> Price {
    match backend {
        BackendKind::Anthropic => Price::new(0.003, 0.015),
        BackendKind::OpenAi => Price::new(0.0025, 0.01),
        BackendKind::Google => Price::new(0.00125, 0.01),
        BackendKind::Groq => Price::new(0.00059, 0.00079),
        BackendKind::Mistral => Price::new(0.002, 0.006),
        BackendKind::Xai => Price::new(0.003, 0.015),
        BackendKind::DeepSeek => Price::new(0.00027, 0.0011),
        BackendKind::Perplexity => Price::new(0.001, 0.001),
        BackendKind::Ollama => Price::ZERO,
        BackendKind::Custom(_) => Price::new(0.001, 0.002),
    }
}

/// Estimated cost of one call. Only metered adapters cost anything.
pub fn estimate_cost(backend: &BackendKind, class: AdapterClass, tokens: TokenUsage) -> f64 {
    if class.is_billed_per_call() {
        list_price(backend).cost(tokens)
    } else {
        0.0
    }
}
