//! Execution parameters — use case control.
//!
//! [`ExecutionParams`] groups the static parameters shared by the fan-out,
//! judge and debate use cases. These are application-layer concerns, not
//! domain policy.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Per-request execution parameters.
///
/// | Field | Used by |
/// |-------|---------|
/// | `call_timeout` | every adapter call |
/// | `default_tier` | requests that name no tier |
/// | `default_temperature` / `default_max_tokens` | configs that leave them unset |
/// | `debate_rounds` | debates that name no round count |
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionParams {
    /// Timeout for a single adapter call.
    pub call_timeout: Duration,
    /// Billing tier applied when a request names none.
    pub default_tier: String,
    pub default_temperature: Option<f32>,
    pub default_max_tokens: Option<u32>,
    /// Rounds per debate.
    pub debate_rounds: u32,
}

impl Default for ExecutionParams {
    fn default() -> Self {
        Self {
            call_timeout: Duration::from_secs(60),
            default_tier: "metered".to_string(),
            default_temperature: None,
            default_max_tokens: Some(2048),
            debate_rounds: 2,
        }
    }
}

impl ExecutionParams {
    // ==================== Builder Methods ====================

    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = timeout;
        self
    }

    pub fn with_default_tier(mut self, tier: impl Into<String>) -> Self {
        self.default_tier = tier.into();
        self
    }

    pub fn with_default_temperature(mut self, temperature: Option<f32>) -> Self {
        self.default_temperature = temperature;
        self
    }

    pub fn with_default_max_tokens(mut self, max_tokens: Option<u32>) -> Self {
        self.default_max_tokens = max_tokens;
        self
    }

    pub fn with_debate_rounds(mut self, rounds: u32) -> Self {
        self.debate_rounds = rounds;
        self
    }

    /// Tier to use for a request
    pub fn tier_or_default<'a>(&'a self, tier: Option<&'a str>) -> &'a str {
        tier.filter(|t| !t.trim().is_empty())
            .unwrap_or(&self.default_tier)
    }
}
