//! Execution configuration from TOML (`[execution]` section)

use serde::{Deserialize, Serialize};
use std::time::Duration;
use verdict_application::ExecutionParams;

/// Per-call limits and generation defaults
///
/// ```toml
/// [execution]
/// timeout_seconds = 60
/// default_tier = "metered"
/// temperature = 0.7
/// max_tokens = 2048
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileExecutionConfig {
    pub timeout_seconds: u64,
    pub default_tier: String,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

impl Default for FileExecutionConfig {
    fn default() -> Self {
        let params = ExecutionParams::default();
        Self {
            timeout_seconds: params.call_timeout.as_secs(),
            default_tier: params.default_tier,
            temperature: params.default_temperature,
            max_tokens: params.default_max_tokens,
        }
    }
}

impl FileExecutionConfig {
    /// Execution parameters for use cases; `rounds` comes from `[debate]`
    pub fn to_params(&self, rounds: u32) -> ExecutionParams {
        ExecutionParams::default()
            .with_call_timeout(Duration::from_secs(self.timeout_seconds.max(1)))
            .with_default_tier(self.default_tier.clone())
            .with_default_temperature(self.temperature)
            .with_default_max_tokens(self.max_tokens)
            .with_debate_rounds(rounds)
    }
}
