//! Shared helpers for use cases.
//!
//! Every adapter call goes through [`call_adapter`], which bounds it by the
//! configured timeout and records the outcome in the health history.

use crate::config::ExecutionParams;
use crate::ports::backend_adapter::{AdapterError, BackendAdapter, Completion};
use crate::ports::health_history::HealthHistory;
use std::time::{Duration, Instant};
use tracing::debug;
use verdict_domain::{CallOutcome, QueryConfig, Response};

/// Result of one bounded adapter call
pub(crate) struct CallResult {
    pub completion: Result<Completion, AdapterError>,
    pub elapsed_ms: u64,
}

impl CallResult {
    /// Normalize into a [`Response`]; errors become `Response.error`.
    pub fn into_response(self, config: &QueryConfig) -> Response {
        match self.completion {
            Ok(completion) => {
                let confidence = completion.effective_confidence();
                Response::success(
                    config,
                    completion.text,
                    confidence,
                    completion.tokens,
                    self.elapsed_ms,
                )
            }
            Err(e) => Response::failure(config, e.to_string(), self.elapsed_ms),
        }
    }
}

/// Call an adapter with a timeout. Never panics or propagates errors.
pub(crate) async fn call_adapter(
    adapter: &dyn BackendAdapter,
    system: Option<&str>,
    prompt: &str,
    config: &QueryConfig,
    timeout: Duration,
    health: &dyn HealthHistory,
) -> CallResult {
    let started = Instant::now();
    let completion = match tokio::time::timeout(timeout, adapter.complete(system, prompt, config)).await
    {
        Ok(result) => result,
        Err(_) => Err(AdapterError::Timeout(timeout.as_secs())),
    };
    let elapsed_ms = started.elapsed().as_millis() as u64;

    debug!(
        adapter = adapter.name(),
        model = %config.model,
        elapsed_ms,
        success = completion.is_ok(),
        "Adapter call finished"
    );

    health.record(
        adapter.backend(),
        &config.model,
        CallOutcome {
            success: completion.is_ok(),
            latency_ms: elapsed_ms,
        },
    );

    CallResult {
        completion,
        elapsed_ms,
    }
}

/// Fill unset generation parameters from execution defaults
pub(crate) fn with_defaults(config: &QueryConfig, params: &ExecutionParams) -> QueryConfig {
    let mut config = config.clone();
    if config.temperature.is_none() {
        config.temperature = params.default_temperature;
    }
    if config.max_tokens.is_none() {
        config.max_tokens = params.default_max_tokens;
    }
    config
}
