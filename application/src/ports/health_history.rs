//! Model health history port

use verdict_domain::{BackendKind, CallOutcome, ModelHealth};

/// Rolling record of adapter call outcomes per (backend, model)
pub trait HealthHistory: Send + Sync {
    fn record(&self, backend: &BackendKind, model: &str, outcome: CallOutcome);

    /// Current health of every model seen so far
    fn snapshot(&self) -> Vec<ModelHealth>;
}

/// History that remembers nothing
pub struct NoHealthHistory;

impl HealthHistory for NoHealthHistory {
    fn record(&self, _backend: &BackendKind, _model: &str, _outcome: CallOutcome) {}

    fn snapshot(&self) -> Vec<ModelHealth> {
        Vec::new()
    }
}
