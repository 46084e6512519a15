//! Rolling per-model health history

use std::collections::HashMap;
use std::sync::Mutex;
use verdict_application::HealthHistory;
use verdict_domain::{BackendKind, CallOutcome, HealthWindow, ModelHealth};

/// Keeps the last [`WINDOW_SIZE`](verdict_domain::health::WINDOW_SIZE) outcomes per (backend, model)
#[derive(Default)]
pub struct InMemoryHealthHistory {
    windows: Mutex<HashMap<(BackendKind, String), HealthWindow>>,
}

impl InMemoryHealthHistory {
    pub fn new() -> Self {
        Self::default()
    }
}

impl HealthHistory for InMemoryHealthHistory {
    fn record(&self, backend: &BackendKind, model: &str, outcome: CallOutcome) {
        if let Ok(mut windows) = self.windows.lock() {
            windows
                .entry((backend.clone(), model.to_string()))
                .or_default()
                .record(outcome);
        }
    }

    /// Sorted by backend then model
    fn snapshot(&self) -> Vec<ModelHealth> {
        let Ok(windows) = self.windows.lock() else {
            return Vec::new();
        };
        let mut keys: Vec<_> = windows.keys().collect();
        keys.sort();
        keys.into_iter()
            .map(|key| windows[key].snapshot(&key.0, &key.1))
            .collect()
    }
}
