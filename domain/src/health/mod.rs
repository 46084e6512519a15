//! Rolling per-model health.

use crate::core::backend::BackendKind;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Outcomes kept per (backend, model)
pub const WINDOW_SIZE: usize = 50;
pub const HEALTHY_RATE: f64 = 0.9;
pub const DEGRADED_RATE: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Down,
    /// No calls recorded yet
    Unknown,
}

impl HealthStatus {
    pub fn from_rate(rate: f64) -> Self {
        if rate >= HEALTHY_RATE {
            HealthStatus::Healthy
        } else if rate >= DEGRADED_RATE {
            HealthStatus::Degraded
        } else {
            HealthStatus::Down
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HealthStatus::Healthy => "healthy",
            HealthStatus::Degraded => "degraded",
            HealthStatus::Down => "down",
            HealthStatus::Unknown => "unknown",
        }
    }
}

/// Result of one adapter call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallOutcome {
    pub success: bool,
    pub latency_ms: u64,
}

/// Bounded window of recent outcomes
#[derive(Debug, Clone, Default)]
pub struct HealthWindow {
    outcomes: VecDeque<CallOutcome>,
}

impl HealthWindow {
    pub fn record(&mut self, outcome: CallOutcome) {
        if self.outcomes.len() == WINDOW_SIZE {
            self.outcomes.pop_front();
        }
        self.outcomes.push_back(outcome);
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    pub fn snapshot(&self, backend: &BackendKind, model: &str) -> ModelHealth {
        let total = self.outcomes.len();
        let failures = self.outcomes.iter().filter(|o| !o.success).count();
        let (success_rate, avg_latency_ms, status) = if total == 0 {
            (0.0, 0.0, HealthStatus::Unknown)
        } else {
            let rate = (total - failures) as f64 / total as f64;
            let latency =
                self.outcomes.iter().map(|o| o.latency_ms as f64).sum::<f64>() / total as f64;
            (rate, latency, HealthStatus::from_rate(rate))
        };
        ModelHealth {
            backend: backend.clone(),
            model: model.to_string(),
            total,
            failures,
            success_rate,
            avg_latency_ms,
            status,
        }
    }
}

/// Health summary for one model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelHealth {
    pub backend: BackendKind,
    pub model: String,
    pub total: usize,
    pub failures: usize,
    pub success_rate: f64,
    pub avg_latency_ms: f64,
    pub status: HealthStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ok(latency_ms: u64) -> CallOutcome {
        CallOutcome {
            success: true,
            latency_ms,
        }
    }

    fn fail() -> CallOutcome {
        CallOutcome {
            success: false,
            latency_ms: 1000,
        }
    }

    #[test]
    fn test_status_thresholds() {
        assert_eq!(HealthStatus::from_rate(0.95), HealthStatus::Healthy);
        assert_eq!(HealthStatus::from_rate(0.9), HealthStatus::Healthy);
        assert_eq!(HealthStatus::from_rate(0.6), HealthStatus::Degraded);
        assert_eq!(HealthStatus::from_rate(0.2), HealthStatus::Down);
    }

    #[test]
    fn test_window_is_bounded() {
        let mut window = HealthWindow::default();
        for _ in 0..WINDOW_SIZE {
            window.record(fail());
        }
        for _ in 0..WINDOW_SIZE {
            window.record(ok(100));
        }
        assert_eq!(window.len(), WINDOW_SIZE);
        let health = window.snapshot(&BackendKind::Groq, "llama");
        assert_eq!(health.failures, 0);
        assert_eq!(health.status, HealthStatus::Healthy);
        assert_eq!(health.avg_latency_ms, 100.0);
    }

    #[test]
    fn test_snapshot_mixed() {
        let mut window = HealthWindow::default();
        window.record(ok(200));
        window.record(fail());
        let health = window.snapshot(&BackendKind::OpenAi, "gpt-4o");
        assert_eq!(health.total, 2);
        assert_eq!(health.success_rate, 0.5);
        assert_eq!(health.status, HealthStatus::Degraded);
        assert_eq!(health.avg_latency_ms, 600.0);
    }

    #[test]
    fn test_empty_is_unknown() {
        let health = HealthWindow::default().snapshot(&BackendKind::Ollama, "qwen");
        assert_eq!(health.status, HealthStatus::Unknown);
        assert_eq!(health.total, 0);
    }
}
