//! Static per-model power weights.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Weight for models missing from the table
pub const DEFAULT_WEIGHT: f64 = 0.7;

/// Built-in table keyed by model-name prefix
const BUILTIN: &[(&str, f64)] = &[
    ("claude-opus", 1.0),
    ("claude-sonnet", 0.95),
    ("claude-3-5-sonnet", 0.9),
    ("claude-haiku", 0.8),
    ("claude-3-5-haiku", 0.75),
    ("gpt-5", 1.0),
    ("gpt-4.1", 0.95),
    ("gpt-4o-mini", 0.8),
    ("gpt-4o", 0.9),
    ("o3", 0.95),
    ("o4-mini", 0.85),
    ("gemini-2.5-pro", 0.95),
    ("gemini-2.5-flash", 0.85),
    ("gemini", 0.8),
    ("grok", 0.85),
    ("deepseek", 0.8),
    ("mistral-large", 0.8),
    ("llama", 0.75),
    ("sonar", 0.75),
];

/// Per-model power weights, looked up by longest matching prefix
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelWeights {
    table: BTreeMap<String, f64>,
    default_weight: f64,
}

impl Default for ModelWeights {
    fn default() -> Self {
        Self {
            table: BUILTIN.iter().map(|(k, v)| (k.to_string(), *v)).collect(),
            default_weight: DEFAULT_WEIGHT,
        }
    }
}

impl ModelWeights {
    /// Built-in table extended/overridden by `overrides` (prefix → weight)
    pub fn with_overrides<I, K>(overrides: I) -> Self
    where
        I: IntoIterator<Item = (K, f64)>,
        K: Into<String>,
    {
        let mut weights = Self::default();
        for (prefix, weight) in overrides {
            weights
                .table
                .insert(prefix.into().to_lowercase(), weight.clamp(0.0, 1.0));
        }
        weights
    }

    /// Weight for a model id; provider prefixes like `openai/` are ignored
    pub fn weight(&self, model: &str) -> f64 {
        let lower = model.to_lowercase();
        let name = lower.rsplit('/').next().unwrap_or(&lower);
        self.table
            .iter()
            .filter(|(prefix, _)| name.starts_with(prefix.as_str()))
            .max_by_key(|(prefix, _)| prefix.len())
            .map(|(_, w)| *w)
            .unwrap_or(self.default_weight)
    }

    /// Coarse label shown to the trading judge next to each weight
    pub fn tier_label(&self, model: &str) -> &'static str {
        match self.weight(model) {
            w if w >= 0.9 => "flagship",
            w if w >= 0.8 => "strong",
            _ => "standard",
        }
    }
}
