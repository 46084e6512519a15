//! Top-level fan-out result.

use super::query::{Response, TokenUsage};
use super::scoring;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Agreement across the successful responses
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsensusSummary {
    /// Agreement score in [0, 1]
    pub agreement: f64,
    pub summary: String,
    #[serde(default)]
    pub disagreements: Vec<String>,
    /// Mean confidence of successful responses, 0 if none
    pub confidence: f64,
}

/// Aggregate call metrics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseMetrics {
    pub avg_response_time_ms: f64,
    /// Fraction of responses without error, in [0, 1]
    pub success_rate: f64,
    pub total_tokens: u32,
}

/// Complete result of one fan-out request
///
/// `responses` has exactly one entry per dispatched config, in input order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsensusResult {
    pub id: String,
    pub prompt: String,
    pub responses: Vec<Response>,
    pub consensus: ConsensusSummary,
    pub metrics: ResponseMetrics,
    pub timestamp: DateTime<Utc>,
}

impl ConsensusResult {
    /// Builds the result, scoring only the successful responses.
    pub fn from_responses(prompt: impl Into<String>, responses: Vec<Response>) -> Self {
        let successful: Vec<&Response> = responses.iter().filter(|r| r.is_success()).collect();
        let texts: Vec<&str> = successful.iter().map(|r| r.text.as_str()).collect();

        let agreement = scoring::agreement(&texts);
        let labeled: Vec<(String, &str)> = successful
            .iter()
            .map(|r| (format!("{}/{}", r.backend, r.model), r.text.as_str()))
            .collect();

        let confidence = if successful.is_empty() {
            0.0
        } else {
            successful.iter().map(|r| r.confidence).sum::<f64>() / successful.len() as f64
        };

        let consensus = ConsensusSummary {
            agreement,
            summary: scoring::summarize(successful.len(), agreement),
            disagreements: scoring::divergent_pairs(&labeled),
            confidence,
        };

        let metrics = if responses.is_empty() {
            ResponseMetrics {
                avg_response_time_ms: 0.0,
                success_rate: 0.0,
                total_tokens: 0,
            }
        } else {
            let tokens = responses
                .iter()
                .fold(TokenUsage::default(), |acc, r| acc + r.tokens);
            ResponseMetrics {
                avg_response_time_ms: responses.iter().map(|r| r.elapsed_ms as f64).sum::<f64>()
                    / responses.len() as f64,
                success_rate: successful.len() as f64 / responses.len() as f64,
                total_tokens: tokens.total(),
            }
        };

        Self {
            id: uuid::Uuid::new_v4().to_string(),
            prompt: prompt.into(),
            responses,
            consensus,
            metrics,
            timestamp: Utc::now(),
        }
    }

    /// Returns an iterator over only the successful responses.
    pub fn successful_responses(&self) -> impl Iterator<Item = &Response> {
        self.responses.iter().filter(|r| r.is_success())
    }

    /// Returns an iterator over only the failed responses.
    pub fn failed_responses(&self) -> impl Iterator<Item = &Response> {
        self.responses.iter().filter(|r| !r.is_success())
    }
}
