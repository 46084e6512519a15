//! Backend adapter port
//!
//! Defines the interface for calling a single text-generation backend.

use async_trait::async_trait;
use verdict_domain::{AdapterClass, BackendKind, QueryConfig, TokenUsage};
use thiserror::Error;

/// Confidence assigned to a complete completion when the backend reports none
pub const COMPLETE_CONFIDENCE: f64 = 0.8;
/// Confidence assigned to a truncated completion when the backend reports none
pub const TRUNCATED_CONFIDENCE: f64 = 0.5;

/// Errors an adapter can report for one call
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AdapterError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Quota exceeded: {0}")]
    Quota(String),

    #[error("Timed out after {0}s")]
    Timeout(u64),

    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    #[error("Other error: {0}")]
    Other(String),
}

/// Raw completion returned by an adapter
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    pub text: String,
    pub tokens: TokenUsage,
    /// Backend-reported confidence, if any
    pub confidence: Option<f64>,
    /// The backend stopped early (length limit)
    pub truncated: bool,
}

impl Completion {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            tokens: TokenUsage::default(),
            confidence: None,
            truncated: false,
        }
    }

    pub fn with_tokens(mut self, tokens: TokenUsage) -> Self {
        self.tokens = tokens;
        self
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = Some(confidence);
        self
    }

    pub fn truncated(mut self) -> Self {
        self.truncated = true;
        self
    }

    /// Reported confidence, else derived from completion status
    pub fn effective_confidence(&self) -> f64 {
        self.confidence.unwrap_or(if self.truncated {
            TRUNCATED_CONFIDENCE
        } else {
            COMPLETE_CONFIDENCE
        })
    }
}

/// A concrete adapter instance for one backend
///
/// Implementations live in the infrastructure layer. The billing class is
/// fixed when the adapter is registered.
#[async_trait]
pub trait BackendAdapter: Send + Sync {
    /// Registry name of this instance (e.g. `anthropic-cli`)
    fn name(&self) -> &str;

    fn backend(&self) -> &BackendKind;

    fn class(&self) -> AdapterClass;

    /// Run one completion
    async fn complete(
        &self,
        system: Option<&str>,
        prompt: &str,
        config: &QueryConfig,
    ) -> Result<Completion, AdapterError>;
}
