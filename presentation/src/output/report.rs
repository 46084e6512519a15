//! Result bundles rendered by the CLI

use serde::Serialize;
use verdict_domain::{ConsensusResult, JudgeVerdict, TradingConsensus};

/// Everything one `ask` run produced
#[derive(Debug, Clone, Serialize)]
pub struct AskReport {
    pub result: ConsensusResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verdict: Option<JudgeVerdict>,
    /// Why the judge step produced no verdict
    #[serde(skip_serializing_if = "Option::is_none")]
    pub judge_error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trading: Option<TradingConsensus>,
}

impl AskReport {
    pub fn new(result: ConsensusResult) -> Self {
        Self {
            result,
            verdict: None,
            judge_error: None,
            trading: None,
        }
    }

    pub fn with_verdict(mut self, verdict: JudgeVerdict) -> Self {
        self.verdict = Some(verdict);
        self
    }

    pub fn with_judge_error(mut self, error: impl Into<String>) -> Self {
        self.judge_error = Some(error.into());
        self
    }

    pub fn with_trading(mut self, trading: TradingConsensus) -> Self {
        self.trading = Some(trading);
        self
    }
}
