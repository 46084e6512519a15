//! Debate session accumulator.

use super::persona::{DebateBindings, Persona};
use super::stage::{DebateStage, DebateState};
use crate::consensus::TokenUsage;
use crate::decision::{Decision, VoteTally};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Session misuse: recording out of order or after sealing
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SessionError {
    #[error("Expected stage {expected}, got {actual}")]
    OutOfOrder { expected: String, actual: String },

    #[error("Debate session is already sealed")]
    Sealed,

    #[error("Debate has no synthesizer decision for round {0}")]
    MissingFinalDecision(u32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DebateStatus {
    Running,
    Completed,
}

/// One persona's parsed output in one round
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DebateTurn {
    pub round: u32,
    pub persona: Persona,
    pub backend: String,
    pub model: String,
    pub decision: Decision,
    pub tokens: TokenUsage,
    pub elapsed_ms: u64,
}

impl DebateTurn {
    pub fn stage(&self) -> DebateStage {
        DebateStage::new(self.round, self.persona)
    }

    /// Transcript line embedded into later prompts
    pub fn transcript_line(&self) -> String {
        format!(
            "[Round {} {} - {}] {}",
            self.round,
            self.persona.as_str().to_uppercase(),
            self.model,
            self.decision.summary_line()
        )
    }
}

/// Last-round synthesizer decision with a one-sentence narrative
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalDecision {
    #[serde(flatten)]
    pub decision: Decision,
    pub narrative: String,
}

/// A debate in progress or completed
///
/// Turns are append-only and must arrive in stage order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DebateSession {
    pub id: String,
    pub question: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    pub rounds: u32,
    pub bindings: DebateBindings,
    turns: Vec<DebateTurn>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_decision: Option<FinalDecision>,
    pub total_tokens: TokenUsage,
    pub estimated_cost: f64,
    pub started_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ended_at: Option<DateTime<Utc>>,
    pub status: DebateStatus,
}

impl DebateSession {
    pub fn new(question: impl Into<String>, rounds: u32, bindings: DebateBindings) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            question: question.into(),
            subject: None,
            rounds,
            bindings,
            turns: Vec::new(),
            final_decision: None,
            total_tokens: TokenUsage::default(),
            estimated_cost: 0.0,
            started_at: Utc::now(),
            ended_at: None,
            status: DebateStatus::Running,
        }
    }

    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    pub fn turns(&self) -> &[DebateTurn] {
        &self.turns
    }

    /// Next stage to run, or [`DebateState::Final`]
    pub fn state(&self) -> DebateState {
        match self.turns.last() {
            None => DebateState::start(self.rounds),
            Some(turn) => DebateState::Stage(turn.stage()).advance(self.rounds),
        }
    }

    /// Append a turn; it must be the next expected stage.
    pub fn record(&mut self, turn: DebateTurn, cost: f64) -> Result<(), SessionError> {
        if self.status == DebateStatus::Completed {
            return Err(SessionError::Sealed);
        }
        match self.state() {
            DebateState::Stage(expected) if expected == turn.stage() => {}
            DebateState::Stage(expected) => {
                return Err(SessionError::OutOfOrder {
                    expected: expected.label(),
                    actual: turn.stage().label(),
                });
            }
            DebateState::Final => return Err(SessionError::Sealed),
        }
        self.total_tokens = self.total_tokens + turn.tokens;
        self.estimated_cost += cost;
        self.turns.push(turn);
        Ok(())
    }

    /// Turns of one round, in speaking order
    pub fn round(&self, round: u32) -> impl Iterator<Item = &DebateTurn> {
        self.turns.iter().filter(move |t| t.round == round)
    }

    /// Votes across every turn
    pub fn tally(&self) -> VoteTally {
        VoteTally::from_actions(self.turns.iter().map(|t| t.decision.action))
    }

    /// Seal the session: the final decision is the last round's synthesizer.
    pub fn seal(&mut self) -> Result<&FinalDecision, SessionError> {
        if self.status == DebateStatus::Completed {
            return Err(SessionError::Sealed);
        }
        let synthesizer = self
            .round(self.rounds)
            .find(|t| t.persona == Persona::Synthesizer)
            .ok_or(SessionError::MissingFinalDecision(self.rounds))?;
        let decision = synthesizer.decision.clone();
        let narrative = narrative(&decision, self.rounds, &self.tally());

        self.status = DebateStatus::Completed;
        self.ended_at = Some(Utc::now());
        Ok(&*self.final_decision.insert(FinalDecision {
            decision,
            narrative,
        }))
    }

    pub fn duration_ms(&self) -> Option<i64> {
        self.ended_at
            .map(|end| (end - self.started_at).num_milliseconds())
    }
}

/// One-sentence summary of how the debate ended
pub fn narrative(decision: &Decision, rounds: u32, tally: &VoteTally) -> String {
    let symbol = decision
        .symbol
        .as_deref()
        .map(|s| format!(" {}", s))
        .unwrap_or_default();
    format!(
        "After {} round{} of debate the synthesizer recommends {}{} with {:.0}% confidence ({} across all turns).",
        rounds,
        if rounds == 1 { "" } else { "s" },
        decision.action,
        symbol,
        decision.confidence * 100.0,
        tally.display()
    )
}
