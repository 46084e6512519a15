//! Debate stage state machine.

use super::persona::Persona;
use serde::{Deserialize, Serialize};

/// A single (round, persona) step. Rounds are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DebateStage {
    pub round: u32,
    pub persona: Persona,
}

impl DebateStage {
    pub fn new(round: u32, persona: Persona) -> Self {
        Self { round, persona }
    }

    /// Rounds after the first refine the previous round's transcript
    pub fn is_refinement(&self) -> bool {
        self.round > 1
    }

    pub fn label(&self) -> String {
        format!("R{}-{}", self.round, self.persona)
    }
}

impl std::fmt::Display for DebateStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Debate progress: either a stage to run, or done
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebateState {
    Stage(DebateStage),
    Final,
}

impl DebateState {
    /// First state of a debate with `rounds` rounds
    pub fn start(rounds: u32) -> Self {
        if rounds == 0 {
            DebateState::Final
        } else {
            DebateState::Stage(DebateStage::new(1, Persona::Analyst))
        }
    }

    /// Transition after the current stage succeeded
    pub fn advance(self, rounds: u32) -> Self {
        match self {
            DebateState::Final => DebateState::Final,
            DebateState::Stage(stage) => match stage.persona.next() {
                Some(persona) => DebateState::Stage(DebateStage::new(stage.round, persona)),
                None if stage.round < rounds => {
                    DebateState::Stage(DebateStage::new(stage.round + 1, Persona::Analyst))
                }
                None => DebateState::Final,
            },
        }
    }

    /// All stages for `rounds` rounds, in order
    pub fn plan(rounds: u32) -> Vec<DebateStage> {
        let mut stages = Vec::new();
        let mut state = DebateState::start(rounds);
        while let DebateState::Stage(stage) = state {
            stages.push(stage);
            state = state.advance(rounds);
        }
        stages
    }
}
