//! Debate personas and their backend bindings.

use crate::core::backend::BackendKind;
use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};

/// Role a model plays within a debate round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Persona {
    Analyst,
    Critic,
    Synthesizer,
}

impl Persona {
    /// Speaking order within a round
    pub const ORDER: [Persona; 3] = [Persona::Analyst, Persona::Critic, Persona::Synthesizer];

    pub fn as_str(&self) -> &'static str {
        match self {
            Persona::Analyst => "analyst",
            Persona::Critic => "critic",
            Persona::Synthesizer => "synthesizer",
        }
    }

    pub fn next(&self) -> Option<Persona> {
        match self {
            Persona::Analyst => Some(Persona::Critic),
            Persona::Critic => Some(Persona::Synthesizer),
            Persona::Synthesizer => None,
        }
    }

    /// What the persona is asked to do
    pub fn brief(&self) -> &'static str {
        match self {
            Persona::Analyst => {
                "You are the ANALYST. Build the strongest evidence-based case for a trading decision."
            }
            Persona::Critic => {
                "You are the CRITIC. Stress-test the analysis: find flawed assumptions, missing risks and overconfidence."
            }
            Persona::Synthesizer => {
                "You are the SYNTHESIZER. Weigh the analysis against the critique and commit to one decision."
            }
        }
    }
}

impl std::fmt::Display for Persona {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A persona bound to a backend and model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonaBinding {
    pub backend: BackendKind,
    pub model: String,
}

impl PersonaBinding {
    pub fn new(backend: BackendKind, model: impl Into<String>) -> Self {
        Self {
            backend,
            model: model.into(),
        }
    }

    pub fn label(&self) -> String {
        format!("{}/{}", self.backend, self.model)
    }
}

/// One binding per persona
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DebateBindings {
    pub analyst: PersonaBinding,
    pub critic: PersonaBinding,
    pub synthesizer: PersonaBinding,
}

impl DebateBindings {
    pub fn get(&self, persona: Persona) -> &PersonaBinding {
        match persona {
            Persona::Analyst => &self.analyst,
            Persona::Critic => &self.critic,
            Persona::Synthesizer => &self.synthesizer,
        }
    }

    /// Reject bindings with blank model ids
    pub fn validate(&self) -> Result<(), DomainError> {
        for persona in Persona::ORDER {
            let binding = self.get(persona);
            if binding.model.trim().is_empty() {
                return Err(DomainError::InvalidIdentifier(format!(
                    "{} model id is empty",
                    persona
                )));
            }
            if binding.backend.as_str().trim().is_empty() {
                return Err(DomainError::InvalidIdentifier(format!(
                    "{} backend id is empty",
                    persona
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_persona_order() {
        assert_eq!(Persona::Analyst.next(), Some(Persona::Critic));
        assert_eq!(Persona::Critic.next(), Some(Persona::Synthesizer));
        assert_eq!(Persona::Synthesizer.next(), None);
    }

    #[test]
    fn test_bindings_validate() {
        let good = PersonaBinding::new(BackendKind::Anthropic, "claude-sonnet-4");
        let bindings = DebateBindings {
            analyst: good.clone(),
            critic: PersonaBinding::new(BackendKind::OpenAi, " "),
            synthesizer: good,
        };
        assert!(matches!(
            bindings.validate(),
            Err(DomainError::InvalidIdentifier(msg)) if msg.starts_with("critic")
        ));
    }

    #[test]
    fn test_bindings_deserialize() {
        let json = r#"{
            "analyst": {"backend": "claude", "model": "claude-sonnet-4"},
            "critic": {"backend": "openai", "model": "gpt-4o"},
            "synthesizer": {"backend": "google", "model": "gemini-2.5-pro"}
        }"#;
        let bindings: DebateBindings = serde_json::from_str(json).unwrap();
        assert_eq!(bindings.get(Persona::Analyst).backend, BackendKind::Anthropic);
        assert_eq!(bindings.get(Persona::Synthesizer).label(), "google/gemini-2.5-pro");
        assert!(bindings.validate().is_ok());
    }
}
