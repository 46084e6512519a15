//! Judge and debate role configuration from TOML (`[judge]`, `[debate]` sections)

use crate::config::validation::ConfigIssue;
use serde::{Deserialize, Serialize};
use verdict_domain::{BackendKind, DebateBindings, JudgeMode, PersonaBinding};

/// One backend/model pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileBindingConfig {
    pub backend: String,
    pub model: String,
}

impl FileBindingConfig {
    pub fn to_binding(&self) -> PersonaBinding {
        let backend: BackendKind = match self.backend.parse() {
            Ok(kind) => kind,
            Err(never) => match never {},
        };
        PersonaBinding::new(backend, self.model.trim())
    }

    fn check(&self, field: &str) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();
        if self.backend.trim().is_empty() {
            issues.push(ConfigIssue::error(
                format!("{}.backend", field),
                "backend cannot be empty",
            ));
        }
        if self.model.trim().is_empty() {
            issues.push(ConfigIssue::error(
                format!("{}.model", field),
                "model name cannot be empty",
            ));
        }
        issues
    }
}

/// General and trading judge
///
/// ```toml
/// [judge]
/// backend = "anthropic"
/// model = "claude-opus-4"
/// mode = "detailed"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileJudgeConfig {
    pub backend: Option<String>,
    pub model: Option<String>,
    pub mode: String,
}

impl Default for FileJudgeConfig {
    fn default() -> Self {
        Self {
            backend: None,
            model: None,
            mode: JudgeMode::default().as_str().to_string(),
        }
    }
}

impl FileJudgeConfig {
    /// Configured judge, if both backend and model are set
    pub fn binding(&self) -> Option<PersonaBinding> {
        match (&self.backend, &self.model) {
            (Some(backend), Some(model)) => Some(
                FileBindingConfig {
                    backend: backend.clone(),
                    model: model.clone(),
                }
                .to_binding(),
            ),
            _ => None,
        }
    }

    /// Parse `mode`, falling back to concise with an issue on bad input
    pub fn parse_mode(&self) -> (JudgeMode, Vec<ConfigIssue>) {
        match self.mode.parse::<JudgeMode>() {
            Ok(mode) => (mode, Vec::new()),
            Err(e) => (
                JudgeMode::default(),
                vec![ConfigIssue::warning("judge.mode", format!("{}; using concise", e))],
            ),
        }
    }

    pub(super) fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = self.parse_mode().1;
        match (&self.backend, &self.model) {
            (Some(_), None) => issues.push(ConfigIssue::error(
                "judge.model",
                "judge backend is set but model is missing",
            )),
            (None, Some(_)) => issues.push(ConfigIssue::error(
                "judge.backend",
                "judge model is set but backend is missing",
            )),
            (Some(backend), Some(model)) => issues.extend(
                FileBindingConfig {
                    backend: backend.clone(),
                    model: model.clone(),
                }
                .check("judge"),
            ),
            (None, None) => {}
        }
        issues
    }
}

/// Debate rounds and persona bindings
///
/// ```toml
/// [debate]
/// rounds = 2
/// analyst = { backend = "openai", model = "gpt-4o" }
/// critic = { backend = "google", model = "gemini-2.5-pro" }
/// synthesizer = { backend = "anthropic", model = "claude-opus-4" }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileDebateConfig {
    pub rounds: u32,
    pub analyst: Option<FileBindingConfig>,
    pub critic: Option<FileBindingConfig>,
    pub synthesizer: Option<FileBindingConfig>,
}

impl Default for FileDebateConfig {
    fn default() -> Self {
        Self {
            rounds: 2,
            analyst: None,
            critic: None,
            synthesizer: None,
        }
    }
}

impl FileDebateConfig {
    /// All three bindings, or `None` if any persona is unbound
    pub fn bindings(&self) -> Option<DebateBindings> {
        Some(DebateBindings {
            analyst: self.analyst.as_ref()?.to_binding(),
            critic: self.critic.as_ref()?.to_binding(),
            synthesizer: self.synthesizer.as_ref()?.to_binding(),
        })
    }

    pub(super) fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();
        if self.rounds == 0 {
            issues.push(ConfigIssue::error("debate.rounds", "rounds must be at least 1"));
        }
        let personas = [
            ("debate.analyst", &self.analyst),
            ("debate.critic", &self.critic),
            ("debate.synthesizer", &self.synthesizer),
        ];
        let bound = personas.iter().filter(|(_, b)| b.is_some()).count();
        for (field, binding) in personas {
            match binding {
                Some(binding) => issues.extend(binding.check(field)),
                None if bound > 0 => issues.push(ConfigIssue::warning(
                    field,
                    "persona is unbound; debates need all three personas",
                )),
                None => {}
            }
        }
        issues
    }
}
