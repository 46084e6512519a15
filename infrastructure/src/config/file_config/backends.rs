//! Backend configuration from TOML (`[backends.<name>]` sections)
//!
//! Each table registers one adapter instance. Several instances may serve
//! the same backend kind with different billing classes:
//!
//! ```toml
//! [backends.claude-cli]
//! kind = "anthropic"
//! protocol = "cli"            # subscription-backed local CLI
//! command = "claude"
//! args = ["-p"]
//! model_flag = "--model"      # how the bound model is passed
//!
//! [backends.groq]
//! class = "metered"
//! api_key_env = "GROQ_API_KEY"
//!
//! [backends.ollama]
//! class = "free"
//! base_url = "http://localhost:11434/v1"
//! ```

use crate::config::validation::ConfigIssue;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use verdict_domain::{AdapterClass, BackendKind};

/// Wire protocol spoken to the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendProtocol {
    /// OpenAI-compatible chat completions
    OpenAi,
    /// Anthropic messages API
    Anthropic,
    /// Local vendor CLI reading the prompt as an argument
    Cli,
}

/// Raw backend configuration from TOML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileBackendConfig {
    /// Backend kind; defaults to the table name
    pub kind: Option<String>,
    /// Defaults to `cli` when `command` is set, else by kind
    pub protocol: Option<BackendProtocol>,
    /// Billing class; defaults to subscription for CLIs, free for local models
    pub class: Option<AdapterClass>,
    pub enabled: bool,
    pub base_url: Option<String>,
    /// Environment variable holding the API key
    pub api_key_env: Option<String>,
    pub command: Option<String>,
    pub args: Vec<String>,
    /// CLI flag that selects the model; the model is not passed when unset
    pub model_flag: Option<String>,
}

impl Default for FileBackendConfig {
    fn default() -> Self {
        Self {
            kind: None,
            protocol: None,
            class: None,
            enabled: true,
            base_url: None,
            api_key_env: None,
            command: None,
            args: Vec::new(),
            model_flag: None,
        }
    }
}

impl FileBackendConfig {
    pub fn backend_kind(&self, name: &str) -> BackendKind {
        match self.kind.as_deref().unwrap_or(name).parse() {
            Ok(kind) => kind,
            Err(never) => match never {},
        }
    }

    pub fn protocol(&self, kind: &BackendKind) -> BackendProtocol {
        if let Some(protocol) = self.protocol {
            return protocol;
        }
        if self.command.is_some() {
            BackendProtocol::Cli
        } else if *kind == BackendKind::Anthropic {
            BackendProtocol::Anthropic
        } else {
            BackendProtocol::OpenAi
        }
    }

    pub fn class(&self, kind: &BackendKind) -> AdapterClass {
        if let Some(class) = self.class {
            return class;
        }
        match (self.protocol(kind), kind) {
            (BackendProtocol::Cli, _) => AdapterClass::Subscription,
            (_, BackendKind::Ollama) => AdapterClass::Free,
            _ => AdapterClass::Metered,
        }
    }

    pub fn base_url(&self, kind: &BackendKind) -> Option<String> {
        self.base_url
            .clone()
            .or_else(|| default_base_url(kind).map(str::to_string))
    }

    pub fn api_key_env(&self, kind: &BackendKind) -> Option<String> {
        self.api_key_env
            .clone()
            .or_else(|| default_api_key_env(kind).map(str::to_string))
    }

    /// CLI program and arguments; the Anthropic CLI is the default program
    pub fn command(&self, kind: &BackendKind) -> Option<(String, Vec<String>)> {
        match (&self.command, kind) {
            (Some(command), _) => Some((command.clone(), self.args.clone())),
            (None, BackendKind::Anthropic) => Some(("claude".to_string(), vec!["-p".to_string()])),
            (None, _) => None,
        }
    }

    /// Model flag for CLI backends; the Claude CLI takes `--model`
    pub fn model_flag(&self, kind: &BackendKind) -> Option<String> {
        if let Some(flag) = &self.model_flag {
            return Some(flag.clone());
        }
        match self.command(kind) {
            Some((program, _)) if program == "claude" => Some("--model".to_string()),
            _ => None,
        }
    }

    pub(super) fn validate(&self, name: &str) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();
        if !self.enabled {
            return issues;
        }
        let field = |key: &str| format!("backends.{}.{}", name, key);
        let kind = self.backend_kind(name);

        match self.protocol(&kind) {
            BackendProtocol::Cli => {
                if self.command(&kind).is_none() {
                    issues.push(ConfigIssue::error(
                        field("command"),
                        "CLI backends need a command",
                    ));
                }
                if self.class(&kind) == AdapterClass::Metered {
                    issues.push(ConfigIssue::warning(
                        field("class"),
                        "CLI backend registered as metered; subscription tiers will not use it",
                    ));
                }
            }
            BackendProtocol::OpenAi | BackendProtocol::Anthropic => {
                if self.base_url(&kind).is_none() {
                    issues.push(ConfigIssue::error(
                        field("base_url"),
                        format!("no default endpoint for backend kind '{}'", kind),
                    ));
                }
                if let Some(env) = self.api_key_env(&kind)
                    && std::env::var(&env).map(|v| v.trim().is_empty()).unwrap_or(true)
                {
                    issues.push(ConfigIssue::warning(
                        field("api_key_env"),
                        format!("{} is not set; backend will not be registered", env),
                    ));
                }
            }
        }
        issues
    }
}

pub fn default_base_url(kind: &BackendKind) -> Option<&'static str> {
    Some(match kind {
        BackendKind::Anthropic => "https://api.anthropic.com",
        BackendKind::OpenAi => "https://api.openai.com/v1",
        BackendKind::Google => "https://generativelanguage.googleapis.com/v1beta/openai",
        BackendKind::Groq => "https://api.groq.com/openai/v1",
        BackendKind::Mistral => "https://api.mistral.ai/v1",
        BackendKind::Xai => "https://api.x.ai/v1",
        BackendKind::DeepSeek => "https://api.deepseek.com/v1",
        BackendKind::Perplexity => "https://api.perplexity.ai",
        BackendKind::Ollama => "http://localhost:11434/v1",
        BackendKind::Custom(_) => return None,
    })
}

pub fn default_api_key_env(kind: &BackendKind) -> Option<&'static str> {
    Some(match kind {
        BackendKind::Anthropic => "ANTHROPIC_API_KEY",
        BackendKind::OpenAi => "OPENAI_API_KEY",
        BackendKind::Google => "GEMINI_API_KEY",
        BackendKind::Groq => "GROQ_API_KEY",
        BackendKind::Mistral => "MISTRAL_API_KEY",
        BackendKind::Xai => "XAI_API_KEY",
        BackendKind::DeepSeek => "DEEPSEEK_API_KEY",
        BackendKind::Perplexity => "PERPLEXITY_API_KEY",
        BackendKind::Ollama | BackendKind::Custom(_) => return None,
    })
}

/// Backends registered when the config names none of its own
pub fn default_backends() -> BTreeMap<String, FileBackendConfig> {
    ["anthropic", "openai", "ollama"]
        .into_iter()
        .map(|name| (name.to_string(), FileBackendConfig::default()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_defaults_to_table_name() {
        let config = FileBackendConfig::default();
        assert_eq!(config.backend_kind("groq"), BackendKind::Groq);
        assert_eq!(config.protocol(&BackendKind::Groq), BackendProtocol::OpenAi);
        assert_eq!(config.class(&BackendKind::Groq), AdapterClass::Metered);
        assert_eq!(
            config.base_url(&BackendKind::Groq).as_deref(),
            Some("https://api.groq.com/openai/v1")
        );
    }

    #[test]
    fn test_cli_backend_is_subscription() {
        let config: FileBackendConfig = toml::from_str(
            r#"
kind = "anthropic"
command = "claude"
args = ["-p", "--output-format", "text"]
"#,
        )
        .unwrap();
        let kind = config.backend_kind("claude-cli");
        assert_eq!(kind, BackendKind::Anthropic);
        assert_eq!(config.protocol(&kind), BackendProtocol::Cli);
        assert_eq!(config.class(&kind), AdapterClass::Subscription);
        assert_eq!(config.command(&kind).unwrap().1.len(), 3);
    }

    #[test]
    fn test_model_flag() {
        let claude: FileBackendConfig = toml::from_str(
            r#"
kind = "anthropic"
command = "claude"
"#,
        )
        .unwrap();
        assert_eq!(
            claude.model_flag(&BackendKind::Anthropic).as_deref(),
            Some("--model")
        );

        let custom: FileBackendConfig = toml::from_str(
            r#"
command = "gemini"
model_flag = "-m"
"#,
        )
        .unwrap();
        assert_eq!(custom.model_flag(&BackendKind::Google).as_deref(), Some("-m"));

        let bare: FileBackendConfig = toml::from_str(r#"command = "llm""#).unwrap();
        assert_eq!(bare.model_flag(&BackendKind::OpenAi), None);
    }

    #[test]
    fn test_local_models_are_free() {
        let config = FileBackendConfig::default();
        assert_eq!(config.class(&BackendKind::Ollama), AdapterClass::Free);
        assert_eq!(config.api_key_env(&BackendKind::Ollama), None);
    }

    #[test]
    fn test_custom_backend_needs_base_url() {
        let config = FileBackendConfig::default();
        let issues = config.validate("together");
        assert!(issues.iter().any(|i| i.is_error() && i.field == "backends.together.base_url"));

        let config = FileBackendConfig {
            base_url: Some("https://api.together.xyz/v1".to_string()),
            ..Default::default()
        };
        assert!(config.validate("together").is_empty());
    }

    #[test]
    fn test_cli_without_command_is_error() {
        let config = FileBackendConfig {
            protocol: Some(BackendProtocol::Cli),
            ..Default::default()
        };
        assert!(config.validate("groq").iter().any(|i| i.is_error()));
    }

    #[test]
    fn test_disabled_backend_skips_validation() {
        let config = FileBackendConfig {
            enabled: false,
            ..Default::default()
        };
        assert!(config.validate("together").is_empty());
    }
}
