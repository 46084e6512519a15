//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and use domain types where appropriate.

mod backends;
mod execution;
mod output;
mod roles;
mod server;

pub use backends::{BackendProtocol, FileBackendConfig, default_api_key_env, default_base_url};
pub use execution::FileExecutionConfig;
pub use output::FileOutputConfig;
pub use roles::{FileBindingConfig, FileDebateConfig, FileJudgeConfig};
pub use server::{FileLoggingConfig, FileResearchConfig, FileServerConfig};

use super::error::ConfigError;
use super::validation::ConfigIssue;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use verdict_application::ExecutionParams;
use verdict_domain::{ModelWeights, TierDefinition, TierPolicy};

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub server: FileServerConfig,
    pub execution: FileExecutionConfig,
    pub judge: FileJudgeConfig,
    pub debate: FileDebateConfig,
    /// Custom tiers on top of the built-in free / pro / metered
    pub tiers: BTreeMap<String, TierDefinition>,
    pub backends: BTreeMap<String, FileBackendConfig>,
    /// Model-prefix → power weight overrides
    pub weights: BTreeMap<String, f64>,
    pub logging: FileLoggingConfig,
    pub research: FileResearchConfig,
    pub output: FileOutputConfig,
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            server: FileServerConfig::default(),
            execution: FileExecutionConfig::default(),
            judge: FileJudgeConfig::default(),
            debate: FileDebateConfig::default(),
            tiers: BTreeMap::new(),
            backends: backends::default_backends(),
            weights: BTreeMap::new(),
            logging: FileLoggingConfig::default(),
            research: FileResearchConfig::default(),
            output: FileOutputConfig::default(),
        }
    }
}

impl FileConfig {
    pub fn execution_params(&self) -> ExecutionParams {
        self.execution.to_params(self.debate.rounds)
    }

    /// Built-in tiers plus `[tiers]`; an invalid definition is an error
    pub fn tier_policy(&self) -> Result<TierPolicy, ConfigError> {
        TierPolicy::with_definitions(
            self.tiers
                .iter()
                .map(|(id, definition)| (id.clone(), definition.clone())),
        )
        .map_err(ConfigError::Tier)
    }

    pub fn model_weights(&self) -> ModelWeights {
        ModelWeights::with_overrides(self.weights.iter().map(|(k, v)| (k.clone(), *v)))
    }

    /// Validate the entire configuration, returning all detected issues.
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        // 1. Execution limits
        if self.execution.timeout_seconds == 0 {
            issues.push(ConfigIssue::error(
                "execution.timeout_seconds",
                "timeout_seconds cannot be 0",
            ));
        }

        // 2. Tiers, including the default tier
        match self.tier_policy() {
            Ok(policy) => {
                if policy.get(&self.execution.default_tier).is_err() {
                    issues.push(ConfigIssue::error(
                        "execution.default_tier",
                        format!(
                            "unknown tier '{}'; known: {}",
                            self.execution.default_tier,
                            policy.ids().collect::<Vec<_>>().join(", ")
                        ),
                    ));
                }
            }
            Err(e) => issues.push(ConfigIssue::error("tiers", e.to_string())),
        }

        // 3. Backends
        for (name, backend) in &self.backends {
            issues.extend(backend.validate(name));
        }
        if !self.backends.values().any(|b| b.enabled) {
            issues.push(ConfigIssue::error("backends", "no enabled backends"));
        }

        // 4. Roles
        issues.extend(self.judge.validate());
        issues.extend(self.debate.validate());
        let bindings = self
            .judge
            .binding()
            .into_iter()
            .map(|b| ("judge".to_string(), b))
            .chain(self.debate.bindings().into_iter().flat_map(|d| {
                [
                    ("debate.analyst".to_string(), d.analyst),
                    ("debate.critic".to_string(), d.critic),
                    ("debate.synthesizer".to_string(), d.synthesizer),
                ]
            }));
        for (field, binding) in bindings {
            let served = self
                .backends
                .iter()
                .any(|(name, b)| b.enabled && b.backend_kind(name) == binding.backend);
            if !served {
                issues.push(ConfigIssue::warning(
                    format!("{}.backend", field),
                    format!("no enabled backend serves '{}'", binding.backend),
                ));
            }
        }

        // 5. Weights
        for (prefix, weight) in &self.weights {
            if !(0.0..=1.0).contains(weight) {
                issues.push(ConfigIssue::warning(
                    format!("weights.{}", prefix),
                    format!("weight {} is outside [0, 1] and will be clamped", weight),
                ));
            }
        }

        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use verdict_domain::{AdapterClass, BackendKind, OutputFormat, TierBilling};

    #[test]
    fn test_deserialize_full_config() {
        let toml_str = r#"
[server]
port = 9000

[execution]
timeout_seconds = 30
default_tier = "team"

[judge]
backend = "anthropic"
model = "claude-opus-4"
mode = "detailed"

[debate]
rounds = 3
analyst = { backend = "openai", model = "gpt-4o" }
critic = { backend = "ollama", model = "llama3.3" }
synthesizer = { backend = "anthropic", model = "claude-sonnet-4" }

[tiers.team]
billing = "subscription"

[backends.claude-cli]
kind = "anthropic"
command = "claude"
args = ["-p"]

[weights]
"llama" = 0.6

[output]
format = "full"
color = false
"#;

        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.execution.timeout_seconds, 30);
        assert_eq!(config.judge.binding().unwrap().model, "claude-opus-4");
        assert_eq!(config.debate.rounds, 3);
        assert_eq!(config.tiers["team"].billing, TierBilling::Subscription);
        assert_eq!(config.output.format, Some(OutputFormat::Full));

        let cli = &config.backends["claude-cli"];
        assert_eq!(cli.class(&BackendKind::Anthropic), AdapterClass::Subscription);

        let policy = config.tier_policy().unwrap();
        assert!(policy.get("team").is_ok());
        assert_eq!(config.model_weights().weight("llama3.3"), 0.6);
        assert_eq!(config.execution_params().debate_rounds, 3);
    }

    #[test]
    fn test_default_config() {
        let config = FileConfig::default();
        assert_eq!(config.debate.rounds, 2);
        assert!(config.judge.binding().is_none());
        assert!(config.backends.contains_key("ollama"));
        assert_eq!(config.execution_params().default_tier, "metered");
    }

    #[test]
    fn test_validate_reports_every_problem() {
        let toml_str = r#"
[execution]
timeout_seconds = 0
default_tier = "enterprise"

[debate]
rounds = 0

[weights]
"gpt-4o" = 1.5
"#;
        let config: FileConfig = toml::from_str(toml_str).unwrap();
        let issues = config.validate();
        let fields: Vec<&str> = issues.iter().map(|i| i.field.as_str()).collect();

        assert!(fields.contains(&"execution.timeout_seconds"));
        assert!(fields.contains(&"execution.default_tier"));
        assert!(fields.contains(&"debate.rounds"));
        assert!(fields.contains(&"weights.gpt-4o"));
    }

    #[test]
    fn test_subscription_tier_with_metered_rejected() {
        let toml_str = r#"
[tiers.cheap]
billing = "subscription"
allowed = ["subscription", "metered"]
"#;
        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert!(matches!(config.tier_policy(), Err(ConfigError::Tier(_))));
        assert!(config.validate().iter().any(|i| i.field == "tiers" && i.is_error()));
    }

    #[test]
    fn test_unserved_binding_warns() {
        let toml_str = r#"
[judge]
backend = "mistral"
model = "mistral-large"
"#;
        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert!(
            config
                .validate()
                .iter()
                .any(|i| i.field == "judge.backend" && !i.is_error())
        );
    }
}
