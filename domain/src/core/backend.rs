//! Backend identity value objects
//!
//! A backend is a text-generation vendor or channel. Backends form a closed
//! set so routing is a table lookup, never a runtime type inspection.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Known text-generation backends (Value Object)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BackendKind {
    Anthropic,
    OpenAi,
    Google,
    Groq,
    Mistral,
    Xai,
    DeepSeek,
    Perplexity,
    Ollama,
    /// Any other OpenAI-compatible endpoint, keyed by name
    Custom(String),
}

impl BackendKind {
    /// Get the string identifier for this backend
    pub fn as_str(&self) -> &str {
        match self {
            BackendKind::Anthropic => "anthropic",
            BackendKind::OpenAi => "openai",
            BackendKind::Google => "google",
            BackendKind::Groq => "groq",
            BackendKind::Mistral => "mistral",
            BackendKind::Xai => "xai",
            BackendKind::DeepSeek => "deepseek",
            BackendKind::Perplexity => "perplexity",
            BackendKind::Ollama => "ollama",
            BackendKind::Custom(s) => s,
        }
    }

    /// Human-friendly vendor name
    pub fn display_name(&self) -> &str {
        match self {
            BackendKind::Anthropic => "Anthropic",
            BackendKind::OpenAi => "OpenAI",
            BackendKind::Google => "Google",
            BackendKind::Groq => "Groq",
            BackendKind::Mistral => "Mistral",
            BackendKind::Xai => "xAI",
            BackendKind::DeepSeek => "DeepSeek",
            BackendKind::Perplexity => "Perplexity",
            BackendKind::Ollama => "Ollama",
            BackendKind::Custom(s) => s,
        }
    }
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for BackendKind {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_lowercase().as_str() {
            "anthropic" | "claude" => BackendKind::Anthropic,
            "openai" | "gpt" => BackendKind::OpenAi,
            "google" | "gemini" => BackendKind::Google,
            "groq" => BackendKind::Groq,
            "mistral" => BackendKind::Mistral,
            "xai" | "grok" => BackendKind::Xai,
            "deepseek" => BackendKind::DeepSeek,
            "perplexity" => BackendKind::Perplexity,
            "ollama" => BackendKind::Ollama,
            other => BackendKind::Custom(other.to_string()),
        })
    }
}

impl Serialize for BackendKind {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for BackendKind {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        match s.parse() {
            Ok(kind) => Ok(kind),
            Err(never) => match never {},
        }
    }
}

/// Billing class of a concrete adapter instance
///
/// - `Subscription`: reached through a pre-paid channel (e.g. a locally
///   authenticated vendor CLI); never billed per call
/// - `Metered`: billed per call / per token
/// - `Free`: explicitly free-listed (local models, free tiers)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdapterClass {
    Subscription,
    Metered,
    Free,
}

impl AdapterClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            AdapterClass::Subscription => "subscription",
            AdapterClass::Metered => "metered",
            AdapterClass::Free => "free",
        }
    }

    /// Whether calls through this class incur a per-call charge
    pub fn is_billed_per_call(&self) -> bool {
        matches!(self, AdapterClass::Metered)
    }
}

impl std::fmt::Display for AdapterClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for AdapterClass {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "subscription" | "sub" => Ok(AdapterClass::Subscription),
            "metered" | "api" => Ok(AdapterClass::Metered),
            "free" => Ok(AdapterClass::Free),
            other => Err(format!(
                "Unknown adapter class: {}. Valid: subscription, metered, free",
                other
            )),
        }
    }
}
