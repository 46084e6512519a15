//! General judge verdict and concise-mode parsing.

use super::category::QueryDomain;
use super::rating::{Actionable, RiskLevel};
use crate::decision::decision::number_value;
use crate::extraction::extract_object;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Output shape requested from the general judge
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JudgeMode {
    /// Single JSON object
    #[default]
    Concise,
    /// Sectioned report
    Detailed,
}

impl JudgeMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            JudgeMode::Concise => "concise",
            JudgeMode::Detailed => "detailed",
        }
    }
}

impl std::fmt::Display for JudgeMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for JudgeMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "concise" | "short" => Ok(JudgeMode::Concise),
            "detailed" | "full" => Ok(JudgeMode::Detailed),
            other => Err(format!("Unknown judge mode: {}. Valid: concise, detailed", other)),
        }
    }
}

/// Parsed general-judge analysis
///
/// `consensus_score` and `confidence` are on a 0-100 scale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JudgeVerdict {
    pub consensus_score: f64,
    pub best_answer: String,
    pub confidence: f64,
    pub actionable: Actionable,
    pub risk_level: RiskLevel,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub agreements: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub disagreements: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommendation: Option<String>,
    pub mode: JudgeMode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<QueryDomain>,
    /// True when nothing could be parsed and every field is a fallback
    #[serde(default)]
    pub fallback: bool,
}

impl JudgeVerdict {
    /// Fixed verdict returned when concise output cannot be parsed at all
    pub fn safe_default() -> Self {
        Self {
            consensus_score: 50.0,
            best_answer: "Unable to parse judge analysis".to_string(),
            confidence: 30.0,
            actionable: Actionable::No,
            risk_level: RiskLevel::High,
            agreements: Vec::new(),
            disagreements: Vec::new(),
            recommendation: None,
            mode: JudgeMode::Concise,
            domain: None,
            fallback: true,
        }
    }

    pub fn with_domain(mut self, domain: QueryDomain) -> Self {
        self.domain = Some(domain);
        self
    }
}

/// Clamp a 0-100 score, mapping non-finite values to `fallback`
pub(crate) fn clamp_score(value: f64, fallback: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, 100.0)
    } else {
        fallback
    }
}

/// Parse concise judge output.
///
/// Fields missing from a partially valid object take their safe-default
/// value; numbers are always clamped to [0, 100].
pub fn parse_concise(raw: &str) -> JudgeVerdict {
    let extraction = extract_object(raw);
    match extraction.data {
        Some(object) => from_object(&object),
        None => JudgeVerdict::safe_default(),
    }
}

fn from_object(object: &Map<String, Value>) -> JudgeVerdict {
    let defaults = JudgeVerdict::safe_default();

    let number = |keys: &[&str], fallback: f64| {
        keys.iter()
            .find_map(|k| object.get(*k).and_then(number_value))
            .map(|v| clamp_score(v, fallback))
            .unwrap_or(fallback)
    };
    let text = |keys: &[&str]| {
        keys.iter()
            .find_map(|k| object.get(*k).and_then(Value::as_str))
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    };

    JudgeVerdict {
        consensus_score: number(&["consensusScore", "consensus_score"], defaults.consensus_score),
        best_answer: text(&["bestAnswer", "best_answer", "answer"]).unwrap_or(defaults.best_answer),
        confidence: number(&["confidence"], defaults.confidence),
        actionable: text(&["actionable"])
            .and_then(|s| Actionable::scan(&s))
            .unwrap_or(defaults.actionable),
        risk_level: text(&["riskLevel", "risk_level", "risk"])
            .and_then(|s| RiskLevel::scan(&s))
            .unwrap_or(defaults.risk_level),
        fallback: false,
        ..defaults
    }
}
