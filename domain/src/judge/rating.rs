//! Risk and actionability ratings emitted by judges.

use serde::{Deserialize, Serialize};

/// Risk rating, ordered from least to most severe
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RiskLevel {
    None,
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::None => "None",
            RiskLevel::Low => "Low",
            RiskLevel::Medium => "Medium",
            RiskLevel::High => "High",
            RiskLevel::Critical => "Critical",
        }
    }

    /// Find the most severe level mentioned anywhere in free text
    pub fn scan(text: &str) -> Option<Self> {
        let lower = text.to_lowercase();
        [
            RiskLevel::Critical,
            RiskLevel::High,
            RiskLevel::Medium,
            RiskLevel::Low,
            RiskLevel::None,
        ]
        .into_iter()
        .find(|level| lower.contains(&level.as_str().to_lowercase()))
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for RiskLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "none" => Ok(RiskLevel::None),
            "low" => Ok(RiskLevel::Low),
            "medium" | "moderate" => Ok(RiskLevel::Medium),
            "high" => Ok(RiskLevel::High),
            "critical" | "severe" => Ok(RiskLevel::Critical),
            other => Err(format!("Unknown risk level: {}", other)),
        }
    }
}

/// Whether the judged answer is safe to act on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Actionable {
    Yes,
    Caution,
    No,
}

impl Actionable {
    pub fn as_str(&self) -> &'static str {
        match self {
            Actionable::Yes => "Yes",
            Actionable::Caution => "Caution",
            Actionable::No => "No",
        }
    }

    /// Read the first recognizable answer from free text
    pub fn scan(text: &str) -> Option<Self> {
        text.split(|c: char| !c.is_alphanumeric())
            .find_map(|word| word.parse().ok())
    }
}

impl std::fmt::Display for Actionable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Actionable {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "yes" | "true" => Ok(Actionable::Yes),
            "caution" | "maybe" | "partial" => Ok(Actionable::Caution),
            "no" | "false" => Ok(Actionable::No),
            other => Err(format!("Unknown actionable value: {}", other)),
        }
    }
}
