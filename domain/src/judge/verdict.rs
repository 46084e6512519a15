//! Trading and screening judge verdicts.
//!
//! Parsing never yields an actionable verdict by accident: when the judge
//! output cannot be read, or names no valid action, the result is the most
//! conservative action with `Critical` risk and low confidence.

use super::rating::RiskLevel;
use crate::decision::decision::{normalize_confidence, number_value};
use crate::decision::{ScreeningAction, TradeAction};
use crate::extraction::extract_object;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::str::FromStr;

/// Confidence attached to the fallback verdict
pub const FALLBACK_CONFIDENCE: f64 = 0.1;

/// An action set with a designated most-conservative member
pub trait VerdictAction: Copy + FromStr + std::fmt::Display {
    const CONSERVATIVE: Self;
}

impl VerdictAction for TradeAction {
    const CONSERVATIVE: Self = TradeAction::Hold;
}

impl VerdictAction for ScreeningAction {
    const CONSERVATIVE: Self = ScreeningAction::Skip;
}

/// Parsed judge verdict over a debate transcript
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verdict<A> {
    pub action: A,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
    /// Within [0, 1]
    pub confidence: f64,
    pub risk_level: RiskLevel,
    pub reasoning: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub key_factors: Vec<String>,
    /// True when this is the conservative fallback
    #[serde(default)]
    pub fallback: bool,
}

pub type TradingVerdict = Verdict<TradeAction>;
pub type ScreeningVerdict = Verdict<ScreeningAction>;

impl<A: VerdictAction> Verdict<A> {
    /// Most conservative verdict, used whenever parsing fails
    pub fn conservative(reason: impl Into<String>) -> Self {
        Self {
            action: A::CONSERVATIVE,
            symbol: None,
            confidence: FALLBACK_CONFIDENCE,
            risk_level: RiskLevel::Critical,
            reasoning: reason.into(),
            key_factors: Vec::new(),
            fallback: true,
        }
    }

    fn from_object(object: &Map<String, Value>) -> Option<Self> {
        let action = ["action", "decision", "recommendation", "verdict"]
            .iter()
            .find_map(|k| object.get(*k).and_then(Value::as_str))
            .and_then(|s| s.trim().parse::<A>().ok())?;

        let text = |key: &str| {
            object
                .get(key)
                .and_then(Value::as_str)
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
        };

        let key_factors = object
            .get("key_factors")
            .or_else(|| object.get("keyFactors"))
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        Some(Self {
            action,
            symbol: text("symbol").map(|s| s.to_uppercase()),
            confidence: object
                .get("confidence")
                .and_then(number_value)
                .map(normalize_confidence)
                .unwrap_or(FALLBACK_CONFIDENCE),
            risk_level: text("risk_level")
                .or_else(|| text("riskLevel"))
                .or_else(|| text("risk"))
                .and_then(|s| RiskLevel::scan(&s))
                .unwrap_or(RiskLevel::High),
            reasoning: text("reasoning").unwrap_or_default(),
            key_factors,
            fallback: false,
        })
    }
}

/// Parse judge output into a verdict, falling back to
/// [`Verdict::conservative`] when no valid action can be read.
pub fn parse_verdict<A: VerdictAction>(raw: &str) -> Verdict<A> {
    let extraction = extract_object(raw);
    let Some(object) = extraction.data else {
        return Verdict::conservative(format!(
            "Unable to parse judge verdict; defaulting to {}",
            A::CONSERVATIVE
        ));
    };
    Verdict::from_object(&object).unwrap_or_else(|| {
        Verdict::conservative(format!(
            "Judge verdict named no valid action; defaulting to {}",
            A::CONSERVATIVE
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_trading_verdict() {
        let raw = r#"{"action": "BUY", "symbol": "tsla", "confidence": 72, "risk_level": "Medium", "reasoning": "Momentum", "key_factors": ["volume", "gap"]}"#;
        let verdict: TradingVerdict = parse_verdict(raw);
        assert_eq!(verdict.action, TradeAction::Buy);
        assert_eq!(verdict.symbol.as_deref(), Some("TSLA"));
        assert!((verdict.confidence - 0.72).abs() < 1e-9);
        assert_eq!(verdict.risk_level, RiskLevel::Medium);
        assert_eq!(verdict.key_factors, vec!["volume", "gap"]);
        assert!(!verdict.fallback);
    }

    #[test]
    fn test_trading_parse_failure_is_hold_critical() {
        let verdict: TradingVerdict = parse_verdict("I think buying is wise.");
        assert_eq!(verdict.action, TradeAction::Hold);
        assert_eq!(verdict.risk_level, RiskLevel::Critical);
        assert!(verdict.confidence <= 0.2);
        assert!(verdict.fallback);
    }

    #[test]
    fn test_screening_parse_failure_is_skip() {
        let verdict: ScreeningVerdict = parse_verdict("{{{ not json");
        assert_eq!(verdict.action, ScreeningAction::Skip);
        assert_eq!(verdict.risk_level, RiskLevel::Critical);
        assert!(verdict.fallback);
    }

    #[test]
    fn test_invalid_action_never_actionable() {
        let verdict: TradingVerdict = parse_verdict(r#"{"action": "STRONG BUY", "confidence": 0.95}"#);
        assert_eq!(verdict.action, TradeAction::Hold);
        assert!(verdict.fallback);

        let verdict: ScreeningVerdict = parse_verdict(r#"{"action": "SELL"}"#);
        assert_eq!(verdict.action, ScreeningAction::Skip);
    }

    #[test]
    fn test_screening_watch() {
        let verdict: ScreeningVerdict =
            parse_verdict("```json\n{\"action\": \"watch\", \"confidence\": 0.55, \"risk\": \"high\"}\n```");
        assert_eq!(verdict.action, ScreeningAction::Watch);
        assert_eq!(verdict.risk_level, RiskLevel::High);
    }
}
