//! Structured trading decisions cast from repaired model output.

use super::action::TradeAction;
use crate::extraction::{RepairStrategy, extract_object};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Confidence assumed when a model omits it
const DEFAULT_CONFIDENCE: f64 = 0.5;

/// Errors from casting model output into a [`Decision`]
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DecisionError {
    #[error("Could not extract a JSON object: {0}")]
    Unparseable(String),

    #[error("Decision object has no action field")]
    MissingAction,

    #[error("Invalid action: {0}")]
    InvalidAction(String),
}

/// A BUY/SELL/HOLD judgment (Value Object)
///
/// Only produced from a successfully extracted object, see [`parse_decision`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    pub action: TradeAction,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<f64>,
    pub reasoning: String,
    /// Always within [0, 1]
    pub confidence: f64,
}

impl Decision {
    pub fn new(action: TradeAction, reasoning: impl Into<String>, confidence: f64) -> Self {
        Self {
            action,
            symbol: None,
            quantity: None,
            reasoning: reasoning.into(),
            confidence: normalize_confidence(confidence),
        }
    }

    pub fn with_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.symbol = Some(symbol.into().to_uppercase());
        self
    }

    pub fn with_quantity(mut self, quantity: f64) -> Self {
        self.quantity = Some(quantity);
        self
    }

    /// Cast an extracted object into a decision.
    ///
    /// `action` is required (aliases: `decision`, `recommendation`). Confidence
    /// given on a 0-100 scale is rescaled, then clamped to [0, 1].
    pub fn from_object(object: &Map<String, Value>) -> Result<Self, DecisionError> {
        let raw_action = first_str(object, &["action", "decision", "recommendation"])
            .ok_or(DecisionError::MissingAction)?;
        let action: TradeAction = raw_action
            .parse()
            .map_err(|_| DecisionError::InvalidAction(raw_action.to_string()))?;

        let symbol = first_str(object, &["symbol", "ticker"])
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_uppercase);

        let quantity = object
            .get("quantity")
            .and_then(number_value)
            .filter(|q| q.is_finite() && *q >= 0.0);

        let reasoning = first_str(object, &["reasoning", "rationale", "explanation"])
            .unwrap_or_default()
            .trim()
            .to_string();

        let confidence = object
            .get("confidence")
            .and_then(number_value)
            .map(normalize_confidence)
            .unwrap_or(DEFAULT_CONFIDENCE);

        Ok(Self {
            action,
            symbol,
            quantity,
            reasoning,
            confidence,
        })
    }

    /// One-line rendering used inside follow-up prompts
    pub fn summary_line(&self) -> String {
        let symbol = self
            .symbol
            .as_deref()
            .map(|s| format!(" {}", s))
            .unwrap_or_default();
        format!(
            "{}{} (confidence {:.0}%): {}",
            self.action,
            symbol,
            self.confidence * 100.0,
            self.reasoning
        )
    }
}

/// A decision attributed to the model that produced it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelDecision {
    pub model: String,
    #[serde(flatten)]
    pub decision: Decision,
}

impl ModelDecision {
    pub fn new(model: impl Into<String>, decision: Decision) -> Self {
        Self {
            model: model.into(),
            decision,
        }
    }
}

/// Extract, repair and cast raw model output into a [`Decision`].
///
/// Returns the repair strategy that succeeded alongside the decision.
pub fn parse_decision(raw: &str) -> Result<(Decision, RepairStrategy), DecisionError> {
    let extraction = extract_object(raw);
    let (Some(object), Some(strategy)) = (&extraction.data, extraction.strategy_used) else {
        return Err(DecisionError::Unparseable(
            extraction.error.unwrap_or_else(|| "no JSON object found".to_string()),
        ));
    };
    let decision = Decision::from_object(object)?;
    Ok((decision, strategy))
}

/// Rescale 0-100 confidences and clamp into [0, 1]
pub fn normalize_confidence(value: f64) -> f64 {
    if !value.is_finite() {
        return 0.0;
    }
    let scaled = if value > 1.0 { value / 100.0 } else { value };
    scaled.clamp(0.0, 1.0)
}

fn first_str<'a>(object: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a str> {
    keys.iter().find_map(|k| object.get(*k).and_then(Value::as_str))
}

/// Numbers, or strings holding numbers (optionally with a trailing `%`)
pub(crate) fn number_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().trim_end_matches('%').trim().parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(value: Value) -> Map<String, Value> {
        value.as_object().unwrap().clone()
    }

    #[test]
    fn test_from_object_full() {
        let decision = Decision::from_object(&object(json!({
            "action": "buy",
            "symbol": "aapl",
            "quantity": 10,
            "reasoning": "Breakout above resistance.",
            "confidence": 0.72
        })))
        .unwrap();

        assert_eq!(decision.action, TradeAction::Buy);
        assert_eq!(decision.symbol.as_deref(), Some("AAPL"));
        assert_eq!(decision.quantity, Some(10.0));
        assert_eq!(decision.confidence, 0.72);
    }

    #[test]
    fn test_percent_confidence_rescaled() {
        let decision =
            Decision::from_object(&object(json!({"action": "HOLD", "confidence": 85}))).unwrap();
        assert!((decision.confidence - 0.85).abs() < 1e-9);

        let decision =
            Decision::from_object(&object(json!({"action": "SELL", "confidence": "60%"}))).unwrap();
        assert!((decision.confidence - 0.6).abs() < 1e-9);
    }

    #[test]
    fn test_confidence_clamped_and_defaulted() {
        let d = Decision::from_object(&object(json!({"action": "BUY", "confidence": 250}))).unwrap();
        assert_eq!(d.confidence, 1.0);
        let d = Decision::from_object(&object(json!({"action": "BUY", "confidence": -3}))).unwrap();
        assert_eq!(d.confidence, 0.0);
        let d = Decision::from_object(&object(json!({"action": "BUY"}))).unwrap();
        assert_eq!(d.confidence, DEFAULT_CONFIDENCE);
    }

    #[test]
    fn test_action_aliases_and_errors() {
        let d = Decision::from_object(&object(json!({"recommendation": "sell"}))).unwrap();
        assert_eq!(d.action, TradeAction::Sell);

        assert_eq!(
            Decision::from_object(&object(json!({"reasoning": "x"}))),
            Err(DecisionError::MissingAction)
        );
        assert_eq!(
            Decision::from_object(&object(json!({"action": "SHORT"}))),
            Err(DecisionError::InvalidAction("SHORT".to_string()))
        );
    }

    #[test]
    fn test_parse_decision_from_prose() {
        let raw = "Here is my call:\n```json\n{\"action\": \"SELL\", \"reasoning\": \"Weak guidance\", \"confidence\": 0.6,}\n```";
        let (decision, strategy) = parse_decision(raw).unwrap();
        assert_eq!(decision.action, TradeAction::Sell);
        assert_ne!(strategy, RepairStrategy::Direct);
    }

    #[test]
    fn test_parse_decision_garbage() {
        assert!(matches!(
            parse_decision("I would rather not say."),
            Err(DecisionError::Unparseable(_))
        ));
    }

    #[test]
    fn test_summary_line() {
        let d = Decision::new(TradeAction::Buy, "Momentum", 0.8).with_symbol("nvda");
        assert_eq!(d.summary_line(), "BUY NVDA (confidence 80%): Momentum");
    }
}
