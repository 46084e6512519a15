//! Verdict enums for trading and screening.

use serde::{Deserialize, Serialize};

/// Trading verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TradeAction {
    Buy,
    Sell,
    Hold,
}

impl TradeAction {
    pub const ALL: [TradeAction; 3] = [TradeAction::Buy, TradeAction::Sell, TradeAction::Hold];

    pub fn as_str(&self) -> &'static str {
        match self {
            TradeAction::Buy => "BUY",
            TradeAction::Sell => "SELL",
            TradeAction::Hold => "HOLD",
        }
    }

    /// BUY and SELL move money; HOLD does not.
    pub fn is_actionable(&self) -> bool {
        !matches!(self, TradeAction::Hold)
    }
}

impl std::fmt::Display for TradeAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for TradeAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "BUY" => Ok(TradeAction::Buy),
            "SELL" => Ok(TradeAction::Sell),
            "HOLD" => Ok(TradeAction::Hold),
            other => Err(format!("Unknown trade action: {}", other)),
        }
    }
}

/// Pre-market screening verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ScreeningAction {
    Buy,
    Watch,
    Skip,
}

impl ScreeningAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScreeningAction::Buy => "BUY",
            ScreeningAction::Watch => "WATCH",
            ScreeningAction::Skip => "SKIP",
        }
    }

    pub fn is_actionable(&self) -> bool {
        matches!(self, ScreeningAction::Buy)
    }
}

impl std::fmt::Display for ScreeningAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ScreeningAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "BUY" => Ok(ScreeningAction::Buy),
            "WATCH" => Ok(ScreeningAction::Watch),
            "SKIP" => Ok(ScreeningAction::Skip),
            other => Err(format!("Unknown screening action: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trade_action_parse() {
        assert_eq!(" buy ".parse::<TradeAction>().unwrap(), TradeAction::Buy);
        assert_eq!("HOLD".parse::<TradeAction>().unwrap(), TradeAction::Hold);
        assert!("SHORT".parse::<TradeAction>().is_err());
    }

    #[test]
    fn test_actionable() {
        assert!(TradeAction::Sell.is_actionable());
        assert!(!TradeAction::Hold.is_actionable());
        assert!(!ScreeningAction::Watch.is_actionable());
        assert!(ScreeningAction::Buy.is_actionable());
    }

    #[test]
    fn test_serde_uppercase() {
        assert_eq!(serde_json::to_string(&TradeAction::Sell).unwrap(), "\"SELL\"");
        let s: ScreeningAction = serde_json::from_str("\"WATCH\"").unwrap();
        assert_eq!(s, ScreeningAction::Watch);
    }
}
