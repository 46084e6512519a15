//! BUY/SELL/HOLD vote counting.

use super::action::TradeAction;
use serde::{Deserialize, Serialize};

/// Vote counts per trade action
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteTally {
    #[serde(rename = "BUY")]
    pub buy: usize,
    #[serde(rename = "SELL")]
    pub sell: usize,
    #[serde(rename = "HOLD")]
    pub hold: usize,
}

impl VoteTally {
    pub fn new(buy: usize, sell: usize, hold: usize) -> Self {
        Self { buy, sell, hold }
    }

    /// Count actions from an iterator of votes
    pub fn from_actions(actions: impl IntoIterator<Item = TradeAction>) -> Self {
        let mut tally = Self::default();
        for action in actions {
            tally.record(action);
        }
        tally
    }

    pub fn record(&mut self, action: TradeAction) {
        match action {
            TradeAction::Buy => self.buy += 1,
            TradeAction::Sell => self.sell += 1,
            TradeAction::Hold => self.hold += 1,
        }
    }

    pub fn count(&self, action: TradeAction) -> usize {
        match action {
            TradeAction::Buy => self.buy,
            TradeAction::Sell => self.sell,
            TradeAction::Hold => self.hold,
        }
    }

    pub fn total(&self) -> usize {
        self.buy + self.sell + self.hold
    }

    /// Winning action and its count. Ties and empty tallies resolve to HOLD.
    pub fn winner(&self) -> (TradeAction, usize) {
        let max = self.buy.max(self.sell).max(self.hold);
        let leaders: Vec<TradeAction> = TradeAction::ALL
            .into_iter()
            .filter(|a| self.count(*a) == max)
            .collect();
        if leaders.len() == 1 {
            (leaders[0], max)
        } else {
            (TradeAction::Hold, self.hold)
        }
    }

    /// Fraction of votes for `action`, 0 when there are no votes
    pub fn share(&self, action: TradeAction) -> f64 {
        if self.total() == 0 {
            0.0
        } else {
            self.count(action) as f64 / self.total() as f64
        }
    }

    /// Visual summary, e.g. "BUY 3 / SELL 0 / HOLD 1"
    pub fn display(&self) -> String {
        format!("BUY {} / SELL {} / HOLD {}", self.buy, self.sell, self.hold)
    }
}
