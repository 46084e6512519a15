//! Trading-style decisions.
//!
//! - [`action::TradeAction`] / [`action::ScreeningAction`] - closed verdict sets
//! - [`decision::Decision`] - a structured BUY/SELL/HOLD judgment cast from a parsed object
//! - [`tally::VoteTally`] - BUY/SELL/HOLD vote counts

pub mod action;
#[allow(clippy::module_inception)]
pub mod decision;
pub mod tally;

pub use action::{ScreeningAction, TradeAction};
pub use decision::{Decision, DecisionError, ModelDecision, parse_decision};
pub use tally::VoteTally;
