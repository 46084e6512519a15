//! Deterministic trading judge.
//!
//! Folds per-model [`Decision`]s and their vote tally into one weighted
//! consensus with agreement and disagreement notes. No model is called.

use super::weights::ModelWeights;
use crate::core::string::sentence_excerpt;
use crate::decision::{ModelDecision, TradeAction, VoteTally};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Upper bound on the weighted confidence
pub const CONFIDENCE_CAP: f64 = 0.8;
/// Winning share that counts as strong consensus
pub const STRONG_THRESHOLD: f64 = 0.75;
/// Winning share that counts as a majority
pub const MAJORITY_THRESHOLD: f64 = 0.6;
/// HOLD share that signals high uncertainty
pub const HOLD_UNCERTAINTY_THRESHOLD: f64 = 0.3;
/// Winning share below which consensus is weak
pub const WEAK_THRESHOLD: f64 = 0.5;
/// Share of reasoning texts a theme must appear in
pub const THEME_THRESHOLD: f64 = 0.5;
/// Excerpt length for the representative reasoning
pub const EXCERPT_LEN: usize = 150;

pub const THEMES: [&str; 7] = [
    "bullish",
    "bearish",
    "support",
    "resistance",
    "momentum",
    "breakout",
    "earnings",
];

/// Synthesized trading consensus
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradingConsensus {
    pub action: TradeAction,
    pub votes: VoteTally,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
    pub weighted_confidence: f64,
    pub agreements: Vec<String>,
    pub disagreements: Vec<String>,
    pub unified_reasoning: String,
}

fn percent(share: f64) -> u32 {
    (share * 100.0).round() as u32
}

/// Weighted mean confidence, capped at [`CONFIDENCE_CAP`]
pub fn weighted_confidence(decisions: &[ModelDecision], weights: &ModelWeights) -> f64 {
    let (weighted, total) = decisions.iter().fold((0.0, 0.0), |(sum, total), d| {
        let w = weights.weight(&d.model);
        (sum + w * d.decision.confidence, total + w)
    });
    if total <= 0.0 {
        0.0
    } else {
        (weighted / total).min(CONFIDENCE_CAP)
    }
}

/// Most recommended symbol among BUY/SELL decisions, with its count.
/// Ties resolve alphabetically.
fn top_symbol(decisions: &[ModelDecision]) -> Option<(String, usize)> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for d in decisions {
        if d.decision.action.is_actionable()
            && let Some(symbol) = d.decision.symbol.as_deref()
        {
            *counts.entry(symbol).or_default() += 1;
        }
    }
    counts
        .into_iter()
        .fold(None, |best: Option<(&str, usize)>, (symbol, count)| match best {
            Some((_, best_count)) if best_count >= count => best,
            _ => Some((symbol, count)),
        })
        .map(|(s, c)| (s.to_string(), c))
}

fn agreements(
    decisions: &[ModelDecision],
    votes: &VoteTally,
    action: TradeAction,
    count: usize,
) -> Vec<String> {
    let mut notes = Vec::new();
    let total = votes.total();
    let share = votes.share(action);

    if total > 0 && share >= STRONG_THRESHOLD {
        notes.push(format!(
            "Strong consensus: {}/{} models ({}% agreement) recommend {}",
            count,
            total,
            percent(share),
            action
        ));
    } else if total > 0 && share >= MAJORITY_THRESHOLD {
        notes.push(format!(
            "Majority: {}/{} models ({}% agreement) recommend {}",
            count,
            total,
            percent(share),
            action
        ));
    }

    if let Some((symbol, n)) = top_symbol(decisions)
        && n >= 2
    {
        notes.push(format!("{} models agree on {}", n, symbol));
    }

    if !decisions.is_empty() {
        let reasonings: Vec<String> = decisions
            .iter()
            .map(|d| d.decision.reasoning.to_lowercase())
            .collect();
        for theme in THEMES {
            let hits = reasonings.iter().filter(|r| r.contains(theme)).count();
            if hits as f64 / decisions.len() as f64 >= THEME_THRESHOLD {
                notes.push(format!(
                    "Shared theme: {} ({}/{} models)",
                    theme,
                    hits,
                    decisions.len()
                ));
            }
        }
    }

    notes
}

fn disagreements(votes: &VoteTally, action: TradeAction) -> Vec<String> {
    let mut notes = Vec::new();
    let total = votes.total();
    if total == 0 {
        notes.push("No model decisions to compare".to_string());
        return notes;
    }

    if votes.buy > 0 && votes.sell > 0 {
        notes.push(format!(
            "Split signals: {} BUY vs {} SELL",
            votes.buy, votes.sell
        ));
    }
    let hold_share = votes.share(TradeAction::Hold);
    if hold_share >= HOLD_UNCERTAINTY_THRESHOLD {
        notes.push(format!(
            "High uncertainty: {}/{} models ({}%) recommend HOLD",
            votes.hold,
            total,
            percent(hold_share)
        ));
    }
    let share = votes.share(action);
    if share < WEAK_THRESHOLD {
        notes.push(format!(
            "Weak consensus: only {}% of models back {}",
            percent(share),
            action
        ));
    }
    notes
}

/// Representative reasoning: the most confident model that chose `action`
fn representative(decisions: &[ModelDecision], action: TradeAction) -> Option<&ModelDecision> {
    decisions
        .iter()
        .filter(|d| d.decision.action == action && !d.decision.reasoning.trim().is_empty())
        .fold(None, |best: Option<&ModelDecision>, d| match best {
            Some(b) if b.decision.confidence >= d.decision.confidence => Some(b),
            _ => Some(d),
        })
}

fn unified_reasoning(
    decisions: &[ModelDecision],
    votes: &VoteTally,
    action: TradeAction,
    agreements: &[String],
) -> String {
    let mut text = format!("{} consensus ({}).", action, votes.display());
    if !agreements.is_empty() {
        let top: Vec<&str> = agreements.iter().take(2).map(String::as_str).collect();
        text.push_str(&format!(" {}.", top.join("; ")));
    }
    if let Some(rep) = representative(decisions, action) {
        text.push_str(&format!(
            " Representative view ({}): {}",
            rep.model,
            sentence_excerpt(rep.decision.reasoning.trim(), EXCERPT_LEN)
        ));
    }
    text
}

/// Synthesize a trading consensus from model decisions and their tally.
///
/// Ties between the leading actions resolve to HOLD.
pub fn synthesize(
    decisions: &[ModelDecision],
    votes: &VoteTally,
    weights: &ModelWeights,
) -> TradingConsensus {
    let (action, count) = votes.winner();
    let agreements = agreements(decisions, votes, action, count);
    let disagreements = disagreements(votes, action);
    let unified_reasoning = unified_reasoning(decisions, votes, action, &agreements);
    let symbol = top_symbol(decisions).map(|(s, _)| s);

    TradingConsensus {
        action,
        votes: *votes,
        symbol,
        weighted_confidence: weighted_confidence(decisions, weights),
        agreements,
        disagreements,
        unified_reasoning,
    }
}
