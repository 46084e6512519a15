//! Composite pre-market screening score.
//!
//! | Factor | Points |
//! |--------|--------|
//! | Gap magnitude | up to 30 |
//! | Pre-market volume | up to 20 |
//! | Shortable shares (squeeze potential) | up to 20 |
//! | P/E | up to 15 |
//! | Sentiment | up to 15, +3 bonus |

use serde::{Deserialize, Serialize};

/// Inputs for one screening candidate
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScreeningMetrics {
    pub symbol: String,
    /// Signed gap vs. previous close, in percent
    pub gap_percent: f64,
    pub premarket_volume: u64,
    #[serde(default)]
    pub shortable_shares: Option<u64>,
    #[serde(default)]
    pub pe_ratio: Option<f64>,
    #[serde(default)]
    pub sentiment: Option<Sentiment>,
}

/// Social sentiment summary
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sentiment {
    /// -1 (bearish) to 1 (bullish)
    pub score: f64,
    /// Share of positive mentions, 0 to 1
    #[serde(default = "neutral_ratio")]
    pub ratio: f64,
}

fn neutral_ratio() -> f64 {
    0.5
}

fn gap_points(gap_percent: f64) -> f64 {
    match gap_percent.abs() {
        g if g > 10.0 => 30.0,
        g if g > 7.0 => 25.0,
        g if g > 5.0 => 20.0,
        g if g > 3.0 => 15.0,
        g if g > 1.0 => 10.0,
        _ => 0.0,
    }
}

fn volume_points(volume: u64) -> f64 {
    match volume {
        v if v > 5_000_000 => 20.0,
        v if v > 2_000_000 => 15.0,
        v if v > 1_000_000 => 10.0,
        v if v > 500_000 => 5.0,
        _ => 0.0,
    }
}

/// Unknown borrow data scores as easy to borrow; a reported zero scores nothing
fn shortable_points(shares: Option<u64>) -> f64 {
    match shares {
        Some(0) => 0.0,
        Some(s) if s < 10_000_000 => 20.0,
        Some(s) if s < 50_000_000 => 15.0,
        Some(s) if s < 100_000_000 => 10.0,
        Some(_) | None => 5.0,
    }
}

fn pe_points(pe: Option<f64>) -> f64 {
    match pe {
        Some(pe) if pe > 0.0 && pe < 30.0 => 15.0,
        Some(pe) if pe > 0.0 && pe < 50.0 => 10.0,
        Some(pe) if pe > 0.0 => 5.0,
        _ => 0.0,
    }
}

fn sentiment_points(sentiment: Option<Sentiment>) -> f64 {
    let Some(sentiment) = sentiment else {
        return 0.0;
    };
    let base = (sentiment.score.clamp(-1.0, 1.0) + 1.0) * 7.5;
    let bonus = if sentiment.ratio > 0.7 { 3.0 } else { 0.0 };
    base + bonus
}

impl ScreeningMetrics {
    /// Composite score in [0, 100], rounded to one decimal
    pub fn score(&self) -> f64 {
        let raw = gap_points(self.gap_percent)
            + volume_points(self.premarket_volume)
            + shortable_points(self.shortable_shares)
            + pe_points(self.pe_ratio)
            + sentiment_points(self.sentiment);
        ((raw * 10.0).round() / 10.0).min(100.0)
    }
}
