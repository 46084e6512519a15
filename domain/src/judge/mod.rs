//! Judge synthesis.
//!
//! Two families share the repair cascade in [`crate::extraction`]:
//!
//! - LLM-backed: [`concise`] and [`detailed`] parse a general judge's output,
//!   [`verdict`] parses a trading/screening judge's output
//! - Deterministic: [`heuristic`] folds structured decisions into one
//!   trading consensus without any network call
//!
//! [`category`] classifies the question so judge prompts carry
//! domain-specific criteria, and [`weights`] holds per-model power weights.

pub mod category;
pub mod concise;
pub mod detailed;
pub mod heuristic;
pub mod rating;
pub mod verdict;
pub mod weights;

pub use category::QueryDomain;
pub use concise::{JudgeMode, JudgeVerdict, parse_concise};
pub use detailed::parse_detailed;
pub use heuristic::{TradingConsensus, synthesize};
pub use rating::{Actionable, RiskLevel};
pub use verdict::{ScreeningVerdict, TradingVerdict, Verdict, VerdictAction, parse_verdict};
pub use weights::ModelWeights;
