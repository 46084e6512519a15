//! Domain layer for verdict
//!
//! This crate contains the core business logic, entities, and value objects.
//! It has no dependencies on infrastructure or presentation concerns and
//! performs no I/O.
//!
//! # Core Concepts
//!
//! ## Fan-out consensus
//!
//! One prompt is sent to several backends. Each call yields a [`Response`]
//! (failed calls included, with confidence 0) and the set is scored into a
//! [`ConsensusResult`] whose agreement is mean pairwise word overlap.
//!
//! ## Repair cascade
//!
//! Model output rarely follows a schema. [`extract_object`] runs an ordered
//! list of pure repair strategies and reports which one succeeded.
//!
//! ## Judges
//!
//! - **General judge**: concise JSON or detailed sectioned report, with
//!   domain-specific criteria and safe defaults on unreadable output
//! - **Heuristic trading judge**: deterministic vote/weight synthesis
//! - **Trading/screening judge**: never defaults to BUY/SELL on parse failure
//!
//! ## Debate
//!
//! Analyst, critic and synthesizer personas run over several rounds; the
//! final decision is always the last round's synthesizer decision.
//!
//! ## Tiers
//!
//! A subscription tier may only bind subscription-backed or free adapters.

pub mod cache;
pub mod config;
pub mod consensus;
pub mod core;
pub mod debate;
pub mod decision;
pub mod extraction;
pub mod health;
pub mod judge;
pub mod pricing;
pub mod prompt;
pub mod screening;
pub mod tier;

// Re-export commonly used types
pub use cache::{CacheEntry, CacheKey, InvalidateScope, TimeframeClass};
pub use config::OutputFormat;
pub use consensus::{ConsensusResult, ConsensusSummary, QueryConfig, Response, ResponseMetrics, TokenUsage};
pub use core::{
    backend::{AdapterClass, BackendKind},
    error::DomainError,
    prompt::Prompt,
};
pub use debate::{
    DebateBindings, DebateSession, DebateStage, DebateState, DebateStatus, DebateTurn,
    FinalDecision, Persona, PersonaBinding, SessionError,
};
pub use decision::{Decision, DecisionError, ModelDecision, ScreeningAction, TradeAction, VoteTally, parse_decision};
pub use extraction::{Extraction, RepairStrategy, extract_object};
pub use health::{CallOutcome, HealthStatus, HealthWindow, ModelHealth};
pub use judge::{
    Actionable, JudgeMode, JudgeVerdict, ModelWeights, QueryDomain, RiskLevel, ScreeningVerdict,
    TradingConsensus, TradingVerdict, Verdict, VerdictAction, parse_concise, parse_detailed,
    parse_verdict,
};
pub use pricing::{Price, estimate_cost};
pub use prompt::{ModelMeta, PromptTemplate};
pub use screening::{ScreeningMetrics, Sentiment};
pub use tier::{Tier, TierBilling, TierDefinition, TierPolicy};
