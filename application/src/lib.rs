//! Application layer for verdict
//!
//! This crate contains use cases, port definitions, and execution parameters.
//! It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::ExecutionParams;
pub use ports::{
    adapter_resolver::{AdapterResolver, Resolution},
    backend_adapter::{AdapterError, BackendAdapter, Completion},
    health_history::{HealthHistory, NoHealthHistory},
    progress::{NoProgress, ProgressNotifier},
    research_source::{NoResearchSource, ResearchSource},
    storage::{NoResultStore, ResearchStore, ResultRecord, ResultStore, StoreError},
};
pub use use_cases::research_cache::ResearchCache;
pub use use_cases::run_consensus::{RunConsensusError, RunConsensusInput, RunConsensusUseCase};
pub use use_cases::run_debate::{RunDebateError, RunDebateInput, RunDebateOutput, RunDebateUseCase};
pub use use_cases::run_judge::{JudgeError, RunJudgeInput, RunJudgeUseCase};
pub use use_cases::run_trading_judge::TradingJudgeUseCase;
