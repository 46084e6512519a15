//! Use cases
//!
//! Application-level operations that orchestrate domain logic.

pub mod research_cache;
pub mod run_consensus;
pub mod run_debate;
pub mod run_judge;
pub mod run_trading_judge;
pub(crate) mod shared;
#[cfg(test)]
mod test_support;
