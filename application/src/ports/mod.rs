//! Port definitions (interfaces for external adapters)
//!
//! Ports define the contracts that infrastructure adapters must implement.

pub mod adapter_resolver;
pub mod backend_adapter;
pub mod health_history;
pub mod progress;
pub mod research_source;
pub mod storage;
