//! Fan-out consensus domain
//!
//! - [`query`] - per-backend configs and normalized responses
//! - [`scoring`] - agreement score and summary over successful texts
//! - [`result`] - the complete result of one fan-out request

pub mod query;
pub mod result;
pub mod scoring;

pub use query::{QueryConfig, Response, TokenUsage};
pub use result::{ConsensusResult, ConsensusSummary, ResponseMetrics};
pub use scoring::{agreement, jaccard_similarity};
