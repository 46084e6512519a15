//! HTTP API
//!
//! - `POST /consensus` - fan-out consensus over the request's configs
//! - `POST /debate` - sequential persona debate; any stage failure is a 500
//! - `GET /model-health` - rolling per-model success rates
//! - `GET /health` - liveness

mod error;
mod routes;
mod state;

pub use error::ApiError;
pub use routes::{ConsensusRequest, DebateRequest, create_router, start_server};
pub use state::ApiState;
