//! Application-level configuration.
//!
//! - [`ExecutionParams`] — timeouts, default tier and generation defaults

pub mod execution_params;

pub use execution_params::ExecutionParams;
