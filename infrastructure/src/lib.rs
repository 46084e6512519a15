//! Infrastructure layer for verdict
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer, including configuration file loading.

pub mod config;
pub mod logging;
pub mod providers;
pub mod storage;

// Re-export commonly used types
pub use config::{ConfigError, ConfigIssue, ConfigLoader, ConfigSource, FileConfig, Severity};
pub use logging::JsonlResultStore;
pub use providers::{AdapterRegistry, AnthropicAdapter, CliAdapter, OpenAiCompatibleAdapter};
pub use storage::{DirectoryResearchSource, InMemoryHealthHistory, InMemoryResearchStore};
