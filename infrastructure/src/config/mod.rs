//! Configuration file loading for verdict
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. `VERDICT_` environment variables (`VERDICT_SERVER__PORT=9000`)
//! 2. `--config <path>` specified file
//! 3. Project root: `./verdict.toml` or `./.verdict.toml`
//! 4. XDG config: `$XDG_CONFIG_HOME/verdict/config.toml`
//! 5. Default values

mod error;
mod file_config;
mod loader;
mod validation;

pub use error::ConfigError;
pub use file_config::{
    BackendProtocol, FileBackendConfig, FileBindingConfig, FileConfig, FileDebateConfig,
    FileExecutionConfig, FileJudgeConfig, FileLoggingConfig, FileOutputConfig, FileResearchConfig,
    FileServerConfig,
};
pub use loader::{ConfigLoader, ConfigSource};
pub use validation::{ConfigIssue, Severity};
