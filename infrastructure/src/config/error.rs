//! Configuration errors

use thiserror::Error;
use verdict_domain::DomainError;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] Box<figment::Error>),

    #[error("Invalid tier configuration: {0}")]
    Tier(DomainError),

    #[error("Invalid backend '{name}': {reason}")]
    Backend { name: String, reason: String },

    #[error("Configuration has {0} error(s)")]
    Invalid(usize),
}
