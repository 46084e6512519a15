//! Core domain concepts shared across all subdomains.
//!
//! - [`backend::BackendKind`] — text-generation backends (Anthropic, OpenAI, Groq, etc.)
//! - [`backend::AdapterClass`] — billing class of an adapter instance
//! - [`prompt::Prompt`] — a validated prompt to fan out
//! - [`error::DomainError`] — domain-level errors

pub mod backend;
pub mod error;
pub mod prompt;
pub mod string;
