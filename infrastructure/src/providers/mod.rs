//! Backend adapters
//!
//! - [`OpenAiCompatibleAdapter`] - `/chat/completions` over HTTP
//! - [`AnthropicAdapter`] - Anthropic messages API
//! - [`CliAdapter`] - subscription-backed vendor CLI
//! - [`AdapterRegistry`] - tier-gated resolution over registered adapters

mod anthropic;
mod cli;
mod http;
mod openai;
mod registry;

pub use anthropic::AnthropicAdapter;
pub use cli::CliAdapter;
pub use http::api_key_from_env;
pub use openai::OpenAiCompatibleAdapter;
pub use registry::AdapterRegistry;
