//! Presentation layer for verdict
//!
//! This crate contains CLI definitions, output formatters,
//! progress reporters, and the HTTP API.

pub mod api;
pub mod cli;
pub mod output;
pub mod progress;

// Re-export commonly used types
pub use api::{ApiError, ApiState, create_router, start_server};
pub use cli::commands::{AskArgs, Cli, Command, ConfigAction, ConfigArgs, DebateArgs, ServeArgs};
pub use output::console::ConsoleFormatter;
pub use output::report::AskReport;
pub use progress::reporter::{ProgressReporter, SimpleProgress};
