//! Structured result logging
//!
//! Provides [`JsonlResultStore`], a JSONL file writer that implements the
//! [`ResultStore`](verdict_application::ResultStore) port.

mod jsonl_store;

pub use jsonl_store::JsonlResultStore;
