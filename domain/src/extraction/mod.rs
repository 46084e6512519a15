//! Structured extraction from unstructured model output.
//!
//! [`repair::extract_object`] is the single parsing primitive shared by
//! every judge and by the debate orchestrator. It never fails loudly: the
//! caller gets an [`repair::Extraction`] and chooses its own fallback.

pub mod repair;

pub use repair::{Extraction, RepairStrategy, extract_object};
