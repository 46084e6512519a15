//! Prompt domain
//!
//! Templates for the judge, the trading/screening judge and each debate stage.

mod template;

pub use template::{ModelMeta, PromptTemplate};
