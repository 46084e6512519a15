//! Output formatting for results

pub mod console;
pub mod report;
