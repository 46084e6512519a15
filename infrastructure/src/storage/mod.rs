//! In-process stores backing the application ports

mod health;
mod research_source;
mod research_store;

pub use health::InMemoryHealthHistory;
pub use research_source::DirectoryResearchSource;
pub use research_store::InMemoryResearchStore;
