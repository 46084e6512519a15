//! Server, logging and research configuration from TOML
//! (`[server]`, `[logging]`, `[research]` sections)

use serde::{Deserialize, Serialize};

/// HTTP API listen address
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for FileServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

impl FileServerConfig {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Diagnostic log directory and result record file
///
/// ```toml
/// [logging]
/// dir = "~/.local/state/verdict/logs"     # daily-rolling tracing output
/// results_path = "results.jsonl"           # consensus results and debate sessions
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLoggingConfig {
    pub dir: Option<String>,
    pub results_path: Option<String>,
}

/// Local research snapshots consulted by debates that name a subject
///
/// ```toml
/// [research]
/// dir = "research"    # reads research/<SUBJECT>.json
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileResearchConfig {
    pub dir: Option<String>,
}
