//! Output format value object

use serde::{Deserialize, Serialize};

/// How results are rendered to the operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Every response, metric and note
    Full,
    /// Agreement line plus the judge's verdict (default)
    #[default]
    Summary,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "full" => Ok(OutputFormat::Full),
            "summary" => Ok(OutputFormat::Summary),
            "json" => Ok(OutputFormat::Json),
            other => Err(format!(
                "Unknown output format: {}. Valid: full, summary, json",
                other
            )),
        }
    }
}
