//! Research snapshots read from a local directory
//!
//! `<dir>/<SUBJECT>.json` holds the payload for every timeframe;
//! `<dir>/<SUBJECT>.<timeframe>.json` overrides it for one timeframe.

use async_trait::async_trait;
use serde_json::Value;
use std::path::PathBuf;
use tracing::debug;
use verdict_application::{ResearchSource, StoreError};
use verdict_domain::TimeframeClass;

pub struct DirectoryResearchSource {
    dir: PathBuf,
}

impl DirectoryResearchSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn candidates(&self, subject: &str, timeframe: TimeframeClass) -> [PathBuf; 2] {
        let subject = subject.trim().to_uppercase();
        [
            self.dir.join(format!("{}.{}.json", subject, timeframe.as_str())),
            self.dir.join(format!("{}.json", subject)),
        ]
    }
}

#[async_trait]
impl ResearchSource for DirectoryResearchSource {
    async fn fetch(&self, subject: &str, timeframe: TimeframeClass) -> Result<Value, StoreError> {
        for path in self.candidates(subject, timeframe) {
            let content = match tokio::fs::read_to_string(&path).await {
                Ok(content) => content,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
                Err(e) => {
                    return Err(StoreError::Unavailable(format!(
                        "{}: {}",
                        path.display(),
                        e
                    )));
                }
            };
            debug!(path = %path.display(), "Loaded research snapshot");
            return serde_json::from_str(&content)
                .map_err(|e| StoreError::Serialization(format!("{}: {}", path.display(), e)));
        }
        Err(StoreError::Lookup(format!(
            "no research snapshot for {} in {}",
            subject,
            self.dir.display()
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_timeframe_file_overrides_subject_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("NVDA.json"), r#"{"source": "any"}"#).unwrap();
        std::fs::write(
            dir.path().join(format!("NVDA.{}.json", TimeframeClass::Short.as_str())),
            r#"{"source": "short"}"#,
        )
        .unwrap();
        let source = DirectoryResearchSource::new(dir.path());

        let short = source.fetch("nvda", TimeframeClass::Short).await.unwrap();
        assert_eq!(short["source"], "short");
        let long = source.fetch("nvda", TimeframeClass::Long).await.unwrap();
        assert_eq!(long["source"], "any");
    }

    #[tokio::test]
    async fn test_missing_and_malformed() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("BAD.json"), "{not json").unwrap();
        let source = DirectoryResearchSource::new(dir.path());

        assert!(matches!(
            source.fetch("AAPL", TimeframeClass::Medium).await,
            Err(StoreError::Lookup(_))
        ));
        assert!(matches!(
            source.fetch("bad", TimeframeClass::Medium).await,
            Err(StoreError::Serialization(_))
        ));
    }
}
