//! JSONL file writer for result records.
//!
//! Each [`ResultRecord`] is written as a single JSON line carrying `type`,
//! `id` and `timestamp` next to the payload fields. The file is opened in
//! append mode so records accumulate across runs.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::warn;
use verdict_application::{ResultRecord, ResultStore};

/// Thread-safe via `Mutex<BufWriter<File>>`. Flushes after every record and on `Drop`.
pub struct JsonlResultStore {
    writer: Mutex<BufWriter<File>>,
    path: PathBuf,
}

impl JsonlResultStore {
    /// Open (or create) the results file, creating parent directories.
    ///
    /// Returns `None` if the file cannot be opened.
    pub fn new(path: impl AsRef<Path>) -> Option<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && let Err(e) = std::fs::create_dir_all(parent)
        {
            warn!(
                "Could not create results directory {}: {}",
                parent.display(),
                e
            );
            return None;
        }

        let file = match OpenOptions::new().create(true).append(true).open(path) {
            Ok(f) => f,
            Err(e) => {
                warn!("Could not open results file {}: {}", path.display(), e);
                return None;
            }
        };

        Some(Self {
            writer: Mutex::new(BufWriter::new(file)),
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn to_line(record: ResultRecord) -> Option<String> {
        let timestamp = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true);

        let value = if let serde_json::Value::Object(mut map) = record.payload {
            map.insert(
                "type".to_string(),
                serde_json::Value::String(record.record_type.to_string()),
            );
            map.insert("id".to_string(), serde_json::Value::String(record.id));
            map.insert(
                "timestamp".to_string(),
                serde_json::Value::String(timestamp),
            );
            serde_json::Value::Object(map)
        } else {
            serde_json::json!({
                "type": record.record_type,
                "id": record.id,
                "timestamp": timestamp,
                "data": record.payload,
            })
        };

        serde_json::to_string(&value).ok()
    }
}

impl ResultStore for JsonlResultStore {
    fn save(&self, record: ResultRecord) {
        let Some(line) = Self::to_line(record) else {
            return;
        };

        match self.writer.lock() {
            Ok(mut writer) => {
                if let Err(e) = writeln!(writer, "{}", line).and_then(|_| writer.flush()) {
                    warn!("Failed to write result record to {}: {}", self.path.display(), e);
                }
            }
            Err(_) => warn!("Result store lock poisoned; record dropped"),
        }
    }
}

impl Drop for JsonlResultStore {
    fn drop(&mut self) {
        if let Ok(mut writer) = self.writer.lock() {
            let _ = writer.flush();
        }
    }
}
