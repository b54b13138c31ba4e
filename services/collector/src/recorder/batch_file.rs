use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};

use serde_json::Value;
use tokio::{fs::OpenOptions, io::AsyncWriteExt, sync::Mutex};
use tracing::{debug, info};

use super::RecorderError;

/// Appends the names of received events to a text file, one name per line and
/// a blank line after every batch.
pub struct BatchRecorder {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl BatchRecorder {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Records a batch of names. The output file must already exist.
    pub async fn record(&self, names: &[String]) -> Result<usize, RecorderError> {
        let content = format_batch(names);

        let _guard = self.write_lock.lock().await;

        let mut file = OpenOptions::new()
            .append(true)
            .open(&self.path)
            .await
            .map_err(|err| match err.kind() {
                ErrorKind::NotFound => RecorderError::OutputMissing(self.path.clone()),
                _ => RecorderError::Io {
                    path: self.path.clone(),
                    source: err,
                },
            })?;

        file.write_all(content.as_bytes())
            .await
            .map_err(|source| RecorderError::Io {
                path: self.path.clone(),
                source,
            })?;
        file.flush().await.map_err(|source| RecorderError::Io {
            path: self.path.clone(),
            source,
        })?;

        info!(
            recorded = names.len(),
            path = %self.path.display(),
            "batch recorded"
        );

        Ok(names.len())
    }
}

pub fn format_batch(names: &[String]) -> String {
    let mut content = String::new();
    for name in names {
        content.push_str(name);
        content.push('\n');
    }
    content.push('\n');
    content
}

/// Collects the non-empty string names stored under `name_field` from a batch
/// payload of the form `{ "batch": [event, ...] }`. A missing or null batch is
/// empty; any other non-array batch is rejected.
pub fn extract_event_names(payload: &Value, name_field: &str) -> Result<Vec<String>, RecorderError> {
    let object = payload
        .as_object()
        .ok_or_else(|| RecorderError::InvalidBatch("payload must be a JSON object".into()))?;

    let events = match object.get("batch") {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(Value::Array(events)) => events,
        Some(_) => {
            return Err(RecorderError::InvalidBatch(
                "batch must be an array of events".into(),
            ))
        }
    };

    let names: Vec<String> = events
        .iter()
        .filter_map(|event| event.get(name_field))
        .filter_map(Value::as_str)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect();

    debug!(
        events = events.len(),
        named = names.len(),
        "extracted event names from batch"
    );

    Ok(names)
}
