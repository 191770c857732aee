//! JSON dataset loading.

use super::Dataset;
use crate::error::{ReportError, Result, ResultExt};
use serde_json::Value;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::info;

/// Key under which wrapped exports keep their records.
const DATA_KEY: &str = "data";

/// Load a JSON dataset into a [`Dataset`].
///
/// Accepts either a top-level array of objects or an object whose `"data"`
/// key holds such an array.
///
/// # Errors
///
/// - [`ReportError::NotFound`] when `json_path` does not exist.
/// - [`ReportError::Io`] when the file cannot be opened or read.
/// - [`ReportError::Validation`] when the content is malformed JSON, is not
///   a list after unwrapping `"data"`, is empty, or yields no columns.
pub fn load_json_dataset(json_path: impl AsRef<Path>) -> Result<Dataset> {
    let json_path = json_path.as_ref();
    if !json_path.exists() {
        return Err(ReportError::NotFound(json_path.to_path_buf()));
    }

    info!("Loading dataset from: {}", json_path.display());
    let file = File::open(json_path).context(format!("Opening {}", json_path.display()))?;
    let raw: Value = serde_json::from_reader(BufReader::new(file)).map_err(|e| {
        if e.is_io() {
            ReportError::Io(e.into()).with_context(format!("Reading {}", json_path.display()))
        } else {
            ReportError::Validation(format!("Malformed JSON in {}: {e}", json_path.display()))
        }
    })?;

    let records = match unwrap_records(raw) {
        Value::Array(records) => records,
        _ => {
            return Err(ReportError::Validation(
                "JSON dataset must be a list of records or include a 'data' list".to_string(),
            ));
        }
    };

    if records.is_empty() {
        return Err(ReportError::Validation("JSON dataset is empty".to_string()));
    }

    let dataset = Dataset::from_records(&records)?;
    info!(
        "Dataset loaded successfully: {} rows x {} columns",
        dataset.height(),
        dataset.width()
    );
    Ok(dataset)
}

/// Unwrap `{"data": ...}`; any other value is returned as is.
fn unwrap_records(raw: Value) -> Value {
    match raw {
        Value::Object(mut map) => match map.remove(DATA_KEY) {
            Some(data) => data,
            None => Value::Object(map),
        },
        other => other,
    }
}
