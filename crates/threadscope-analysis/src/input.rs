//! Loading raw records from scraper dumps.

use std::path::Path;

use serde::de::DeserializeOwned;

use crate::error::AnalysisError;

/// Load raw records from a `.json` array or a `.csv` file with a header row.
///
/// # Errors
///
/// - [`AnalysisError::Io`] if the file cannot be read.
/// - [`AnalysisError::Input`] for an unsupported extension or malformed JSON.
/// - [`AnalysisError::Csv`] for a malformed CSV record.
pub fn load_records<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, AnalysisError> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);

    let records = match extension.as_deref() {
        Some("json") => {
            let raw = std::fs::read_to_string(path).map_err(|source| AnalysisError::Io {
                path: path.display().to_string(),
                source,
            })?;
            serde_json::from_str::<Vec<T>>(&raw).map_err(|e| AnalysisError::Input {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?
        }
        Some("csv") => {
            let mut reader = csv::Reader::from_path(path).map_err(|e| match e.into_kind() {
                csv::ErrorKind::Io(source) => AnalysisError::Io {
                    path: path.display().to_string(),
                    source,
                },
                other => AnalysisError::Input {
                    path: path.display().to_string(),
                    reason: format!("{other:?}"),
                },
            })?;
            reader.deserialize().collect::<Result<Vec<T>, _>>()?
        }
        _ => {
            return Err(AnalysisError::Input {
                path: path.display().to_string(),
                reason: "expected a .json or .csv file".to_string(),
            });
        }
    };

    tracing::debug!(path = %path.display(), records = records.len(), "loaded raw records");
    Ok(records)
}
