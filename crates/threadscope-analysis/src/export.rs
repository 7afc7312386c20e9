//! CSV export of the canonical result table.

use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use threadscope_core::SortOrder;

use crate::error::AnalysisError;
use crate::join::ResultTable;

/// What an export wrote and where.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportReceipt {
    pub path: PathBuf,
    /// Data rows, excluding the header.
    pub rows: usize,
    /// Lowercase hex SHA-256 of the file contents.
    pub sha256: String,
}

/// File name for one subreddit/sort-order run.
#[must_use]
pub fn results_file_name(subreddit: &str, sort_order: SortOrder) -> String {
    format!("{subreddit}_{sort_order}_results.csv")
}

/// Render a table to CSV bytes: header first, then one record per row.
///
/// # Errors
///
/// Returns [`AnalysisError::Csv`] if a record cannot be written.
pub fn render_csv(table: &ResultTable) -> Result<Vec<u8>, AnalysisError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(table.columns())?;
    for row in table.rows() {
        writer.write_record(row.iter().map(crate::types::Cell::render))?;
    }
    writer.into_inner().map_err(|e| AnalysisError::Io {
        path: "<buffer>".to_string(),
        source: e.into_error(),
    })
}

/// Write `table` to `{base}/{subreddit}_{sort_order}_results.csv`.
///
/// `base` is created if absent. An existing file is overwritten.
///
/// # Errors
///
/// - [`AnalysisError::ExportPrecondition`] if `table` is `None`, meaning the
///   pipeline has not completed, or if `subreddit` is not a valid name.
/// - [`AnalysisError::Io`] if the directory or file cannot be written.
pub fn export_results(
    table: Option<&ResultTable>,
    subreddit: &str,
    sort_order: SortOrder,
    base: &Path,
) -> Result<ExportReceipt, AnalysisError> {
    let table = table.ok_or_else(|| {
        AnalysisError::ExportPrecondition(format!(
            "no result table for r/{subreddit} ({sort_order}); run the pipeline first"
        ))
    })?;
    threadscope_core::validate_subreddit(subreddit)
        .map_err(|e| AnalysisError::ExportPrecondition(e.to_string()))?;

    std::fs::create_dir_all(base).map_err(|source| AnalysisError::Io {
        path: base.display().to_string(),
        source,
    })?;

    let bytes = render_csv(table)?;
    let sha256 = format!("{:x}", Sha256::digest(&bytes));
    let path = base.join(results_file_name(subreddit, sort_order));
    std::fs::write(&path, &bytes).map_err(|source| AnalysisError::Io {
        path: path.display().to_string(),
        source,
    })?;

    tracing::info!(
        subreddit,
        %sort_order,
        rows = table.len(),
        path = %path.display(),
        %sha256,
        "results exported"
    );

    Ok(ExportReceipt {
        path,
        rows: table.len(),
        sha256,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::join::relabel;
    use crate::types::Cell;

    const COLUMNS: &[&str] = &["id", "text", "score"];

    fn table() -> ResultTable {
        relabel(
            COLUMNS,
            vec![
                vec![
                    Cell::Text("p1".to_string()),
                    Cell::Text("hello, world".to_string()),
                    Cell::Score(0.25),
                ],
                vec![
                    Cell::Text("p2".to_string()),
                    Cell::Text("line one\nline \"two\"".to_string()),
                    Cell::Null,
                ],
            ],
        )
        .unwrap()
    }

    #[test]
    fn file_name_uses_subreddit_and_sort_order() {
        assert_eq!(
            results_file_name("computerscience", SortOrder::Hot),
            "computerscience_hot_results.csv"
        );
    }

    #[test]
    fn renders_header_quoting_and_nulls() {
        let text = String::from_utf8(render_csv(&table()).unwrap()).unwrap();
        assert_eq!(
            text,
            "id,text,score\np1,\"hello, world\",0.25\np2,\"line one\nline \"\"two\"\"\",\n"
        );
    }

    #[test]
    fn missing_table_is_precondition_failure() {
        let dir = tempfile::tempdir().unwrap();
        let err = export_results(None, "rust", SortOrder::New, dir.path()).unwrap_err();
        assert!(matches!(err, AnalysisError::ExportPrecondition(_)));
        assert!(std::fs::read_dir(dir.path()).unwrap().next().is_none());
    }

    #[test]
    fn subreddit_with_path_separator_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("results");
        let err = export_results(Some(&table()), "../escape", SortOrder::Hot, &base).unwrap_err();
        assert!(matches!(err, AnalysisError::ExportPrecondition(_)));
        assert!(!base.exists());
        assert!(!dir.path().join("escape_hot_results.csv").exists());
    }

    #[test]
    fn creates_directory_and_reports_receipt() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("nested").join("results");
        let receipt = export_results(Some(&table()), "rust", SortOrder::Top, &base).unwrap();

        assert_eq!(receipt.path, base.join("rust_top_results.csv"));
        assert_eq!(receipt.rows, 2);
        let written = std::fs::read(&receipt.path).unwrap();
        assert_eq!(receipt.sha256, format!("{:x}", Sha256::digest(&written)));
        assert_eq!(receipt.sha256.len(), 64);
    }

    #[test]
    fn repeated_export_is_byte_identical() {
        let dir = tempfile::tempdir().unwrap();
        let first = export_results(Some(&table()), "rust", SortOrder::Hot, dir.path()).unwrap();
        let first_bytes = std::fs::read(&first.path).unwrap();
        let second = export_results(Some(&table()), "rust", SortOrder::Hot, dir.path()).unwrap();
        assert_eq!(first, second);
        assert_eq!(first_bytes, std::fs::read(&second.path).unwrap());
    }

    #[test]
    fn header_only_for_empty_table() {
        let empty = relabel(COLUMNS, Vec::new()).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let receipt = export_results(Some(&empty), "rust", SortOrder::Rising, dir.path()).unwrap();
        assert_eq!(receipt.rows, 0);
        assert_eq!(
            std::fs::read_to_string(&receipt.path).unwrap(),
            "id,text,score\n"
        );
    }
}
