//! Spreadsheet export
//!
//! - **workbook**: format-independent document model (sheets, cells, names)
//! - **xlsx**: `.xlsx` rendering
//! - **error**: Error types
//!
//! ```text
//! (pets, records) → build_workbook → ExportWorkbook → write_xlsx → <dir>/<prefix>_<date>.xlsx
//! ```

pub mod error;
pub mod workbook;
pub mod xlsx;

pub use error::{ExportError, ExportResult};
pub use workbook::{
    build_workbook, export_filename, sanitize_sheet_name, Cell, ExportWorkbook, Sheet,
    DEFAULT_FILENAME_PREFIX, MAX_SHEET_NAME, PLACEHOLDER, SUMMARY_SHEET,
};
pub use xlsx::{to_xlsx_bytes, write_xlsx};

use crate::storage::{Pet, WeightRecord};
use chrono::NaiveDate;
use std::path::{Path, PathBuf};

/// Export everything to `<dir>/<prefix>_<date>.xlsx` and return the path.
/// Errors are not recovered; they propagate to the caller.
pub fn export_to_dir(
    pets: &[Pet],
    records: &[WeightRecord],
    dir: &Path,
    prefix: &str,
    date: NaiveDate,
) -> ExportResult<PathBuf> {
    let document = build_workbook(pets, records);
    std::fs::create_dir_all(dir)?;

    let path = dir.join(export_filename(prefix, date));
    write_xlsx(&document, &path)?;

    tracing::info!(
        path = %path.display(),
        sheets = document.sheets.len(),
        records = records.len(),
        "Exported workbook"
    );
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{seed_pets, seed_records};
    use tempfile::tempdir;

    #[test]
    fn test_export_to_dir_creates_dated_file() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("exports");
        let date = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();

        let path = export_to_dir(&seed_pets(), &seed_records(), &out, "birds", date).unwrap();

        assert_eq!(path, out.join("birds_2024-05-01.xlsx"));
        assert!(path.exists());
        assert!(std::fs::metadata(&path).unwrap().len() > 0);
    }
}
