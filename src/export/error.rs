//! Export error types

use thiserror::Error;

/// Errors that can occur while writing the spreadsheet
#[derive(Error, Debug)]
pub enum ExportError {
    /// The spreadsheet writer rejected the document
    #[error("Spreadsheet error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    /// Output directory could not be created
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for export operations
pub type ExportResult<T> = Result<T, ExportError>;
