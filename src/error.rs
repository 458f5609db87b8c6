//! Error handling for batch lookup runs.
//!
//! Only structural failures live here: unreadable input, a missing
//! identifier column, an unwritable report, a bad configuration. Problems
//! with a single identifier are recorded in its output row instead.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LookupError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Input file not found: {path}")]
    InputNotFound { path: PathBuf },

    #[error("Unsupported spreadsheet format for file: {path} (expected .xlsx, .xlsm, .xlsb, .xls, .ods or .csv)")]
    UnsupportedFormat { path: PathBuf },

    #[error("Column '{column}' not found in {source_name}. Available columns: {available}")]
    MissingColumn {
        column: String,
        source_name: String,
        available: String,
    },

    #[error("Failed to read spreadsheet {source_name}: {reason}")]
    Spreadsheet { source_name: String, reason: String },

    #[error("CSV error: {0}")]
    Csv(#[from] polars::error::PolarsError),

    #[error("Failed to render report: {0}")]
    Report(#[from] rust_xlsxwriter::XlsxError),

    #[error("Failed to write report {path}: {reason}")]
    OutputWrite { path: PathBuf, reason: String },

    #[error("Failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Processing interrupted: {reason}")]
    Interrupted { reason: String },
}

impl LookupError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn spreadsheet(source_name: impl Into<String>, reason: impl ToString) -> Self {
        Self::Spreadsheet {
            source_name: source_name.into(),
            reason: reason.to_string(),
        }
    }

    pub fn output_write(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::OutputWrite {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, LookupError>;
