//! Core data structures shared across the lookup pipeline.
//!
//! Defines row-level failure kinds, lookup results, the flat output row
//! and the statistics gathered over a batch run.

use crate::registry::RegistryRecord;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Why a single identifier has no data in the report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FailureKind {
    /// Not 14 digits after stripping formatting
    InvalidFormat,
    /// Check digits do not match
    InvalidChecksum,
    /// Registry has no record or rejected the identifier
    NotFound,
    /// Transient failures outlasted the retry budget
    Unavailable,
    /// Run was interrupted before this identifier finished
    Incomplete,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::InvalidFormat => "InvalidFormat",
            FailureKind::InvalidChecksum => "InvalidChecksum",
            FailureKind::NotFound => "NotFound",
            FailureKind::Unavailable => "Unavailable",
            FailureKind::Incomplete => "Incomplete",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of resolving one identifier
#[derive(Debug, Clone, PartialEq)]
pub enum LookupResult {
    Success {
        identifier: String,
        record: RegistryRecord,
    },
    Failure {
        kind: FailureKind,
        identifier: String,
        detail: String,
    },
}

impl LookupResult {
    pub fn failure(
        kind: FailureKind,
        identifier: impl Into<String>,
        detail: impl Into<String>,
    ) -> Self {
        LookupResult::Failure {
            kind,
            identifier: identifier.into(),
            detail: detail.into(),
        }
    }

    pub fn identifier(&self) -> &str {
        match self {
            LookupResult::Success { identifier, .. } => identifier,
            LookupResult::Failure { identifier, .. } => identifier,
        }
    }

    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            LookupResult::Success { .. } => None,
            LookupResult::Failure { kind, .. } => Some(*kind),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, LookupResult::Success { .. })
    }
}

/// One line of the report
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OutputRow {
    pub identifier: String,
    pub legal_name: String,
    pub trade_name: String,
    pub primary_activity_code: String,
    pub primary_activity_description: String,
    pub secondary_activity_code: String,
    pub secondary_activity_description: String,
    pub address: String,
    pub size: String,
    pub share_capital: Option<f64>,
    pub status: String,
    pub status_date: String,
    pub phone: String,
    pub email: String,
    pub error: String,
}

impl OutputRow {
    /// Text cells in column order; share capital is handled separately
    pub fn text_cells(&self) -> [&str; 14] {
        [
            &self.identifier,
            &self.legal_name,
            &self.trade_name,
            &self.primary_activity_code,
            &self.primary_activity_description,
            &self.secondary_activity_code,
            &self.secondary_activity_description,
            &self.address,
            &self.size,
            &self.status,
            &self.status_date,
            &self.phone,
            &self.email,
            &self.error,
        ]
    }

    pub fn is_error(&self) -> bool {
        !self.error.is_empty()
    }
}

/// A raw identifier as read from the input sheet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputIdentifier {
    /// 1-based spreadsheet row, header included
    pub row: usize,
    pub raw: String,
}

/// Identifiers loaded from an input sheet
#[derive(Debug, Clone, Default)]
pub struct InputTable {
    pub identifiers: Vec<InputIdentifier>,
    pub blank_rows_skipped: usize,
}

/// Processing statistics
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProcessingStats {
    pub rows_read: usize,
    pub blank_rows_skipped: usize,
    pub unique_identifiers: usize,
    pub duplicates_removed: usize,
    pub succeeded: usize,
    pub invalid: usize,
    pub not_found: usize,
    pub unavailable: usize,
    pub incomplete: usize,
    pub interrupted: bool,
    pub elapsed: Duration,
    pub output_path: Option<PathBuf>,
}

impl ProcessingStats {
    /// Count one finished row
    pub fn record(&mut self, kind: Option<FailureKind>) {
        match kind {
            None => self.succeeded += 1,
            Some(FailureKind::InvalidFormat | FailureKind::InvalidChecksum) => self.invalid += 1,
            Some(FailureKind::NotFound) => self.not_found += 1,
            Some(FailureKind::Unavailable) => self.unavailable += 1,
            Some(FailureKind::Incomplete) => self.incomplete += 1,
        }
    }

    pub fn failed(&self) -> usize {
        self.invalid + self.not_found + self.unavailable + self.incomplete
    }
}

/// Ordered report rows plus run statistics
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    pub rows: Vec<OutputRow>,
    pub stats: ProcessingStats,
}
