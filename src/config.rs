//! Configuration management and validation.
//!
//! Provides the run configuration for a batch lookup: where identifiers come
//! from, where the report goes, and how hard the registry may be pushed.

use crate::constants::{
    DEFAULT_API_URL, DEFAULT_CONCURRENCY, DEFAULT_IDENTIFIER_COLUMN, DEFAULT_MIN_INTERVAL,
    DEFAULT_OUTPUT_FILENAME, DEFAULT_REQUEST_TIMEOUT, MAX_CONCURRENCY, MAX_JITTER,
};
use crate::error::{LookupError, Result};
use crate::processor::writer::ReportFormat;
use crate::registry::BackoffPolicy;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::debug;

/// Main configuration for a lookup run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LookupConfig {
    /// Spreadsheet or CSV holding the identifiers
    pub input: PathBuf,

    /// Worksheet to read; first sheet when unset
    pub sheet: Option<String>,

    /// Header of the identifier column
    pub column: String,

    /// Report destination (.xlsx or .csv)
    pub output: PathBuf,

    /// Registry base URL, the identifier is appended as a path segment
    pub api_url: String,

    /// Per-request timeout
    pub timeout: Duration,

    /// Retry budget and delays
    pub backoff: BackoffPolicy,

    /// Minimum spacing between registry calls
    pub min_interval: Duration,

    /// Lookups in flight (1..=5)
    pub concurrency: usize,

    /// Show a progress bar
    pub progress: bool,
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::new(),
            sheet: None,
            column: DEFAULT_IDENTIFIER_COLUMN.to_string(),
            output: PathBuf::from(DEFAULT_OUTPUT_FILENAME),
            api_url: DEFAULT_API_URL.to_string(),
            timeout: DEFAULT_REQUEST_TIMEOUT,
            backoff: BackoffPolicy::default(),
            min_interval: DEFAULT_MIN_INTERVAL,
            concurrency: DEFAULT_CONCURRENCY,
            progress: true,
        }
    }
}

impl LookupConfig {
    pub fn new(input: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            ..Self::default()
        }
    }

    pub fn with_output(mut self, output: impl Into<PathBuf>) -> Self {
        self.output = output.into();
        self
    }

    pub fn with_sheet(mut self, sheet: impl Into<String>) -> Self {
        self.sheet = Some(sheet.into());
        self
    }

    pub fn with_column(mut self, column: impl Into<String>) -> Self {
        self.column = column.into();
        self
    }

    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_backoff(mut self, backoff: BackoffPolicy) -> Self {
        self.backoff = backoff;
        self
    }

    pub fn with_min_interval(mut self, min_interval: Duration) -> Self {
        self.min_interval = min_interval;
        self
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    /// Disable the progress bar
    pub fn without_progress(mut self) -> Self {
        self.progress = false;
        self
    }

    /// Reject settings the pipeline cannot honour
    pub fn validate(&self) -> Result<()> {
        debug!("Validating configuration: {:?}", self);

        if self.backoff.max_attempts == 0 {
            return Err(LookupError::configuration(
                "max attempts must be at least 1",
            ));
        }

        if !(1..=MAX_CONCURRENCY).contains(&self.concurrency) {
            return Err(LookupError::configuration(format!(
                "concurrency must be between 1 and {}, got {}",
                MAX_CONCURRENCY, self.concurrency
            )));
        }

        if self.backoff.max_delay < self.backoff.base_delay {
            return Err(LookupError::configuration(format!(
                "max delay ({:?}) is shorter than base delay ({:?})",
                self.backoff.max_delay, self.backoff.base_delay
            )));
        }

        if !(0.0..=MAX_JITTER).contains(&self.backoff.jitter) {
            return Err(LookupError::configuration(format!(
                "jitter must be between 0 and {}, got {}",
                MAX_JITTER, self.backoff.jitter
            )));
        }

        if self.timeout.is_zero() {
            return Err(LookupError::configuration(
                "request timeout must be greater than zero",
            ));
        }

        if !(self.api_url.starts_with("http://") || self.api_url.starts_with("https://")) {
            return Err(LookupError::configuration(format!(
                "API URL must start with http:// or https://, got '{}'",
                self.api_url
            )));
        }

        if self.column.trim().is_empty() {
            return Err(LookupError::configuration("identifier column name is empty"));
        }

        // Unsupported report formats must fail before any registry call
        ReportFormat::from_path(&self.output)?;

        Ok(())
    }
}
