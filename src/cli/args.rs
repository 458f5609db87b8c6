//! Command-line argument definitions for the CNPJ lookup tool
//!
//! Defines the CLI using the clap derive API and turns parsed arguments
//! into a [`LookupConfig`].

use crate::config::LookupConfig;
use crate::constants::{
    DEFAULT_API_URL, DEFAULT_CONCURRENCY, DEFAULT_IDENTIFIER_COLUMN, DEFAULT_MAX_ATTEMPTS,
    DEFAULT_OUTPUT_FILENAME,
};
use crate::registry::BackoffPolicy;
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

/// CLI arguments for the CNPJ lookup tool
///
/// Reads a spreadsheet with a `CNPJ` column, looks every company up in the
/// public registry and writes an enriched report.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "cnpj-lookup",
    version,
    about = "Look up Brazilian company registrations (CNPJ) in bulk",
    long_about = "Reads the CNPJ column of a spreadsheet or CSV file, validates and deduplicates \
                  the identifiers, queries the public registry for each one with rate limiting \
                  and retries, and writes a report with legal name, activities (CNAE), address, \
                  status and contact details."
)]
pub struct Args {
    /// Spreadsheet (.xlsx, .xlsm, .xlsb, .xls, .ods) or CSV file with the identifiers
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Report path; the extension (.xlsx or .csv) selects the format
    #[arg(
        short = 'o',
        long = "output",
        value_name = "PATH",
        default_value = DEFAULT_OUTPUT_FILENAME
    )]
    pub output: PathBuf,

    /// Worksheet to read (first sheet by default)
    #[arg(long, value_name = "NAME")]
    pub sheet: Option<String>,

    /// Header of the column holding the identifiers
    #[arg(long, value_name = "NAME", default_value = DEFAULT_IDENTIFIER_COLUMN)]
    pub column: String,

    /// Registry base URL; the identifier is appended as the last path segment
    #[arg(long, value_name = "URL", default_value = DEFAULT_API_URL)]
    pub api_url: String,

    /// Lookups in flight at once (1 to 5)
    #[arg(short = 'c', long, default_value_t = DEFAULT_CONCURRENCY)]
    pub concurrency: usize,

    /// Attempts per identifier, first call included
    #[arg(long, default_value_t = DEFAULT_MAX_ATTEMPTS)]
    pub max_attempts: u32,

    /// First retry delay in milliseconds, doubled on every further retry
    #[arg(long, default_value_t = 800)]
    pub base_delay_ms: u64,

    /// Upper bound for a single retry delay in milliseconds
    #[arg(long, default_value_t = 10_000)]
    pub max_delay_ms: u64,

    /// Random fraction added to retry delays, 0 to 1 (0 disables)
    #[arg(long, default_value_t = 0.0)]
    pub jitter: f64,

    /// Minimum spacing between registry calls in milliseconds
    #[arg(long, default_value_t = 150)]
    pub min_interval_ms: u64,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = 15)]
    pub timeout_secs: u64,

    /// Disable the progress bar
    #[arg(long)]
    pub no_progress: bool,

    /// Increase logging verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Only log errors and hide the progress bar
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

impl Args {
    /// Determine the appropriate log level based on verbosity flags
    pub fn get_log_level(&self) -> &'static str {
        if self.quiet {
            "error"
        } else {
            match self.verbose {
                0 => "warn",
                1 => "info",
                2 => "debug",
                _ => "trace",
            }
        }
    }

    /// Check if we should show progress bars
    pub fn show_progress(&self) -> bool {
        !self.quiet && !self.no_progress
    }

    /// Build the run configuration; validation happens in the pipeline
    pub fn to_config(&self) -> LookupConfig {
        let backoff = BackoffPolicy::default()
            .with_max_attempts(self.max_attempts)
            .with_base_delay(Duration::from_millis(self.base_delay_ms))
            .with_max_delay(Duration::from_millis(self.max_delay_ms))
            .with_jitter(self.jitter);

        let mut config = LookupConfig::new(&self.input)
            .with_output(&self.output)
            .with_column(&self.column)
            .with_api_url(&self.api_url)
            .with_concurrency(self.concurrency)
            .with_backoff(backoff)
            .with_min_interval(Duration::from_millis(self.min_interval_ms))
            .with_timeout(Duration::from_secs(self.timeout_secs));

        if let Some(sheet) = &self.sheet {
            config = config.with_sheet(sheet);
        }
        if !self.show_progress() {
            config = config.without_progress();
        }

        config
    }
}
