//! CNPJ Lookup Library
//!
//! Bulk lookup of Brazilian company registrations (CNPJ) against a public
//! registry API.
//!
//! This library provides tools for:
//! - Reading the identifier column of a spreadsheet or CSV file
//! - Normalizing identifiers and validating their check digits
//! - Deduplicating identifiers before any network call
//! - Resolving identifiers with throttling, timeouts and bounded retries
//! - Shaping registry records into flat report rows
//! - Writing the report as xlsx or CSV, atomically

pub mod config;
pub mod constants;
pub mod error;
pub mod identifier;
pub mod input;
pub mod models;
pub mod processor;
pub mod registry;
pub mod shaper;

// CLI modules
pub mod cli {
    pub mod args;
    pub mod commands;
}

// Re-export commonly used types
pub use config::LookupConfig;
pub use error::{LookupError, Result};
pub use identifier::{Cnpj, NormalizeError, normalize};
pub use models::{BatchReport, FailureKind, LookupResult, OutputRow, ProcessingStats};
pub use processor::{BatchProcessor, run_lookup};
pub use registry::{BackoffPolicy, HttpTransport, RegistryClient, RegistryTransport};
