//! Application constants for the CNPJ lookup tool
//!
//! This module contains the default values, registry endpoint details and
//! report column names used throughout the crate.

use std::time::Duration;

// =============================================================================
// Identifier Rules
// =============================================================================

/// Number of digits in a normalized CNPJ
pub const CNPJ_LENGTH: usize = 14;

/// Weights for the first check digit (applied to digits 1..12)
pub const FIRST_CHECK_WEIGHTS: [u32; 12] = [5, 4, 3, 2, 9, 8, 7, 6, 5, 4, 3, 2];

/// Weights for the second check digit (applied to digits 1..13)
pub const SECOND_CHECK_WEIGHTS: [u32; 13] = [6, 5, 4, 3, 2, 9, 8, 7, 6, 5, 4, 3, 2];

// =============================================================================
// Registry API
// =============================================================================

/// Default lookup endpoint; the identifier is appended as the last path segment
pub const DEFAULT_API_URL: &str = "https://brasilapi.com.br/api/cnpj/v1";

/// Per-request timeout
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Minimum spacing between two consecutive registry calls
pub const DEFAULT_MIN_INTERVAL: Duration = Duration::from_millis(150);

/// Total attempts per identifier (first call plus three retries)
pub const DEFAULT_MAX_ATTEMPTS: u32 = 4;

/// First backoff delay, doubled on every further retry
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_millis(800);

/// Upper bound for a single backoff delay
pub const DEFAULT_MAX_DELAY: Duration = Duration::from_secs(10);

/// Largest accepted jitter fraction
pub const MAX_JITTER: f64 = 1.0;

/// Default number of lookups in flight
pub const DEFAULT_CONCURRENCY: usize = 1;

/// Hard ceiling for in-flight lookups; the public API is shared
pub const MAX_CONCURRENCY: usize = 5;

/// HTTP statuses that mean "this identifier has no record"
pub const NOT_FOUND_STATUSES: &[u16] = &[400, 404];

/// HTTP statuses worth retrying besides the 5xx range
pub const RETRYABLE_STATUSES: &[u16] = &[408, 429];

// =============================================================================
// Input and Output
// =============================================================================

/// Input column holding the identifiers
pub const DEFAULT_IDENTIFIER_COLUMN: &str = "CNPJ";

/// Default report file name
pub const DEFAULT_OUTPUT_FILENAME: &str = "resultado_cnaes.xlsx";

/// Worksheet name in the xlsx report
pub const REPORT_SHEET_NAME: &str = "Resultado";

/// Spreadsheet extensions read through calamine
pub const SPREADSHEET_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xlsb", "xls", "ods"];

/// Report columns, in output order
pub mod columns {
    pub const IDENTIFIER: &str = "CNPJ";
    pub const LEGAL_NAME: &str = "Razão Social";
    pub const TRADE_NAME: &str = "Nome Fantasia";
    pub const PRIMARY_ACTIVITY_CODE: &str = "CNAE Principal";
    pub const PRIMARY_ACTIVITY_DESCRIPTION: &str = "Descrição CNAE Principal";
    pub const SECONDARY_ACTIVITY_CODE: &str = "CNAE Secundário";
    pub const SECONDARY_ACTIVITY_DESCRIPTION: &str = "Descrição CNAE Secundário";
    pub const ADDRESS: &str = "Endereço";
    pub const SIZE: &str = "Porte";
    pub const SHARE_CAPITAL: &str = "Capital Social";
    pub const STATUS: &str = "Situação Cadastral";
    pub const STATUS_DATE: &str = "Data Situação Cadastral";
    pub const PHONE: &str = "Telefone";
    pub const EMAIL: &str = "E-mail";
    pub const ERROR: &str = "Erro";

    pub const ALL: [&str; 15] = [
        IDENTIFIER,
        LEGAL_NAME,
        TRADE_NAME,
        PRIMARY_ACTIVITY_CODE,
        PRIMARY_ACTIVITY_DESCRIPTION,
        SECONDARY_ACTIVITY_CODE,
        SECONDARY_ACTIVITY_DESCRIPTION,
        ADDRESS,
        SIZE,
        SHARE_CAPITAL,
        STATUS,
        STATUS_DATE,
        PHONE,
        EMAIL,
        ERROR,
    ];
}

// =============================================================================
// Formatting
// =============================================================================

/// Date format used by the registry
pub const REGISTRY_DATE_FORMAT: &str = "%Y-%m-%d";

/// Date format written to the report
pub const REPORT_DATE_FORMAT: &str = "%d/%m/%Y";
