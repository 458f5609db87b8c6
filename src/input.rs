//! Input sheet loading.
//!
//! Reads the identifier column from a spreadsheet (calamine) or a CSV file
//! (polars). The column is located once from the header row; a missing
//! column aborts the run. Numeric cells are turned back into zero-padded
//! digit strings because spreadsheets drop leading zeros of numbers.

use crate::constants::{CNPJ_LENGTH, SPREADSHEET_EXTENSIONS};
use crate::error::{LookupError, Result};
use crate::models::{InputIdentifier, InputTable};
use calamine::{Data, Range, Reader, Sheets, open_workbook_auto_from_rs};
use polars::prelude::{CsvReadOptions, SerReader};
use regex::Regex;
use std::io::{Cursor, Read, Seek};
use std::path::Path;
use std::sync::LazyLock;
use tracing::{debug, info};

static SCIENTIFIC_NOTATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+(?:\.\d+)?[eE]\+\d+$").expect("valid regex"));

/// Supported input containers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Spreadsheet,
    Csv,
}

impl InputFormat {
    /// Detect the format from the file extension
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();

        if extension == "csv" {
            Ok(InputFormat::Csv)
        } else if SPREADSHEET_EXTENSIONS.contains(&extension.as_str()) {
            Ok(InputFormat::Spreadsheet)
        } else {
            Err(LookupError::UnsupportedFormat {
                path: path.to_path_buf(),
            })
        }
    }
}

/// Where to find the identifiers inside the input
#[derive(Debug, Clone)]
pub struct InputSchema<'a> {
    pub column: &'a str,
    pub sheet: Option<&'a str>,
}

/// Load identifiers from a file on disk
pub fn read_identifiers(path: &Path, schema: &InputSchema<'_>) -> Result<InputTable> {
    if !path.exists() {
        return Err(LookupError::InputNotFound {
            path: path.to_path_buf(),
        });
    }

    let format = InputFormat::from_path(path)?;
    let bytes = std::fs::read(path)?;
    info!("Reading identifiers from {}", path.display());

    read_identifiers_from_bytes(bytes, format, schema, &path.display().to_string())
}

/// Load identifiers from raw file bytes
pub fn read_identifiers_from_bytes(
    bytes: Vec<u8>,
    format: InputFormat,
    schema: &InputSchema<'_>,
    source_name: &str,
) -> Result<InputTable> {
    let table = match format {
        InputFormat::Spreadsheet => {
            let workbook = open_workbook_auto_from_rs(Cursor::new(bytes))
                .map_err(|e| LookupError::spreadsheet(source_name, e))?;
            read_workbook(workbook, schema, source_name)?
        }
        InputFormat::Csv => read_csv(bytes, schema, source_name)?,
    };

    info!(
        "Loaded {} identifier(s) from {} ({} blank row(s) skipped)",
        table.identifiers.len(),
        source_name,
        table.blank_rows_skipped
    );
    Ok(table)
}

fn read_workbook<RS: Read + Seek>(
    mut workbook: Sheets<RS>,
    schema: &InputSchema<'_>,
    source_name: &str,
) -> Result<InputTable> {
    let sheet_names = workbook.sheet_names();
    debug!("Sheets in {}: {:?}", source_name, sheet_names);

    let sheet = match schema.sheet {
        Some(wanted) => sheet_names
            .iter()
            .find(|name| name.as_str() == wanted)
            .cloned()
            .ok_or_else(|| {
                LookupError::spreadsheet(
                    source_name,
                    format!(
                        "sheet '{}' not found (available: {})",
                        wanted,
                        sheet_names.join(", ")
                    ),
                )
            })?,
        None => sheet_names
            .first()
            .cloned()
            .ok_or_else(|| LookupError::spreadsheet(source_name, "workbook has no sheets"))?,
    };

    let range = workbook
        .worksheet_range(&sheet)
        .map_err(|e| LookupError::spreadsheet(source_name, e))?;

    debug!("Using sheet '{}' ({:?} cells)", sheet, range.get_size());
    table_from_range(&range, schema.column, &format!("{source_name} [{sheet}]"))
}

fn table_from_range(range: &Range<Data>, column: &str, source_name: &str) -> Result<InputTable> {
    let first_row = range.start().map(|(row, _)| row as usize).unwrap_or(0);
    let mut rows = range.rows();

    let header: Vec<String> = rows
        .next()
        .map(|cells| cells.iter().map(|c| c.to_string()).collect())
        .unwrap_or_default();
    let index = find_column(&header, column, source_name)?;

    let mut table = InputTable::default();
    for (offset, cells) in rows.enumerate() {
        // header is spreadsheet row first_row + 1
        let row = first_row + offset + 2;
        match cells.get(index).and_then(cell_text) {
            Some(raw) => table.identifiers.push(InputIdentifier { row, raw }),
            None => {
                debug!("Row {} has no identifier, skipping", row);
                table.blank_rows_skipped += 1;
            }
        }
    }

    Ok(table)
}

fn read_csv(bytes: Vec<u8>, schema: &InputSchema<'_>, source_name: &str) -> Result<InputTable> {
    let separator = detect_separator(&bytes);
    debug!("CSV separator for {}: {:?}", source_name, separator as char);

    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .map_parse_options(|options| options.with_separator(separator))
        .into_reader_with_file_handle(Cursor::new(bytes))
        .finish()?;

    let header: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|name| name.to_string())
        .collect();
    let index = find_column(&header, schema.column, source_name)?;

    let values = df
        .column(header[index].as_str())?
        .as_materialized_series()
        .str()?;

    let mut table = InputTable::default();
    for (offset, value) in values.into_iter().enumerate() {
        let row = offset + 2;
        match value.and_then(text_cell) {
            Some(raw) => table.identifiers.push(InputIdentifier { row, raw }),
            None => {
                debug!("Row {} has no identifier, skipping", row);
                table.blank_rows_skipped += 1;
            }
        }
    }

    Ok(table)
}

/// Semicolon when the header line uses it and has no comma
fn detect_separator(bytes: &[u8]) -> u8 {
    let header = bytes.split(|&b| b == b'\n').next().unwrap_or_default();
    if header.contains(&b';') && !header.contains(&b',') {
        b';'
    } else {
        b','
    }
}

/// Locate the identifier column by exact, trimmed header match
fn find_column(header: &[String], column: &str, source_name: &str) -> Result<usize> {
    header
        .iter()
        .position(|name| clean_header(name) == column)
        .ok_or_else(|| LookupError::MissingColumn {
            column: column.to_string(),
            source_name: source_name.to_string(),
            available: header
                .iter()
                .map(|h| clean_header(h))
                .filter(|h| !h.is_empty())
                .collect::<Vec<_>>()
                .join(", "),
        })
}

fn clean_header(name: &str) -> &str {
    name.trim_start_matches('\u{feff}').trim()
}

/// Text of a spreadsheet cell, `None` for blanks
fn cell_text(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty => None,
        Data::String(s) => text_cell(s),
        Data::Int(i) if *i >= 0 => Some(pad_digits(i.to_string())),
        Data::Float(f) => Some(float_cell(*f)),
        other => text_cell(&other.to_string()),
    }
}

/// Trimmed text, recovering numbers that were exported in scientific notation
fn text_cell(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    if SCIENTIFIC_NOTATION.is_match(trimmed) {
        if let Ok(value) = trimmed.parse::<f64>() {
            return Some(float_cell(value));
        }
    }

    Some(trimmed.to_string())
}

fn float_cell(value: f64) -> String {
    if value.is_finite() && value >= 0.0 && value.fract() == 0.0 && value < 1e15 {
        pad_digits(format!("{value:.0}"))
    } else {
        value.to_string()
    }
}

/// Left-pad a digit string to the CNPJ length
fn pad_digits(digits: String) -> String {
    if digits.len() < CNPJ_LENGTH {
        format!("{digits:0>width$}", width = CNPJ_LENGTH)
    } else {
        digits
    }
}
