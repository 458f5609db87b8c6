//! Report writing.
//!
//! Renders the report rows as an xlsx workbook (rust_xlsxwriter) or a CSV
//! table (polars) and writes the bytes through a temporary file in the
//! target directory, so a failed or interrupted run never leaves a partial
//! report behind.

use crate::constants::{REPORT_SHEET_NAME, columns};
use crate::error::{LookupError, Result};
use crate::models::OutputRow;

use polars::prelude::{Column, CsvWriter, DataFrame, SerWriter};
use rust_xlsxwriter::{DocProperties, ExcelDateTime, Format, Workbook};
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::debug;

/// Column index of the numeric share capital cell
const SHARE_CAPITAL_COLUMN: u16 = 9;

/// Report file flavours, picked by extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Xlsx,
    Csv,
}

impl ReportFormat {
    pub fn from_path(path: &Path) -> Result<Self> {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .as_deref()
        {
            Some("xlsx") => Ok(ReportFormat::Xlsx),
            Some("csv") => Ok(ReportFormat::Csv),
            _ => Err(LookupError::UnsupportedFormat {
                path: path.to_path_buf(),
            }),
        }
    }
}

/// Write the report to `path`, replacing any existing file
pub fn write_report(path: &Path, rows: &[OutputRow]) -> Result<()> {
    let bytes = match ReportFormat::from_path(path)? {
        ReportFormat::Xlsx => render_xlsx(rows)?,
        ReportFormat::Csv => render_csv(rows)?,
    };

    debug!("Writing {} byte report to {}", bytes.len(), path.display());
    write_atomically(path, &bytes)
}

/// Render the report as xlsx bytes
///
/// The document creation date is fixed, so equal rows give equal bytes.
pub fn render_xlsx(rows: &[OutputRow]) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    let created = ExcelDateTime::from_ymd(2000, 1, 1)?;
    workbook.set_properties(&DocProperties::new().set_creation_datetime(&created));

    let header_format = Format::new().set_bold();
    let capital_format = Format::new().set_num_format("#,##0.00");

    let sheet = workbook.add_worksheet();
    sheet.set_name(REPORT_SHEET_NAME)?;

    for (col, name) in columns::ALL.iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, *name, &header_format)?;
    }

    for (index, row) in rows.iter().enumerate() {
        let excel_row = (index + 1) as u32;

        for (position, value) in row.text_cells().into_iter().enumerate() {
            if value.is_empty() {
                continue;
            }
            let mut col = position as u16;
            if col >= SHARE_CAPITAL_COLUMN {
                col += 1;
            }
            sheet.write_string(excel_row, col, value)?;
        }

        if let Some(capital) = row.share_capital {
            sheet.write_number_with_format(excel_row, SHARE_CAPITAL_COLUMN, capital, &capital_format)?;
        }
    }

    sheet.set_freeze_panes(1, 0)?;
    sheet.autofit();

    Ok(workbook.save_to_buffer()?)
}

/// Render the report as CSV bytes with a header row
///
/// Blank cells are written as empty fields.
pub fn render_csv(rows: &[OutputRow]) -> Result<Vec<u8>> {
    let mut frame_columns: Vec<Column> = Vec::with_capacity(columns::ALL.len());

    for (position, name) in columns::ALL.iter().enumerate() {
        let position = position as u16;
        let column = if position == SHARE_CAPITAL_COLUMN {
            let values: Vec<Option<f64>> = rows.iter().map(|r| r.share_capital).collect();
            Column::new((*name).into(), values)
        } else {
            let index = if position > SHARE_CAPITAL_COLUMN {
                position - 1
            } else {
                position
            } as usize;
            let values: Vec<Option<&str>> = rows
                .iter()
                .map(|r| Some(r.text_cells()[index]).filter(|v| !v.is_empty()))
                .collect();
            Column::new((*name).into(), values)
        };
        frame_columns.push(column);
    }

    let mut df = DataFrame::new(frame_columns)?;
    let mut buffer = Vec::new();
    CsvWriter::new(&mut buffer)
        .include_header(true)
        .finish(&mut df)?;

    Ok(buffer)
}

/// Write through a sibling temp file and rename it into place
fn write_atomically(path: &Path, bytes: &[u8]) -> Result<()> {
    let directory = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(directory)?;

    let mut temp = NamedTempFile::new_in(directory)
        .map_err(|e| LookupError::output_write(path, e))?;
    temp.write_all(bytes)
        .map_err(|e| LookupError::output_write(path, e))?;
    temp.as_file()
        .sync_all()
        .map_err(|e| LookupError::output_write(path, e))?;
    temp.persist(path)
        .map_err(|e| LookupError::output_write(path, e.error))?;

    Ok(())
}
