// ============================================================
// SPREADSHEET INFRASTRUCTURE LAYER
// ============================================================
// Turns uploaded bytes into a header + typed rows table

mod csv_reader;
mod xlsx_reader;

pub use csv_reader::CsvReader;
pub use xlsx_reader::XlsxReader;

use crate::domain::error::{AppError, Result};
use crate::domain::record::{CellValue, SheetTable};
use std::collections::HashSet;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpreadsheetFormat {
    Xlsx,
    Csv,
}

impl SpreadsheetFormat {
    pub fn from_file_name(file_name: &str) -> Result<Self> {
        let extension = Path::new(file_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
            .ok_or_else(|| {
                AppError::IngestionFailure(format!("File '{}' has no extension", file_name))
            })?;

        match extension.as_str() {
            "xlsx" | "xlsm" => Ok(SpreadsheetFormat::Xlsx),
            "csv" => Ok(SpreadsheetFormat::Csv),
            other => Err(AppError::IngestionFailure(format!(
                "Unsupported file type '{}' for '{}' (expected .xlsx or .csv)",
                other, file_name
            ))),
        }
    }
}

/// Parse one uploaded file into a table, picking the reader by extension.
pub fn read_upload(file_name: &str, bytes: &[u8]) -> Result<SheetTable> {
    match SpreadsheetFormat::from_file_name(file_name)? {
        SpreadsheetFormat::Xlsx => XlsxReader::default().read(bytes),
        SpreadsheetFormat::Csv => CsvReader::default().read(bytes),
    }
}

/// Name blank headers `Unnamed: <idx>` and suffix repeats with `.1`, `.2`, ...
///
/// Repeats are detected case-insensitively because SQLite column names are.
pub(crate) fn normalize_headers(raw: &[String]) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut headers = Vec::with_capacity(raw.len());

    for (idx, name) in raw.iter().enumerate() {
        let base = match name.trim() {
            "" => format!("Unnamed: {}", idx),
            trimmed => trimmed.to_string(),
        };

        let mut candidate = base.clone();
        let mut suffix = 1;
        while !seen.insert(candidate.to_lowercase()) {
            candidate = format!("{}.{}", base, suffix);
            suffix += 1;
        }
        headers.push(candidate);
    }

    headers
}

/// Assemble the table: first row is the header, fully empty rows are dropped.
pub(crate) fn build_table(header: Vec<String>, body: Vec<Vec<CellValue>>) -> Result<SheetTable> {
    if header.iter().all(|h| h.trim().is_empty()) {
        return Err(AppError::IngestionFailure(
            "Spreadsheet has no header row".to_string(),
        ));
    }

    let columns = normalize_headers(&header);
    let width = columns.len();
    let mut rows = Vec::with_capacity(body.len());
    for (index, mut row) in body.into_iter().enumerate() {
        if row.iter().all(CellValue::is_null) {
            continue;
        }
        if row.iter().skip(width).any(|cell| !cell.is_null()) {
            // Header is row 1.
            return Err(AppError::IngestionFailure(format!(
                "Row {} has {} values but the header has {} columns",
                index + 2,
                row.len(),
                width
            )));
        }
        row.resize(width, CellValue::Null);
        rows.push(row);
    }

    Ok(SheetTable { columns, rows })
}
