// ============================================================
// XLSX READER
// ============================================================
// Reads the first worksheet of an in-memory workbook

use std::io::Cursor;

use calamine::{open_workbook_from_rs, Data, DataType, Range, Reader, Xlsx};
use tracing::debug;

use super::build_table;
use crate::domain::error::{AppError, Result};
use crate::domain::record::{CellValue, SheetTable};

/// Largest float that still converts to i64 without loss of integrality.
const MAX_EXACT_INT: f64 = 9_007_199_254_740_992.0;

#[derive(Debug, Default)]
pub struct XlsxReader;

impl XlsxReader {
    pub fn read(&self, bytes: &[u8]) -> Result<SheetTable> {
        let mut workbook: Xlsx<_> = open_workbook_from_rs(Cursor::new(bytes))
            .map_err(|e| AppError::IngestionFailure(format!("Failed to open Excel file: {}", e)))?;

        let range = workbook
            .worksheet_range_at(0)
            .ok_or_else(|| AppError::IngestionFailure("No worksheet found".to_string()))?
            .map_err(|e| {
                AppError::IngestionFailure(format!("Failed to read Excel range: {}", e))
            })?;

        let table = Self::table_from_range(&range)?;
        debug!(
            columns = table.columns.len(),
            rows = table.rows.len(),
            "Parsed first worksheet"
        );
        Ok(table)
    }

    fn table_from_range(range: &Range<Data>) -> Result<SheetTable> {
        let mut rows = range.rows();
        let header: Vec<String> = rows
            .next()
            .ok_or_else(|| AppError::IngestionFailure("Worksheet is empty".to_string()))?
            .iter()
            .map(header_text)
            .collect();

        let body = rows
            .map(|row| row.iter().map(cell_value).collect())
            .collect();

        build_table(header, body)
    }
}

fn header_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::Float(f) if f.fract() == 0.0 && f.abs() < MAX_EXACT_INT => {
            format!("{}", *f as i64)
        }
        other => other.to_string().trim().to_string(),
    }
}

/// Integral floats become integers, as Excel stores every number as a float.
fn cell_value(cell: &Data) -> CellValue {
    match cell {
        Data::Empty | Data::Error(_) => CellValue::Null,
        Data::Int(i) => CellValue::Integer(*i),
        Data::Float(f) if f.fract() == 0.0 && f.abs() < MAX_EXACT_INT => {
            CellValue::Integer(*f as i64)
        }
        Data::Float(f) => CellValue::Real(*f),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::String(s) if s.trim().is_empty() => CellValue::Null,
        Data::String(s) => CellValue::Text(s.trim().to_string()),
        Data::DateTime(_) | Data::DateTimeIso(_) => match cell.as_datetime() {
            Some(dt) => CellValue::Date(dt),
            None => CellValue::Text(cell.to_string()),
        },
        Data::DurationIso(s) => CellValue::Text(s.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use calamine::{ExcelDateTime, ExcelDateTimeType};

    #[test]
    fn test_integral_floats_become_integers() {
        assert_eq!(cell_value(&Data::Float(12345678.0)), CellValue::Integer(12345678));
        assert_eq!(cell_value(&Data::Float(2.5)), CellValue::Real(2.5));
        assert_eq!(cell_value(&Data::Int(7)), CellValue::Integer(7));
    }

    #[test]
    fn test_blank_and_error_cells_are_null() {
        assert_eq!(cell_value(&Data::Empty), CellValue::Null);
        assert_eq!(cell_value(&Data::String("   ".to_string())), CellValue::Null);
    }

    #[test]
    fn test_text_is_trimmed() {
        assert_eq!(
            cell_value(&Data::String("  Zulia ".to_string())),
            CellValue::Text("Zulia".to_string())
        );
    }

    #[test]
    fn test_iso_datetime_cells_parse() {
        match cell_value(&Data::DateTimeIso("2023-05-04T10:00:00".to_string())) {
            CellValue::Date(dt) => assert_eq!(dt.format("%Y-%m-%d").to_string(), "2023-05-04"),
            other => panic!("expected date, got {:?}", other),
        }
    }

    #[test]
    fn test_serial_datetime_cells_parse() {
        let serial = ExcelDateTime::new(45000.0, ExcelDateTimeType::DateTime, false);
        match cell_value(&Data::DateTime(serial)) {
            CellValue::Date(dt) => {
                assert_eq!(dt.format("%Y-%m-%d %H:%M:%S").to_string(), "2023-03-15 00:00:00")
            }
            other => panic!("expected date, got {:?}", other),
        }
    }

    #[test]
    fn test_header_text() {
        assert_eq!(header_text(&Data::String(" cedula ".to_string())), "cedula");
        assert_eq!(header_text(&Data::Float(2023.0)), "2023");
        assert_eq!(header_text(&Data::Empty), "");
    }

    #[test]
    fn test_table_from_range() {
        let mut range: Range<Data> = Range::new((0, 0), (2, 1));
        range.set_value((0, 0), Data::String("cedula".to_string()));
        range.set_value((0, 1), Data::String("estado".to_string()));
        range.set_value((1, 0), Data::Float(101.0));
        range.set_value((1, 1), Data::String("Lara".to_string()));
        range.set_value((2, 0), Data::Float(102.0));

        let table = XlsxReader::table_from_range(&range).unwrap();
        assert_eq!(table.columns, vec!["cedula".to_string(), "estado".to_string()]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[1], vec![CellValue::Integer(102), CellValue::Null]);
    }
}
