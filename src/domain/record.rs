use chrono::NaiveDateTime;
use serde::Serialize;
use std::collections::BTreeMap;

pub const SOURCE_FILE_COLUMN: &str = "source_file";
pub const LOAD_TIMESTAMP_COLUMN: &str = "load_timestamp";

/// `load_timestamp` rendering, minute granularity.
pub const LOAD_TIMESTAMP_FORMAT: &str = "%d-%m-%Y %H:%M";

/// How coerced dates are stored, so that `substr(col, 1, 4)` is the year.
pub const STORED_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

static NULL_CELL: CellValue = CellValue::Null;

/// One spreadsheet cell as it will be bound into SQLite.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CellValue {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Bool(bool),
    Date(NaiveDateTime),
}

impl CellValue {
    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    /// Infer a typed value from raw text (CSV cells).
    pub fn from_text(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return CellValue::Null;
        }
        if let Ok(i) = trimmed.parse::<i64>() {
            return CellValue::Integer(i);
        }
        if let Ok(f) = trimmed.parse::<f64>() {
            if f.is_finite() {
                return CellValue::Real(f);
            }
        }
        CellValue::Text(trimmed.to_string())
    }
}

/// One ingested row: column name to value.
///
/// Uploaded files decide the column set, so this is a mapping rather than a
/// fixed struct; queries check the columns they need against the table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    values: BTreeMap<String, CellValue>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, column: impl Into<String>, value: CellValue) {
        self.values.insert(column.into(), value);
    }

    pub fn get(&self, column: &str) -> Option<&CellValue> {
        self.values.get(column)
    }

    pub fn get_mut(&mut self, column: &str) -> Option<&mut CellValue> {
        self.values.get_mut(column)
    }

    /// Value bound for `column`; absent columns bind as NULL.
    pub fn value_or_null(&self, column: &str) -> &CellValue {
        self.values.get(column).unwrap_or(&NULL_CELL)
    }

    pub fn stamp_provenance(&mut self, source_file: &str, load_timestamp: &str) {
        self.insert(SOURCE_FILE_COLUMN, CellValue::Text(source_file.to_string()));
        self.insert(
            LOAD_TIMESTAMP_COLUMN,
            CellValue::Text(load_timestamp.to_string()),
        );
    }
}

/// A parsed single-sheet upload: header plus rows in header order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SheetTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

impl SheetTable {
    pub fn into_records(self) -> Vec<Record> {
        let columns = self.columns;
        self.rows
            .into_iter()
            .map(|row| {
                let mut record = Record::new();
                for (idx, column) in columns.iter().enumerate() {
                    let value = row.get(idx).cloned().unwrap_or(CellValue::Null);
                    record.insert(column.clone(), value);
                }
                record
            })
            .collect()
    }
}

/// File handed over by the upload mechanism.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_text_infers_types() {
        assert_eq!(CellValue::from_text(" 42 "), CellValue::Integer(42));
        assert_eq!(CellValue::from_text("3.5"), CellValue::Real(3.5));
        assert_eq!(CellValue::from_text(""), CellValue::Null);
        assert_eq!(
            CellValue::from_text("Caracas"),
            CellValue::Text("Caracas".to_string())
        );
        assert_eq!(CellValue::from_text("NaN"), CellValue::Text("NaN".to_string()));
    }

    #[test]
    fn test_into_records_pads_short_rows() {
        let table = SheetTable {
            columns: vec!["cedula".to_string(), "estado".to_string()],
            rows: vec![vec![CellValue::Integer(1)]],
        };
        let records = table.into_records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].get("estado"), Some(&CellValue::Null));
    }

    #[test]
    fn test_stamp_provenance_overrides_uploaded_value() {
        let mut record = Record::new();
        record.insert(SOURCE_FILE_COLUMN, CellValue::Text("user value".to_string()));
        record.stamp_provenance("enero.xlsx", "01-02-2024 10:30");
        assert_eq!(
            record.get(SOURCE_FILE_COLUMN),
            Some(&CellValue::Text("enero.xlsx".to_string()))
        );
        assert_eq!(record.value_or_null("missing"), &CellValue::Null);
    }
}
