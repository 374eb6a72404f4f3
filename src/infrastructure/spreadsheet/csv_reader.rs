// ============================================================
// CSV READER
// ============================================================
// CSV uploads with encoding fallback and delimiter detection

use csv::{ReaderBuilder, Trim};
use encoding_rs::WINDOWS_1252;
use std::borrow::Cow;

use super::build_table;
use crate::domain::error::{AppError, Result};
use crate::domain::record::{CellValue, SheetTable};

const DELIMITER_CANDIDATES: [u8; 4] = [b',', b';', b'\t', b'|'];

/// CSV reader; the delimiter is sniffed unless set explicitly.
#[derive(Debug, Default)]
pub struct CsvReader {
    delimiter: Option<u8>,
}

impl CsvReader {
    #[cfg(test)]
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = Some(delimiter);
        self
    }

    pub fn read(&self, bytes: &[u8]) -> Result<SheetTable> {
        let content = decode(bytes);
        let delimiter = self
            .delimiter
            .unwrap_or_else(|| detect_delimiter(&content));

        let mut reader = ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(false)
            .flexible(true)
            .trim(Trim::All)
            .from_reader(content.as_bytes());

        let mut records = reader.records();
        let header: Vec<String> = match records.next() {
            Some(record) => record
                .map_err(|e| {
                    AppError::IngestionFailure(format!("Failed to read CSV header: {}", e))
                })?
                .iter()
                .map(|s| s.to_string())
                .collect(),
            None => return Err(AppError::IngestionFailure("CSV file is empty".to_string())),
        };

        let mut body = Vec::new();
        for (index, record) in records.enumerate() {
            let record = record.map_err(|e| {
                AppError::IngestionFailure(format!("Failed to parse CSV row {}: {}", index + 1, e))
            })?;
            body.push(record.iter().map(CellValue::from_text).collect());
        }

        build_table(header, body)
    }
}

/// UTF-8 (BOM stripped) first, Windows-1252 for legacy Excel exports.
fn decode(bytes: &[u8]) -> Cow<'_, str> {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    match std::str::from_utf8(bytes) {
        Ok(text) => Cow::Borrowed(text),
        Err(_) => {
            let (text, _, _) = WINDOWS_1252.decode(bytes);
            text
        }
    }
}

/// Pick the candidate that splits the first lines most often and most evenly.
pub(crate) fn detect_delimiter(content: &str) -> u8 {
    let sample_lines: Vec<_> = content.lines().take(10).collect();
    if sample_lines.is_empty() {
        return b',';
    }

    let mut best_delimiter = b',';
    let mut best_score = 0.0f32;

    for &delimiter in &DELIMITER_CANDIDATES {
        let field_counts: Vec<usize> = sample_lines
            .iter()
            .map(|line| line.bytes().filter(|&b| b == delimiter).count())
            .collect();

        let avg = field_counts.iter().sum::<usize>() as f32 / field_counts.len() as f32;
        let variance = field_counts
            .iter()
            .map(|&x| (x as f32 - avg).powi(2))
            .sum::<f32>()
            / field_counts.len() as f32;

        let score = avg / (1.0 + variance.sqrt());
        if score > best_score {
            best_score = score;
            best_delimiter = delimiter;
        }
    }

    best_delimiter
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_delimiter() {
        assert_eq!(detect_delimiter("a,b,c\nd,e,f"), b',');
        assert_eq!(detect_delimiter("a;b;c\nd;e;f"), b';');
        assert_eq!(detect_delimiter("a\tb\nc\td"), b'\t');
        assert_eq!(detect_delimiter(""), b',');
    }

    #[test]
    fn test_read_semicolon_file_with_types() {
        let table = CsvReader::default()
            .read("cedula;estado;monto\n101;Zulia;2,5\n102;Lara;\n".as_bytes())
            .unwrap();
        assert_eq!(table.columns, vec!["cedula", "estado", "monto"]);
        assert_eq!(table.rows[0][0], CellValue::Integer(101));
        assert_eq!(table.rows[0][1], CellValue::Text("Zulia".to_string()));
        assert_eq!(table.rows[1][2], CellValue::Null);
    }

    #[test]
    fn test_read_windows_1252() {
        // "Mérida" encoded as Windows-1252
        let bytes = b"estado\nM\xE9rida\n";
        let table = CsvReader::default().read(bytes).unwrap();
        assert_eq!(table.rows[0][0], CellValue::Text("Mérida".to_string()));
    }

    #[test]
    fn test_bom_is_stripped() {
        let table = CsvReader::default()
            .read(b"\xEF\xBB\xBFcedula\n1\n")
            .unwrap();
        assert_eq!(table.columns, vec!["cedula"]);
    }

    #[test]
    fn test_explicit_delimiter() {
        let table = CsvReader::default()
            .with_delimiter(b'|')
            .read(b"a|b\n1|2\n")
            .unwrap();
        assert_eq!(table.rows[0], vec![CellValue::Integer(1), CellValue::Integer(2)]);
    }

    #[test]
    fn test_empty_file_is_an_ingestion_failure() {
        assert!(matches!(
            CsvReader::default().read(b""),
            Err(AppError::IngestionFailure(_))
        ));
    }
}
