//! Dataset decoding and summary statistics
//!
//! This module turns an uploaded base64 payload into an in-memory table
//! and derives the values the dashboard displays: record/column counts,
//! the date-range card, the grid preview, and the textual head used for
//! prompting.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashSet;
use thiserror::Error;

/// Errors produced while decoding or parsing an uploaded payload
#[derive(Error, Debug)]
pub enum ParseError {
    /// Payload was not valid base64
    #[error("invalid base64 payload: {0}")]
    InvalidEncoding(String),

    /// Decoded bytes were not valid UTF-8 text
    #[error("payload is not valid UTF-8 text")]
    InvalidText,

    /// File extension is not a supported tabular format
    #[error("unsupported file format: {0}")]
    UnsupportedFormat(String),

    /// CSV structure could not be parsed
    #[error("invalid CSV content: {0}")]
    InvalidCsv(String),

    /// Header contains the same column name twice
    #[error("duplicate column name: {0}")]
    DuplicateColumn(String),

    /// Payload decoded to an empty document
    #[error("empty upload")]
    Empty,
}

/// An in-memory table with named, ordered columns
///
/// Columns are unique and ordered as in the CSV header; rows hold
/// heterogeneous scalar values (`serde_json::Value` numbers, bools,
/// strings, or null for empty cells). A Dataset is replaced wholesale by
/// the next successful upload and is never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

/// Derived upload statistics shown in the dashboard cards
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UploadStats {
    /// Total rows in the dataset
    pub records: usize,
    /// Number of columns
    pub columns: usize,
    /// Min-max of a column literally named "year", or "N/A"
    pub date_range: String,
}

/// Column definition entry for the preview grid
#[derive(Debug, Clone, Serialize)]
pub struct ColumnDef {
    /// Column name as it appears in the header
    pub field: String,
}

/// Grid-oriented preview of the dataset
#[derive(Debug, Clone, Serialize)]
pub struct DatasetPreview {
    /// Column definitions in header order
    pub columns: Vec<ColumnDef>,
    /// Row records, one JSON object per row
    pub rows: Vec<serde_json::Map<String, Value>>,
}

/// Decode and parse an uploaded payload into a [`Dataset`]
///
/// Accepts either a data-URL style payload (`data:text/csv;base64,<data>`)
/// or a bare base64 string. The filename is used only for format
/// disambiguation: `.csv` and extension-less names parse as CSV, anything
/// else is rejected as unsupported.
///
/// # Errors
///
/// Returns a [`ParseError`] when decoding fails, the bytes are not valid
/// tabular text, or the format is unrecognized. Callers own the previous
/// dataset; a failed parse must not replace it.
pub fn parse_upload(contents: &str, filename: &str) -> Result<Dataset, ParseError> {
    if let Some(ext) = extension(filename) {
        if ext != "csv" {
            return Err(ParseError::UnsupportedFormat(ext));
        }
    }

    // Data-URL uploads carry a "<media-type>;base64," prefix
    let encoded = match contents.split_once(',') {
        Some((prefix, data)) if prefix.contains("base64") => data,
        _ => contents,
    };

    let bytes = BASE64
        .decode(encoded.trim())
        .map_err(|e| ParseError::InvalidEncoding(e.to_string()))?;
    let text = String::from_utf8(bytes).map_err(|_| ParseError::InvalidText)?;

    Dataset::from_csv(&text)
}

fn extension(filename: &str) -> Option<String> {
    std::path::Path::new(filename)
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
}

impl Dataset {
    /// Parse CSV text into a Dataset
    ///
    /// The first line is the header; columns keep header order and must be
    /// unique. Cell values are inferred as integer, float, bool, or string;
    /// empty cells become null.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError`] for empty input, duplicate headers, or
    /// structurally invalid CSV (e.g. ragged rows).
    pub fn from_csv(text: &str) -> Result<Self, ParseError> {
        if text.trim().is_empty() {
            return Err(ParseError::Empty);
        }

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(text.as_bytes());

        let headers = reader
            .headers()
            .map_err(|e| ParseError::InvalidCsv(e.to_string()))?;
        let columns: Vec<String> = headers.iter().map(|h| h.to_string()).collect();
        if columns.is_empty() {
            return Err(ParseError::Empty);
        }

        let mut seen = HashSet::new();
        for name in &columns {
            if !seen.insert(name.as_str()) {
                return Err(ParseError::DuplicateColumn(name.clone()));
            }
        }

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record.map_err(|e| ParseError::InvalidCsv(e.to_string()))?;
            rows.push(record.iter().map(infer_cell).collect());
        }

        Ok(Self { columns, rows })
    }

    /// Column names in header order
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Number of rows
    pub fn record_count(&self) -> usize {
        self.rows.len()
    }

    /// Number of columns
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Index of a column by exact name
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// All values of one column, in row order
    ///
    /// Returns `None` when the column does not exist.
    pub fn column_values(&self, name: &str) -> Option<Vec<Value>> {
        let idx = self.column_index(name)?;
        Some(
            self.rows
                .iter()
                .map(|row| row.get(idx).cloned().unwrap_or(Value::Null))
                .collect(),
        )
    }

    /// Derived statistics for the dashboard cards
    ///
    /// The date range is the min-max of a column literally named `year`
    /// formatted as `"2010 - 2020"`; when no such column exists or it has
    /// no numeric values the range is `"N/A"`.
    pub fn stats(&self) -> UploadStats {
        UploadStats {
            records: self.record_count(),
            columns: self.column_count(),
            date_range: self.year_range(),
        }
    }

    fn year_range(&self) -> String {
        let Some(values) = self.column_values("year") else {
            return "N/A".to_string();
        };

        let numbers: Vec<f64> = values.iter().filter_map(numeric_value).collect();
        if numbers.is_empty() {
            return "N/A".to_string();
        }

        let min = numbers.iter().cloned().fold(f64::INFINITY, f64::min);
        let max = numbers.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        format!("{} - {}", format_year(min), format_year(max))
    }

    /// Textual rendering of the first `n` rows, used for prompting
    ///
    /// Produces a padded, whitespace-aligned table with the header as the
    /// first line.
    pub fn head_text(&self, n: usize) -> String {
        let shown = self.rows.iter().take(n);
        let mut cells: Vec<Vec<String>> = vec![self.columns.clone()];
        for row in shown {
            cells.push(row.iter().map(display_cell).collect());
        }

        let mut widths = vec![0usize; self.columns.len()];
        for row in &cells {
            for (i, cell) in row.iter().enumerate() {
                widths[i] = widths[i].max(cell.chars().count());
            }
        }

        cells
            .iter()
            .map(|row| {
                row.iter()
                    .enumerate()
                    .map(|(i, cell)| format!("{:<width$}", cell, width = widths[i]))
                    .collect::<Vec<_>>()
                    .join("  ")
                    .trim_end()
                    .to_string()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Grid preview with at most `limit` rows
    pub fn preview(&self, limit: usize) -> DatasetPreview {
        DatasetPreview {
            columns: self
                .columns
                .iter()
                .map(|c| ColumnDef { field: c.clone() })
                .collect(),
            rows: self.to_records(limit),
        }
    }

    /// Row-oriented JSON records for at most `limit` rows
    pub fn to_records(&self, limit: usize) -> Vec<serde_json::Map<String, Value>> {
        self.rows
            .iter()
            .take(limit)
            .map(|row| {
                self.columns
                    .iter()
                    .cloned()
                    .zip(row.iter().cloned())
                    .collect()
            })
            .collect()
    }
}

/// Infer a typed cell value from CSV text
///
/// Order: integer, float, bool, string. Empty cells become null.
fn infer_cell(raw: &str) -> Value {
    if raw.is_empty() {
        return Value::Null;
    }
    if let Ok(i) = raw.parse::<i64>() {
        return Value::from(i);
    }
    if let Ok(f) = raw.parse::<f64>() {
        if let Some(num) = serde_json::Number::from_f64(f) {
            return Value::Number(num);
        }
    }
    match raw {
        "true" | "True" | "TRUE" => return Value::Bool(true),
        "false" | "False" | "FALSE" => return Value::Bool(false),
        _ => {}
    }
    Value::String(raw.to_string())
}

fn numeric_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn format_year(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

fn display_cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CSV: &str = "year,country,value\n2010,NL,1.5\n2015,BE,2\n2020,DE,3.25\n";

    fn encode(text: &str) -> String {
        BASE64.encode(text.as_bytes())
    }

    #[test]
    fn test_from_csv_counts_and_header_order() {
        let ds = Dataset::from_csv(CSV).unwrap();
        assert_eq!(ds.record_count(), 3);
        assert_eq!(ds.column_count(), 3);
        assert_eq!(ds.columns(), &["year", "country", "value"]);
    }

    #[test]
    fn test_cell_type_inference() {
        let ds = Dataset::from_csv("a,b,c,d\n1,2.5,true,text\n").unwrap();
        let records = ds.to_records(10);
        assert_eq!(records[0]["a"], Value::from(1));
        assert_eq!(records[0]["b"], Value::from(2.5));
        assert_eq!(records[0]["c"], Value::Bool(true));
        assert_eq!(records[0]["d"], Value::from("text"));
    }

    #[test]
    fn test_empty_cell_is_null() {
        let ds = Dataset::from_csv("a,b\n1,\n").unwrap();
        assert_eq!(ds.to_records(10)[0]["b"], Value::Null);
    }

    #[test]
    fn test_duplicate_header_rejected() {
        let err = Dataset::from_csv("a,b,a\n1,2,3\n").unwrap_err();
        assert!(matches!(err, ParseError::DuplicateColumn(_)));
    }

    #[test]
    fn test_ragged_row_rejected() {
        let err = Dataset::from_csv("a,b\n1,2,3\n").unwrap_err();
        assert!(matches!(err, ParseError::InvalidCsv(_)));
    }

    #[test]
    fn test_empty_input_rejected() {
        assert!(matches!(
            Dataset::from_csv("  \n"),
            Err(ParseError::Empty)
        ));
    }

    #[test]
    fn test_year_range() {
        let ds = Dataset::from_csv("year,value\n2010,1\n2015,2\n2020,3\n").unwrap();
        assert_eq!(ds.stats().date_range, "2010 - 2020");
    }

    #[test]
    fn test_year_range_absent_column() {
        let ds = Dataset::from_csv("a,b\n1,2\n").unwrap();
        assert_eq!(ds.stats().date_range, "N/A");
    }

    #[test]
    fn test_year_range_non_numeric_values() {
        let ds = Dataset::from_csv("year\nnot-a-year\n").unwrap();
        assert_eq!(ds.stats().date_range, "N/A");
    }

    #[test]
    fn test_stats_counts() {
        let ds = Dataset::from_csv(CSV).unwrap();
        let stats = ds.stats();
        assert_eq!(stats.records, 3);
        assert_eq!(stats.columns, 3);
    }

    #[test]
    fn test_parse_upload_bare_base64() {
        let ds = parse_upload(&encode(CSV), "data.csv").unwrap();
        assert_eq!(ds.record_count(), 3);
    }

    #[test]
    fn test_parse_upload_data_url() {
        let payload = format!("data:text/csv;base64,{}", encode(CSV));
        let ds = parse_upload(&payload, "data.csv").unwrap();
        assert_eq!(ds.record_count(), 3);
        assert_eq!(ds.columns()[0], "year");
    }

    #[test]
    fn test_parse_upload_no_extension_defaults_to_csv() {
        let ds = parse_upload(&encode(CSV), "upload").unwrap();
        assert_eq!(ds.record_count(), 3);
    }

    #[test]
    fn test_parse_upload_bad_base64() {
        let err = parse_upload("!!!not base64!!!", "data.csv").unwrap_err();
        assert!(matches!(err, ParseError::InvalidEncoding(_)));
    }

    #[test]
    fn test_parse_upload_unsupported_extension() {
        let err = parse_upload(&encode(CSV), "data.parquet").unwrap_err();
        assert!(matches!(err, ParseError::UnsupportedFormat(_)));
    }

    #[test]
    fn test_parse_upload_binary_payload() {
        let payload = BASE64.encode([0xff, 0xfe, 0x00, 0x01]);
        let err = parse_upload(&payload, "data.csv").unwrap_err();
        assert!(matches!(err, ParseError::InvalidText));
    }

    #[test]
    fn test_head_text_contains_header_and_rows() {
        let ds = Dataset::from_csv(CSV).unwrap();
        let head = ds.head_text(2);
        let lines: Vec<&str> = head.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("year"));
        assert!(lines[1].contains("2010"));
        assert!(lines[2].contains("2015"));
        assert!(!head.contains("2020"));
    }

    #[test]
    fn test_head_text_alignment() {
        let ds = Dataset::from_csv("name,n\nlongvalue,1\nx,2\n").unwrap();
        let head = ds.head_text(5);
        // Both data lines start their second column at the same offset
        let lines: Vec<&str> = head.lines().collect();
        let pos1 = lines[1].find('1').unwrap();
        let pos2 = lines[2].find('2').unwrap();
        assert_eq!(pos1, pos2);
    }

    #[test]
    fn test_preview_respects_limit() {
        let ds = Dataset::from_csv(CSV).unwrap();
        let preview = ds.preview(2);
        assert_eq!(preview.columns.len(), 3);
        assert_eq!(preview.rows.len(), 2);
        assert_eq!(preview.columns[1].field, "country");
    }

    #[test]
    fn test_column_values() {
        let ds = Dataset::from_csv(CSV).unwrap();
        let years = ds.column_values("year").unwrap();
        assert_eq!(years, vec![Value::from(2010), Value::from(2015), Value::from(2020)]);
        assert!(ds.column_values("missing").is_none());
    }

    #[test]
    fn test_quoted_fields() {
        let ds = Dataset::from_csv("a,b\n\"x, y\",2\n").unwrap();
        assert_eq!(ds.to_records(1)[0]["a"], Value::from("x, y"));
    }
}
