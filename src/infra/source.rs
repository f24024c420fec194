use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::domain::{Row, SqlValue};

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid CSV: {0}")]
    InvalidCsv(#[from] csv::Error),
    #[error("Row {line} has {found} fields, expected {expected}")]
    RaggedRow {
        line: u64,
        found: usize,
        expected: usize,
    },
}

/// Rows read from a CSV file; the header line names the target columns.
#[derive(Debug, Clone, PartialEq)]
pub struct CsvRows {
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
}

pub fn read_csv_rows(path: &Path) -> Result<CsvRows, SourceError> {
    let file = File::open(path).map_err(|source| SourceError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    parse_csv_rows(file)
}

pub fn parse_csv_rows<R: Read>(reader: R) -> Result<CsvRows, SourceError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let columns: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        if record.len() != columns.len() {
            return Err(SourceError::RaggedRow {
                line: record.position().map(|p| p.line()).unwrap_or_default(),
                found: record.len(),
                expected: columns.len(),
            });
        }
        rows.push(record.iter().map(SqlValue::infer).collect());
    }

    Ok(CsvRows { columns, rows })
}
