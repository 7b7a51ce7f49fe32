//! Ingestion layer for exported ticket logs
//!
//! ```text
//! ┌──────────────┐     ┌──────────┐     ┌───────────────┐     ┌───────────┐
//! │  export.csv  │ ──► │  reader  │ ──► │ Record::from_ │ ──► │ analytics │
//! │ (';' fields) │     │  (Rows)  │     │ row (binding) │     │           │
//! └──────────────┘     └──────────┘     └───────────────┘     └───────────┘
//! ```
//!
//! Reading the file is the only fallible step. Everything after it degrades
//! to blank cells instead of failing.

pub mod reader;

pub use reader::parse;

use crate::config::ColumnNames;
use crate::error::Result;
use crate::types::{Record, Row};
use std::path::Path;

/// An imported export: the rows as read and the records bound from them.
///
/// Rows are what gets persisted; records are recomputed on load.
#[derive(Debug, Clone, Default)]
pub struct Import {
    pub rows: Vec<Row>,
    pub records: Vec<Record>,
}

impl Import {
    /// Parse export text and bind it to the configured columns.
    pub fn from_text(text: &str, columns: &ColumnNames) -> Self {
        Self::from_rows(parse(text), columns)
    }

    /// Bind previously parsed (or stored) rows.
    pub fn from_rows(rows: Vec<Row>, columns: &ColumnNames) -> Self {
        let records = bind_rows(&rows, columns);
        Self { rows, records }
    }

    /// Read and parse an export file.
    pub fn from_path(path: &Path, columns: &ColumnNames) -> Result<Self> {
        let text = read_file(path)?;
        let import = Self::from_text(&text, columns);
        tracing::info!(
            path = %path.display(),
            records = import.records.len(),
            "Imported ticket export"
        );
        Ok(import)
    }
}

/// Read an export file.
///
/// Invalid UTF-8 is decoded lossily; only I/O failures are errors.
pub fn read_file(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Parse export text straight into records.
pub fn parse_records(text: &str, columns: &ColumnNames) -> Vec<Record> {
    bind_rows(&parse(text), columns)
}

/// Bind rows to the configured columns.
pub fn bind_rows(rows: &[Row], columns: &ColumnNames) -> Vec<Record> {
    rows.iter()
        .map(|row| Record::from_row(row, columns))
        .collect()
}
