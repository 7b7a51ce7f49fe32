//! Core domain types for ticketdash
//!
//! ## Terminology
//!
//! | Term | Definition |
//! |------|------------|
//! | **Row** | One line of the export as read, header cell → value |
//! | **Record** | A row bound to the known columns (month, client, analyst, ...) |
//! | **Snapshot** | Derived statistics for a set of records |
//! | **Bucket** | The records sharing one period label (e.g. one month) |
//! | **Sentinel** | `SEM CATEGORIA` (uncategorized) or `GERAL` (umbrella client) |
//! | **Escalation** | A record whose status is the configured escalation label |
//! | **Terminal status** | A closed/resolved status |

use crate::config::ColumnNames;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Placeholder label for blank categories.
pub const UNCATEGORIZED: &str = "SEM CATEGORIA";

/// Umbrella client used for tickets not tied to a real customer.
pub const GENERAL_CLIENT: &str = "GERAL";

/// Display value for rankings with no winner.
pub const NOT_AVAILABLE: &str = "N/A";

/// Whether `label` is one of the sentinel categories excluded from client
/// rankings and uniqueness counts.
pub fn is_sentinel(label: &str) -> bool {
    label == UNCATEGORIZED || label == GENERAL_CLIENT
}

/// One parsed input line, in header order. Missing cells are `""`.
pub type Row = IndexMap<String, String>;

/// The columns the analytics understand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    Month,
    Client,
    Analyst,
    WorkItemType,
    Tags,
    Status,
}

impl Column {
    pub const ALL: [Column; 6] = [
        Column::Month,
        Column::Client,
        Column::Analyst,
        Column::WorkItemType,
        Column::Tags,
        Column::Status,
    ];
}

/// A ticket bound to the known columns.
///
/// Absent columns read as `""`; the aggregator maps blanks to
/// [`UNCATEGORIZED`]. Columns outside the known set are kept in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    /// Raw period label (e.g. `2024-03`), never normalized
    pub month: String,
    pub client: String,
    pub analyst: String,
    pub work_item_type: String,
    /// Comma-separated tag list as exported
    pub tags: String,
    pub status: String,
    /// Unknown columns, in header order
    pub extra: Row,
}

impl Record {
    /// Bind a row using the configured header names.
    pub fn from_row(row: &Row, columns: &ColumnNames) -> Self {
        let mut record = Record::default();
        for (header, value) in row {
            match columns.column_for(header) {
                Some(column) => *record.field_mut(column) = value.clone(),
                None => {
                    record.extra.insert(header.clone(), value.clone());
                }
            }
        }
        record
    }

    /// Value of a known column.
    pub fn get(&self, column: Column) -> &str {
        match column {
            Column::Month => &self.month,
            Column::Client => &self.client,
            Column::Analyst => &self.analyst,
            Column::WorkItemType => &self.work_item_type,
            Column::Tags => &self.tags,
            Column::Status => &self.status,
        }
    }

    /// Flatten back into a row: known columns under their configured
    /// headers, then the extra cells.
    pub fn to_row(&self, columns: &ColumnNames) -> Row {
        let mut row: Row = Column::ALL
            .into_iter()
            .map(|column| (columns.header(column).to_string(), self.get(column).to_string()))
            .collect();
        for (header, value) in &self.extra {
            row.insert(header.clone(), value.clone());
        }
        row
    }

    fn field_mut(&mut self, column: Column) -> &mut String {
        match column {
            Column::Month => &mut self.month,
            Column::Client => &mut self.client,
            Column::Analyst => &mut self.analyst,
            Column::WorkItemType => &mut self.work_item_type,
            Column::Tags => &mut self.tags,
            Column::Status => &mut self.status,
        }
    }
}

/// Display info for the person the dashboard belongs to. Opaque to the
/// analytics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInfo {
    pub name: String,
    pub role: String,
}
