//! Two-stage record filter applied before aggregation.
//!
//! 1. Analyst selection: keep records assigned to one of the selected
//!    analysts ("overall" keeps everything).
//! 2. Dimension filter: optionally narrow to one client, work item or tag.
//!
//! Both stages are stable; the output keeps input order.

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

use super::normalize::{normalize_client, normalize_label, split_tags};
use crate::types::Record;

/// Value meaning "every value" for a dimension filter.
pub const ALL_VALUES: &str = "all";

/// Which analysts' records to include.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalystSelection {
    /// No analyst filtering
    #[default]
    Overall,
    /// Only these analysts; an empty set behaves like `Overall`
    Selected(IndexSet<String>),
}

impl AnalystSelection {
    pub fn selected<I, S>(analysts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        AnalystSelection::Selected(
            analysts
                .into_iter()
                .map(|a| {
                    let analyst: String = a.into();
                    analyst.trim().to_string()
                })
                .collect(),
        )
    }

    fn matches(&self, record: &Record) -> bool {
        match self {
            AnalystSelection::Overall => true,
            AnalystSelection::Selected(set) if set.is_empty() => true,
            AnalystSelection::Selected(set) => set.contains(record.analyst.trim()),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    #[default]
    None,
    Client,
    WorkItem,
    Tag,
}

impl Dimension {
    pub fn name(&self) -> &'static str {
        match self {
            Dimension::None => "none",
            Dimension::Client => "client",
            Dimension::WorkItem => "work item",
            Dimension::Tag => "tag",
        }
    }
}

/// Single-dimension filter. `value: None` is the "all" sentinel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DimensionFilter {
    pub dimension: Dimension,
    pub value: Option<String>,
}

impl DimensionFilter {
    /// Build a filter; blank values and `"all"` select every value.
    ///
    /// The value is normalized the same way as the records it is compared
    /// with, so a client filter keys on the first word (`"Acme Corp"` →
    /// `ACME`).
    pub fn new(dimension: Dimension, value: &str) -> Self {
        let value = value.trim();
        let value = if value.is_empty() || value.eq_ignore_ascii_case(ALL_VALUES) {
            None
        } else if dimension == Dimension::Client {
            Some(normalize_client(Some(value)))
        } else {
            Some(value.to_uppercase())
        };
        Self { dimension, value }
    }

    pub fn none() -> Self {
        Self::default()
    }

    pub fn client(value: &str) -> Self {
        Self::new(Dimension::Client, value)
    }

    pub fn work_item(value: &str) -> Self {
        Self::new(Dimension::WorkItem, value)
    }

    pub fn tag(value: &str) -> Self {
        Self::new(Dimension::Tag, value)
    }

    /// Whether this filter removes anything.
    pub fn is_active(&self) -> bool {
        self.dimension != Dimension::None && self.value.is_some()
    }

    fn matches(&self, record: &Record) -> bool {
        let Some(value) = self.value.as_deref().map(str::to_uppercase) else {
            return true;
        };
        match self.dimension {
            Dimension::None => true,
            Dimension::Client => normalize_client(Some(&record.client)) == value,
            Dimension::WorkItem => normalize_label(&record.work_item_type) == value,
            Dimension::Tag => split_tags(&record.tags).contains(&value),
        }
    }
}

/// Apply the analyst selection, then the dimension filter.
pub fn filter<'a, I>(
    records: I,
    analysts: &AnalystSelection,
    dimension: &DimensionFilter,
) -> Vec<&'a Record>
where
    I: IntoIterator<Item = &'a Record>,
{
    records
        .into_iter()
        .filter(|record| analysts.matches(record))
        .filter(|record| dimension.matches(record))
        .collect()
}

/// Distinct analysts in first-seen order, blanks skipped.
pub fn analysts<'a, I>(records: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a Record>,
{
    let mut seen: IndexSet<String> = IndexSet::new();
    for record in records {
        let analyst = record.analyst.trim();
        if !analyst.is_empty() && !seen.contains(analyst) {
            seen.insert(analyst.to_string());
        }
    }
    seen.into_iter().collect()
}

/// Distinct normalized values of `dimension`, in first-seen order.
pub fn dimension_values<'a, I>(records: I, dimension: Dimension) -> Vec<String>
where
    I: IntoIterator<Item = &'a Record>,
{
    let mut seen: IndexSet<String> = IndexSet::new();
    for record in records {
        match dimension {
            Dimension::None => return Vec::new(),
            Dimension::Client => {
                seen.insert(normalize_client(Some(&record.client)));
            }
            Dimension::WorkItem => {
                seen.insert(normalize_label(&record.work_item_type));
            }
            Dimension::Tag => seen.extend(split_tags(&record.tags)),
        }
    }
    seen.into_iter().collect()
}
