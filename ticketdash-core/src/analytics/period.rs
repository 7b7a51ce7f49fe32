//! Month buckets and the per-month snapshot cache.
//!
//! Buckets are keyed by the raw month label and ordered lexicographically.
//! Labels must sort the same way chronologically (e.g. `YYYY-MM`) for
//! "previous month" to mean the calendar predecessor.

use std::collections::BTreeMap;
use std::ops::Bound;

use serde::Serialize;

use super::snapshot::{aggregate, Snapshot};
use super::variation::{variation, SnapshotField, Variation};
use crate::config::AnalyticsConfig;
use crate::types::Record;

/// Partition records by month label.
///
/// Records with a blank label are dropped. Within a bucket records keep
/// their input order.
pub fn group_by_period<'a, I>(records: I) -> BTreeMap<String, Vec<&'a Record>>
where
    I: IntoIterator<Item = &'a Record>,
{
    let mut buckets: BTreeMap<String, Vec<&'a Record>> = BTreeMap::new();
    for record in records {
        if record.month.trim().is_empty() {
            continue;
        }
        buckets.entry(record.month.clone()).or_default().push(record);
    }
    buckets
}

/// Sorted distinct month labels (the period picker).
pub fn available_periods<'a, I>(records: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a Record>,
{
    group_by_period(records).into_keys().collect()
}

/// Variation of one figure against the previous period.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FieldVariation {
    pub field: SnapshotField,
    pub variation: Option<Variation>,
}

/// One snapshot per month, rebuilt wholesale whenever the input changes.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct PeriodSnapshots {
    snapshots: BTreeMap<String, Snapshot>,
}

impl PeriodSnapshots {
    /// Aggregate each month bucket of `records`.
    pub fn build<'a, I>(records: I, config: &AnalyticsConfig) -> Self
    where
        I: IntoIterator<Item = &'a Record>,
    {
        let snapshots = group_by_period(records)
            .into_iter()
            .map(|(label, bucket)| (label, aggregate(bucket, config)))
            .collect();
        Self { snapshots }
    }

    pub fn get(&self, label: &str) -> Option<&Snapshot> {
        self.snapshots.get(label)
    }

    /// The bucket immediately before `label`, if any.
    pub fn previous(&self, label: &str) -> Option<(&str, &Snapshot)> {
        self.snapshots
            .range::<str, _>((Bound::Unbounded, Bound::Excluded(label)))
            .next_back()
            .map(|(label, snapshot)| (label.as_str(), snapshot))
    }

    /// Tracked figures of `label` compared with the adjacent earlier bucket.
    ///
    /// Empty if `label` is not a bucket.
    pub fn variations_for(&self, label: &str) -> Vec<FieldVariation> {
        let Some(current) = self.get(label) else {
            return Vec::new();
        };
        let previous = self.previous(label).map(|(_, snapshot)| snapshot);

        SnapshotField::TRACKED
            .into_iter()
            .map(|field| FieldVariation {
                field,
                variation: variation(current, previous, field),
            })
            .collect()
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.snapshots.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Snapshot)> {
        self.snapshots
            .iter()
            .map(|(label, snapshot)| (label.as_str(), snapshot))
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}
