//! Period-over-period variation of snapshot figures.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::snapshot::Snapshot;

/// Changes smaller than this (in percent) are reported as neutral.
pub const NEUTRAL_THRESHOLD: f64 = 0.1;

/// Numeric snapshot figures that can be compared across periods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SnapshotField {
    TotalCards,
    AvgPerDay,
    TotalActive,
    TotalUniqueClients,
    TotalUniqueTags,
    AvgTagsPerItem,
    EscalatedCount,
}

impl SnapshotField {
    /// Figures shown with a trend badge on the dashboard cards.
    pub const TRACKED: [SnapshotField; 4] = [
        SnapshotField::AvgPerDay,
        SnapshotField::TotalActive,
        SnapshotField::TotalUniqueClients,
        SnapshotField::TotalUniqueTags,
    ];

    pub const ALL: [SnapshotField; 7] = [
        SnapshotField::TotalCards,
        SnapshotField::AvgPerDay,
        SnapshotField::TotalActive,
        SnapshotField::TotalUniqueClients,
        SnapshotField::TotalUniqueTags,
        SnapshotField::AvgTagsPerItem,
        SnapshotField::EscalatedCount,
    ];

    /// Numeric value of this figure, `None` if it does not parse to a finite
    /// number.
    pub fn value(&self, snapshot: &Snapshot) -> Option<f64> {
        let value = match self {
            SnapshotField::TotalCards => snapshot.total_cards as f64,
            SnapshotField::AvgPerDay => snapshot.avg_per_day.trim().parse().ok()?,
            SnapshotField::TotalActive => snapshot.total_active as f64,
            SnapshotField::TotalUniqueClients => snapshot.total_unique_clients as f64,
            SnapshotField::TotalUniqueTags => snapshot.total_unique_tags as f64,
            SnapshotField::AvgTagsPerItem => snapshot.avg_tags_per_item.trim().parse().ok()?,
            SnapshotField::EscalatedCount => snapshot.escalated_count as f64,
        };
        value.is_finite().then_some(value)
    }

    /// Stored snapshot name of this figure.
    pub fn name(&self) -> &'static str {
        match self {
            SnapshotField::TotalCards => "totalCards",
            SnapshotField::AvgPerDay => "avgPerDay",
            SnapshotField::TotalActive => "totalAtivos",
            SnapshotField::TotalUniqueClients => "totalClientesUnicos",
            SnapshotField::TotalUniqueTags => "totalTagsUnicas",
            SnapshotField::AvgTagsPerItem => "avgTagsPerItem",
            SnapshotField::EscalatedCount => "escalonadoCount",
        }
    }

    /// Human-readable label for reports.
    pub fn display_name(&self) -> &'static str {
        match self {
            SnapshotField::TotalCards => "Total cards",
            SnapshotField::AvgPerDay => "Avg per day",
            SnapshotField::TotalActive => "Active",
            SnapshotField::TotalUniqueClients => "Unique clients",
            SnapshotField::TotalUniqueTags => "Unique tags",
            SnapshotField::AvgTagsPerItem => "Tags per item",
            SnapshotField::EscalatedCount => "Escalated",
        }
    }
}

impl FromStr for SnapshotField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SnapshotField::ALL
            .into_iter()
            .find(|field| field.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown snapshot field: {}", s))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Increase,
    Decrease,
    Neutral,
}

/// Signed change between two periods.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Variation {
    pub direction: Direction,
    /// Signed percentage, rounded to one decimal; `0.0` when neutral
    pub percent: f64,
}

impl fmt::Display for Variation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.direction {
            Direction::Increase => write!(f, "+{:.1}%", self.percent),
            Direction::Decrease => write!(f, "{:.1}%", self.percent),
            Direction::Neutral => write!(f, "0.0%"),
        }
    }
}

/// Change of `field` from `previous` to `current`.
///
/// `None` ("no variation") when there is no previous snapshot, when either
/// value is not numeric, or when the previous value is exactly zero.
pub fn variation(
    current: &Snapshot,
    previous: Option<&Snapshot>,
    field: SnapshotField,
) -> Option<Variation> {
    let previous = field.value(previous?)?;
    let current = field.value(current)?;
    if previous == 0.0 {
        return None;
    }

    let delta = (current - previous) / previous * 100.0;
    if delta.abs() < NEUTRAL_THRESHOLD {
        return Some(Variation {
            direction: Direction::Neutral,
            percent: 0.0,
        });
    }

    let direction = if delta > 0.0 {
        Direction::Increase
    } else {
        Direction::Decrease
    };
    Some(Variation {
        direction,
        percent: (delta * 10.0).round() / 10.0,
    })
}
