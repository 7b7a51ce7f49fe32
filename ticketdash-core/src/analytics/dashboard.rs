//! Dashboard state: the loaded records plus the current selections.
//!
//! Every setter recomputes the derived state in one pass:
//! filtered records → monthly snapshot cache → snapshot for the selected
//! period. Readers only ever see a consistent [`DashboardView`].

use serde::{Deserialize, Serialize};

use super::filter::{filter, AnalystSelection, DimensionFilter};
use super::period::{FieldVariation, PeriodSnapshots};
use super::snapshot::{aggregate, Snapshot};
use crate::config::AnalyticsConfig;
use crate::types::Record;

/// Which period the headline snapshot covers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeriodSelection {
    /// Every record, regardless of month
    #[default]
    All,
    Month(String),
}

impl PeriodSelection {
    /// `"all"` (any case) or blank selects every period.
    pub fn parse(value: &str) -> Self {
        let value = value.trim();
        if value.is_empty() || value.eq_ignore_ascii_case("all") {
            PeriodSelection::All
        } else {
            PeriodSelection::Month(value.to_string())
        }
    }

    pub fn label(&self) -> &str {
        match self {
            PeriodSelection::All => "all",
            PeriodSelection::Month(label) => label,
        }
    }
}

/// Read-only view handed to renderers.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardView<'a> {
    pub period: &'a PeriodSelection,
    pub snapshot: &'a Snapshot,
    /// Month labels present after filtering, ascending
    pub periods: Vec<&'a str>,
    /// Tracked figures against the previous month; empty for `All`
    pub variations: &'a [FieldVariation],
}

/// Owns the records and everything derived from them.
#[derive(Debug)]
pub struct Dashboard {
    records: Vec<Record>,
    config: AnalyticsConfig,
    analysts: AnalystSelection,
    dimension: DimensionFilter,
    period: PeriodSelection,

    // derived
    filtered_count: usize,
    periods: PeriodSnapshots,
    snapshot: Snapshot,
    variations: Vec<FieldVariation>,
}

impl Dashboard {
    pub fn new(records: Vec<Record>, config: AnalyticsConfig) -> Self {
        let mut dashboard = Self {
            records,
            config,
            analysts: AnalystSelection::default(),
            dimension: DimensionFilter::default(),
            period: PeriodSelection::default(),
            filtered_count: 0,
            periods: PeriodSnapshots::default(),
            snapshot: Snapshot::default(),
            variations: Vec::new(),
        };
        dashboard.recompute();
        dashboard
    }

    pub fn select_analysts(&mut self, analysts: AnalystSelection) {
        self.analysts = analysts;
        self.recompute();
    }

    pub fn set_dimension_filter(&mut self, dimension: DimensionFilter) {
        self.dimension = dimension;
        self.recompute();
    }

    pub fn set_period(&mut self, period: PeriodSelection) {
        self.period = period;
        self.recompute();
    }

    fn recompute(&mut self) {
        let filtered = filter(&self.records, &self.analysts, &self.dimension);
        self.filtered_count = filtered.len();
        self.periods = PeriodSnapshots::build(filtered.iter().copied(), &self.config);

        match &self.period {
            PeriodSelection::All => {
                self.snapshot = aggregate(filtered.iter().copied(), &self.config);
                self.variations = Vec::new();
            }
            PeriodSelection::Month(label) => {
                // unknown month: empty snapshot, no variations
                self.snapshot = match self.periods.get(label) {
                    Some(snapshot) => snapshot.clone(),
                    None => aggregate(std::iter::empty(), &self.config),
                };
                self.variations = self.periods.variations_for(label);
            }
        }

        tracing::debug!(
            records = self.records.len(),
            filtered = self.filtered_count,
            periods = self.periods.len(),
            period = self.period.label(),
            "Dashboard recomputed"
        );
    }

    pub fn view(&self) -> DashboardView<'_> {
        DashboardView {
            period: &self.period,
            snapshot: &self.snapshot,
            periods: self.periods.labels().collect(),
            variations: &self.variations,
        }
    }

    /// All loaded records, unfiltered.
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Records passing the current analyst and dimension filters.
    pub fn filtered_records(&self) -> Vec<&Record> {
        filter(&self.records, &self.analysts, &self.dimension)
    }

    pub fn filtered_count(&self) -> usize {
        self.filtered_count
    }

    /// Month labels of the filtered records.
    pub fn available_periods(&self) -> Vec<&str> {
        self.periods.labels().collect()
    }

    pub fn period_snapshots(&self) -> &PeriodSnapshots {
        &self.periods
    }

    pub fn analysts(&self) -> &AnalystSelection {
        &self.analysts
    }

    pub fn dimension_filter(&self) -> &DimensionFilter {
        &self.dimension
    }

    pub fn period(&self) -> &PeriodSelection {
        &self.period
    }
}
