//! Ticket analytics
//!
//! Turns imported records into dashboard figures:
//! - [`filter`]: analyst selection and single-dimension filter
//! - [`snapshot`]: the aggregator, one [`Snapshot`] per record set
//! - [`period`]: month buckets and the per-month snapshot cache
//! - [`variation`]: period-over-period change of tracked figures
//! - [`dashboard`]: owns the records and keeps all of the above in sync
//!
//! Everything here is pure and synchronous; nothing touches the store.

pub mod counts;
pub mod dashboard;
pub mod filter;
pub mod normalize;
pub mod period;
pub mod snapshot;
pub mod variation;

pub use counts::CountMap;
pub use dashboard::{Dashboard, DashboardView, PeriodSelection};
pub use filter::{analysts, dimension_values, filter, AnalystSelection, Dimension, DimensionFilter};
pub use normalize::{normalize_client, normalize_label, split_tags};
pub use period::{available_periods, group_by_period, FieldVariation, PeriodSnapshots};
pub use snapshot::{aggregate, ClientRanking, Snapshot, TagRanking};
pub use variation::{variation, Direction, SnapshotField, Variation, NEUTRAL_THRESHOLD};
