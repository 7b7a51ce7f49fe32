//! # ticketdash-core
//!
//! Core library for ticketdash - a dashboard engine for exported support
//! ticket logs.
//!
//! This library provides:
//! - A reader for `;`-delimited ticket exports
//! - Filtering, aggregation and month-over-month comparison of tickets
//! - A SQLite key-value store for the imported log and cached snapshot
//! - Configuration management
//! - Logging infrastructure
//!
//! ## Data flow
//!
//! - **Rows:** the export as read, header → value (persisted as-is)
//! - **Records:** rows bound to the configured columns
//! - **Snapshots:** statistics derived from records (regenerable)
//!
//! ## Example
//!
//! ```rust,no_run
//! use ticketdash_core::analytics::{Dashboard, PeriodSelection};
//! use ticketdash_core::{Config, Import};
//!
//! let config = Config::load().expect("failed to load config");
//! let import = Import::from_path("tickets.csv".as_ref(), &config.columns)
//!     .expect("failed to read export");
//!
//! let mut dashboard = Dashboard::new(import.records, config.analytics);
//! dashboard.set_period(PeriodSelection::Month("2024-03".to_string()));
//! println!("{} tickets", dashboard.view().snapshot.total_cards);
//! ```

// Re-export commonly used items at the crate root
pub use analytics::{Dashboard, Snapshot};
pub use config::Config;
pub use db::{Database, SessionState};
pub use error::{Error, Result};
pub use ingest::Import;
pub use types::*;

// Public modules
pub mod analytics;
pub mod config;
pub mod db;
pub mod error;
pub mod ingest;
pub mod logging;
pub mod types;
