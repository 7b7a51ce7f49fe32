//! Database layer for ticketdash
//!
//! SQLite key-value store with:
//! - Schema migrations
//! - Session persistence (imported rows and user info)
//! - A snapshot cache keyed by the fingerprint of the rows and settings

pub mod repo;
pub mod schema;

pub use repo::{
    fingerprint_source, Database, SessionState, StoredSession, StoredSnapshot, RAW_DATA_KEY,
    SNAPSHOT_KEY, USER_INFO_KEY,
};
