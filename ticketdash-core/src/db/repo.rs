//! Database repository layer
//!
//! A single `kv` table holds everything that survives between runs: the
//! imported rows, the user's display info and the last computed snapshot.
//! Values are JSON text.

use crate::analytics::Snapshot;
use crate::config::{AnalyticsConfig, ColumnNames};
use crate::error::{Error, Result};
use crate::types::{Column, Row, UserInfo};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::Path;

/// Imported rows, as a JSON array of header → value objects
pub const RAW_DATA_KEY: &str = "raw_dashboard_data";
/// [`UserInfo`] as JSON
pub const USER_INFO_KEY: &str = "user_info";
/// [`StoredSnapshot`] as JSON
pub const SNAPSHOT_KEY: &str = "snapshot";

/// A previously imported ticket log.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredSession {
    pub rows: Vec<Row>,
    pub user: UserInfo,
    /// When the rows were last written
    pub saved_at: DateTime<Utc>,
}

/// Outcome of loading the stored session at startup.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    Ready(StoredSession),
    /// Nothing stored, or what is stored cannot be decoded
    NeedsSetup,
}

/// Snapshot cached together with the fingerprint of the rows and settings it
/// came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredSnapshot {
    pub source_hash: String,
    pub computed_at: DateTime<Utc>,
    pub snapshot: Snapshot,
}

/// SHA-256 (hex) over everything a snapshot depends on: the rows' headers
/// and values in order, the configured column names and the analytics
/// settings. Editing either config section changes the fingerprint.
pub fn fingerprint_source(
    rows: &[Row],
    columns: &ColumnNames,
    analytics: &AnalyticsConfig,
) -> String {
    let mut hasher = Sha256::new();
    for row in rows {
        for (header, value) in row {
            hasher.update(header.as_bytes());
            hasher.update([0x1f]);
            hasher.update(value.as_bytes());
            hasher.update([0x1e]);
        }
        hasher.update([0x1d]);
    }

    hasher.update([0x1c]);
    for column in Column::ALL {
        hasher.update(columns.header(column).as_bytes());
        hasher.update([0x1f]);
    }
    hasher.update(analytics.working_days.to_le_bytes());
    hasher.update((analytics.top_n as u64).to_le_bytes());
    hasher.update(analytics.escalated_status.as_bytes());
    hasher.update([0x1f]);
    for status in &analytics.terminal_statuses {
        hasher.update(status.as_bytes());
        hasher.update([0x1f]);
    }

    hex::encode(hasher.finalize())
}

/// Database handle (single connection)
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open or create a database at the given path
    pub fn open(path: &Path) -> Result<Self> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            ",
        )?;

        Ok(Self { conn })
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self { conn })
    }

    /// Run migrations on this database
    pub fn migrate(&self) -> Result<()> {
        super::schema::run_migrations(&self.conn)
    }

    /// Get the underlying connection (for advanced use)
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    // ============================================
    // Raw key-value operations
    // ============================================

    /// Value and last write time for `key`
    pub fn get_entry(&self, key: &str) -> Result<Option<(String, DateTime<Utc>)>> {
        let entry: Option<(String, String)> = self
            .conn
            .query_row(
                "SELECT value, updated_at FROM kv WHERE key = ?1",
                [key],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        Ok(entry.map(|(value, updated_at)| (value, parse_datetime(&updated_at))))
    }

    pub fn get_value(&self, key: &str) -> Result<Option<String>> {
        Ok(self.get_entry(key)?.map(|(value, _)| value))
    }

    /// Insert or replace a value
    pub fn set_value(&self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            r#"
            INSERT INTO kv (key, value, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
            params![key, value, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    /// Delete a key. Returns whether it existed.
    pub fn remove_value(&self, key: &str) -> Result<bool> {
        let removed = self.conn.execute("DELETE FROM kv WHERE key = ?1", [key])?;
        Ok(removed > 0)
    }

    /// Delete everything. Returns the number of keys removed.
    pub fn clear(&self) -> Result<usize> {
        let removed = self.conn.execute("DELETE FROM kv", [])?;
        tracing::info!(removed, "Cleared stored data");
        Ok(removed)
    }

    fn get_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<(T, DateTime<Utc>)>> {
        let Some((value, updated_at)) = self.get_entry(key)? else {
            return Ok(None);
        };
        let decoded = serde_json::from_str(&value).map_err(|e| Error::Persistence {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        Ok(Some((decoded, updated_at)))
    }

    // ============================================
    // Session operations
    // ============================================

    /// Store the imported rows and user info, replacing any previous session.
    ///
    /// The cached snapshot is dropped since it belongs to the old rows.
    pub fn save_session(&self, rows: &[Row], user: &UserInfo) -> Result<()> {
        let rows_json = serde_json::to_string(rows)?;
        let user_json = serde_json::to_string(user)?;

        let tx = self.conn.unchecked_transaction()?;
        self.set_value(RAW_DATA_KEY, &rows_json)?;
        self.set_value(USER_INFO_KEY, &user_json)?;
        self.remove_value(SNAPSHOT_KEY)?;
        tx.commit()?;

        tracing::info!(rows = rows.len(), user = %user.name, "Saved session");
        Ok(())
    }

    /// Load the stored session.
    ///
    /// `Ok(None)` unless both the rows and the user info are present. A value
    /// that fails to decode yields [`Error::Persistence`].
    pub fn load_session(&self) -> Result<Option<StoredSession>> {
        let Some((rows, saved_at)) = self.get_json::<Vec<Row>>(RAW_DATA_KEY)? else {
            return Ok(None);
        };
        let Some((user, _)) = self.get_json::<UserInfo>(USER_INFO_KEY)? else {
            return Ok(None);
        };

        tracing::info!(rows = rows.len(), "Loaded stored session");
        Ok(Some(StoredSession {
            rows,
            user,
            saved_at,
        }))
    }

    /// Like [`load_session`](Self::load_session), but a corrupted session is
    /// reported as [`SessionState::NeedsSetup`] instead of an error.
    pub fn load_session_or_setup(&self) -> Result<SessionState> {
        match self.load_session() {
            Ok(Some(session)) => Ok(SessionState::Ready(session)),
            Ok(None) => Ok(SessionState::NeedsSetup),
            Err(Error::Persistence { key, message }) => {
                tracing::warn!(%key, %message, "Stored session is unreadable, setup required");
                Ok(SessionState::NeedsSetup)
            }
            Err(e) => Err(e),
        }
    }

    // ============================================
    // Snapshot cache
    // ============================================

    pub fn save_snapshot(&self, snapshot: &Snapshot, source_hash: &str) -> Result<()> {
        let stored = StoredSnapshot {
            source_hash: source_hash.to_string(),
            computed_at: Utc::now(),
            snapshot: snapshot.clone(),
        };
        self.set_value(SNAPSHOT_KEY, &serde_json::to_string(&stored)?)
    }

    /// Cached snapshot, only if it was computed under `source_hash` (see
    /// [`fingerprint_source`]).
    ///
    /// An undecodable cache entry counts as a miss.
    pub fn load_snapshot(&self, source_hash: &str) -> Result<Option<StoredSnapshot>> {
        let stored = match self.get_json::<StoredSnapshot>(SNAPSHOT_KEY) {
            Ok(stored) => stored.map(|(stored, _)| stored),
            Err(Error::Persistence { key, message }) => {
                tracing::warn!(%key, %message, "Discarding unreadable snapshot cache");
                None
            }
            Err(e) => return Err(e),
        };

        Ok(stored.filter(|stored| stored.source_hash == source_hash))
    }
}

fn parse_datetime(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}
