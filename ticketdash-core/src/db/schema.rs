//! Store schema. The version lives in `PRAGMA user_version`.

use crate::error::Result;
use rusqlite::Connection;

pub const SCHEMA_VERSION: i32 = 1;

/// Migration `i` brings the store to version `i + 1`.
const MIGRATIONS: &[&str] = &[
    // 1: one table of JSON values by key
    r#"
    CREATE TABLE IF NOT EXISTS kv (
        key          TEXT PRIMARY KEY,
        value        TEXT NOT NULL,
        updated_at   DATETIME NOT NULL
    );
    "#,
];

/// Apply every migration newer than the store's version.
pub fn run_migrations(conn: &Connection) -> Result<()> {
    let from = schema_version(conn)?;
    if from >= SCHEMA_VERSION {
        tracing::debug!(version = from, "Store schema up to date");
        return Ok(());
    }

    for (version, sql) in (1..).zip(MIGRATIONS).skip(from.max(0) as usize) {
        conn.execute_batch(sql)?;
        conn.pragma_update(None, "user_version", version)?;
    }

    tracing::info!(from, to = SCHEMA_VERSION, "Migrated store schema");
    Ok(())
}

pub fn schema_version(conn: &Connection) -> Result<i32> {
    Ok(conn.pragma_query_value(None, "user_version", |row| row.get(0))?)
}
