//! Errors returned by ticketdash-core.
//!
//! Only reading files, touching the store, and loading config or logging can
//! fail. Parsing and aggregation degrade to defaults instead.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Unreadable export, unwritable data or log directory
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Config file unreadable, malformed or out of range
    #[error("configuration error: {0}")]
    Config(String),

    /// File logger could not be installed
    #[error("logging error: {0}")]
    Logging(String),

    /// A stored value exists but does not decode
    #[error("stored value '{key}' is corrupted: {message}")]
    Persistence { key: String, message: String },
}

pub type Result<T> = std::result::Result<T, Error>;
