//! Local persistence: the channel registry and the request log.
//!
//! Everything lives in one `SQLite` file under the storage root:
//!
//! ```text
//! <root>/storecast.sqlite
//!   channel       # Managed channels, keyed by external id
//!   request_log   # Most recent vendor requests, bounded
//! ```

mod channel;
mod request_log;

use std::{fs, io, path::PathBuf};

use rusqlite::Connection;

use crate::config::Config;

const DB_FILE: &str = "storecast.sqlite";

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS channel (
        external_id TEXT PRIMARY KEY,
        channel_id TEXT NOT NULL,
        installation_id TEXT NOT NULL,
        user_count INTEGER NOT NULL,
        post_id TEXT,
        task_lists TEXT NOT NULL,
        legacy_task_list_id TEXT,
        department TEXT NOT NULL,
        title TEXT NOT NULL,
        created_at TEXT NOT NULL
    );
    CREATE INDEX IF NOT EXISTS channel_by_channel_id ON channel (channel_id);

    CREATE TABLE IF NOT EXISTS request_log (
        seq INTEGER PRIMARY KEY AUTOINCREMENT,
        method TEXT NOT NULL,
        url TEXT NOT NULL,
        kind TEXT NOT NULL,
        token_fingerprint TEXT NOT NULL,
        body TEXT,
        sent_at TEXT NOT NULL
    );
";

/// Errors that can occur during storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("channel not found: {0}")]
    ChannelNotFound(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("corrupt registry: {0}")]
    Corrupt(String),
}

pub type Result<T> = core::result::Result<T, StorageError>;

/// Local `SQLite` storage for the registry and request log.
pub struct Storage {
    conn: Connection,
}

impl Storage {
    /// Opens the database under `root`, creating the directory and schema if
    /// needed.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        let conn = Connection::open(root.join(DB_FILE))?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn })
    }

    /// Returns the default storage root: `~/.storecast/`.
    pub fn default_root() -> Option<PathBuf> {
        Config::home()
    }
}
