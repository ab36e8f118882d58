//! Local persistence for study content and session records.
//!
//! Everything lives in one `SQLite` file:
//!
//! ```text
//! difficulties, priorities, statuses   # lookup rows, seeded on open
//! stacks, contents, answers            # what there is to study
//! sessions, items, actions             # what happened while studying
//! ```
//!
//! Timestamps are stored as RFC 3339 strings, list-valued fields as JSON.

mod content;
mod lookup;
mod record;
mod session;

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use jiff::Timestamp;
use rusqlite::Connection;
use serde::{Serialize, de::DeserializeOwned};
use uuid::Uuid;

use crate::gateway::GatewayError;

/// Errors that can occur during storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("{entity} not found: {key}")]
    NotFound { entity: &'static str, key: String },

    #[error("{entity} already exists: {key}")]
    AlreadyExists { entity: &'static str, key: String },

    #[error("corrupt data: {0}")]
    Corrupt(String),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl StorageError {
    fn not_found(entity: &'static str, key: &(impl ToString + ?Sized)) -> Self {
        Self::NotFound {
            entity,
            key: key.to_string(),
        }
    }

    /// Maps a uniqueness violation on insert to `AlreadyExists`.
    fn on_insert(entity: &'static str, key: impl ToString) -> impl FnOnce(rusqlite::Error) -> Self {
        move |e| match e {
            rusqlite::Error::SqliteFailure(f, _)
                if f.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                Self::AlreadyExists {
                    entity,
                    key: key.to_string(),
                }
            }
            other => other.into(),
        }
    }
}

impl From<StorageError> for GatewayError {
    fn from(e: StorageError) -> Self {
        match e {
            StorageError::NotFound { entity, key } => Self::NotFound { entity, key },
            e @ (StorageError::AlreadyExists { .. } | StorageError::Corrupt(_)) => {
                Self::Rejected(e.to_string())
            }
            e => Self::Unavailable(e.to_string()),
        }
    }
}

pub type Result<T> = core::result::Result<T, StorageError>;

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS difficulties (
        id    INTEGER PRIMARY KEY,
        name  TEXT NOT NULL UNIQUE,
        value REAL NOT NULL
    );
    CREATE TABLE IF NOT EXISTS priorities (
        id    INTEGER PRIMARY KEY,
        name  TEXT NOT NULL UNIQUE,
        value REAL NOT NULL
    );
    CREATE TABLE IF NOT EXISTS statuses (
        id   INTEGER PRIMARY KEY,
        name TEXT NOT NULL UNIQUE
    );
    CREATE TABLE IF NOT EXISTS stacks (
        key         TEXT PRIMARY KEY,
        name        TEXT NOT NULL,
        contents    TEXT NOT NULL,
        descendants TEXT NOT NULL
    );
    CREATE TABLE IF NOT EXISTS contents (
        key            TEXT PRIMARY KEY,
        kind           TEXT NOT NULL,
        front          TEXT NOT NULL,
        back           TEXT NOT NULL,
        difficulty     INTEGER NOT NULL,
        priority       INTEGER NOT NULL,
        last_viewed_at TEXT,
        interval_days  REAL,
        due_by         TEXT
    );
    CREATE TABLE IF NOT EXISTS answers (
        key      TEXT PRIMARY KEY,
        question TEXT NOT NULL,
        text     TEXT NOT NULL,
        correct  INTEGER NOT NULL
    );
    CREATE INDEX IF NOT EXISTS answers_by_question ON answers (question);
    CREATE TABLE IF NOT EXISTS sessions (
        id         TEXT PRIMARY KEY,
        contents   TEXT NOT NULL,
        filters    TEXT NOT NULL,
        mode       TEXT NOT NULL,
        settings   TEXT NOT NULL,
        stacks     TEXT NOT NULL,
        started_at TEXT NOT NULL,
        ended_at   TEXT,
        duration   REAL,
        status     INTEGER NOT NULL,
        children   TEXT NOT NULL
    );
    CREATE TABLE IF NOT EXISTS items (
        id         TEXT PRIMARY KEY,
        session    TEXT NOT NULL,
        reference  TEXT NOT NULL,
        started_at TEXT NOT NULL,
        ended_at   TEXT,
        duration   REAL,
        actions    TEXT NOT NULL,
        created_at TEXT NOT NULL
    );
    CREATE INDEX IF NOT EXISTS items_by_session ON items (session);
    CREATE TABLE IF NOT EXISTS actions (
        id              TEXT PRIMARY KEY,
        item            TEXT NOT NULL,
        reference       TEXT NOT NULL,
        action_type     TEXT NOT NULL,
        action_metadata TEXT NOT NULL,
        started_at      TEXT NOT NULL,
        ended_at        TEXT NOT NULL,
        duration        REAL NOT NULL
    );
    CREATE INDEX IF NOT EXISTS actions_by_item ON actions (item);
";

/// Local `SQLite` storage for the study repository.
pub struct Storage {
    conn: Connection,
}

impl Storage {
    /// Opens (or creates) the database at `path` and seeds the lookup rows.
    ///
    /// The parent directory is created if it doesn't exist.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        conn.execute_batch(SCHEMA)?;
        let storage = Self { conn };
        storage.seed_lookups()?;
        Ok(storage)
    }

    /// Runs `writes` in one transaction. Nothing is kept if it fails.
    pub fn in_transaction<T>(&self, writes: impl FnOnce(&Self) -> Result<T>) -> Result<T> {
        let tx = self.conn.unchecked_transaction()?;
        let value = writes(self)?;
        tx.commit()?;
        Ok(value)
    }

    /// Returns the default database path: `~/.rehearse/study.sqlite`.
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".rehearse").join("study.sqlite"))
    }
}

// ── Column codecs ──

fn timestamp(raw: &str, column: &str) -> Result<Timestamp> {
    raw.parse::<Timestamp>()
        .map_err(|e| StorageError::Corrupt(format!("invalid {column}: {e}")))
}

fn optional_timestamp(raw: Option<String>, column: &str) -> Result<Option<Timestamp>> {
    raw.map(|s| timestamp(&s, column)).transpose()
}

fn uuid(raw: &str, column: &str) -> Result<Uuid> {
    raw.parse::<Uuid>()
        .map_err(|e| StorageError::Corrupt(format!("invalid {column}: {e}")))
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    Ok(serde_json::to_string(value)?)
}

fn from_json<T: DeserializeOwned>(raw: &str, column: &str) -> Result<T> {
    serde_json::from_str(raw).map_err(|e| StorageError::Corrupt(format!("invalid {column}: {e}")))
}
