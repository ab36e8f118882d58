//! Session storage: create, update, load, and list sessions.

use rusqlite::{OptionalExtension, Row};
use uuid::Uuid;

use crate::model::{Mode, Session};

use super::{Result, Storage, StorageError, from_json, optional_timestamp, timestamp, to_json, uuid};

const COLUMNS: &str = "id, contents, filters, mode, settings, stacks, started_at, ended_at, \
                       duration, status, children";

impl Storage {
    pub fn create_session(&self, session: &Session) -> Result<()> {
        self.conn
            .execute(
                &format!(
                    "INSERT INTO sessions ({COLUMNS})
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)"
                ),
                rusqlite::params![
                    session.id.to_string(),
                    to_json(&session.contents)?,
                    to_json(&session.filters)?,
                    session.mode.as_str(),
                    to_json(&session.settings)?,
                    to_json(&session.stacks)?,
                    session.start.to_string(),
                    session.end.map(|t| t.to_string()),
                    session.duration,
                    session.status,
                    to_json(&session.children)?,
                ],
            )
            .map_err(StorageError::on_insert("session", session.id))?;
        Ok(())
    }

    pub fn update_session(&self, session: &Session) -> Result<()> {
        let rows = self.conn.execute(
            "UPDATE sessions
             SET contents = ?1, filters = ?2, mode = ?3, settings = ?4, stacks = ?5,
                 started_at = ?6, ended_at = ?7, duration = ?8, status = ?9, children = ?10
             WHERE id = ?11",
            rusqlite::params![
                to_json(&session.contents)?,
                to_json(&session.filters)?,
                session.mode.as_str(),
                to_json(&session.settings)?,
                to_json(&session.stacks)?,
                session.start.to_string(),
                session.end.map(|t| t.to_string()),
                session.duration,
                session.status,
                to_json(&session.children)?,
                session.id.to_string(),
            ],
        )?;
        if rows == 0 {
            return Err(StorageError::not_found("session", &session.id));
        }
        Ok(())
    }

    pub fn load_session(&self, id: Uuid) -> Result<Session> {
        let raw = self
            .conn
            .query_row(
                &format!("SELECT {COLUMNS} FROM sessions WHERE id = ?1"),
                [id.to_string()],
                raw_session,
            )
            .optional()?
            .ok_or_else(|| StorageError::not_found("session", &id))?;
        session(raw)
    }

    /// Lists all sessions, oldest first.
    pub fn list_sessions(&self) -> Result<Vec<Session>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {COLUMNS} FROM sessions ORDER BY started_at"))?;
        let rows = stmt.query_map([], raw_session)?;
        rows.map(|raw| session(raw?)).collect()
    }
}

struct RawSession {
    id: String,
    contents: String,
    filters: String,
    mode: String,
    settings: String,
    stacks: String,
    start: String,
    end: Option<String>,
    duration: Option<f64>,
    status: i64,
    children: String,
}

fn raw_session(row: &Row<'_>) -> rusqlite::Result<RawSession> {
    Ok(RawSession {
        id: row.get(0)?,
        contents: row.get(1)?,
        filters: row.get(2)?,
        mode: row.get(3)?,
        settings: row.get(4)?,
        stacks: row.get(5)?,
        start: row.get(6)?,
        end: row.get(7)?,
        duration: row.get(8)?,
        status: row.get(9)?,
        children: row.get(10)?,
    })
}

fn session(raw: RawSession) -> Result<Session> {
    let mode = Mode::parse(&raw.mode)
        .ok_or_else(|| StorageError::Corrupt(format!("unknown session mode: {}", raw.mode)))?;
    Ok(Session {
        id: uuid(&raw.id, "session id")?,
        contents: from_json(&raw.contents, "session contents")?,
        filters: from_json(&raw.filters, "session filters")?,
        mode,
        settings: from_json(&raw.settings, "session settings")?,
        stacks: from_json(&raw.stacks, "session stacks")?,
        start: timestamp(&raw.start, "started_at")?,
        end: optional_timestamp(raw.end, "ended_at")?,
        duration: raw.duration,
        status: raw.status,
        children: from_json(&raw.children, "session children")?,
    })
}
