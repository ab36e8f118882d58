//! Item and action storage: what happened inside a session.

use rusqlite::Row;
use uuid::Uuid;

use crate::model::{Action, ActionType, Item};

use super::{Result, Storage, StorageError, from_json, optional_timestamp, timestamp, to_json, uuid};

const ITEM_COLUMNS: &str =
    "id, session, reference, started_at, ended_at, duration, actions, created_at";

const ACTION_COLUMNS: &str =
    "id, item, reference, action_type, action_metadata, started_at, ended_at, duration";

impl Storage {
    // ── Items ──

    pub fn create_item(&self, item: &Item) -> Result<()> {
        self.conn
            .execute(
                &format!(
                    "INSERT INTO items ({ITEM_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)"
                ),
                rusqlite::params![
                    item.id.to_string(),
                    item.session.to_string(),
                    &item.reference,
                    item.start.to_string(),
                    item.end.map(|t| t.to_string()),
                    item.duration,
                    to_json(&item.actions)?,
                    item.created_at.to_string(),
                ],
            )
            .map_err(StorageError::on_insert("item", item.id))?;
        Ok(())
    }

    pub fn update_item(&self, item: &Item) -> Result<()> {
        let rows = self.conn.execute(
            "UPDATE items
             SET session = ?1, reference = ?2, started_at = ?3, ended_at = ?4, duration = ?5,
                 actions = ?6, created_at = ?7
             WHERE id = ?8",
            rusqlite::params![
                item.session.to_string(),
                &item.reference,
                item.start.to_string(),
                item.end.map(|t| t.to_string()),
                item.duration,
                to_json(&item.actions)?,
                item.created_at.to_string(),
                item.id.to_string(),
            ],
        )?;
        if rows == 0 {
            return Err(StorageError::not_found("item", &item.id));
        }
        Ok(())
    }

    /// Items recorded for a session, oldest first.
    pub fn load_items(&self, session: Uuid) -> Result<Vec<Item>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {ITEM_COLUMNS} FROM items WHERE session = ?1 ORDER BY started_at, rowid"
        ))?;
        let rows = stmt.query_map([session.to_string()], raw_item)?;
        rows.map(|raw| item(raw?)).collect()
    }

    // ── Actions ──

    /// Appends an action. Actions are never updated.
    pub fn create_action(&self, action: &Action) -> Result<()> {
        self.conn
            .execute(
                &format!(
                    "INSERT INTO actions ({ACTION_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)"
                ),
                rusqlite::params![
                    action.id.to_string(),
                    action.item.to_string(),
                    &action.reference,
                    action.action_type.as_str(),
                    to_json(&action.action_metadata)?,
                    action.start.to_string(),
                    action.end.to_string(),
                    action.duration,
                ],
            )
            .map_err(StorageError::on_insert("action", action.id))?;
        Ok(())
    }

    /// Actions recorded under any item of a session, in recording order.
    pub fn load_actions(&self, session: Uuid) -> Result<Vec<Action>> {
        let mut stmt = self.conn.prepare(
            "SELECT a.id, a.item, a.reference, a.action_type, a.action_metadata,
                    a.started_at, a.ended_at, a.duration
             FROM actions a JOIN items i ON a.item = i.id
             WHERE i.session = ?1
             ORDER BY a.rowid",
        )?;
        let rows = stmt.query_map([session.to_string()], raw_action)?;
        rows.map(|raw| action(raw?)).collect()
    }
}

type RawItem = (
    String,
    String,
    String,
    String,
    Option<String>,
    Option<f64>,
    String,
    String,
);

fn raw_item(row: &Row<'_>) -> rusqlite::Result<RawItem> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
        row.get(6)?,
        row.get(7)?,
    ))
}

fn item(
    (id, session, reference, start, end, duration, actions, created_at): RawItem,
) -> Result<Item> {
    Ok(Item {
        id: uuid(&id, "item id")?,
        session: uuid(&session, "item session")?,
        reference,
        start: timestamp(&start, "item started_at")?,
        end: optional_timestamp(end, "item ended_at")?,
        duration,
        actions: from_json(&actions, "item actions")?,
        created_at: timestamp(&created_at, "item created_at")?,
    })
}

type RawAction = (String, String, String, String, String, String, String, f64);

fn raw_action(row: &Row<'_>) -> rusqlite::Result<RawAction> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
        row.get(6)?,
        row.get(7)?,
    ))
}

fn action(
    (id, item, reference, action_type, metadata, start, end, duration): RawAction,
) -> Result<Action> {
    let action_type = ActionType::parse(&action_type)
        .ok_or_else(|| StorageError::Corrupt(format!("unknown action type: {action_type}")))?;
    Ok(Action {
        id: uuid(&id, "action id")?,
        item: uuid(&item, "action item")?,
        reference,
        action_type,
        action_metadata: from_json(&metadata, "action metadata")?,
        start: timestamp(&start, "action started_at")?,
        end: timestamp(&end, "action ended_at")?,
        duration,
    })
}
