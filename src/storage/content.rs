//! Content storage: stacks, contents, and answers.

use rusqlite::{OptionalExtension, Row};

use crate::model::{Answer, Content, ContentKind, Stack};

use super::{Result, Storage, StorageError, from_json, optional_timestamp, to_json};

const CONTENT_COLUMNS: &str =
    "key, kind, front, back, difficulty, priority, last_viewed_at, interval_days, due_by";

impl Storage {
    // ── Stacks ──

    /// Inserts or replaces a stack.
    pub fn save_stack(&self, stack: &Stack) -> Result<()> {
        self.conn.execute(
            "INSERT INTO stacks (key, name, contents, descendants) VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT (key) DO UPDATE SET
                 name = excluded.name,
                 contents = excluded.contents,
                 descendants = excluded.descendants",
            rusqlite::params![
                &stack.key,
                &stack.name,
                to_json(&stack.contents)?,
                to_json(&stack.descendants)?,
            ],
        )?;
        Ok(())
    }

    pub fn load_stack(&self, key: &str) -> Result<Stack> {
        let raw = self
            .conn
            .query_row(
                "SELECT key, name, contents, descendants FROM stacks WHERE key = ?1",
                [key],
                raw_stack,
            )
            .optional()?
            .ok_or_else(|| StorageError::not_found("stack", key))?;
        stack(raw)
    }

    pub fn list_stacks(&self) -> Result<Vec<Stack>> {
        let mut stmt = self
            .conn
            .prepare("SELECT key, name, contents, descendants FROM stacks ORDER BY key")?;
        let rows = stmt.query_map([], raw_stack)?;
        rows.map(|raw| stack(raw?)).collect()
    }

    // ── Contents ──

    /// Inserts content, or updates the text, kind, difficulty, and priority
    /// of an existing row. Scheduling fields of an existing row are kept.
    pub fn upsert_content(&self, content: &Content) -> Result<()> {
        self.conn.execute(
            &format!(
                "INSERT INTO contents ({CONTENT_COLUMNS})
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                 ON CONFLICT (key) DO UPDATE SET
                     kind = excluded.kind,
                     front = excluded.front,
                     back = excluded.back,
                     difficulty = excluded.difficulty,
                     priority = excluded.priority"
            ),
            rusqlite::params![
                &content.key,
                content.kind.as_str(),
                &content.front,
                &content.back,
                content.difficulty,
                content.priority,
                content.last_viewed_at.map(|t| t.to_string()),
                content.interval,
                content.due_by.map(|t| t.to_string()),
            ],
        )?;
        Ok(())
    }

    /// Rewrites every field of an existing content row.
    pub fn update_content(&self, content: &Content) -> Result<()> {
        let rows = self.conn.execute(
            "UPDATE contents
             SET kind = ?1, front = ?2, back = ?3, difficulty = ?4, priority = ?5,
                 last_viewed_at = ?6, interval_days = ?7, due_by = ?8
             WHERE key = ?9",
            rusqlite::params![
                content.kind.as_str(),
                &content.front,
                &content.back,
                content.difficulty,
                content.priority,
                content.last_viewed_at.map(|t| t.to_string()),
                content.interval,
                content.due_by.map(|t| t.to_string()),
                &content.key,
            ],
        )?;
        if rows == 0 {
            return Err(StorageError::not_found("content", &content.key));
        }
        Ok(())
    }

    pub fn load_content(&self, key: &str) -> Result<Content> {
        let raw = self
            .conn
            .query_row(
                &format!("SELECT {CONTENT_COLUMNS} FROM contents WHERE key = ?1"),
                [key],
                raw_content,
            )
            .optional()?
            .ok_or_else(|| StorageError::not_found("content", key))?;
        content(raw)
    }

    /// Loads every content row among `keys`, in `keys` order. Unknown keys
    /// are skipped.
    pub fn load_contents(&self, keys: &[String]) -> Result<Vec<Content>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {CONTENT_COLUMNS} FROM contents WHERE key = ?1"))?;
        let mut contents = Vec::with_capacity(keys.len());
        for key in keys {
            if let Some(raw) = stmt.query_row([key], raw_content).optional()? {
                contents.push(content(raw)?);
            }
        }
        Ok(contents)
    }

    // ── Answers ──

    /// Inserts or replaces an answer.
    pub fn save_answer(&self, answer: &Answer) -> Result<()> {
        self.conn.execute(
            "INSERT INTO answers (key, question, text, correct) VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT (key) DO UPDATE SET
                 question = excluded.question,
                 text = excluded.text,
                 correct = excluded.correct",
            rusqlite::params![&answer.key, &answer.question, &answer.text, answer.correct],
        )?;
        Ok(())
    }

    /// Answers for `question`, in the order they were first saved.
    pub fn load_answers(&self, question: &str) -> Result<Vec<Answer>> {
        let mut stmt = self.conn.prepare(
            "SELECT key, question, text, correct FROM answers WHERE question = ?1 ORDER BY rowid",
        )?;
        let rows = stmt.query_map([question], |row| {
            Ok(Answer {
                key: row.get(0)?,
                question: row.get(1)?,
                text: row.get(2)?,
                correct: row.get(3)?,
            })
        })?;
        Ok(rows.collect::<rusqlite::Result<_>>()?)
    }
}

type RawStack = (String, String, String, String);

fn raw_stack(row: &Row<'_>) -> rusqlite::Result<RawStack> {
    Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
}

fn stack((key, name, contents, descendants): RawStack) -> Result<Stack> {
    Ok(Stack {
        contents: from_json(&contents, "stack contents")?,
        descendants: from_json(&descendants, "stack descendants")?,
        key,
        name,
    })
}

struct RawContent {
    key: String,
    kind: String,
    front: String,
    back: String,
    difficulty: i64,
    priority: i64,
    last_viewed_at: Option<String>,
    interval: Option<f64>,
    due_by: Option<String>,
}

fn raw_content(row: &Row<'_>) -> rusqlite::Result<RawContent> {
    Ok(RawContent {
        key: row.get(0)?,
        kind: row.get(1)?,
        front: row.get(2)?,
        back: row.get(3)?,
        difficulty: row.get(4)?,
        priority: row.get(5)?,
        last_viewed_at: row.get(6)?,
        interval: row.get(7)?,
        due_by: row.get(8)?,
    })
}

fn content(raw: RawContent) -> Result<Content> {
    let kind = ContentKind::parse(&raw.kind)
        .ok_or_else(|| StorageError::Corrupt(format!("unknown content kind: {}", raw.kind)))?;
    Ok(Content {
        kind,
        last_viewed_at: optional_timestamp(raw.last_viewed_at, "last_viewed_at")?,
        due_by: optional_timestamp(raw.due_by, "due_by")?,
        key: raw.key,
        front: raw.front,
        back: raw.back,
        difficulty: raw.difficulty,
        priority: raw.priority,
        interval: raw.interval,
    })
}
