//! Lookup storage: difficulties, priorities, and statuses.

use rusqlite::{OptionalExtension, Row};

use crate::gateway::Lookup;
use crate::model::{Difficulty, Priority, Status};

use super::{Result, Storage, StorageError};

const DIFFICULTIES: &[(i64, &str, f64)] =
    &[(1, "easy", 0.25), (2, "medium", 0.5), (3, "hard", 0.75)];

const PRIORITIES: &[(i64, &str, f64)] = &[
    (1, "lowest", 0.0),
    (2, "low", 0.25),
    (3, "medium", 0.5),
    (4, "high", 0.75),
    (5, "highest", 1.0),
];

const STATUSES: &[(i64, &str)] = &[(1, Status::NEW), (2, Status::COMPLETED)];

impl Storage {
    /// Inserts the default lookup rows that are missing. Existing rows,
    /// including edited values, are left alone.
    pub(super) fn seed_lookups(&self) -> Result<()> {
        for &(id, name, value) in DIFFICULTIES {
            self.conn.execute(
                "INSERT OR IGNORE INTO difficulties (id, name, value) VALUES (?1, ?2, ?3)",
                rusqlite::params![id, name, value],
            )?;
        }
        for &(id, name, value) in PRIORITIES {
            self.conn.execute(
                "INSERT OR IGNORE INTO priorities (id, name, value) VALUES (?1, ?2, ?3)",
                rusqlite::params![id, name, value],
            )?;
        }
        for &(id, name) in STATUSES {
            self.conn.execute(
                "INSERT OR IGNORE INTO statuses (id, name) VALUES (?1, ?2)",
                rusqlite::params![id, name],
            )?;
        }
        Ok(())
    }

    pub fn difficulties(&self) -> Result<Vec<Difficulty>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, value FROM difficulties ORDER BY value")?;
        let rows = stmt.query_map([], difficulty_row)?;
        Ok(rows.collect::<rusqlite::Result<_>>()?)
    }

    pub fn priorities(&self) -> Result<Vec<Priority>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, value FROM priorities ORDER BY value")?;
        let rows = stmt.query_map([], priority_row)?;
        Ok(rows.collect::<rusqlite::Result<_>>()?)
    }

    pub fn difficulty(&self, lookup: Lookup<'_>) -> Result<Difficulty> {
        self.find("difficulties", "difficulty", lookup, difficulty_row)
    }

    pub fn priority(&self, lookup: Lookup<'_>) -> Result<Priority> {
        self.find("priorities", "priority", lookup, priority_row)
    }

    pub fn status(&self, lookup: Lookup<'_>) -> Result<Status> {
        self.find("statuses", "status", lookup, |row| {
            Ok(Status {
                id: row.get(0)?,
                name: row.get(1)?,
            })
        })
    }

    /// Finds one lookup row by id or by name.
    fn find<T>(
        &self,
        table: &str,
        entity: &'static str,
        lookup: Lookup<'_>,
        map: impl FnOnce(&Row<'_>) -> rusqlite::Result<T>,
    ) -> Result<T> {
        let columns = if table == "statuses" {
            "id, name"
        } else {
            "id, name, value"
        };
        let found = match lookup {
            Lookup::Id(id) => self
                .conn
                .query_row(
                    &format!("SELECT {columns} FROM {table} WHERE id = ?1"),
                    [id],
                    map,
                )
                .optional()?,
            Lookup::Name(name) => self
                .conn
                .query_row(
                    &format!("SELECT {columns} FROM {table} WHERE name = ?1"),
                    [name],
                    map,
                )
                .optional()?,
        };
        found.ok_or_else(|| StorageError::not_found(entity, &lookup))
    }
}

fn difficulty_row(row: &Row<'_>) -> rusqlite::Result<Difficulty> {
    Ok(Difficulty {
        id: row.get(0)?,
        name: row.get(1)?,
        value: row.get(2)?,
    })
}

fn priority_row(row: &Row<'_>) -> rusqlite::Result<Priority> {
    Ok(Priority {
        id: row.get(0)?,
        name: row.get(1)?,
        value: row.get(2)?,
    })
}
