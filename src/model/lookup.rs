//! Lookup entities: difficulty, priority, and status.

use serde::{Deserialize, Serialize};

/// How hard a piece of content feels to the learner.
///
/// `value` is a normalized weight in `[0, 1]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Difficulty {
    pub id: i64,
    pub name: String,
    pub value: f64,
}

/// How much the learner cares about a piece of content.
///
/// `value` is a normalized weight in `[0, 1]`; higher means more important.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Priority {
    pub id: i64,
    pub name: String,
    pub value: f64,
}

/// Lifecycle status of a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Status {
    pub id: i64,
    pub name: String,
}

impl Status {
    pub const NEW: &'static str = "new";
    pub const COMPLETED: &'static str = "completed";
}

/// The three self-reported difficulty buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DifficultyLevel {
    Easy,
    Medium,
    Hard,
}

impl DifficultyLevel {
    /// Name of the matching difficulty lookup row.
    pub fn name(self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Hard => "hard",
        }
    }

    /// Whether rating content at this level earns it another look this run.
    pub fn wants_review(self) -> bool {
        matches!(self, Self::Medium | Self::Hard)
    }
}
