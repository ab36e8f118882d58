//! Action: a single timestamped event within an item.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Mode, Settings};

/// An instantaneous event recorded while an item is open.
///
/// Append-only: never mutated after creation. `start == end` and
/// `duration == 0`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Action {
    pub id: Uuid,

    /// The item this action was recorded under.
    pub item: Uuid,

    /// Key of the content the action concerns.
    pub reference: String,

    pub action_type: ActionType,
    pub action_metadata: ActionMetadata,

    pub start: Timestamp,
    pub end: Timestamp,
    pub duration: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionType {
    FlashcardFlipped,
    DifficultyChanged,
}

impl ActionType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::FlashcardFlipped => "FLASHCARD_FLIPPED",
            Self::DifficultyChanged => "DIFFICULTY_CHANGED",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "FLASHCARD_FLIPPED" => Some(Self::FlashcardFlipped),
            "DIFFICULTY_CHANGED" => Some(Self::DifficultyChanged),
            _ => None,
        }
    }
}

/// Free-form snapshot taken when an action is recorded.
///
/// The identifying fields are filled in by the recorder; callers add
/// `before`/`after` snapshots as needed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionMetadata {
    /// 1-based position of this action within its item.
    pub sequence: usize,

    pub session: Uuid,
    pub item: Uuid,
    pub mode: Mode,
    pub settings: Settings,

    /// Seconds between the item's start and this action.
    pub elapsed: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub before: Option<serde_json::Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub after: Option<serde_json::Value>,
}
