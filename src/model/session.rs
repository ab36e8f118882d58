//! Session types: one complete study run.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One complete study run over a filtered content set.
///
/// Created once per run and closed exactly once: `end`, `duration` and the
/// completed status are stamped together.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: Uuid,

    /// Content keys included in the run, in presentation order.
    pub contents: Vec<String>,

    pub filters: Filters,
    pub mode: Mode,
    pub settings: Settings,

    /// Source stack keys, including expanded descendants.
    pub stacks: Vec<String>,

    pub start: Timestamp,
    pub end: Option<Timestamp>,

    /// Seconds between `start` and `end`, set at close.
    pub duration: Option<f64>,

    /// Id of the session's status lookup row.
    pub status: i64,

    /// Items recorded during the run, oldest first.
    pub children: Vec<Uuid>,
}

impl Session {
    pub fn is_closed(&self) -> bool {
        self.end.is_some()
    }
}

/// Difficulty and priority ids a run was narrowed to. Empty means no constraint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filters {
    pub difficulty: Vec<i64>,
    pub priority: Vec<i64>,
}

/// Run options chosen when the session starts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Shuffle the filtered content before presenting it.
    pub enable_randomisation: bool,

    /// Re-present content rated medium or hard later in the same run.
    pub enable_spaced_review: bool,
}

/// How content is presented during a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mode {
    #[default]
    Default,
    Recall,
    #[serde(rename = "Recall (at random)")]
    RecallAtRandom,
    #[serde(rename = "Speed test")]
    SpeedTest,
    #[serde(rename = "Spaced repetition")]
    SpacedRepetition,
}

impl Mode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Default => "Default",
            Self::Recall => "Recall",
            Self::RecallAtRandom => "Recall (at random)",
            Self::SpeedTest => "Speed test",
            Self::SpacedRepetition => "Spaced repetition",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Default" => Some(Self::Default),
            "Recall" => Some(Self::Recall),
            "Recall (at random)" => Some(Self::RecallAtRandom),
            "Speed test" => Some(Self::SpeedTest),
            "Spaced repetition" => Some(Self::SpacedRepetition),
            _ => None,
        }
    }
}
