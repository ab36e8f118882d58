//! Content: the unit being studied.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

/// A flashcard, note, or question.
///
/// Owned by the content repository. A run reads it and rewrites the
/// scheduling fields (`difficulty`, `last_viewed_at`, `interval`, `due_by`)
/// through the gateway; it never persists content on its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Content {
    /// Stable key, e.g. `FLASHCARD_1`.
    pub key: String,

    pub kind: ContentKind,

    /// Flashcard front, note title, or question text.
    pub front: String,

    /// Flashcard back or note body. Empty for questions.
    pub back: String,

    /// Id of the current difficulty.
    pub difficulty: i64,

    /// Id of the current priority.
    pub priority: i64,

    pub last_viewed_at: Option<Timestamp>,

    /// Last long-term interval computed for this content, in days.
    pub interval: Option<f64>,

    /// When this content becomes eligible for study again.
    pub due_by: Option<Timestamp>,
}

impl Content {
    pub fn is_question(&self) -> bool {
        self.kind == ContentKind::Question
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ContentKind {
    Flashcard,
    Note,
    Question,
}

impl ContentKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Flashcard => "flashcard",
            Self::Note => "note",
            Self::Question => "question",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "flashcard" => Some(Self::Flashcard),
            "note" => Some(Self::Note),
            "question" => Some(Self::Question),
            _ => None,
        }
    }
}

/// One possible answer to a question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Answer {
    pub key: String,

    /// Key of the question this answer belongs to.
    pub question: String,

    pub text: String,
    pub correct: bool,
}

/// What the runner hands to the UI after navigating.
///
/// Questions travel with their answer set so the view can render both.
#[derive(Debug, Clone, PartialEq)]
pub enum Presented {
    Content(Content),
    Question {
        question: Content,
        answers: Vec<Answer>,
    },
}

impl Presented {
    /// The content being presented, regardless of kind.
    pub fn content(&self) -> &Content {
        match self {
            Self::Content(content) | Self::Question { question: content, .. } => content,
        }
    }

    pub fn key(&self) -> &str {
        &self.content().key
    }
}
