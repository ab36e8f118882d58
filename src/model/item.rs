//! Item: time spent on one piece of content within a session.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The record of one stretch of time spent on a single content item.
///
/// Open while `end` is `None`. At most one item per session is open.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: Uuid,

    /// The session this item belongs to.
    pub session: Uuid,

    /// Key of the content being studied.
    pub reference: String,

    pub start: Timestamp,
    pub end: Option<Timestamp>,

    /// Seconds between `start` and `end`, set at close.
    pub duration: Option<f64>,

    /// Actions recorded while this item was open, oldest first.
    pub actions: Vec<Uuid>,

    pub created_at: Timestamp,
}

impl Item {
    /// A fresh, open item for `reference` starting at `now`.
    pub fn open(session: Uuid, reference: impl Into<String>, now: Timestamp) -> Self {
        Self {
            id: Uuid::new_v4(),
            session,
            reference: reference.into(),
            start: now,
            end: None,
            duration: None,
            actions: Vec::new(),
            created_at: now,
        }
    }

    pub fn is_open(&self) -> bool {
        self.end.is_none()
    }

    /// Seconds elapsed from `start` until `at`.
    pub fn elapsed(&self, at: Timestamp) -> f64 {
        at.duration_since(self.start).as_secs_f64()
    }
}
