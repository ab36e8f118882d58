//! What a finished session amounts to.

use std::collections::{BTreeMap, HashSet};

use uuid::Uuid;

use crate::model::{Action, ActionType, Item, Session};

/// Aggregates for the results view.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSummary {
    pub session: Uuid,

    /// Items opened, counting repeat views.
    pub items_shown: usize,
    pub distinct_contents: usize,

    /// Seconds across closed items. Open items count as zero.
    pub total_seconds: f64,
    pub mean_seconds: Option<f64>,

    pub flips: usize,
    pub difficulty_changes: usize,

    /// Seconds per content key, longest first. Ties keep key order.
    pub time_per_content: Vec<(String, f64)>,
}

impl SessionSummary {
    /// Summarizes `session` from its items and their actions.
    ///
    /// Items and actions belonging to other sessions are ignored.
    pub fn new(session: &Session, items: &[Item], actions: &[Action]) -> Self {
        let items: Vec<&Item> = items.iter().filter(|i| i.session == session.id).collect();
        let item_ids: HashSet<Uuid> = items.iter().map(|i| i.id).collect();
        let actions: Vec<&Action> = actions
            .iter()
            .filter(|a| item_ids.contains(&a.item))
            .collect();

        let mut per_content: BTreeMap<&str, f64> = BTreeMap::new();
        for item in &items {
            *per_content.entry(item.reference.as_str()).or_default() +=
                item.duration.unwrap_or(0.0);
        }
        let total_seconds: f64 = per_content.values().sum();

        let mut time_per_content: Vec<(String, f64)> = per_content
            .into_iter()
            .map(|(key, seconds)| (key.to_string(), seconds))
            .collect();
        time_per_content.sort_by(|a, b| b.1.total_cmp(&a.1));

        let closed = items.iter().filter(|i| !i.is_open()).count();
        let count = |kind| actions.iter().filter(|a| a.action_type == kind).count();

        Self {
            session: session.id,
            items_shown: items.len(),
            distinct_contents: time_per_content.len(),
            total_seconds,
            mean_seconds: (closed > 0).then(|| total_seconds / closed as f64),
            flips: count(ActionType::FlashcardFlipped),
            difficulty_changes: count(ActionType::DifficultyChanged),
            time_per_content,
        }
    }
}
