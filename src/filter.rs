//! Resolving what a run will study.
//!
//! Selected stacks expand to their own contents plus the contents of every
//! descendant stack. The resulting entities are narrowed by the selected
//! difficulties and priorities, then optionally shuffled.

use std::collections::HashSet;

use rand::RngCore;
use rand::seq::SliceRandom;
use tracing::{debug, warn};

use crate::gateway::Gateway;
use crate::model::{Difficulty, Priority, Stack};

/// What a run was asked to study.
#[derive(Debug, Clone, Default)]
pub struct Selection {
    pub stacks: Vec<Stack>,

    /// Allowed difficulties. Empty means any.
    pub difficulties: Vec<Difficulty>,

    /// Allowed priorities. Empty means any.
    pub priorities: Vec<Priority>,

    pub shuffle: bool,
}

impl Selection {
    /// Keys of the selected stacks and every descendant, first occurrence kept.
    pub fn stack_keys(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.stacks
            .iter()
            .flat_map(|s| std::iter::once(&s.key).chain(&s.descendants))
            .filter(|k| seen.insert(k.as_str()))
            .cloned()
            .collect()
    }

    pub fn difficulty_ids(&self) -> Vec<i64> {
        self.difficulties.iter().map(|d| d.id).collect()
    }

    pub fn priority_ids(&self) -> Vec<i64> {
        self.priorities.iter().map(|p| p.id).collect()
    }
}

/// Produces the ordered list of content keys for a run.
///
/// Returns an empty list when nothing matches or the content cannot be
/// fetched; the run then has nothing to study.
pub fn resolve<G: Gateway + ?Sized>(
    gateway: &G,
    selection: &Selection,
    rng: &mut dyn RngCore,
) -> Vec<String> {
    let keys = collect_keys(gateway, &selection.stacks);

    let contents = match gateway.get_by_keys(&keys) {
        Ok(contents) => contents,
        Err(e) => {
            warn!(
                stacks = ?stack_names(&selection.stacks),
                error = %e,
                "failed to fetch stack contents"
            );
            return Vec::new();
        }
    };
    if contents.is_empty() {
        warn!(stacks = ?stack_names(&selection.stacks), "no contents found for stacks");
        return Vec::new();
    }

    let difficulties = selection.difficulty_ids();
    let priorities = selection.priority_ids();
    let mut keys: Vec<String> = contents
        .into_iter()
        .filter(|c| difficulties.is_empty() || difficulties.contains(&c.difficulty))
        .filter(|c| priorities.is_empty() || priorities.contains(&c.priority))
        .map(|c| c.key)
        .collect();

    if selection.shuffle {
        keys.shuffle(rng);
    }
    debug!(
        count = keys.len(),
        shuffled = selection.shuffle,
        "contents resolved"
    );
    keys
}

/// Direct contents of every stack, then of each descendant stack.
///
/// Each key appears once, at its first position.
fn collect_keys<G: Gateway + ?Sized>(gateway: &G, stacks: &[Stack]) -> Vec<String> {
    let mut keys = Vec::new();
    for stack in stacks {
        keys.extend(stack.contents.iter().cloned());
        for descendant in &stack.descendants {
            match gateway.stack(descendant) {
                Ok(child) => keys.extend(child.contents),
                Err(e) => warn!(
                    stack = %stack.key,
                    %descendant,
                    error = %e,
                    "skipping descendant stack"
                ),
            }
        }
    }
    let mut seen = HashSet::new();
    keys.retain(|k| seen.insert(k.clone()));
    keys
}

fn stack_names(stacks: &[Stack]) -> Vec<&str> {
    stacks.iter().map(|s| s.name.as_str()).collect()
}
