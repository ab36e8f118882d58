//! Importing study content from a TOML file.
//!
//! ```toml
//! [[stack]]
//! key = "RUST"
//! name = "Rust"
//!
//! [[stack]]
//! key = "RUST_ASYNC"
//! parent = "RUST"
//!
//! [[flashcard]]
//! key = "FLASHCARD_1"
//! stack = "RUST"
//! front = "What does `?` do?"
//! back = "Propagates the error."
//! difficulty = "hard"      # optional, defaults to medium
//! priority = "highest"     # optional, defaults to medium
//!
//! [[note]]
//! key = "NOTE_1"
//! stack = "RUST_ASYNC"
//! title = "Pinning"
//! body = "Futures that borrow from themselves must not move."
//!
//! [[question]]
//! key = "QUESTION_1"
//! stack = "RUST"
//! text = "Which trait marks types safe to send between threads?"
//! answers = [{ text = "Send", correct = true }, { text = "Sync" }]
//! ```
//!
//! A `parent` must be declared in the same file. Content may go into a
//! stack from the file or one imported earlier.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;

use serde::Deserialize;

use rehearse::gateway::Lookup;
use rehearse::model::{Answer, Content, ContentKind, Difficulty, Priority, Stack};
use rehearse::storage::{Storage, StorageError};

const DEFAULT_WEIGHT: &str = "medium";

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub(super) struct ImportFile {
    #[serde(default, rename = "stack")]
    stacks: Vec<StackEntry>,
    #[serde(default, rename = "flashcard")]
    flashcards: Vec<FlashcardEntry>,
    #[serde(default, rename = "note")]
    notes: Vec<NoteEntry>,
    #[serde(default, rename = "question")]
    questions: Vec<QuestionEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct StackEntry {
    key: String,
    name: Option<String>,
    parent: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct FlashcardEntry {
    key: String,
    stack: String,
    front: String,
    back: String,
    difficulty: Option<String>,
    priority: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct NoteEntry {
    key: String,
    stack: String,
    title: String,
    body: String,
    difficulty: Option<String>,
    priority: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct QuestionEntry {
    key: String,
    stack: String,
    text: String,
    difficulty: Option<String>,
    priority: Option<String>,
    #[serde(default)]
    answers: Vec<AnswerEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct AnswerEntry {
    text: String,
    #[serde(default)]
    correct: bool,
}

/// What an import wrote.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) struct ImportReport {
    pub(super) stacks: usize,
    pub(super) contents: usize,
    pub(super) answers: usize,
}

pub(super) fn cmd_import(storage: &Storage, path: &Path) -> Result<(), String> {
    let text = fs::read_to_string(path)
        .map_err(|e| format!("failed to read {}: {e}", path.display()))?;
    let file: ImportFile =
        toml::from_str(&text).map_err(|e| format!("invalid import file {}: {e}", path.display()))?;

    let report = apply(storage, &file)?;
    println!(
        "Imported {} stack(s), {} content item(s), {} answer(s) from {}",
        report.stacks,
        report.contents,
        report.answers,
        path.display()
    );
    Ok(())
}

/// Validates `file` against itself and the repository, then writes it.
///
/// Nothing is written when validation fails, and the writes themselves land
/// in one transaction.
pub(super) fn apply(storage: &Storage, file: &ImportFile) -> Result<ImportReport, String> {
    let weights = Weights::load(storage)?;
    let descendants = descendants(&file.stacks)?;

    let mut contents: Vec<(&str, Content)> = Vec::new();
    let mut answers: Vec<Answer> = Vec::new();
    for card in &file.flashcards {
        let content = weights.content(
            &card.key,
            ContentKind::Flashcard,
            (card.front.as_str(), card.back.as_str()),
            (card.difficulty.as_deref(), card.priority.as_deref()),
        )?;
        contents.push((card.stack.as_str(), content));
    }
    for note in &file.notes {
        let content = weights.content(
            &note.key,
            ContentKind::Note,
            (note.title.as_str(), note.body.as_str()),
            (note.difficulty.as_deref(), note.priority.as_deref()),
        )?;
        contents.push((note.stack.as_str(), content));
    }
    for question in &file.questions {
        let content = weights.content(
            &question.key,
            ContentKind::Question,
            (question.text.as_str(), ""),
            (question.difficulty.as_deref(), question.priority.as_deref()),
        )?;
        contents.push((question.stack.as_str(), content));
        answers.extend(question.answers.iter().enumerate().map(|(n, a)| Answer {
            key: format!("{}_ANSWER_{}", question.key, n + 1),
            question: question.key.clone(),
            text: a.text.clone(),
            correct: a.correct,
        }));
    }

    let mut seen = HashSet::new();
    if let Some((_, dup)) = contents.iter().find(|(_, c)| !seen.insert(c.key.as_str())) {
        return Err(format!("content key {} appears more than once", dup.key));
    }

    // Stacks the file declares, then stacks its content lands in.
    let mut stacks: Vec<Stack> = Vec::new();
    for entry in &file.stacks {
        let existing = storage.load_stack(&entry.key).ok();
        let mut stack = existing.unwrap_or_else(|| Stack {
            key: entry.key.clone(),
            name: entry.key.clone(),
            contents: Vec::new(),
            descendants: Vec::new(),
        });
        if let Some(name) = &entry.name {
            stack.name.clone_from(name);
        }
        extend_unique(&mut stack.descendants, &descendants[entry.key.as_str()]);
        stacks.push(stack);
    }
    for (stack_key, content) in &contents {
        let index = match stacks.iter().position(|s| s.key == *stack_key) {
            Some(i) => i,
            None => {
                let stack = storage.load_stack(stack_key).map_err(|_| {
                    format!("{} refers to unknown stack {stack_key}", content.key)
                })?;
                stacks.push(stack);
                stacks.len() - 1
            }
        };
        extend_unique(
            &mut stacks[index].contents,
            std::slice::from_ref(&content.key),
        );
    }

    storage
        .in_transaction(|storage| {
            for stack in &stacks {
                storage.save_stack(stack)?;
            }
            for (_, content) in &contents {
                storage.upsert_content(content)?;
            }
            for answer in &answers {
                storage.save_answer(answer)?;
            }
            Ok(())
        })
        .map_err(|e| format!("failed to write import: {e}"))?;

    Ok(ImportReport {
        stacks: stacks.len(),
        contents: contents.len(),
        answers: answers.len(),
    })
}

fn extend_unique(list: &mut Vec<String>, more: &[String]) {
    for key in more {
        if !list.contains(key) {
            list.push(key.clone());
        }
    }
}

/// Every stack's transitive sub-stacks, in file order.
fn descendants(stacks: &[StackEntry]) -> Result<HashMap<&str, Vec<String>>, String> {
    let parents: HashMap<&str, Option<&str>> = stacks
        .iter()
        .map(|s| (s.key.as_str(), s.parent.as_deref()))
        .collect();

    let mut result: HashMap<&str, Vec<String>> = stacks
        .iter()
        .map(|s| (s.key.as_str(), Vec::new()))
        .collect();

    for stack in stacks {
        let mut visited = HashSet::from([stack.key.as_str()]);
        let mut parent = stack.parent.as_deref();
        while let Some(p) = parent {
            if !visited.insert(p) {
                return Err(format!("stack {} is part of a parent cycle", stack.key));
            }
            let Some(grandparent) = parents.get(p) else {
                return Err(format!(
                    "stack {} has parent {p}, which is not declared in this file",
                    stack.key
                ));
            };
            if let Some(list) = result.get_mut(p) {
                list.push(stack.key.clone());
            }
            parent = *grandparent;
        }
    }
    Ok(result)
}

/// Difficulty and priority rows, resolved by name.
struct Weights {
    difficulties: Vec<Difficulty>,
    priorities: Vec<Priority>,
    default_difficulty: i64,
    default_priority: i64,
}

impl Weights {
    fn load(storage: &Storage) -> Result<Self, String> {
        let lookup = |e: StorageError| format!("failed to load lookups: {e}");
        Ok(Self {
            difficulties: storage.difficulties().map_err(lookup)?,
            priorities: storage.priorities().map_err(lookup)?,
            default_difficulty: storage
                .difficulty(Lookup::Name(DEFAULT_WEIGHT))
                .map_err(lookup)?
                .id,
            default_priority: storage
                .priority(Lookup::Name(DEFAULT_WEIGHT))
                .map_err(lookup)?
                .id,
        })
    }

    fn content(
        &self,
        key: &str,
        kind: ContentKind,
        (front, back): (&str, &str),
        (difficulty, priority): (Option<&str>, Option<&str>),
    ) -> Result<Content, String> {
        let difficulty = match difficulty {
            None => self.default_difficulty,
            Some(name) => find(key, "difficulty", name, &self.difficulties)?,
        };
        let priority = match priority {
            None => self.default_priority,
            Some(name) => find(key, "priority", name, &self.priorities)?,
        };
        Ok(Content {
            key: key.to_string(),
            kind,
            front: front.to_string(),
            back: back.to_string(),
            difficulty,
            priority,
            last_viewed_at: None,
            interval: None,
            due_by: None,
        })
    }
}

/// A named weight row: a difficulty or a priority.
trait Named {
    fn name(&self) -> &str;
    fn id(&self) -> i64;
}

impl Named for Difficulty {
    fn name(&self) -> &str {
        &self.name
    }

    fn id(&self) -> i64 {
        self.id
    }
}

impl Named for Priority {
    fn name(&self) -> &str {
        &self.name
    }

    fn id(&self) -> i64 {
        self.id
    }
}

fn find<T: Named>(key: &str, what: &str, name: &str, rows: &[T]) -> Result<i64, String> {
    rows.iter()
        .find(|row| row.name() == name)
        .map(Named::id)
        .ok_or_else(|| {
            let known: Vec<&str> = rows.iter().map(Named::name).collect();
            format!(
                "{key}: unknown {what} {name:?} (expected one of: {})",
                known.join(", ")
            )
        })
}
