//! In-memory gateway for tests.
//!
//! Holds every entity in plain collections, counts mutations, and can be told
//! to fail individual operations or how to answer the confirmation prompt.

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, HashSet};

use uuid::Uuid;

use crate::model::{
    Action, Answer, Content, ContentKind, Difficulty, Item, Priority, Session, Stack, Status,
};

use super::{Confirmation, Gateway, GatewayError, Lookup, Navigation, Result, View};

pub(crate) const EASY: i64 = 1;
pub(crate) const MEDIUM: i64 = 2;
pub(crate) const HARD: i64 = 3;

pub(crate) const LOWEST: i64 = 1;
pub(crate) const NORMAL: i64 = 3;
pub(crate) const HIGHEST: i64 = 5;

pub(crate) struct MemoryGateway {
    pub(crate) difficulties: RefCell<Vec<Difficulty>>,
    pub(crate) priorities: RefCell<Vec<Priority>>,
    pub(crate) statuses: Vec<Status>,
    pub(crate) stacks: RefCell<BTreeMap<String, Stack>>,
    pub(crate) contents: RefCell<BTreeMap<String, Content>>,
    pub(crate) answers: RefCell<Vec<Answer>>,
    pub(crate) sessions: RefCell<BTreeMap<Uuid, Session>>,
    pub(crate) items: RefCell<BTreeMap<Uuid, Item>>,
    pub(crate) actions: RefCell<Vec<Action>>,
    pub(crate) content_updates: Cell<usize>,
    pub(crate) prompts: RefCell<Vec<String>>,
    pub(crate) navigations: RefCell<Vec<(View, Option<String>)>>,
    pub(crate) reply: Cell<Confirmation>,
    failing: RefCell<HashSet<&'static str>>,
}

impl MemoryGateway {
    /// A gateway seeded with the default lookup rows and nothing else.
    pub(crate) fn new() -> Self {
        let difficulty = |id, name: &str, value| Difficulty {
            id,
            name: name.into(),
            value,
        };
        let priority = |id, name: &str, value| Priority {
            id,
            name: name.into(),
            value,
        };
        Self {
            difficulties: RefCell::new(vec![
                difficulty(EASY, "easy", 0.25),
                difficulty(MEDIUM, "medium", 0.5),
                difficulty(HARD, "hard", 0.75),
            ]),
            priorities: RefCell::new(vec![
                priority(LOWEST, "lowest", 0.0),
                priority(2, "low", 0.25),
                priority(NORMAL, "medium", 0.5),
                priority(4, "high", 0.75),
                priority(HIGHEST, "highest", 1.0),
            ]),
            statuses: vec![
                Status {
                    id: 1,
                    name: Status::NEW.into(),
                },
                Status {
                    id: 2,
                    name: Status::COMPLETED.into(),
                },
            ],
            stacks: RefCell::default(),
            contents: RefCell::default(),
            answers: RefCell::default(),
            sessions: RefCell::default(),
            items: RefCell::default(),
            actions: RefCell::default(),
            content_updates: Cell::new(0),
            prompts: RefCell::default(),
            navigations: RefCell::default(),
            reply: Cell::new(Confirmation::Yes),
            failing: RefCell::default(),
        }
    }

    /// A gateway with one stack, `STACK_1`, holding a flashcard per key.
    pub(crate) fn with_flashcards(keys: &[&str]) -> Self {
        let gateway = Self::new();
        for key in keys {
            gateway.add_content(flashcard(key));
        }
        gateway.add_stack("STACK_1", keys, &[]);
        gateway
    }

    pub(crate) fn add_content(&self, content: Content) {
        self.contents
            .borrow_mut()
            .insert(content.key.clone(), content);
    }

    pub(crate) fn add_stack(&self, key: &str, contents: &[&str], descendants: &[&str]) {
        let stack = Stack {
            key: key.into(),
            name: key.to_lowercase(),
            contents: contents.iter().map(|&k| k.to_string()).collect(),
            descendants: descendants.iter().map(|&k| k.to_string()).collect(),
        };
        self.stacks.borrow_mut().insert(stack.key.clone(), stack);
    }

    pub(crate) fn stack_list(&self, keys: &[&str]) -> Vec<Stack> {
        let stacks = self.stacks.borrow();
        keys.iter().map(|&k| stacks[k].clone()).collect()
    }

    pub(crate) fn content(&self, key: &str) -> Content {
        self.contents.borrow()[key].clone()
    }

    pub(crate) fn difficulty_named(&self, name: &str) -> Difficulty {
        self.difficulty(Lookup::Name(name)).unwrap()
    }

    pub(crate) fn priority_named(&self, name: &str) -> Priority {
        self.priority(Lookup::Name(name)).unwrap()
    }

    pub(crate) fn only_session(&self) -> Session {
        let sessions = self.sessions.borrow();
        assert_eq!(sessions.len(), 1, "expected exactly one session");
        sessions.values().next().unwrap().clone()
    }

    pub(crate) fn open_items(&self) -> usize {
        self.items.borrow().values().filter(|i| i.is_open()).count()
    }

    /// Makes `operation` fail until [`MemoryGateway::recover`] is called.
    pub(crate) fn fail(&self, operation: &'static str) {
        self.failing.borrow_mut().insert(operation);
    }

    pub(crate) fn recover(&self, operation: &'static str) {
        self.failing.borrow_mut().remove(operation);
    }

    fn check(&self, operation: &'static str) -> Result<()> {
        if self.failing.borrow().contains(operation) {
            return Err(GatewayError::Unavailable(operation.into()));
        }
        Ok(())
    }
}

/// A medium-difficulty, medium-priority flashcard.
pub(crate) fn flashcard(key: &str) -> Content {
    Content {
        key: key.into(),
        kind: ContentKind::Flashcard,
        front: format!("{key} front"),
        back: format!("{key} back"),
        difficulty: MEDIUM,
        priority: NORMAL,
        last_viewed_at: None,
        interval: None,
        due_by: None,
    }
}

impl Gateway for MemoryGateway {
    fn difficulty(&self, lookup: Lookup<'_>) -> Result<Difficulty> {
        self.check("difficulty")?;
        self.difficulties
            .borrow()
            .iter()
            .find(|d| match lookup {
                Lookup::Id(id) => d.id == id,
                Lookup::Name(name) => d.name == name,
            })
            .cloned()
            .ok_or_else(|| GatewayError::not_found("difficulty", &lookup))
    }

    fn priority(&self, lookup: Lookup<'_>) -> Result<Priority> {
        self.check("priority")?;
        self.priorities
            .borrow()
            .iter()
            .find(|p| match lookup {
                Lookup::Id(id) => p.id == id,
                Lookup::Name(name) => p.name == name,
            })
            .cloned()
            .ok_or_else(|| GatewayError::not_found("priority", &lookup))
    }

    fn status(&self, lookup: Lookup<'_>) -> Result<Status> {
        self.check("status")?;
        self.statuses
            .iter()
            .find(|s| match lookup {
                Lookup::Id(id) => s.id == id,
                Lookup::Name(name) => s.name == name,
            })
            .cloned()
            .ok_or_else(|| GatewayError::not_found("status", &lookup))
    }

    fn stack(&self, key: &str) -> Result<Stack> {
        self.check("stack")?;
        self.stacks
            .borrow()
            .get(key)
            .cloned()
            .ok_or_else(|| GatewayError::not_found("stack", key))
    }

    fn get_by_key(&self, key: &str) -> Result<Content> {
        self.check("get_by_key")?;
        self.contents
            .borrow()
            .get(key)
            .cloned()
            .ok_or_else(|| GatewayError::not_found("content", key))
    }

    fn get_by_keys(&self, keys: &[String]) -> Result<Vec<Content>> {
        self.check("get_by_keys")?;
        let contents = self.contents.borrow();
        Ok(keys
            .iter()
            .filter_map(|k| contents.get(k).cloned())
            .collect())
    }

    fn answers(&self, question: &str) -> Result<Vec<Answer>> {
        self.check("answers")?;
        Ok(self
            .answers
            .borrow()
            .iter()
            .filter(|a| a.question == question)
            .cloned()
            .collect())
    }

    fn update_content(&self, content: &Content) -> Result<Content> {
        self.check("update_content")?;
        let mut contents = self.contents.borrow_mut();
        let Some(slot) = contents.get_mut(&content.key) else {
            return Err(GatewayError::not_found("content", &content.key));
        };
        *slot = content.clone();
        self.content_updates.set(self.content_updates.get() + 1);
        Ok(content.clone())
    }

    fn create_session(&self, session: &Session) -> Result<Session> {
        self.check("create_session")?;
        self.sessions
            .borrow_mut()
            .insert(session.id, session.clone());
        Ok(session.clone())
    }

    fn update_session(&self, session: &Session) -> Result<Session> {
        self.check("update_session")?;
        let mut sessions = self.sessions.borrow_mut();
        let Some(slot) = sessions.get_mut(&session.id) else {
            return Err(GatewayError::not_found("session", &session.id));
        };
        *slot = session.clone();
        Ok(session.clone())
    }

    fn create_item(&self, item: &Item) -> Result<Item> {
        self.check("create_item")?;
        self.items.borrow_mut().insert(item.id, item.clone());
        Ok(item.clone())
    }

    fn update_item(&self, item: &Item) -> Result<Item> {
        self.check("update_item")?;
        let mut items = self.items.borrow_mut();
        let Some(slot) = items.get_mut(&item.id) else {
            return Err(GatewayError::not_found("item", &item.id));
        };
        *slot = item.clone();
        Ok(item.clone())
    }

    fn create_action(&self, action: &Action) -> Result<Action> {
        self.check("create_action")?;
        self.actions.borrow_mut().push(action.clone());
        Ok(action.clone())
    }

    fn confirm(&self, prompt: &str) -> Confirmation {
        self.prompts.borrow_mut().push(prompt.to_string());
        self.reply.get()
    }

    fn navigate(&self, navigation: Navigation<'_>) -> Result<()> {
        self.check("navigate")?;
        self.navigations
            .borrow_mut()
            .push((navigation.view, navigation.entity.map(|c| c.key.clone())));
        Ok(())
    }
}
