//! The seam between the study core and everything it does not own.
//!
//! The core never reaches a repository, a prompt, or a view directly. Every
//! lookup, mutation, and hand-off goes through one [`Gateway`] method, so an
//! embedding application can back it with whatever persistence and UI it has.
//! Each call either yields its single result or reports why it could not.

#[cfg(test)]
pub(crate) mod memory;

use crate::model::{Action, Answer, Content, Difficulty, Item, Priority, Session, Stack, Status};
use crate::recall::RecallComparer;

/// Errors a collaborator can report back through the gateway.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("{entity} not found: {key}")]
    NotFound { entity: &'static str, key: String },

    #[error("request rejected: {0}")]
    Rejected(String),

    #[error("collaborator unavailable: {0}")]
    Unavailable(String),
}

impl GatewayError {
    pub fn not_found(entity: &'static str, key: &(impl ToString + ?Sized)) -> Self {
        Self::NotFound {
            entity,
            key: key.to_string(),
        }
    }
}

pub type Result<T> = core::result::Result<T, GatewayError>;

/// How to find a lookup row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Lookup<'a> {
    Id(i64),
    Name(&'a str),
}

impl std::fmt::Display for Lookup<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Id(id) => write!(f, "id {id}"),
            Self::Name(name) => write!(f, "'{name}'"),
        }
    }
}

/// Answer to a blocking yes/no prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    Yes,
    No,
    Cancel,
}

/// Views the core can hand navigation off to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    /// Ask the learner to recall the current content before revealing it.
    Recall,

    /// Show the outcome of a closed session.
    Results,
}

/// A request to move the UI to another view.
#[derive(Debug, Clone, Copy)]
pub struct Navigation<'a> {
    pub view: View,
    pub session: &'a Session,

    /// The content on screen when the hand-off happened, if any.
    pub entity: Option<&'a Content>,

    /// Helper for scoring a recall attempt against the content.
    pub comparer: &'a RecallComparer,
}

/// Every collaborator operation the study core needs.
pub trait Gateway {
    // ── Lookups ──

    fn difficulty(&self, lookup: Lookup<'_>) -> Result<Difficulty>;
    fn priority(&self, lookup: Lookup<'_>) -> Result<Priority>;
    fn status(&self, lookup: Lookup<'_>) -> Result<Status>;

    // ── Content ──

    fn stack(&self, key: &str) -> Result<Stack>;
    fn get_by_key(&self, key: &str) -> Result<Content>;

    /// Fetches every content item that exists among `keys`, in `keys` order.
    /// Unknown keys are skipped.
    fn get_by_keys(&self, keys: &[String]) -> Result<Vec<Content>>;

    fn answers(&self, question: &str) -> Result<Vec<Answer>>;
    fn update_content(&self, content: &Content) -> Result<Content>;

    // ── Records ──

    fn create_session(&self, session: &Session) -> Result<Session>;
    fn update_session(&self, session: &Session) -> Result<Session>;
    fn create_item(&self, item: &Item) -> Result<Item>;
    fn update_item(&self, item: &Item) -> Result<Item>;
    fn create_action(&self, action: &Action) -> Result<Action>;

    // ── Interaction ──

    /// Asks the learner a yes/no question and blocks until answered.
    fn confirm(&self, prompt: &str) -> Confirmation;

    /// Hands navigation off to another view.
    fn navigate(&self, navigation: Navigation<'_>) -> Result<()>;
}
