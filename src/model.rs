//! Core data model for rehearse.
//!
//! These types represent what a study run touches: the content being studied
//! (owned by the repository behind the gateway), the lookups that weight it,
//! and the audit trail a run leaves behind: sessions, items, and actions.

mod action;
mod content;
mod item;
mod lookup;
mod session;
mod stack;

pub use action::{Action, ActionMetadata, ActionType};
pub use content::{Answer, Content, ContentKind, Presented};
pub use item::Item;
pub use lookup::{Difficulty, DifficultyLevel, Priority, Status};
pub use session::{Filters, Mode, Session, Settings};
pub use stack::Stack;
