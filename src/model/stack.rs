//! Stack: a named collection of content.

use serde::{Deserialize, Serialize};

/// A collection of content keys, possibly with nested sub-stacks.
///
/// `descendants` is already flattened: it lists every sub-stack key at any
/// depth, so resolving a stack takes one lookup per descendant key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stack {
    pub key: String,
    pub name: String,
    pub contents: Vec<String>,
    pub descendants: Vec<String>,
}
