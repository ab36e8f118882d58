//! Rehearse: study runs over flashcards, notes, and questions.
//!
//! The [`runner`] drives a run: it resolves what to study, presents it one
//! entity at a time, records the learner's path as sessions, items, and
//! actions, and brings content rated medium or hard back later in the same
//! run. Everything it does not own is reached through a [`gateway::Gateway`].

pub mod clock;
pub mod config;
pub mod filter;
pub mod gateway;
pub mod interval;
pub mod model;
pub mod recall;
pub mod recorder;
pub mod review;
pub mod runner;
pub mod storage;
pub mod summary;
