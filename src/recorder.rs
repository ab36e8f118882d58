//! Recording the learner's path: sessions, items, and actions.
//!
//! A session owns an ordered list of items; each item owns an ordered list of
//! actions. At most one item is open at a time, and opening a new one closes
//! the previous one first. Every change is committed through the gateway
//! before the in-memory copy is replaced, so a failed commit leaves the
//! recorder exactly as it was.

use jiff::Timestamp;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::gateway::{Gateway, GatewayError};
use crate::model::{Action, ActionMetadata, ActionType, Item, Session, Status};

#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    #[error("no item is open")]
    NoOpenItem,

    #[error("session {0} is already closed")]
    SessionClosed(Uuid),

    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

pub type Result<T> = core::result::Result<T, RecordError>;

/// Keeps the session record and its open item in step with the repository.
#[derive(Debug)]
pub struct Recorder {
    session: Session,
    item: Option<Item>,
}

impl Recorder {
    /// Persists `draft` as a new session and starts recording into it.
    pub fn begin<G: Gateway + ?Sized>(gateway: &G, draft: &Session) -> Result<Self> {
        let session = gateway.create_session(draft)?;
        debug!(session = %session.id, contents = session.contents.len(), "session created");
        Ok(Self {
            session,
            item: None,
        })
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// The open item, if any.
    pub fn item(&self) -> Option<&Item> {
        self.item.as_ref()
    }

    /// Opens an item for `reference`, closing the open one first.
    ///
    /// If the previous item cannot be closed, no new item is opened. If the
    /// new item is created but the session cannot be updated to list it, the
    /// item is closed again and nothing is opened.
    pub fn open<G: Gateway + ?Sized>(
        &mut self,
        gateway: &G,
        reference: &str,
        now: Timestamp,
    ) -> Result<&Item> {
        if self.session.is_closed() {
            return Err(RecordError::SessionClosed(self.session.id));
        }
        self.close(gateway, now)?;

        let item = gateway.create_item(&Item::open(self.session.id, reference, now))?;

        let mut session = self.session.clone();
        session.children.push(item.id);
        match gateway.update_session(&session) {
            Ok(updated) => self.session = updated,
            Err(e) => {
                warn!(
                    session = %self.session.id,
                    item = %item.id,
                    error = %e,
                    "failed to link item to session"
                );
                let mut orphan = item;
                orphan.end = Some(now);
                orphan.duration = Some(orphan.elapsed(now));
                if let Err(close) = gateway.update_item(&orphan) {
                    warn!(item = %orphan.id, error = %close, "failed to close unlinked item");
                }
                return Err(e.into());
            }
        }

        debug!(item = %item.id, reference, "item opened");
        Ok(self.item.insert(item))
    }

    /// Closes the open item, stamping `end` and `duration`.
    ///
    /// Returns the closed item, or `None` if nothing was open.
    pub fn close<G: Gateway + ?Sized>(
        &mut self,
        gateway: &G,
        now: Timestamp,
    ) -> Result<Option<Item>> {
        let Some(open) = &self.item else {
            return Ok(None);
        };
        let mut closed = open.clone();
        closed.end = Some(now);
        closed.duration = Some(open.elapsed(now));

        let closed = gateway.update_item(&closed)?;
        self.item = None;
        debug!(item = %closed.id, duration = ?closed.duration, "item closed");
        Ok(Some(closed))
    }

    /// Appends an instantaneous action to the open item.
    ///
    /// `build` adds caller-specific detail (such as before/after snapshots)
    /// to the metadata the recorder fills in.
    pub fn record_action<G, F>(
        &mut self,
        gateway: &G,
        now: Timestamp,
        action_type: ActionType,
        reference: &str,
        build: F,
    ) -> Result<Action>
    where
        G: Gateway + ?Sized,
        F: FnOnce(&mut ActionMetadata),
    {
        let item = self.item.as_ref().ok_or(RecordError::NoOpenItem)?;

        let mut metadata = ActionMetadata {
            sequence: item.actions.len() + 1,
            session: self.session.id,
            item: item.id,
            mode: self.session.mode,
            settings: self.session.settings,
            elapsed: item.elapsed(now),
            before: None,
            after: None,
        };
        build(&mut metadata);

        let action = gateway.create_action(&Action {
            id: Uuid::new_v4(),
            item: item.id,
            reference: reference.to_string(),
            action_type,
            action_metadata: metadata,
            start: now,
            end: now,
            duration: 0.0,
        })?;

        let mut updated = item.clone();
        updated.actions.push(action.id);
        let updated = gateway.update_item(&updated)?;
        self.item = Some(updated);

        debug!(action = %action.id, kind = action_type.as_str(), reference, "action recorded");
        Ok(action)
    }

    /// Closes the open item and then the session itself.
    pub fn close_session<G: Gateway + ?Sized>(
        &mut self,
        gateway: &G,
        now: Timestamp,
        completed: &Status,
    ) -> Result<&Session> {
        if self.session.is_closed() {
            return Err(RecordError::SessionClosed(self.session.id));
        }
        self.close(gateway, now)?;

        let mut session = self.session.clone();
        session.end = Some(now);
        session.duration = Some(now.duration_since(session.start).as_secs_f64());
        session.status = completed.id;

        self.session = gateway.update_session(&session)?;
        debug!(session = %self.session.id, duration = ?self.session.duration, "session closed");
        Ok(&self.session)
    }
}
