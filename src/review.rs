//! Intrasession review: content that comes back later in the same run.
//!
//! Entries live only in memory and are lost when the run ends. Anything that
//! would come due after the day's cutoff is handed to the long-term schedule
//! instead by stamping the content's `due_by`.

use jiff::{Timestamp, civil, tz::TimeZone};
use tracing::{debug, warn};

use crate::gateway::Gateway;
use crate::interval::{self, IntervalError, Intervals, Unit};

/// Content due for another look at `due_at`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewEntry {
    pub due_at: Timestamp,
    pub key: String,
}

/// Outcome of scheduling a review.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scheduled {
    /// Queued for this run.
    Queued(Timestamp),

    /// Past the cutoff: the content's `due_by` was stamped instead.
    Deferred(Timestamp),

    /// Lookup or persistence failed; nothing was scheduled.
    Skipped,
}

/// The time of day after which nothing is reviewed again in the same run.
#[derive(Debug, Clone)]
pub struct Cutoff {
    pub time: civil::Time,
    pub time_zone: TimeZone,
}

impl Default for Cutoff {
    fn default() -> Self {
        Self {
            time: civil::time(23, 59, 59, 0),
            time_zone: TimeZone::system(),
        }
    }
}

impl Cutoff {
    /// The cutoff instant on the calendar day containing `now`.
    ///
    /// Falls back to `now` itself when the cutoff time does not exist that
    /// day, so nothing is queued past an unrepresentable boundary.
    pub fn on_day_of(&self, now: Timestamp) -> Timestamp {
        let date = now.to_zoned(self.time_zone.clone()).date();
        date.to_datetime(self.time)
            .to_zoned(self.time_zone.clone())
            .map_or(now, |zoned| zoned.timestamp())
    }
}

/// Everything needed to decide when content comes back.
#[derive(Debug, Clone, Default)]
pub struct Pacing {
    pub intervals: Intervals,
    pub cutoff: Cutoff,
}

/// Content waiting to be re-presented, ordered by due time.
///
/// Scheduling the same key twice before it is consumed yields two entries.
#[derive(Debug, Clone, Default)]
pub struct ReviewQueue {
    entries: Vec<ReviewEntry>,
}

impl ReviewQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedules `key` for another look in this run.
    ///
    /// The delay comes from the seconds interval. If the resulting due time
    /// falls after today's cutoff, the content's `due_by` is stamped and
    /// persisted instead and the queue does not grow.
    pub fn schedule<G: Gateway + ?Sized>(
        &mut self,
        gateway: &G,
        pacing: &Pacing,
        now: Timestamp,
        key: &str,
    ) -> Result<Scheduled, IntervalError> {
        let mut content = match gateway.get_by_key(key) {
            Ok(c) => c,
            Err(e) => {
                warn!(key, error = %e, "cannot schedule review: content lookup failed");
                return Ok(Scheduled::Skipped);
            }
        };
        let Some(seconds) = interval::resolve(gateway, &pacing.intervals, &content, Unit::Seconds)?
        else {
            return Ok(Scheduled::Skipped);
        };
        let due_at = interval::after(now, seconds, Unit::Seconds)?;

        if due_at > pacing.cutoff.on_day_of(now) {
            content.due_by = Some(due_at);
            if let Err(e) = gateway.update_content(&content) {
                warn!(key, error = %e, "failed to defer review past cutoff");
                return Ok(Scheduled::Skipped);
            }
            debug!(key, %due_at, "review falls after cutoff, deferred");
            return Ok(Scheduled::Deferred(due_at));
        }

        self.insert(due_at, key);
        debug!(key, %due_at, pending = self.len(), "review queued");
        Ok(Scheduled::Queued(due_at))
    }

    /// Inserts an entry, keeping the queue sorted by `due_at`.
    ///
    /// Entries with equal due times keep their insertion order.
    pub fn insert(&mut self, due_at: Timestamp, key: impl Into<String>) {
        self.entries.push(ReviewEntry {
            due_at,
            key: key.into(),
        });
        self.entries.sort_by_key(|e| e.due_at);
    }

    /// Removes and returns the earliest entry if it is due at `now`.
    pub fn pop_ready(&mut self, now: Timestamp) -> Option<ReviewEntry> {
        if self.entries.first()?.due_at > now {
            return None;
        }
        Some(self.entries.remove(0))
    }

    /// Puts back an entry that was popped but could not be presented.
    pub fn restore(&mut self, entry: ReviewEntry) {
        self.insert(entry.due_at, entry.key);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ReviewEntry> {
        self.entries.iter()
    }
}
