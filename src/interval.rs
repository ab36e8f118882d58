//! Interval calculation: how long until content should be seen again.
//!
//! One formula serves both horizons. In days it drives the long-term `due_by`
//! stamped on content; in seconds it paces re-presentation within a run.

use jiff::{SignedDuration, Timestamp};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::gateway::{Gateway, Lookup};
use crate::model::{Content, Difficulty, Priority};

/// Errors that indicate a corrupted scheduling precondition.
#[derive(Debug, thiserror::Error)]
pub enum IntervalError {
    #[error("{what} weight {value} is outside [0, 1]")]
    WeightOutOfRange { what: &'static str, value: f64 },

    #[error("base interval {0} is not a positive number")]
    InvalidBase(f64),

    #[error("interval of {seconds}s cannot be added to {from}")]
    Overflow { seconds: f64, from: Timestamp },
}

/// The unit an interval is expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unit {
    Days,
    Seconds,
}

impl Unit {
    pub fn seconds(self) -> f64 {
        match self {
            Self::Days => 86_400.0,
            Self::Seconds => 1.0,
        }
    }
}

/// Base intervals, one per unit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Intervals {
    pub base_days: f64,
    pub base_seconds: f64,
}

impl Default for Intervals {
    fn default() -> Self {
        Self {
            base_days: 1.0,
            base_seconds: 60.0,
        }
    }
}

impl Intervals {
    pub fn base(&self, unit: Unit) -> f64 {
        match unit {
            Unit::Days => self.base_days,
            Unit::Seconds => self.base_seconds,
        }
    }

    /// `base * (1 + difficulty) * (1 - priority)`, never below `base`.
    ///
    /// Harder content and less important content are pushed further out.
    pub fn interval(
        &self,
        difficulty: &Difficulty,
        priority: &Priority,
        unit: Unit,
    ) -> Result<f64, IntervalError> {
        let base = self.base(unit);
        if !base.is_finite() || base <= 0.0 {
            return Err(IntervalError::InvalidBase(base));
        }
        let d = weight("difficulty", difficulty.value)?;
        let p = weight("priority", priority.value)?;
        Ok((base * (1.0 + d) * (1.0 - p)).max(base))
    }
}

fn weight(what: &'static str, value: f64) -> Result<f64, IntervalError> {
    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(IntervalError::WeightOutOfRange { what, value })
    }
}

/// Looks up `content`'s difficulty and priority and computes its interval.
///
/// Returns `Ok(None)` when either lookup fails: the caller must skip
/// scheduling. A weight outside `[0, 1]` is an error.
pub fn resolve<G: Gateway + ?Sized>(
    gateway: &G,
    intervals: &Intervals,
    content: &Content,
    unit: Unit,
) -> Result<Option<f64>, IntervalError> {
    let difficulty = match gateway.difficulty(Lookup::Id(content.difficulty)) {
        Ok(d) => d,
        Err(e) => {
            warn!(key = %content.key, error = %e, "cannot schedule: difficulty lookup failed");
            return Ok(None);
        }
    };
    let priority = match gateway.priority(Lookup::Id(content.priority)) {
        Ok(p) => p,
        Err(e) => {
            warn!(key = %content.key, error = %e, "cannot schedule: priority lookup failed");
            return Ok(None);
        }
    };
    intervals.interval(&difficulty, &priority, unit).map(Some)
}

/// `from` pushed forward by `amount` of `unit`.
pub fn after(from: Timestamp, amount: f64, unit: Unit) -> Result<Timestamp, IntervalError> {
    let seconds = amount * unit.seconds();
    let overflow = || IntervalError::Overflow { seconds, from };
    let span = SignedDuration::try_from_secs_f64(seconds).map_err(|_| overflow())?;
    from.checked_add(span).map_err(|_| overflow())
}
