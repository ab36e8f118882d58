//! Rehearse configuration.
//!
//! Loaded from `~/.rehearse/config.toml`. Every key is optional; a missing
//! file means all defaults.

use std::fs;
use std::path::{Path, PathBuf};

use jiff::{civil, tz::TimeZone};
use serde::Deserialize;

use crate::interval::Intervals;
use crate::model::Mode;
use crate::review::{Cutoff, Pacing};
use crate::storage::Storage;

/// Rehearse configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct Config {
    /// Path of the study database. Defaults to `~/.rehearse/study.sqlite`.
    pub database: Option<PathBuf>,

    /// Base interval for the long-term due date, in days.
    pub base_days: f64,

    /// Base interval for reviews within a run, in seconds.
    pub base_seconds: f64,

    /// Time of day after which nothing is reviewed again in the same run.
    pub review_cutoff: civil::Time,

    /// IANA time zone the cutoff is read in. Defaults to the system zone.
    pub time_zone: Option<String>,

    /// Mode used when `run` is given no `--mode`, e.g. `"Recall (at random)"`.
    pub default_mode: Mode,

    pub shuffle: bool,
    pub spaced_review: bool,
}

impl Default for Config {
    fn default() -> Self {
        let intervals = Intervals::default();
        Self {
            database: None,
            base_days: intervals.base_days,
            base_seconds: intervals.base_seconds,
            review_cutoff: civil::time(23, 59, 59, 0),
            time_zone: None,
            default_mode: Mode::Default,
            shuffle: false,
            spaced_review: true,
        }
    }
}

impl Config {
    /// Load config from `~/.rehearse/config.toml`.
    pub fn load() -> Result<Self, String> {
        let path = Self::path().ok_or("could not determine home directory")?;
        Self::load_from(&path)
    }

    /// Load config from `path`. A missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self, String> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .map_err(|e| format!("failed to read {}: {e}", path.display()))?;

        let config: Self = toml::from_str(&contents)
            .map_err(|e| format!("invalid config at {}: {e}", path.display()))?;

        for (key, value) in [
            ("base-days", config.base_days),
            ("base-seconds", config.base_seconds),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(format!(
                    "{key} must be a positive number in {}, got {value}",
                    path.display()
                ));
            }
        }

        Ok(config)
    }

    /// The config file path: `~/.rehearse/config.toml`.
    pub fn path() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".rehearse").join("config.toml"))
    }

    /// The database to open: the configured path or the default one.
    pub fn database_path(&self) -> Result<PathBuf, String> {
        self.database
            .clone()
            .or_else(Storage::default_path)
            .ok_or_else(|| "could not determine home directory".to_string())
    }

    /// Interval bases and the review cutoff, with the time zone resolved.
    pub fn pacing(&self) -> Result<Pacing, String> {
        let time_zone = match &self.time_zone {
            Some(name) => {
                TimeZone::get(name).map_err(|e| format!("unknown time-zone {name:?}: {e}"))?
            }
            None => TimeZone::system(),
        };
        Ok(Pacing {
            intervals: Intervals {
                base_days: self.base_days,
                base_seconds: self.base_seconds,
            },
            cutoff: Cutoff {
                time: self.review_cutoff,
                time_zone,
            },
        })
    }
}
