//! Time management
//!
//! Both simulation loops run on simulation-relative seconds. The time manager
//! anchors second zero to an absolute UTC instant so that exported results
//! carry wall-clock timestamps, and answers time-of-day questions for the
//! repeating daily crew shifts.

use crate::simulation::{SimulationError, SimulationResult};
use chrono::{DateTime, Duration, SecondsFormat, TimeZone, Utc};
use tracing::debug;

/// Seconds in one day
pub const SECONDS_PER_DAY: f64 = 86_400.0;

/// Maps simulation seconds to absolute time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeManager {
    base: DateTime<Utc>,
}

impl TimeManager {
    /// Anchor simulation second zero at a Unix timestamp
    pub fn new(base_epoch: i64) -> SimulationResult<Self> {
        let base = Utc.timestamp_opt(base_epoch, 0).single().ok_or_else(|| {
            SimulationError::configuration_error(format!("base epoch {} is out of range", base_epoch))
        })?;
        debug!(base = %base, "Time manager anchored");
        Ok(Self { base })
    }

    /// Anchor simulation second zero at an instant
    pub fn from_datetime(base: DateTime<Utc>) -> Self {
        Self { base }
    }

    /// The instant of simulation second zero
    pub fn base(&self) -> DateTime<Utc> {
        self.base
    }

    /// Absolute time of a simulation second, millisecond precision
    pub fn to_utc(&self, sim_seconds: f64) -> DateTime<Utc> {
        self.base + Duration::milliseconds((sim_seconds * 1000.0).round() as i64)
    }

    /// ISO-8601 rendering of a simulation second
    pub fn to_iso8601(&self, sim_seconds: f64) -> String {
        self.to_utc(sim_seconds).to_rfc3339_opts(SecondsFormat::AutoSi, true)
    }

    /// Simulation seconds of an absolute instant, negative before the base
    pub fn sim_seconds(&self, timestamp: DateTime<Utc>) -> f64 {
        (timestamp - self.base).num_milliseconds() as f64 / 1000.0
    }

    /// Position of a simulation second within its day
    pub fn seconds_of_day(sim_seconds: f64) -> f64 {
        sim_seconds.rem_euclid(SECONDS_PER_DAY)
    }

    /// Horizon length in days
    pub fn days(duration_seconds: f64) -> f64 {
        duration_seconds / SECONDS_PER_DAY
    }
}
