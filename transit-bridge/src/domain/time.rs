//! Schedule time handling.
//!
//! The simulation measures time in seconds since midnight of the target day.
//! Times are not wrapped at 24:00: a trip of the following day departs at
//! `24:00:00` or later, and a trip copied from the previous day may start at a
//! negative time.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Seconds relative to midnight of the simulated day.
///
/// # Examples
///
/// ```
/// use transit_bridge::domain::ScheduleTime;
///
/// let t = ScheduleTime::from_seconds(25 * 3600 + 600);
/// assert_eq!(t.to_string(), "25:10:00");
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScheduleTime(i64);

impl ScheduleTime {
    /// Midnight of the simulated day.
    pub const MIDNIGHT: ScheduleTime = ScheduleTime(0);

    /// Create a time from seconds since midnight.
    pub fn from_seconds(seconds: i64) -> Self {
        Self(seconds)
    }

    /// Returns seconds since midnight (may be negative or exceed a day).
    pub fn seconds(&self) -> i64 {
        self.0
    }
}

impl fmt::Debug for ScheduleTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ScheduleTime({self})")
    }
}

impl fmt::Display for ScheduleTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(
            f,
            "{sign}{:02}:{:02}:{:02}",
            abs / 3600,
            (abs % 3600) / 60,
            abs % 60
        )
    }
}
