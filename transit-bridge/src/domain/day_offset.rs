//! Day-of-operation offsets and the departure-id suffix contract.
//!
//! The schedule covers the target day plus some trips of its neighbours. A
//! trip that runs on several of those days is exported once per day, and the
//! copies are told apart by a suffix on the departure id: `_0` for the target
//! day, `_1` for the following day and `_-1` for the previous day.
//!
//! Schedule extraction writes these ids and itinerary reconstruction searches
//! for them, so both sides go through this module.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Number of seconds in a service day.
pub const SECONDS_PER_DAY: i64 = 24 * 60 * 60;

/// Departure-id suffixes in the order reconstruction tries them.
pub const DEPARTURE_ID_SUFFIXES: [&str; 3] = ["_0", "_1", "_-1"];

/// The day a trip copy operates on, relative to the target day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DayOffset {
    /// The day before the target day.
    Previous,
    /// The target day.
    Current,
    /// The day after the target day.
    Following,
}

impl DayOffset {
    /// All offsets, in the order matching [`DEPARTURE_ID_SUFFIXES`].
    pub const MATCH_ORDER: [DayOffset; 3] =
        [DayOffset::Current, DayOffset::Following, DayOffset::Previous];

    /// Signed number of days from the target day.
    pub fn days(self) -> i64 {
        match self {
            DayOffset::Previous => -1,
            DayOffset::Current => 0,
            DayOffset::Following => 1,
        }
    }

    /// Departure-id suffix for this day.
    pub fn suffix(self) -> &'static str {
        match self {
            DayOffset::Current => DEPARTURE_ID_SUFFIXES[0],
            DayOffset::Following => DEPARTURE_ID_SUFFIXES[1],
            DayOffset::Previous => DEPARTURE_ID_SUFFIXES[2],
        }
    }

    /// Shift applied to service-day times to express them relative to the
    /// target day's midnight.
    pub fn shift_seconds(self) -> i64 {
        self.days() * SECONDS_PER_DAY
    }
}

impl fmt::Display for DayOffset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.days())
    }
}
