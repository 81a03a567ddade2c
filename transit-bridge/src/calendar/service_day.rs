//! The simulated day's clock.

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone};
use chrono_tz::Tz;

use crate::config::ConfigError;
use crate::domain::{SECONDS_PER_DAY, ScheduleTime};

/// The simulated day: a date in a time zone.
///
/// Simulation time counts seconds from local midnight of the date. The
/// horizon ends exactly 24 hours later, regardless of daylight saving
/// changes during the day.
///
/// # Examples
///
/// ```
/// use transit_bridge::calendar::ServiceDay;
///
/// let day = ServiceDay::parse("2015-07-01", "Europe/Berlin").unwrap();
/// assert_eq!(day.day_start().to_rfc3339(), "2015-07-01T00:00:00+02:00");
/// assert_eq!(day.following_date().to_string(), "2015-07-02");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceDay {
    date: NaiveDate,
    following_date: NaiveDate,
    previous_date: NaiveDate,
    day_start: DateTime<Tz>,
}

impl ServiceDay {
    /// Create the service day for `date` in `time_zone`.
    ///
    /// # Errors
    ///
    /// Returns `Err` if local midnight doesn't exist on the date, or the date
    /// has no neighbour in chrono's range.
    pub fn new(date: NaiveDate, time_zone: Tz) -> Result<Self, ConfigError> {
        let following_date = date.succ_opt().ok_or(ConfigError::DateOutOfRange(date))?;
        let previous_date = date.pred_opt().ok_or(ConfigError::DateOutOfRange(date))?;
        let day_start = time_zone
            .from_local_datetime(&date.and_time(NaiveTime::MIN))
            .earliest()
            .ok_or_else(|| ConfigError::NonexistentMidnight {
                date,
                time_zone: time_zone.name().to_string(),
            })?;

        Ok(Self {
            date,
            following_date,
            previous_date,
            day_start,
        })
    }

    /// Parse a `YYYY-MM-DD` date and an IANA zone name.
    pub fn parse(date: &str, time_zone: &str) -> Result<Self, ConfigError> {
        let parsed = NaiveDate::parse_from_str(date, "%Y-%m-%d").map_err(|e| {
            ConfigError::InvalidDate {
                date: date.to_string(),
                reason: e.to_string(),
            }
        })?;
        let zone: Tz = time_zone
            .parse()
            .map_err(|_| ConfigError::UnknownTimeZone(time_zone.to_string()))?;
        Self::new(parsed, zone)
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn following_date(&self) -> NaiveDate {
        self.following_date
    }

    pub fn previous_date(&self) -> NaiveDate {
        self.previous_date
    }

    pub fn time_zone(&self) -> Tz {
        self.day_start.timezone()
    }

    /// Local midnight of the date.
    pub fn day_start(&self) -> DateTime<Tz> {
        self.day_start
    }

    pub fn day_start_millis(&self) -> i64 {
        self.day_start.timestamp_millis()
    }

    /// End of the simulated horizon, 24 hours after `day_start`.
    pub fn horizon_end_millis(&self) -> i64 {
        self.day_start_millis() + SECONDS_PER_DAY * 1000
    }

    /// Returns true if an absolute clock time lies after the horizon.
    pub fn is_beyond_horizon(&self, clock_millis: i64) -> bool {
        clock_millis > self.horizon_end_millis()
    }

    /// Converts an absolute clock time into simulation time.
    pub fn time_at(&self, clock_millis: i64) -> ScheduleTime {
        ScheduleTime::from_seconds((clock_millis - self.day_start_millis()) / 1000)
    }

    /// Absolute clock time of a simulation time, in milliseconds.
    pub fn clock_millis(&self, time: ScheduleTime) -> i64 {
        self.day_start_millis() + time.seconds() * 1000
    }

    /// The instant `offset_secs` after local midnight.
    pub fn date_time_at(&self, offset_secs: i64) -> DateTime<Tz> {
        self.day_start + Duration::seconds(offset_secs)
    }
}
