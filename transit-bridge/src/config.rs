//! Bridge configuration.

use chrono::NaiveDate;
use serde::Deserialize;

use crate::calendar::{CalendarFilter, ServiceDay};
use crate::planner::RouterOptions;

/// Default following-day cutoff: trips of the next day departing before
/// 04:00 are exported.
pub const DEFAULT_FOLLOWING_DAY_CUTOFF_SECS: i64 = 4 * 60 * 60;

/// Error in the configuration. Always fatal.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The date isn't `YYYY-MM-DD`
    #[error("invalid date {date:?}: {reason}")]
    InvalidDate { date: String, reason: String },

    /// The time zone isn't a known IANA name
    #[error("unknown time zone: {0}")]
    UnknownTimeZone(String),

    /// Midnight doesn't exist on the date in the zone
    #[error("midnight of {date} does not exist in {time_zone}")]
    NonexistentMidnight { date: NaiveDate, time_zone: String },

    /// The date has no neighbouring day in the calendar range
    #[error("date {0} is at the edge of the supported range")]
    DateOutOfRange(NaiveDate),

    /// Alternatives must be at least one
    #[error("alternatives must be at least 1")]
    NoAlternatives,

    /// Negative cutoff
    #[error("following-day cutoff must not be negative, got {0}s")]
    NegativeCutoff(i64),

    /// Malformed JSON
    #[error("failed to parse config: {0}")]
    Json(#[from] serde_json::Error),
}

/// Settings for extraction and routing.
///
/// # Examples
///
/// ```
/// use transit_bridge::config::BridgeConfig;
///
/// let config = BridgeConfig::from_json_str(
///     r#"{"date": "2024-05-02", "time_zone": "Europe/Berlin", "alternatives": 3}"#,
/// )
/// .unwrap();
/// assert_eq!(config.alternatives, 3);
/// assert!(!config.pseudo_network);
/// assert!(config.service_day().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Simulated day, `YYYY-MM-DD`.
    pub date: String,

    /// IANA time zone of the schedule.
    pub time_zone: String,

    /// Trips of the following day are exported if they depart from their
    /// first stop before this many seconds after midnight.
    pub following_day_cutoff_secs: i64,

    /// Split stops per served platform instead of using the graph's hops.
    pub pseudo_network: bool,

    /// Pick a random parameter profile for every request.
    pub random_profile: bool,

    /// Number of alternative itineraries to choose from at random.
    pub alternatives: usize,
}

impl BridgeConfig {
    /// Create a configuration for a date and zone with default options.
    pub fn new(date: impl Into<String>, time_zone: impl Into<String>) -> Self {
        Self {
            date: date.into(),
            time_zone: time_zone.into(),
            ..Self::default()
        }
    }

    /// Parse and validate a configuration from JSON text.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks every setting, including that date and zone resolve.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.alternatives == 0 {
            return Err(ConfigError::NoAlternatives);
        }
        if self.following_day_cutoff_secs < 0 {
            return Err(ConfigError::NegativeCutoff(self.following_day_cutoff_secs));
        }
        self.service_day().map(|_| ())
    }

    /// The simulated day this configuration describes.
    pub fn service_day(&self) -> Result<ServiceDay, ConfigError> {
        ServiceDay::parse(&self.date, &self.time_zone)
    }

    /// Calendar filter for the simulated day.
    pub fn calendar_filter(&self) -> Result<CalendarFilter, ConfigError> {
        Ok(CalendarFilter::new(
            self.service_day()?,
            self.following_day_cutoff_secs,
        ))
    }

    /// Options for the router.
    pub fn router_options(&self) -> RouterOptions {
        RouterOptions {
            random_profile: self.random_profile,
            alternatives: self.alternatives,
            pseudo_network: self.pseudo_network,
        }
    }
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            date: String::new(),
            time_zone: "UTC".to_string(),
            following_day_cutoff_secs: DEFAULT_FOLLOWING_DAY_CUTOFF_SECS,
            pseudo_network: false,
            random_profile: false,
            alternatives: 1,
        }
    }
}
