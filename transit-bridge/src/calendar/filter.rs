//! Active calendar services and the trip day rules.

use std::collections::HashSet;

use crate::domain::{DayOffset, SECONDS_PER_DAY, ServiceId};
use crate::graph::{CalendarOracle, TripTimes};

use super::ServiceDay;

/// Looks up which calendar services run around the simulated day.
#[derive(Debug, Clone)]
pub struct CalendarFilter {
    day: ServiceDay,
    following_day_cutoff_secs: i64,
}

impl CalendarFilter {
    pub fn new(day: ServiceDay, following_day_cutoff_secs: i64) -> Self {
        Self {
            day,
            following_day_cutoff_secs,
        }
    }

    pub fn service_day(&self) -> &ServiceDay {
        &self.day
    }

    /// Services running on the date, the day after and the day before.
    pub fn active_services(&self, oracle: &impl CalendarOracle) -> ActiveServices {
        ActiveServices {
            current: oracle.services_on(self.day.date()),
            following: oracle.services_on(self.day.following_date()),
            previous: oracle.services_on(self.day.previous_date()),
            following_day_cutoff_secs: self.following_day_cutoff_secs,
        }
    }
}

/// Calendar services active on the simulated day and its neighbours.
///
/// The three sets may overlap.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActiveServices {
    pub current: HashSet<ServiceId>,
    pub following: HashSet<ServiceId>,
    pub previous: HashSet<ServiceId>,
    /// Following-day trips must leave their first stop before this time.
    pub following_day_cutoff_secs: i64,
}

impl ActiveServices {
    /// The days a trip is exported for, in export order.
    ///
    /// - the simulated day if its service runs that day;
    /// - the following day if its service runs then and it leaves its first
    ///   stop before the cutoff;
    /// - the previous day if its service ran then and it leaves its
    ///   second-to-last stop after midnight.
    ///
    /// # Examples
    ///
    /// ```
    /// use transit_bridge::calendar::ActiveServices;
    /// use transit_bridge::domain::{DayOffset, ServiceId, TripId};
    /// use transit_bridge::graph::TripTimes;
    ///
    /// let mut active = ActiveServices::default();
    /// active.current.insert(ServiceId::new("daily"));
    /// active.following.insert(ServiceId::new("daily"));
    /// active.following_day_cutoff_secs = 4 * 3600;
    ///
    /// let early = TripTimes {
    ///     trip_id: TripId::new("T"),
    ///     service_id: ServiceId::new("daily"),
    ///     arrivals: vec![3600, 4200],
    ///     departures: vec![3600, 4200],
    /// };
    /// assert_eq!(
    ///     active.export_days(&early),
    ///     vec![DayOffset::Current, DayOffset::Following]
    /// );
    /// ```
    pub fn export_days(&self, trip: &TripTimes) -> Vec<DayOffset> {
        let mut days = Vec::new();

        if self.current.contains(&trip.service_id) {
            days.push(DayOffset::Current);
        }

        if self.following.contains(&trip.service_id)
            && trip
                .departure(0)
                .is_some_and(|t| t < self.following_day_cutoff_secs)
        {
            days.push(DayOffset::Following);
        }

        if self.previous.contains(&trip.service_id)
            && trip
                .num_stops()
                .checked_sub(2)
                .and_then(|i| trip.departure(i))
                .is_some_and(|t| t > SECONDS_PER_DAY)
        {
            days.push(DayOffset::Previous);
        }

        days
    }
}
