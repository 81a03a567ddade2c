//! Identifier types.
//!
//! Every entity in the graph, network and schedule is keyed by an opaque
//! string id. Each kind of id gets its own newtype so a stop id can never be
//! passed where a link id is expected.

use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::DayOffset;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create an id from anything string-like.
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Returns the id as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_string())
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }
    };
}

string_id!(
    /// Source stop id, also the id of the schedule's stop facility.
    StopId
);
string_id!(
    /// Network link id.
    LinkId
);
string_id!(
    /// Network node id.
    NodeId
);
string_id!(
    /// Transit line id (the source route id).
    LineId
);
string_id!(
    /// Schedule route id (a representative trip id).
    RouteId
);
string_id!(
    /// Departure id: a trip id plus a day suffix.
    DepartureId
);
string_id!(
    /// Synthetic vehicle id, equal to its departure id.
    VehicleId
);
string_id!(
    /// Vehicle type id, one per transit mode.
    VehicleTypeId
);
string_id!(
    /// Source trip id.
    TripId
);
string_id!(
    /// Calendar-service id grouping trips that run on the same days.
    ServiceId
);
string_id!(
    /// Trip pattern code, unique per stop sequence of a line.
    PatternCode
);

impl StopId {
    /// The id of the `n`-th split copy of this stop (`"<id>.<n>"`).
    ///
    /// # Examples
    ///
    /// ```
    /// use transit_bridge::domain::StopId;
    ///
    /// let stop = StopId::new("SWU_900135311");
    /// assert_eq!(stop.split(2).as_str(), "SWU_900135311.2");
    /// ```
    pub fn split(&self, n: u32) -> StopId {
        StopId(format!("{}.{}", self.0, n))
    }
}

impl From<&StopId> for LinkId {
    /// The loop link created at a stop carries the stop's id.
    fn from(stop: &StopId) -> Self {
        LinkId(stop.0.clone())
    }
}

impl From<&StopId> for NodeId {
    fn from(stop: &StopId) -> Self {
        NodeId(stop.0.clone())
    }
}

impl TripId {
    /// The departure id this trip is exported under for `day`.
    ///
    /// # Examples
    ///
    /// ```
    /// use transit_bridge::domain::{DayOffset, TripId};
    ///
    /// let trip = TripId::new("1:trip42");
    /// assert_eq!(trip.departure_id(DayOffset::Current).as_str(), "1:trip42_0");
    /// assert_eq!(trip.departure_id(DayOffset::Previous).as_str(), "1:trip42_-1");
    /// ```
    pub fn departure_id(&self, day: DayOffset) -> DepartureId {
        DepartureId(format!("{}{}", self.0, day.suffix()))
    }

    /// The route id used when this trip founds a new route.
    pub fn route_id(&self) -> RouteId {
        RouteId(self.0.clone())
    }
}

impl From<&DepartureId> for VehicleId {
    fn from(departure: &DepartureId) -> Self {
        VehicleId(departure.0.clone())
    }
}
