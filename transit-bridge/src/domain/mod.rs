//! Domain types shared by schedule extraction and itinerary reconstruction.
//!
//! Validated types enforce their invariants at construction time, so code
//! that receives them can trust their validity.

mod day_offset;
mod error;
mod ids;
mod itinerary;
mod leg;
mod mode;
mod time;

pub use day_offset::{DEPARTURE_ID_SUFFIXES, DayOffset, SECONDS_PER_DAY};
pub use error::DomainError;
pub use ids::{
    DepartureId, LineId, LinkId, NodeId, PatternCode, RouteId, ServiceId, StopId, TripId,
    VehicleId, VehicleTypeId,
};
pub use itinerary::{ContinuityGap, Itinerary};
pub use leg::{Leg, StopAccess, StreetLeg, TeleportLeg, TransitLeg};
pub use mode::{StreetMode, TRANSIT_MODE_TAG, TeleportKind, TransitMode};
pub use time::ScheduleTime;
