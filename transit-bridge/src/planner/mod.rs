//! Routing requests and itinerary reconstruction.
//!
//! The path search itself is external ([`PathSearch`]). This module decides
//! what to ask it for, and turns the path it returns into an [`Itinerary`]
//! that only uses links and departures present in the exported network and
//! schedule.
//!
//! [`Itinerary`]: crate::domain::Itinerary

mod path;
mod profile;
mod reconstruct;
mod router;
mod split_stops;
mod stats;

#[cfg(test)]
mod reconstruct_tests;

pub use path::{GraphPath, PathBuilder, PathEdge, PathState, TripRef};
pub use profile::ParameterProfile;
pub use reconstruct::{ItineraryReconstructor, Reconstruction, ReconstructionReport, ScheduleGap};
pub use router::{
    BIKE_BOARD_COST_SECS, ModeSet, OptimizeType, PathSearch, RouteRequest, Router, RouterOptions,
    SearchError, SearchParameters, WALK_BOARD_COST_SECS,
};
pub use split_stops::{resolve_split_stops, stop_link};
pub use stats::{RoutingStats, RoutingStatsSnapshot};
