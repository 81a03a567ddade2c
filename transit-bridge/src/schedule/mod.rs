//! Simulation network and transit schedule.
//!
//! [`ScheduleExtractor`] reads a [`PlanningGraph`](crate::graph::PlanningGraph)
//! and fills a [`Network`] and a [`TransitSchedule`]. The schedule is the
//! read-only source of truth for itinerary reconstruction afterwards.

mod error;
mod extract;
mod network;
mod pseudo_network;
mod store;


pub use error::ScheduleError;
pub use extract::{
    ExtractionReport, Extraction, HOP_LINK_CAPACITY, HOP_LINK_FREESPEED, STOP_LINK_SIZE,
    ScheduleExtractor, SkipReason, SkippedPattern,
};
pub use network::{CAR_MODE, Link, Network, Node, STREET_LINK_CAPACITY};
pub use pseudo_network::{
    LOOP_LINK_LENGTH, PSEUDO_ID_PREFIX, PSEUDO_LINK_CAPACITY, PSEUDO_LINK_FREESPEED,
    create_pseudo_network,
};
pub use store::{
    DEFAULT_VEHICLE_SEATS, DEFAULT_VEHICLE_STANDING_ROOM, Departure, NetworkRoute, RouteStop,
    ScheduleBuilder, StopFacility, TransitLine, TransitRoute, TransitSchedule, Vehicle,
    VehicleType,
};
