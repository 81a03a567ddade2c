//! Transit bridge between a trip-planner graph and a transport simulation.
//!
//! Exports the planner's street network and timetable as a simulation
//! network and transit schedule for one simulated day, and turns the paths
//! the planner finds into itineraries that only use what was exported.

pub mod calendar;
pub mod config;
pub mod domain;
pub mod graph;
pub mod planner;
pub mod schedule;
