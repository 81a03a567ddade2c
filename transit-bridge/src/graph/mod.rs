//! Input planning graph.
//!
//! The planning graph is the multimodal routing graph the shortest-path
//! search runs on: intersections joined by street edges, transit stops, and
//! for every trip pattern a chain of internal vertices and edges
//!
//! ```text
//! stop -PreBoard-> depart -Board-> pattern depart -Hop-> pattern arrive
//!      -Alight-> arrive -PreAlight-> next stop
//! ```
//!
//! Schedule extraction only reads the graph through [`PlanningGraph`] and
//! [`CalendarOracle`]. [`MemoryGraph`] is an in-memory implementation that
//! can be loaded from JSON or assembled with [`GraphBuilder`].

mod memory;
mod transform;

use std::collections::HashSet;

use chrono::NaiveDate;
use geo_types::Coord;
use serde::{Deserialize, Serialize};

use crate::domain::{LineId, LinkId, PatternCode, ServiceId, StopId, TransitMode, TripId};

pub use memory::{GraphBuilder, GraphError, MemoryGraph, PatternSpec};
pub use transform::{CoordinateTransform, Identity};

/// Position of a vertex in the graph.
pub type VertexIndex = usize;

/// Kind of a graph vertex.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum VertexKind {
    /// Street network node.
    Intersection,
    /// A transit stop, identified by its source stop id.
    TransitStop { stop_id: StopId },
    /// Vertex internal to the transit layer (departure and arrival vertices).
    TransitInternal,
}

/// A graph vertex.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vertex {
    pub kind: VertexKind,
    /// Coordinate in the graph's coordinate system.
    pub coord: Coord<f64>,
}

impl Vertex {
    /// Returns the stop id if this is a transit stop.
    pub fn stop_id(&self) -> Option<&StopId> {
        match &self.kind {
            VertexKind::TransitStop { stop_id } => Some(stop_id),
            _ => None,
        }
    }

    pub fn is_intersection(&self) -> bool {
        matches!(self.kind, VertexKind::Intersection)
    }
}

/// Kind of a graph edge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EdgeKind {
    /// Street segment usable by walking, cycling and cars.
    Street {
        /// Free-flow car speed in metres per second.
        car_speed: f64,
    },
    /// Connects the street network to a transit stop.
    StreetTransitLink,
    /// Stop to its departure vertex.
    PreBoard,
    /// Arrival vertex to its stop.
    PreAlight,
    /// Boarding or alighting a vehicle of one pattern.
    BoardAlight { boarding: bool },
    /// In-vehicle ride between two consecutive stops of a pattern.
    Hop {
        pattern: PatternCode,
        /// Index of the hop within the pattern.
        index: usize,
        mode: TransitMode,
    },
}

/// A directed graph edge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    /// Edge id; street edges and hops keep it as their network link id.
    pub id: LinkId,
    pub from: VertexIndex,
    pub to: VertexIndex,
    /// Length in metres.
    pub distance: f64,
    pub kind: EdgeKind,
}

impl Edge {
    /// Returns the pattern code if this is a hop edge.
    pub fn hop_pattern(&self) -> Option<&PatternCode> {
        match &self.kind {
            EdgeKind::Hop { pattern, .. } => Some(pattern),
            _ => None,
        }
    }
}

/// The transit route (line) a pattern belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineInfo {
    pub id: LineId,
    pub short_name: String,
    pub long_name: String,
}

/// A hop of a trip pattern: the edge id and its length.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternHop {
    pub id: LinkId,
    pub distance: f64,
}

/// Scheduled times of one trip, in seconds after midnight of its service day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TripTimes {
    pub trip_id: TripId,
    pub service_id: ServiceId,
    pub arrivals: Vec<i64>,
    pub departures: Vec<i64>,
}

impl TripTimes {
    /// Number of stops the trip serves.
    pub fn num_stops(&self) -> usize {
        self.arrivals.len()
    }

    pub fn arrival(&self, stop_index: usize) -> Option<i64> {
        self.arrivals.get(stop_index).copied()
    }

    pub fn departure(&self, stop_index: usize) -> Option<i64> {
        self.departures.get(stop_index).copied()
    }
}

/// All trips sharing one stop sequence of a line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripPattern {
    pub code: PatternCode,
    pub line: LineInfo,
    pub name: String,
    pub mode: TransitMode,
    pub stops: Vec<StopId>,
    pub hops: Vec<PatternHop>,
    pub trips: Vec<TripTimes>,
}

/// Read access to a planning graph.
pub trait PlanningGraph {
    /// Number of vertices; indices run from 0 to `vertex_count() - 1`.
    fn vertex_count(&self) -> usize;

    fn vertex(&self, index: VertexIndex) -> Option<&Vertex>;

    /// Outgoing edges of a vertex, in a stable order.
    fn outgoing(&self, index: VertexIndex) -> Vec<&Edge>;

    fn pattern(&self, code: &PatternCode) -> Option<&TripPattern>;

    /// Iterates over all vertices in index order.
    fn vertices(&self) -> impl Iterator<Item = (VertexIndex, &Vertex)> {
        (0..self.vertex_count()).filter_map(|i| self.vertex(i).map(|v| (i, v)))
    }
}

/// Answers which calendar services run on a date.
pub trait CalendarOracle {
    fn services_on(&self, date: NaiveDate) -> HashSet<ServiceId>;
}
