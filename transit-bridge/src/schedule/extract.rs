//! Schedule extraction from the planning graph.
//!
//! Walks the graph once and emits the simulation network, the stop
//! facilities, and lines with deduplicated routes and per-day departures.
//! Iteration follows vertex and edge order, so extracting the same graph
//! twice gives the same schedule.

use std::collections::{BTreeSet, HashSet};
use std::fmt;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::calendar::ActiveServices;
use crate::domain::{
    DayOffset, LinkId, NodeId, PatternCode, RouteId, ScheduleTime, StopId, TransitMode,
    TripId, VehicleId,
};
use crate::graph::{
    CoordinateTransform, Edge, EdgeKind, PlanningGraph, TripPattern, TripTimes, VertexIndex,
};

use super::network::{CAR_MODE, Link, Network, Node, STREET_LINK_CAPACITY};
use super::pseudo_network::create_pseudo_network;
use super::store::{
    Departure, NetworkRoute, RouteStop, ScheduleBuilder, StopFacility, TransitLine, TransitRoute,
    TransitSchedule, VehicleType,
};
use super::ScheduleError;

/// Capacity, free speed and length of the loop link at every stop, high
/// enough that vehicles never queue on it.
pub const STOP_LINK_SIZE: f64 = 1_000_000.0;

/// Capacity of links between stops.
pub const HOP_LINK_CAPACITY: f64 = 1_000_000.0;

/// Free speed of links between stops, in metres per second.
pub const HOP_LINK_FREESPEED: f64 = 20.0;

/// Why a trip pattern was left out of the schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    NoHops,
    SingleStop,
    /// The number of hops isn't one fewer than the number of stops.
    HopsDontMatchStops { hops: usize, stops: usize },
    /// A hop refers to a pattern the graph doesn't have.
    UnknownPattern,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::NoHops => f.write_str("no hops"),
            SkipReason::SingleStop => f.write_str("only one stop"),
            SkipReason::HopsDontMatchStops { hops, stops } => {
                write!(f, "{hops} hops for {stops} stops")
            }
            SkipReason::UnknownPattern => f.write_str("pattern not in graph"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedPattern {
    pub code: PatternCode,
    pub reason: SkipReason,
}

/// Summary of one extraction run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExtractionReport {
    pub nodes: usize,
    pub links: usize,
    pub facilities: usize,
    pub lines: usize,
    pub routes: usize,
    pub departures: usize,
    pub vehicles: usize,
    pub skipped_patterns: Vec<SkippedPattern>,
    /// Trips left out because their times don't fit their pattern or their
    /// departure id was already taken.
    pub skipped_trips: Vec<TripId>,
}

/// Result of extraction.
#[derive(Debug, Clone, Serialize)]
pub struct Extraction {
    pub network: Network,
    pub schedule: TransitSchedule,
    pub report: ExtractionReport,
}

/// Builds the network and schedule from a planning graph.
///
/// Call the three `extract_*` steps in order and then [`finish`], or use
/// [`run`] to do all of it.
///
/// [`finish`]: ScheduleExtractor::finish
/// [`run`]: ScheduleExtractor::run
pub struct ScheduleExtractor<'g, G, T> {
    graph: &'g G,
    transform: T,
    active: ActiveServices,
    pseudo_network: bool,
    network: Network,
    schedule: ScheduleBuilder,
    processed_patterns: HashSet<PatternCode>,
    skipped_patterns: Vec<SkippedPattern>,
    skipped_trips: Vec<TripId>,
}

impl<'g, G, T> ScheduleExtractor<'g, G, T>
where
    G: PlanningGraph,
    T: CoordinateTransform,
{
    /// Create an extractor. `transform` maps graph coordinates into the
    /// network's coordinate system.
    pub fn new(graph: &'g G, transform: T, active: ActiveServices, pseudo_network: bool) -> Self {
        let mut schedule = ScheduleBuilder::new();
        for mode in TransitMode::ALL {
            schedule.add_vehicle_type(VehicleType::default_for(mode));
        }
        Self {
            graph,
            transform,
            active,
            pseudo_network,
            network: Network::new(),
            schedule,
            processed_patterns: HashSet::new(),
            skipped_patterns: Vec::new(),
            skipped_trips: Vec::new(),
        }
    }

    /// Runs every step and returns the result.
    pub fn run(mut self) -> Result<Extraction, ScheduleError> {
        self.extract_street_network()?;
        self.extract_stops_and_pt_network()?;
        self.extract_schedule()?;
        self.finish()
    }

    /// Network built so far.
    pub fn network(&self) -> &Network {
        &self.network
    }

    /// Schedule built so far.
    pub fn schedule(&self) -> &TransitSchedule {
        self.schedule.schedule()
    }

    /// Adds a node per intersection and a car link per street edge between
    /// two intersections.
    pub fn extract_street_network(&mut self) -> Result<(), ScheduleError> {
        let graph = self.graph;

        for (index, vertex) in graph.vertices() {
            if vertex.is_intersection() {
                self.network.add_node(Node {
                    id: intersection_node(index),
                    coord: self.transform.transform(vertex.coord),
                })?;
            }
        }

        for (index, vertex) in graph.vertices() {
            if !vertex.is_intersection() {
                continue;
            }
            for edge in graph.outgoing(index) {
                let EdgeKind::Street { car_speed } = edge.kind else {
                    continue;
                };
                if !graph.vertex(edge.to).is_some_and(|v| v.is_intersection()) {
                    continue;
                }
                self.network.add_link(
                    Link::new(
                        edge.id.clone(),
                        intersection_node(index),
                        intersection_node(edge.to),
                    )
                    .with_length(edge.distance)
                    .with_freespeed(car_speed)
                    .with_capacity(STREET_LINK_CAPACITY)
                    .with_modes([CAR_MODE]),
                )?;
            }
        }

        debug!(
            nodes = self.network.node_count(),
            links = self.network.link_count(),
            "street network extracted"
        );
        Ok(())
    }

    /// Adds a facility per transit stop.
    ///
    /// Unless building a pseudo network, also adds a node and loop link per
    /// stop and a link per pattern hop.
    pub fn extract_stops_and_pt_network(&mut self) -> Result<(), ScheduleError> {
        let graph = self.graph;
        let transit_modes = if self.pseudo_network {
            BTreeSet::new()
        } else {
            self.observed_transit_modes()
        };

        for (_, vertex) in graph.vertices() {
            let Some(stop_id) = vertex.stop_id() else {
                continue;
            };
            let coord = self.transform.transform(vertex.coord);
            let mut facility = StopFacility {
                id: stop_id.clone(),
                coord,
                link: None,
            };

            if !self.pseudo_network {
                let node = NodeId::from(stop_id);
                let link = LinkId::from(stop_id);
                self.network.add_node(Node {
                    id: node.clone(),
                    coord,
                })?;
                self.network.add_link(
                    Link::new(link.clone(), node.clone(), node)
                        .with_capacity(STOP_LINK_SIZE)
                        .with_freespeed(STOP_LINK_SIZE)
                        .with_length(STOP_LINK_SIZE)
                        .with_modes(transit_modes.iter().map(|m| m.as_str())),
                )?;
                facility.link = Some(link);
            }

            self.schedule.add_facility(facility)?;
        }

        if self.pseudo_network {
            return Ok(());
        }

        for (index, vertex) in graph.vertices() {
            let Some(departure_stop) = vertex.stop_id() else {
                continue;
            };
            for hop in self.boarded_hops(index) {
                let EdgeKind::Hop { mode, .. } = hop.kind else {
                    continue;
                };
                for arrival_stop in self.alighting_stops(hop) {
                    self.network.add_link(
                        Link::new(
                            hop.id.clone(),
                            NodeId::from(departure_stop),
                            NodeId::from(arrival_stop),
                        )
                        .with_length(hop.distance)
                        .with_capacity(HOP_LINK_CAPACITY)
                        .with_freespeed(HOP_LINK_FREESPEED)
                        .with_modes([mode.as_str()]),
                    )?;
                }
            }
        }

        Ok(())
    }

    /// Writes lines, routes and departures for every pattern boarded at
    /// some stop. Each pattern is processed once.
    pub fn extract_schedule(&mut self) -> Result<(), ScheduleError> {
        let graph = self.graph;

        for (index, vertex) in graph.vertices() {
            if vertex.stop_id().is_none() {
                continue;
            }
            for hop in self.boarded_hops(index) {
                let Some(code) = hop.hop_pattern() else {
                    continue;
                };
                if !self.processed_patterns.insert(code.clone()) {
                    continue;
                }
                match graph.pattern(code) {
                    Some(pattern) => self.write_pattern(pattern)?,
                    None => self.skip_pattern(code, SkipReason::UnknownPattern),
                }
            }
        }

        Ok(())
    }

    /// Builds the pseudo network if enabled and freezes the schedule.
    pub fn finish(mut self) -> Result<Extraction, ScheduleError> {
        if self.pseudo_network {
            create_pseudo_network(&mut self.network, &mut self.schedule)?;
        }

        let schedule = self.schedule.build();
        let report = ExtractionReport {
            nodes: self.network.node_count(),
            links: self.network.link_count(),
            facilities: schedule.facility_count(),
            lines: schedule.line_count(),
            routes: schedule.route_count(),
            departures: schedule.departure_count(),
            vehicles: schedule.vehicle_count(),
            skipped_patterns: self.skipped_patterns,
            skipped_trips: self.skipped_trips,
        };

        info!(
            nodes = report.nodes,
            links = report.links,
            facilities = report.facilities,
            lines = report.lines,
            routes = report.routes,
            departures = report.departures,
            skipped_patterns = report.skipped_patterns.len(),
            skipped_trips = report.skipped_trips.len(),
            "schedule extracted"
        );

        Ok(Extraction {
            network: self.network,
            schedule,
            report,
        })
    }

    fn observed_transit_modes(&self) -> BTreeSet<TransitMode> {
        let graph = self.graph;
        graph
            .vertices()
            .flat_map(|(index, _)| graph.outgoing(index))
            .filter_map(|edge| match edge.kind {
                EdgeKind::Hop { mode, .. } => Some(mode),
                _ => None,
            })
            .collect()
    }

    /// Hops reached from a stop via PreBoard, Board and a pattern vertex
    /// whose only outgoing edge is the hop.
    fn boarded_hops(&self, stop: VertexIndex) -> Vec<&'g Edge> {
        let graph = self.graph;
        let mut hops = Vec::new();

        for preboard in graph.outgoing(stop) {
            if preboard.kind != EdgeKind::PreBoard {
                continue;
            }
            for board in graph.outgoing(preboard.to) {
                if board.kind != (EdgeKind::BoardAlight { boarding: true }) {
                    continue;
                }
                if let [hop] = graph.outgoing(board.to).as_slice() {
                    if hop.hop_pattern().is_some() {
                        hops.push(*hop);
                    }
                }
            }
        }

        hops
    }

    /// Stops reached from the end of a hop via Alight and PreAlight.
    fn alighting_stops(&self, hop: &Edge) -> Vec<&'g StopId> {
        let graph = self.graph;
        let mut stops = Vec::new();

        for alight in graph.outgoing(hop.to) {
            if alight.kind != (EdgeKind::BoardAlight { boarding: false }) {
                continue;
            }
            let next = graph.outgoing(alight.to);
            let [prealight] = next.as_slice() else {
                continue;
            };
            if prealight.kind != EdgeKind::PreAlight {
                continue;
            }
            if let Some(stop) = graph.vertex(prealight.to).and_then(|v| v.stop_id()) {
                stops.push(stop);
            }
        }

        stops
    }

    fn skip_pattern(&mut self, code: &PatternCode, reason: SkipReason) {
        warn!(pattern = %code, reason = %reason, "skipping trip pattern");
        self.skipped_patterns.push(SkippedPattern {
            code: code.clone(),
            reason,
        });
    }

    fn write_pattern(&mut self, pattern: &TripPattern) -> Result<(), ScheduleError> {
        if pattern.hops.is_empty() {
            self.skip_pattern(&pattern.code, SkipReason::NoHops);
            return Ok(());
        }
        if pattern.stops.len() < 2 {
            self.skip_pattern(&pattern.code, SkipReason::SingleStop);
            return Ok(());
        }
        if pattern.hops.len() + 1 != pattern.stops.len() {
            self.skip_pattern(
                &pattern.code,
                SkipReason::HopsDontMatchStops {
                    hops: pattern.hops.len(),
                    stops: pattern.stops.len(),
                },
            );
            return Ok(());
        }

        let line_id = &pattern.line.id;
        if self.schedule.schedule().line(line_id).is_none() {
            self.schedule.add_line(TransitLine::new(
                line_id.clone(),
                format!("{}: {}", pattern.line.short_name, pattern.line.long_name),
            ))?;
        }

        let network_route = pattern_network_route(pattern);

        for trip in &pattern.trips {
            let stop_count = pattern.stops.len();
            if trip.arrivals.len() != stop_count || trip.departures.len() != stop_count {
                warn!(
                    trip = %trip.trip_id,
                    pattern = %pattern.code,
                    stops = stop_count,
                    arrivals = trip.arrivals.len(),
                    departures = trip.departures.len(),
                    "trip times don't match pattern stops, skipping trip"
                );
                self.skipped_trips.push(trip.trip_id.clone());
                continue;
            }
            for day in self.active.export_days(trip) {
                self.write_trip(pattern, &network_route, trip, day)?;
            }
        }

        Ok(())
    }

    fn write_trip(
        &mut self,
        pattern: &TripPattern,
        network_route: &NetworkRoute,
        trip: &TripTimes,
        day: DayOffset,
    ) -> Result<(), ScheduleError> {
        let line_id = &pattern.line.id;
        let departure_id = trip.trip_id.departure_id(day);
        if self
            .schedule
            .schedule()
            .route_by_departure_id(&departure_id)
            .is_some()
        {
            warn!(departure = %departure_id, "departure id already taken, skipping trip");
            self.skipped_trips.push(trip.trip_id.clone());
            return Ok(());
        }

        let first_arrival = trip.arrivals[0];
        let stops: Vec<RouteStop> = pattern
            .stops
            .iter()
            .zip(trip.arrivals.iter().zip(&trip.departures))
            .map(|(stop, (&arrival, &departure))| RouteStop {
                stop: stop.clone(),
                arrival_offset: arrival - first_arrival,
                departure_offset: departure - first_arrival,
                await_departure: true,
            })
            .collect();

        let existing = self
            .schedule
            .schedule()
            .line(line_id)
            .and_then(|line| line.route_with_stops(&stops))
            .map(|route| route.id.clone());

        let route_id: RouteId = match existing {
            Some(id) => id,
            None => {
                let id = trip.trip_id.route_id();
                if self.schedule.schedule().route(line_id, &id).is_some() {
                    warn!(route = %id, line = %line_id, "route id already taken, skipping trip");
                    self.skipped_trips.push(trip.trip_id.clone());
                    return Ok(());
                }
                self.schedule.add_route(
                    line_id,
                    TransitRoute::new(
                        id.clone(),
                        pattern.mode,
                        format!("Code: {}, Name: {}", pattern.code, pattern.name),
                        stops,
                        network_route.clone(),
                    ),
                )?;
                id
            }
        };

        let departure = Departure {
            vehicle: VehicleId::from(&departure_id),
            id: departure_id,
            time: ScheduleTime::from_seconds(first_arrival + day.shift_seconds()),
        };
        self.schedule.add_departure(
            line_id,
            &route_id,
            departure,
            &VehicleType::default_id(pattern.mode),
        )
    }
}

/// Node id of an intersection vertex.
fn intersection_node(index: VertexIndex) -> NodeId {
    NodeId::new(index.to_string())
}

/// The stop loop links and hop links a pattern's vehicles drive along:
/// first stop, then each hop followed by the stop it reaches, ending with
/// the last hop and the last stop.
fn pattern_network_route(pattern: &TripPattern) -> NetworkRoute {
    let stop_link = |i: usize| LinkId::from(&pattern.stops[i]);
    let last_hop = pattern.hops.len() - 1;

    let mut interior = Vec::with_capacity(2 * pattern.hops.len());
    for (i, hop) in pattern.hops.iter().enumerate().take(last_hop) {
        interior.push(hop.id.clone());
        interior.push(stop_link(i + 1));
    }
    interior.push(pattern.hops[last_hop].id.clone());

    NetworkRoute {
        start: stop_link(0),
        interior,
        end: stop_link(pattern.stops.len() - 1),
    }
}

