//! In-memory planning graph.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use chrono::NaiveDate;
use geo_types::Coord;
use serde::{Deserialize, Serialize};

use crate::domain::{LineId, LinkId, PatternCode, ServiceId, StopId, TransitMode, TripId};

use super::{
    CalendarOracle, Edge, EdgeKind, LineInfo, PatternHop, PlanningGraph, TripPattern, TripTimes,
    Vertex, VertexIndex, VertexKind,
};

/// Error building or loading a graph.
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    /// An edge refers to a vertex that doesn't exist
    #[error("edge {edge} refers to unknown vertex {vertex}")]
    UnknownVertex { edge: LinkId, vertex: VertexIndex },

    /// Two patterns share a code
    #[error("duplicate pattern code: {0}")]
    DuplicatePattern(PatternCode),

    /// Two stop vertices share a stop id
    #[error("duplicate stop id: {0}")]
    DuplicateStop(StopId),

    /// A pattern refers to a stop that doesn't exist
    #[error("unknown stop: {0}")]
    UnknownStop(StopId),

    /// A trip refers to a pattern that doesn't exist
    #[error("unknown pattern: {0}")]
    UnknownPattern(PatternCode),

    /// The pattern's stops and hops don't fit together
    #[error("invalid pattern {code}: {reason}")]
    InvalidPattern { code: PatternCode, reason: String },

    /// A trip's times don't cover every stop of its pattern
    #[error("trip {trip} has {actual} stop times, pattern has {expected} stops")]
    TripLength {
        trip: TripId,
        expected: usize,
        actual: usize,
    },

    /// Malformed JSON
    #[error("failed to parse graph: {0}")]
    Json(#[from] serde_json::Error),
}

/// Serialized form of a [`MemoryGraph`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct GraphData {
    vertices: Vec<Vertex>,
    edges: Vec<Edge>,
    #[serde(default)]
    patterns: Vec<TripPattern>,
    #[serde(default)]
    calendar: BTreeMap<NaiveDate, BTreeSet<ServiceId>>,
}

/// A planning graph held in memory.
///
/// Vertices are addressed by their position in the vertex list. Outgoing
/// edges are returned in insertion order, so iteration is deterministic.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "GraphData", into = "GraphData")]
pub struct MemoryGraph {
    vertices: Vec<Vertex>,
    edges: Vec<Edge>,
    outgoing: Vec<Vec<usize>>,
    patterns: BTreeMap<PatternCode, TripPattern>,
    calendar: BTreeMap<NaiveDate, BTreeSet<ServiceId>>,
}

impl MemoryGraph {
    /// Parse a graph from JSON text.
    pub fn from_json_str(json: &str) -> Result<Self, GraphError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize the graph as JSON text.
    pub fn to_json_string(&self) -> Result<String, GraphError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn patterns(&self) -> impl Iterator<Item = &TripPattern> {
        self.patterns.values()
    }

    /// Mutable access to a pattern's data.
    ///
    /// The graph's edges are left as they are, so the pattern can be made
    /// inconsistent with them.
    pub fn pattern_mut(&mut self, code: &PatternCode) -> Option<&mut TripPattern> {
        self.patterns.get_mut(code)
    }

    /// Finds the vertex of a transit stop.
    pub fn stop_vertex(&self, stop_id: &StopId) -> Option<VertexIndex> {
        self.vertices
            .iter()
            .position(|v| v.stop_id() == Some(stop_id))
    }
}

impl TryFrom<GraphData> for MemoryGraph {
    type Error = GraphError;

    fn try_from(data: GraphData) -> Result<Self, Self::Error> {
        let mut outgoing = vec![Vec::new(); data.vertices.len()];
        for (i, edge) in data.edges.iter().enumerate() {
            for vertex in [edge.from, edge.to] {
                if vertex >= data.vertices.len() {
                    return Err(GraphError::UnknownVertex {
                        edge: edge.id.clone(),
                        vertex,
                    });
                }
            }
            outgoing[edge.from].push(i);
        }

        let mut seen_stops = HashSet::new();
        for stop_id in data.vertices.iter().filter_map(Vertex::stop_id) {
            if !seen_stops.insert(stop_id) {
                return Err(GraphError::DuplicateStop(stop_id.clone()));
            }
        }

        let mut patterns = BTreeMap::new();
        for pattern in data.patterns {
            if patterns.contains_key(&pattern.code) {
                return Err(GraphError::DuplicatePattern(pattern.code));
            }
            patterns.insert(pattern.code.clone(), pattern);
        }

        Ok(Self {
            vertices: data.vertices,
            edges: data.edges,
            outgoing,
            patterns,
            calendar: data.calendar,
        })
    }
}

impl From<MemoryGraph> for GraphData {
    fn from(graph: MemoryGraph) -> Self {
        Self {
            vertices: graph.vertices,
            edges: graph.edges,
            patterns: graph.patterns.into_values().collect(),
            calendar: graph.calendar,
        }
    }
}

impl PlanningGraph for MemoryGraph {
    fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    fn vertex(&self, index: VertexIndex) -> Option<&Vertex> {
        self.vertices.get(index)
    }

    fn outgoing(&self, index: VertexIndex) -> Vec<&Edge> {
        self.outgoing
            .get(index)
            .map(|edges| edges.iter().map(|&e| &self.edges[e]).collect())
            .unwrap_or_default()
    }

    fn pattern(&self, code: &PatternCode) -> Option<&TripPattern> {
        self.patterns.get(code)
    }
}

impl CalendarOracle for MemoryGraph {
    fn services_on(&self, date: NaiveDate) -> HashSet<ServiceId> {
        self.calendar
            .get(&date)
            .map(|services| services.iter().cloned().collect())
            .unwrap_or_default()
    }
}

/// Description of a trip pattern for [`GraphBuilder::pattern`].
#[derive(Debug, Clone)]
pub struct PatternSpec {
    pub code: PatternCode,
    pub line: LineInfo,
    pub name: String,
    pub mode: TransitMode,
    pub stops: Vec<StopId>,
    /// Length of each hop; one fewer than `stops`.
    pub hop_distances: Vec<f64>,
}

impl PatternSpec {
    /// A pattern with every hop 1 km long and the line named after its id.
    pub fn new(code: &str, line: &str, mode: TransitMode, stops: &[&str]) -> Self {
        Self {
            code: PatternCode::new(code),
            line: LineInfo {
                id: LineId::new(line),
                short_name: line.to_string(),
                long_name: format!("Line {line}"),
            },
            name: code.to_string(),
            mode,
            stops: stops.iter().map(|s| StopId::new(*s)).collect(),
            hop_distances: vec![1000.0; stops.len().saturating_sub(1)],
        }
    }

    pub fn with_hop_distances(mut self, distances: Vec<f64>) -> Self {
        self.hop_distances = distances;
        self
    }

    pub fn with_names(mut self, short_name: &str, long_name: &str, pattern_name: &str) -> Self {
        self.line.short_name = short_name.to_string();
        self.line.long_name = long_name.to_string();
        self.name = pattern_name.to_string();
        self
    }
}

/// Assembles a [`MemoryGraph`], wiring the transit layer the way the
/// router's graph does.
///
/// # Examples
///
/// ```
/// use transit_bridge::domain::TransitMode;
/// use transit_bridge::graph::{GraphBuilder, PatternSpec, PlanningGraph};
///
/// let mut builder = GraphBuilder::new();
/// builder.transit_stop("A", 0.0, 0.0).unwrap();
/// builder.transit_stop("B", 1000.0, 0.0).unwrap();
/// builder
///     .pattern(PatternSpec::new("P1", "L1", TransitMode::Bus, &["A", "B"]))
///     .unwrap();
/// builder.trip("P1", "T1", "weekday", &[0, 300], &[0, 300]).unwrap();
///
/// let graph = builder.build().unwrap();
/// assert_eq!(graph.pattern(&"P1".into()).unwrap().trips.len(), 1);
/// ```
#[derive(Debug, Default)]
pub struct GraphBuilder {
    data: GraphData,
    stops: HashMap<StopId, VertexIndex>,
    depart_vertices: HashMap<StopId, VertexIndex>,
    arrive_vertices: HashMap<StopId, VertexIndex>,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    fn add_vertex(&mut self, kind: VertexKind, coord: Coord<f64>) -> VertexIndex {
        self.data.vertices.push(Vertex { kind, coord });
        self.data.vertices.len() - 1
    }

    fn add_edge(
        &mut self,
        id: impl Into<LinkId>,
        from: VertexIndex,
        to: VertexIndex,
        distance: f64,
        kind: EdgeKind,
    ) {
        self.data.edges.push(Edge {
            id: id.into(),
            from,
            to,
            distance,
            kind,
        });
    }

    /// Adds a street network node.
    pub fn intersection(&mut self, x: f64, y: f64) -> VertexIndex {
        self.add_vertex(VertexKind::Intersection, Coord { x, y })
    }

    /// Adds a one-way street edge.
    pub fn street(
        &mut self,
        id: &str,
        from: VertexIndex,
        to: VertexIndex,
        distance: f64,
        car_speed: f64,
    ) {
        self.add_edge(id, from, to, distance, EdgeKind::Street { car_speed });
    }

    /// Adds a transit stop vertex.
    pub fn transit_stop(&mut self, stop_id: &str, x: f64, y: f64) -> Result<VertexIndex, GraphError> {
        let stop_id = StopId::new(stop_id);
        if self.stops.contains_key(&stop_id) {
            return Err(GraphError::DuplicateStop(stop_id));
        }
        let index = self.add_vertex(
            VertexKind::TransitStop {
                stop_id: stop_id.clone(),
            },
            Coord { x, y },
        );
        self.stops.insert(stop_id, index);
        Ok(index)
    }

    /// Links a stop to the street network in both directions.
    pub fn connect_stop(&mut self, stop: VertexIndex, intersection: VertexIndex) {
        let id = format!("stl_{stop}_{intersection}");
        self.add_edge(
            format!("{id}_in"),
            intersection,
            stop,
            0.0,
            EdgeKind::StreetTransitLink,
        );
        self.add_edge(
            format!("{id}_out"),
            stop,
            intersection,
            0.0,
            EdgeKind::StreetTransitLink,
        );
    }

    fn stop_index(&self, stop_id: &StopId) -> Result<VertexIndex, GraphError> {
        self.stops
            .get(stop_id)
            .copied()
            .ok_or_else(|| GraphError::UnknownStop(stop_id.clone()))
    }

    fn stop_coord(&self, stop: VertexIndex) -> Coord<f64> {
        self.data.vertices[stop].coord
    }

    /// The departure vertex shared by all patterns leaving a stop.
    fn depart_vertex(&mut self, stop_id: &StopId) -> Result<VertexIndex, GraphError> {
        if let Some(&v) = self.depart_vertices.get(stop_id) {
            return Ok(v);
        }
        let stop = self.stop_index(stop_id)?;
        let v = self.add_vertex(VertexKind::TransitInternal, self.stop_coord(stop));
        self.add_edge(format!("{stop_id}_preboard"), stop, v, 0.0, EdgeKind::PreBoard);
        self.depart_vertices.insert(stop_id.clone(), v);
        Ok(v)
    }

    /// The arrival vertex shared by all patterns reaching a stop.
    fn arrive_vertex(&mut self, stop_id: &StopId) -> Result<VertexIndex, GraphError> {
        if let Some(&v) = self.arrive_vertices.get(stop_id) {
            return Ok(v);
        }
        let stop = self.stop_index(stop_id)?;
        let v = self.add_vertex(VertexKind::TransitInternal, self.stop_coord(stop));
        self.add_edge(format!("{stop_id}_prealight"), v, stop, 0.0, EdgeKind::PreAlight);
        self.arrive_vertices.insert(stop_id.clone(), v);
        Ok(v)
    }

    /// Adds a trip pattern and wires its board, hop and alight edges.
    pub fn pattern(&mut self, spec: PatternSpec) -> Result<(), GraphError> {
        if self.data.patterns.iter().any(|p| p.code == spec.code) {
            return Err(GraphError::DuplicatePattern(spec.code));
        }
        if spec.stops.len() < 2 {
            return Err(GraphError::InvalidPattern {
                code: spec.code,
                reason: "needs at least two stops".to_string(),
            });
        }
        if spec.hop_distances.len() != spec.stops.len() - 1 {
            return Err(GraphError::InvalidPattern {
                code: spec.code,
                reason: format!(
                    "{} hop distances for {} stops",
                    spec.hop_distances.len(),
                    spec.stops.len()
                ),
            });
        }

        let code = &spec.code;
        let mut hops = Vec::with_capacity(spec.hop_distances.len());
        for (i, &distance) in spec.hop_distances.iter().enumerate() {
            let from_stop = &spec.stops[i];
            let to_stop = &spec.stops[i + 1];

            let depart = self.depart_vertex(from_stop)?;
            let from_coord = self.stop_coord(self.stop_index(from_stop)?);
            let pattern_depart = self.add_vertex(VertexKind::TransitInternal, from_coord);
            self.add_edge(
                format!("{code}_board{i}"),
                depart,
                pattern_depart,
                0.0,
                EdgeKind::BoardAlight { boarding: true },
            );

            let arrive = self.arrive_vertex(to_stop)?;
            let to_coord = self.stop_coord(self.stop_index(to_stop)?);
            let pattern_arrive = self.add_vertex(VertexKind::TransitInternal, to_coord);

            let hop_id = LinkId::new(format!("{code}_hop{i}"));
            self.add_edge(
                hop_id.clone(),
                pattern_depart,
                pattern_arrive,
                distance,
                EdgeKind::Hop {
                    pattern: code.clone(),
                    index: i,
                    mode: spec.mode,
                },
            );
            self.add_edge(
                format!("{code}_alight{}", i + 1),
                pattern_arrive,
                arrive,
                0.0,
                EdgeKind::BoardAlight { boarding: false },
            );
            hops.push(PatternHop {
                id: hop_id,
                distance,
            });
        }

        self.data.patterns.push(TripPattern {
            code: spec.code,
            line: spec.line,
            name: spec.name,
            mode: spec.mode,
            stops: spec.stops,
            hops,
            trips: Vec::new(),
        });
        Ok(())
    }

    /// Adds a trip to a pattern.
    pub fn trip(
        &mut self,
        pattern: &str,
        trip_id: &str,
        service_id: &str,
        arrivals: &[i64],
        departures: &[i64],
    ) -> Result<(), GraphError> {
        let code = PatternCode::new(pattern);
        let pattern = self
            .data
            .patterns
            .iter_mut()
            .find(|p| p.code == code)
            .ok_or(GraphError::UnknownPattern(code))?;

        let trip_id = TripId::new(trip_id);
        let expected = pattern.stops.len();
        for actual in [arrivals.len(), departures.len()] {
            if actual != expected {
                return Err(GraphError::TripLength {
                    trip: trip_id,
                    expected,
                    actual,
                });
            }
        }

        pattern.trips.push(TripTimes {
            trip_id,
            service_id: ServiceId::new(service_id),
            arrivals: arrivals.to_vec(),
            departures: departures.to_vec(),
        });
        Ok(())
    }

    /// Marks a calendar service as running on a date.
    pub fn service_on(&mut self, date: NaiveDate, service_id: &str) {
        self.data
            .calendar
            .entry(date)
            .or_default()
            .insert(ServiceId::new(service_id));
    }

    pub fn build(self) -> Result<MemoryGraph, GraphError> {
        MemoryGraph::try_from(self.data)
    }
}
