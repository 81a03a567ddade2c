//! Shortest-path results as handed over by the path search.
//!
//! A [`GraphPath`] is the sequence of search states from origin to
//! destination. Each state after the first records the edge it was reached
//! by, which is all itinerary reconstruction looks at.

use serde::{Deserialize, Serialize};

use crate::domain::{LineId, LinkId, StopId, StreetMode, TripId};

/// The edge a search state was reached by.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PathEdge {
    /// A street edge, which is also a network link.
    Street { link: LinkId, length: f64 },
    /// Boarding a vehicle at, or alighting from one to, a stop.
    BoardAlight { boarding: bool, stop: StopId },
    /// Riding a vehicle between two stops.
    OnBoard { distance: f64 },
    /// Anything else: stop links, pre-board and pre-alight edges.
    Other,
}

/// The trip a rider is on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TripRef {
    pub trip: TripId,
    pub line: LineId,
}

/// One state of a search path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathState {
    /// Seconds since the search started.
    pub elapsed_secs: i64,
    /// Absolute time in milliseconds since the Unix epoch.
    pub clock_millis: i64,
    pub back_edge: Option<PathEdge>,
    /// The trip the state was reached on, for on-board and alighting states.
    pub back_trip: Option<TripRef>,
    pub non_transit_mode: StreetMode,
    /// Metres walked since the last transit ride.
    pub walk_distance: f64,
}

/// A path found by the search, origin state first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphPath {
    pub states: Vec<PathState>,
}

impl GraphPath {
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Seconds from the first to the last state.
    pub fn duration_secs(&self) -> i64 {
        match (self.states.first(), self.states.last()) {
            (Some(first), Some(last)) => last.elapsed_secs - first.elapsed_secs,
            _ => 0,
        }
    }
}

/// Builds a [`GraphPath`] state by state, advancing the clock.
///
/// Used by search adapters and tests.
///
/// # Examples
///
/// ```
/// use transit_bridge::domain::StreetMode;
/// use transit_bridge::planner::PathBuilder;
///
/// let path = PathBuilder::new(0, StreetMode::Walk)
///     .walk("w1", 100.0, 60)
///     .board("A", "T1", "L1", 120)
///     .ride(1000.0, 300)
///     .alight("B", 0)
///     .build();
/// assert_eq!(path.states.len(), 5);
/// assert_eq!(path.duration_secs(), 480);
/// ```
#[derive(Debug, Clone)]
pub struct PathBuilder {
    states: Vec<PathState>,
    trip: Option<TripRef>,
}

impl PathBuilder {
    /// Starts a path at an absolute clock time.
    pub fn new(clock_millis: i64, mode: StreetMode) -> Self {
        Self {
            states: vec![PathState {
                elapsed_secs: 0,
                clock_millis,
                back_edge: None,
                back_trip: None,
                non_transit_mode: mode,
                walk_distance: 0.0,
            }],
            trip: None,
        }
    }

    fn last(&self) -> &PathState {
        // never empty: `new` pushes the origin state
        &self.states[self.states.len() - 1]
    }

    fn push(mut self, edge: PathEdge, secs: i64, mode: StreetMode, walked: f64) -> Self {
        let last = self.last();
        let state = PathState {
            elapsed_secs: last.elapsed_secs + secs,
            clock_millis: last.clock_millis + secs * 1000,
            back_edge: Some(edge),
            back_trip: self.trip.clone(),
            non_transit_mode: mode,
            walk_distance: last.walk_distance + walked,
        };
        self.states.push(state);
        self
    }

    /// Walks a street link.
    pub fn walk(self, link: &str, length: f64, secs: i64) -> Self {
        let edge = PathEdge::Street {
            link: LinkId::new(link),
            length,
        };
        self.push(edge, secs, StreetMode::Walk, length)
    }

    /// Cycles a street link.
    pub fn bike(self, link: &str, length: f64, secs: i64) -> Self {
        let edge = PathEdge::Street {
            link: LinkId::new(link),
            length,
        };
        self.push(edge, secs, StreetMode::Bicycle, 0.0)
    }

    /// Traverses a non-street edge such as a stop link.
    pub fn other(self, secs: i64) -> Self {
        let mode = self.last().non_transit_mode;
        self.push(PathEdge::Other, secs, mode, 0.0)
    }

    /// Boards a trip at a stop after waiting `wait_secs`.
    pub fn board(mut self, stop: &str, trip: &str, line: &str, wait_secs: i64) -> Self {
        let mode = self.last().non_transit_mode;
        self.trip = Some(TripRef {
            trip: TripId::new(trip),
            line: LineId::new(line),
        });
        let edge = PathEdge::BoardAlight {
            boarding: true,
            stop: StopId::new(stop),
        };
        let mut builder = self.push(edge, wait_secs, mode, 0.0);
        if let Some(state) = builder.states.last_mut() {
            state.walk_distance = 0.0;
        }
        builder
    }

    /// Rides the current trip for one hop.
    pub fn ride(self, distance: f64, secs: i64) -> Self {
        let mode = self.last().non_transit_mode;
        self.push(PathEdge::OnBoard { distance }, secs, mode, 0.0)
    }

    /// Leaves the current trip at a stop.
    pub fn alight(mut self, stop: &str, secs: i64) -> Self {
        let mode = self.last().non_transit_mode;
        let edge = PathEdge::BoardAlight {
            boarding: false,
            stop: StopId::new(stop),
        };
        self = self.push(edge, secs, mode, 0.0);
        self.trip = None;
        self
    }

    pub fn build(self) -> GraphPath {
        GraphPath {
            states: self.states,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_advances_clock_and_tracks_trip() {
        let path = PathBuilder::new(1_000_000, StreetMode::Walk)
            .walk("w", 80.0, 60)
            .board("A", "T", "L", 30)
            .ride(500.0, 200)
            .alight("B", 10)
            .walk("x", 20.0, 15)
            .build();

        let states = &path.states;
        assert_eq!(states.len(), 6);
        assert_eq!(states[1].walk_distance, 80.0);
        assert_eq!(states[2].walk_distance, 0.0);
        assert_eq!(states[3].clock_millis, 1_000_000 + 290_000);
        assert_eq!(states[4].back_trip.as_ref().map(|t| t.trip.as_str()), Some("T"));
        assert!(states[5].back_trip.is_none());
        assert_eq!(path.duration_secs(), 315);
    }

    #[test]
    fn bike_edges_carry_bicycle_mode() {
        let path = PathBuilder::new(0, StreetMode::Walk)
            .walk("a", 10.0, 5)
            .bike("b", 100.0, 20)
            .build();
        assert_eq!(path.states[1].non_transit_mode, StreetMode::Walk);
        assert_eq!(path.states[2].non_transit_mode, StreetMode::Bicycle);
    }

    #[test]
    fn path_state_json() {
        let path = PathBuilder::new(0, StreetMode::Walk).walk("a", 10.0, 5).build();
        let json = serde_json::to_string(&path).unwrap();
        let back: GraphPath = serde_json::from_str(&json).unwrap();
        assert_eq!(back, path);
        assert!(json.contains(r#""type":"street""#));
    }
}
