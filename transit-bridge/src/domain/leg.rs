//! Leg types.
//!
//! A `Leg` is one piece of an itinerary: a walk or bike ride over street
//! links, a ride on a scheduled transit route, or a teleport connector that
//! only exists to keep consecutive legs joined at the same link.

use chrono::Duration;
use serde::Serialize;

use super::{
    DomainError, LineId, LinkId, RouteId, ScheduleTime, StopId, StreetMode, TRANSIT_MODE_TAG,
    TeleportKind,
};

/// A leg over the street network in a single non-transit mode.
///
/// # Invariants
///
/// - At least one link
/// - Travel time is not negative
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StreetLeg {
    mode: StreetMode,
    links: Vec<LinkId>,
    travel_time: i64,
    distance: f64,
    departure_time: ScheduleTime,
}

impl StreetLeg {
    /// Construct a street leg, validating links and travel time.
    ///
    /// # Errors
    ///
    /// Returns `Err` if `links` is empty or `travel_time_secs` is negative.
    ///
    /// # Examples
    ///
    /// ```
    /// use transit_bridge::domain::{LinkId, ScheduleTime, StreetLeg, StreetMode};
    ///
    /// let leg = StreetLeg::new(
    ///     StreetMode::Walk,
    ///     vec![LinkId::new("a"), LinkId::new("b")],
    ///     120,
    ///     150.0,
    ///     ScheduleTime::from_seconds(3600),
    /// )
    /// .unwrap();
    /// assert_eq!(leg.start_link().as_str(), "a");
    /// assert_eq!(leg.end_link().as_str(), "b");
    /// ```
    pub fn new(
        mode: StreetMode,
        links: Vec<LinkId>,
        travel_time_secs: i64,
        distance: f64,
        departure_time: ScheduleTime,
    ) -> Result<Self, DomainError> {
        if links.is_empty() {
            return Err(DomainError::EmptyStreetLeg);
        }
        if travel_time_secs < 0 {
            return Err(DomainError::NegativeTravelTime(travel_time_secs));
        }
        Ok(Self {
            mode,
            links,
            travel_time: travel_time_secs,
            distance,
            departure_time,
        })
    }

    /// Returns the street mode.
    pub fn mode(&self) -> StreetMode {
        self.mode
    }

    /// Returns the traversed links in order.
    pub fn links(&self) -> &[LinkId] {
        &self.links
    }

    /// Returns the first traversed link.
    pub fn start_link(&self) -> &LinkId {
        // Safe: validated non-empty at construction
        &self.links[0]
    }

    /// Returns the last traversed link.
    pub fn end_link(&self) -> &LinkId {
        &self.links[self.links.len() - 1]
    }

    pub fn travel_time(&self) -> Duration {
        Duration::seconds(self.travel_time)
    }

    /// Distance in metres.
    pub fn distance(&self) -> f64 {
        self.distance
    }

    pub fn departure_time(&self) -> ScheduleTime {
        self.departure_time
    }
}

/// A stop together with the link a rider uses to reach it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct StopAccess {
    pub stop: StopId,
    pub link: LinkId,
}

impl StopAccess {
    pub fn new(stop: StopId, link: LinkId) -> Self {
        Self { stop, link }
    }
}

/// A ride on one scheduled route, from boarding to alighting.
///
/// # Invariants
///
/// - Travel time is not negative
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransitLeg {
    line: LineId,
    route: RouteId,
    access: StopAccess,
    egress: StopAccess,
    travel_time: i64,
    distance: f64,
    departure_time: ScheduleTime,
}

impl TransitLeg {
    /// Construct a transit leg.
    ///
    /// # Errors
    ///
    /// Returns `Err` if `travel_time_secs` is negative.
    pub fn new(
        line: LineId,
        route: RouteId,
        access: StopAccess,
        egress: StopAccess,
        travel_time_secs: i64,
        distance: f64,
        departure_time: ScheduleTime,
    ) -> Result<Self, DomainError> {
        if travel_time_secs < 0 {
            return Err(DomainError::NegativeTravelTime(travel_time_secs));
        }
        Ok(Self {
            line,
            route,
            access,
            egress,
            travel_time: travel_time_secs,
            distance,
            departure_time,
        })
    }

    /// Returns a copy of this leg boarding and alighting at other stops.
    ///
    /// Used when split stops replace the stop ids the path search reported.
    pub fn with_stops(&self, access: StopAccess, egress: StopAccess) -> Self {
        Self {
            access,
            egress,
            ..self.clone()
        }
    }

    pub fn line(&self) -> &LineId {
        &self.line
    }

    pub fn route(&self) -> &RouteId {
        &self.route
    }

    /// Returns the boarding stop and link.
    pub fn access(&self) -> &StopAccess {
        &self.access
    }

    /// Returns the alighting stop and link.
    pub fn egress(&self) -> &StopAccess {
        &self.egress
    }

    pub fn travel_time(&self) -> Duration {
        Duration::seconds(self.travel_time)
    }

    /// In-vehicle distance in metres.
    pub fn distance(&self) -> f64 {
        self.distance
    }

    pub fn departure_time(&self) -> ScheduleTime {
        self.departure_time
    }
}

/// A zero-time connector between two links.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TeleportLeg {
    kind: TeleportKind,
    start_link: LinkId,
    end_link: LinkId,
}

impl TeleportLeg {
    /// Create a teleport between two links.
    ///
    /// Returns `None` when the links coincide, since nothing needs connecting.
    ///
    /// # Examples
    ///
    /// ```
    /// use transit_bridge::domain::{LinkId, TeleportKind, TeleportLeg};
    ///
    /// let a = LinkId::new("a");
    /// let b = LinkId::new("b");
    /// assert!(TeleportLeg::between(TeleportKind::BeginOrEnd, a.clone(), b).is_some());
    /// assert!(TeleportLeg::between(TeleportKind::BeginOrEnd, a.clone(), a).is_none());
    /// ```
    pub fn between(kind: TeleportKind, start_link: LinkId, end_link: LinkId) -> Option<Self> {
        if start_link == end_link {
            return None;
        }
        Some(Self {
            kind,
            start_link,
            end_link,
        })
    }

    /// Returns a copy starting at another link.
    ///
    /// The result may start and end at the same link.
    pub fn with_start_link(&self, start_link: LinkId) -> Self {
        Self {
            start_link,
            ..self.clone()
        }
    }

    /// Returns a copy ending at another link.
    pub fn with_end_link(&self, end_link: LinkId) -> Self {
        Self {
            end_link,
            ..self.clone()
        }
    }

    pub fn kind(&self) -> TeleportKind {
        self.kind
    }

    pub fn start_link(&self) -> &LinkId {
        &self.start_link
    }

    pub fn end_link(&self) -> &LinkId {
        &self.end_link
    }
}

/// One leg of an itinerary.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Leg {
    /// Walk or bike over street links
    Street(StreetLeg),
    /// Ride on a scheduled route
    Transit(TransitLeg),
    /// Connector inserted for continuity
    Teleport(TeleportLeg),
}

impl Leg {
    /// Returns the mode tag the simulation uses for this leg.
    pub fn mode_tag(&self) -> &'static str {
        match self {
            Leg::Street(leg) => leg.mode().tag(),
            Leg::Transit(_) => TRANSIT_MODE_TAG,
            Leg::Teleport(leg) => leg.kind().tag(),
        }
    }

    /// Returns the link the leg starts on.
    pub fn start_link(&self) -> &LinkId {
        match self {
            Leg::Street(leg) => leg.start_link(),
            Leg::Transit(leg) => &leg.access().link,
            Leg::Teleport(leg) => leg.start_link(),
        }
    }

    /// Returns the link the leg ends on.
    pub fn end_link(&self) -> &LinkId {
        match self {
            Leg::Street(leg) => leg.end_link(),
            Leg::Transit(leg) => &leg.egress().link,
            Leg::Teleport(leg) => leg.end_link(),
        }
    }

    /// Returns the travel time; zero for teleports.
    pub fn travel_time(&self) -> Duration {
        match self {
            Leg::Street(leg) => leg.travel_time(),
            Leg::Transit(leg) => leg.travel_time(),
            Leg::Teleport(_) => Duration::zero(),
        }
    }

    /// Returns the distance in metres; zero for teleports.
    pub fn distance(&self) -> f64 {
        match self {
            Leg::Street(leg) => leg.distance(),
            Leg::Transit(leg) => leg.distance(),
            Leg::Teleport(_) => 0.0,
        }
    }

    /// Returns the departure time, if the leg has one.
    pub fn departure_time(&self) -> Option<ScheduleTime> {
        match self {
            Leg::Street(leg) => Some(leg.departure_time()),
            Leg::Transit(leg) => Some(leg.departure_time()),
            Leg::Teleport(_) => None,
        }
    }

    /// Returns true if this is a transit leg.
    pub fn is_transit(&self) -> bool {
        matches!(self, Leg::Transit(_))
    }

    /// Returns true if this is a teleport leg.
    pub fn is_teleport(&self) -> bool {
        matches!(self, Leg::Teleport(_))
    }

    /// Returns the transit leg if this is one.
    pub fn as_transit(&self) -> Option<&TransitLeg> {
        match self {
            Leg::Transit(leg) => Some(leg),
            _ => None,
        }
    }

    /// Returns the teleport leg if this is one.
    pub fn as_teleport(&self) -> Option<&TeleportLeg> {
        match self {
            Leg::Teleport(leg) => Some(leg),
            _ => None,
        }
    }

    /// Returns the street leg if this is one.
    pub fn as_street(&self) -> Option<&StreetLeg> {
        match self {
            Leg::Street(leg) => Some(leg),
            _ => None,
        }
    }
}

impl From<StreetLeg> for Leg {
    fn from(leg: StreetLeg) -> Self {
        Leg::Street(leg)
    }
}

impl From<TransitLeg> for Leg {
    fn from(leg: TransitLeg) -> Self {
        Leg::Transit(leg)
    }
}

impl From<TeleportLeg> for Leg {
    fn from(leg: TeleportLeg) -> Self {
        Leg::Teleport(leg)
    }
}
