//! Transit schedule store.
//!
//! Schedule extraction writes through [`ScheduleBuilder`]; once built, the
//! [`TransitSchedule`] is immutable and shared by all routing requests.

use std::collections::{BTreeMap, HashMap, HashSet};

use geo_types::Coord;
use serde::Serialize;

use crate::domain::{
    DayOffset, DepartureId, LineId, LinkId, RouteId, ScheduleTime, StopId, TransitMode, TripId,
    VehicleId, VehicleTypeId,
};

use super::ScheduleError;

/// Seats of a default vehicle.
pub const DEFAULT_VEHICLE_SEATS: u32 = 50;

/// Standing places of a default vehicle.
pub const DEFAULT_VEHICLE_STANDING_ROOM: u32 = 50;

/// A place where vehicles stop and riders board or alight.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StopFacility {
    pub id: StopId,
    pub coord: Coord<f64>,
    /// The network link vehicles serve the stop on.
    pub link: Option<LinkId>,
}

/// One stop of a route with offsets from the route's first arrival.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct RouteStop {
    pub stop: StopId,
    pub arrival_offset: i64,
    pub departure_offset: i64,
    pub await_departure: bool,
}

/// The links a route's vehicles drive along.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NetworkRoute {
    pub start: LinkId,
    pub interior: Vec<LinkId>,
    pub end: LinkId,
}

impl NetworkRoute {
    /// Splits a link sequence into start, interior and end.
    ///
    /// A single link is both start and end. Returns `None` for no links.
    pub fn from_links(mut links: Vec<LinkId>) -> Option<Self> {
        let start = links.first()?.clone();
        if links.len() == 1 {
            return Some(Self {
                end: start.clone(),
                start,
                interior: Vec::new(),
            });
        }
        let end = links.pop()?;
        links.remove(0);
        Some(Self {
            start,
            interior: links,
            end,
        })
    }

    /// All links, start to end.
    pub fn links(&self) -> impl Iterator<Item = &LinkId> {
        std::iter::once(&self.start)
            .chain(self.interior.iter())
            .chain(std::iter::once(&self.end))
    }
}

/// One scheduled run of a route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Departure {
    pub id: DepartureId,
    /// Time the vehicle reaches the first stop.
    pub time: ScheduleTime,
    pub vehicle: VehicleId,
}

/// A stop sequence with fixed offsets, and every departure that follows it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransitRoute {
    pub id: RouteId,
    pub mode: TransitMode,
    pub description: String,
    pub stops: Vec<RouteStop>,
    pub network_route: NetworkRoute,
    departures: Vec<Departure>,
    #[serde(skip)]
    departure_ids: HashSet<DepartureId>,
}

impl TransitRoute {
    pub fn new(
        id: RouteId,
        mode: TransitMode,
        description: String,
        stops: Vec<RouteStop>,
        network_route: NetworkRoute,
    ) -> Self {
        Self {
            id,
            mode,
            description,
            stops,
            network_route,
            departures: Vec::new(),
            departure_ids: HashSet::new(),
        }
    }

    pub fn departures(&self) -> &[Departure] {
        &self.departures
    }

    pub fn has_departure(&self, id: &DepartureId) -> bool {
        self.departure_ids.contains(id)
    }

    /// Returns true if a stop of the route uses this facility.
    pub fn serves_stop(&self, stop: &StopId) -> bool {
        self.stops.iter().any(|s| &s.stop == stop)
    }

    fn push_departure(&mut self, departure: Departure) {
        self.departure_ids.insert(departure.id.clone());
        self.departures.push(departure);
    }
}

/// A service brand owning one or more routes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransitLine {
    pub id: LineId,
    pub name: String,
    routes: Vec<TransitRoute>,
}

impl TransitLine {
    pub fn new(id: LineId, name: String) -> Self {
        Self {
            id,
            name,
            routes: Vec::new(),
        }
    }

    /// Routes in the order they were added.
    pub fn routes(&self) -> &[TransitRoute] {
        &self.routes
    }

    pub fn route(&self, id: &RouteId) -> Option<&TransitRoute> {
        self.routes.iter().find(|r| &r.id == id)
    }

    /// The route whose stop list equals `stops` exactly.
    pub fn route_with_stops(&self, stops: &[RouteStop]) -> Option<&TransitRoute> {
        self.routes.iter().find(|r| r.stops == stops)
    }

    /// The route running a trip on any exported day.
    ///
    /// Tries the departure ids `<trip>_0`, `<trip>_1` and `<trip>_-1`.
    pub fn route_serving_trip(&self, trip: &TripId) -> Option<&TransitRoute> {
        let candidates: Vec<DepartureId> = DayOffset::MATCH_ORDER
            .iter()
            .map(|&day| trip.departure_id(day))
            .collect();
        self.routes
            .iter()
            .find(|route| candidates.iter().any(|id| route.has_departure(id)))
    }

    fn route_mut(&mut self, id: &RouteId) -> Option<&mut TransitRoute> {
        self.routes.iter_mut().find(|r| &r.id == id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VehicleType {
    pub id: VehicleTypeId,
    pub mode: TransitMode,
    pub seats: u32,
    pub standing_room: u32,
}

impl VehicleType {
    /// The default vehicle type for a mode, `"<MODE> Default Vehicle"`.
    pub fn default_for(mode: TransitMode) -> Self {
        Self {
            id: Self::default_id(mode),
            mode,
            seats: DEFAULT_VEHICLE_SEATS,
            standing_room: DEFAULT_VEHICLE_STANDING_ROOM,
        }
    }

    pub fn default_id(mode: TransitMode) -> VehicleTypeId {
        VehicleTypeId::new(format!("{mode} Default Vehicle"))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Vehicle {
    pub id: VehicleId,
    pub vehicle_type: VehicleTypeId,
}

/// Immutable transit schedule.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TransitSchedule {
    facilities: BTreeMap<StopId, StopFacility>,
    lines: BTreeMap<LineId, TransitLine>,
    vehicle_types: BTreeMap<VehicleTypeId, VehicleType>,
    vehicles: BTreeMap<VehicleId, Vehicle>,
    #[serde(skip)]
    departure_index: HashMap<DepartureId, (LineId, RouteId)>,
}

impl TransitSchedule {
    pub fn facility(&self, id: &StopId) -> Option<&StopFacility> {
        self.facilities.get(id)
    }

    pub fn facilities(&self) -> impl Iterator<Item = &StopFacility> {
        self.facilities.values()
    }

    pub fn line(&self, id: &LineId) -> Option<&TransitLine> {
        self.lines.get(id)
    }

    pub fn lines(&self) -> impl Iterator<Item = &TransitLine> {
        self.lines.values()
    }

    pub fn route(&self, line: &LineId, route: &RouteId) -> Option<&TransitRoute> {
        self.line(line)?.route(route)
    }

    /// The line and route a departure belongs to.
    pub fn route_by_departure_id(
        &self,
        id: &DepartureId,
    ) -> Option<(&TransitLine, &TransitRoute)> {
        let (line_id, route_id) = self.departure_index.get(id)?;
        let line = self.line(line_id)?;
        Some((line, line.route(route_id)?))
    }

    pub fn vehicle(&self, id: &VehicleId) -> Option<&Vehicle> {
        self.vehicles.get(id)
    }

    pub fn vehicle_type(&self, id: &VehicleTypeId) -> Option<&VehicleType> {
        self.vehicle_types.get(id)
    }

    pub fn vehicle_types(&self) -> impl Iterator<Item = &VehicleType> {
        self.vehicle_types.values()
    }

    pub fn facility_count(&self) -> usize {
        self.facilities.len()
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    pub fn route_count(&self) -> usize {
        self.lines.values().map(|l| l.routes.len()).sum()
    }

    pub fn departure_count(&self) -> usize {
        self.departure_index.len()
    }

    pub fn vehicle_count(&self) -> usize {
        self.vehicles.len()
    }
}

/// Mutable access to a schedule under construction.
#[derive(Debug, Default)]
pub struct ScheduleBuilder {
    schedule: TransitSchedule,
}

impl ScheduleBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read access to what has been built so far.
    pub fn schedule(&self) -> &TransitSchedule {
        &self.schedule
    }

    pub fn add_facility(&mut self, facility: StopFacility) -> Result<(), ScheduleError> {
        if self.schedule.facilities.contains_key(&facility.id) {
            return Err(ScheduleError::DuplicateFacility(facility.id));
        }
        self.schedule
            .facilities
            .insert(facility.id.clone(), facility);
        Ok(())
    }

    pub fn facility_mut(&mut self, id: &StopId) -> Option<&mut StopFacility> {
        self.schedule.facilities.get_mut(id)
    }

    pub fn add_line(&mut self, line: TransitLine) -> Result<(), ScheduleError> {
        if self.schedule.lines.contains_key(&line.id) {
            return Err(ScheduleError::DuplicateLine(line.id));
        }
        self.schedule.lines.insert(line.id.clone(), line);
        Ok(())
    }

    pub fn add_route(&mut self, line: &LineId, route: TransitRoute) -> Result<(), ScheduleError> {
        let transit_line = self
            .schedule
            .lines
            .get_mut(line)
            .ok_or_else(|| ScheduleError::UnknownLine(line.clone()))?;
        if transit_line.route(&route.id).is_some() {
            return Err(ScheduleError::DuplicateRoute {
                line: line.clone(),
                route: route.id,
            });
        }
        for departure in &route.departures {
            self.schedule
                .departure_index
                .insert(departure.id.clone(), (line.clone(), route.id.clone()));
        }
        transit_line.routes.push(route);
        Ok(())
    }

    pub fn route_mut(&mut self, line: &LineId, route: &RouteId) -> Option<&mut TransitRoute> {
        self.schedule.lines.get_mut(line)?.route_mut(route)
    }

    pub fn add_vehicle_type(&mut self, vehicle_type: VehicleType) {
        self.schedule
            .vehicle_types
            .insert(vehicle_type.id.clone(), vehicle_type);
    }

    /// Adds a departure to a route, with a vehicle of the given type.
    ///
    /// The vehicle id equals the departure id.
    pub fn add_departure(
        &mut self,
        line: &LineId,
        route: &RouteId,
        departure: Departure,
        vehicle_type: &VehicleTypeId,
    ) -> Result<(), ScheduleError> {
        if self.schedule.departure_index.contains_key(&departure.id) {
            return Err(ScheduleError::DuplicateDeparture(departure.id));
        }
        if !self.schedule.vehicle_types.contains_key(vehicle_type) {
            return Err(ScheduleError::UnknownVehicleType(vehicle_type.clone()));
        }
        let transit_route = self
            .schedule
            .lines
            .get_mut(line)
            .ok_or_else(|| ScheduleError::UnknownLine(line.clone()))?
            .route_mut(route)
            .ok_or_else(|| ScheduleError::UnknownRoute {
                line: line.clone(),
                route: route.clone(),
            })?;

        self.schedule.vehicles.insert(
            departure.vehicle.clone(),
            Vehicle {
                id: departure.vehicle.clone(),
                vehicle_type: vehicle_type.clone(),
            },
        );
        self.schedule
            .departure_index
            .insert(departure.id.clone(), (line.clone(), route.clone()));
        transit_route.push_departure(departure);
        Ok(())
    }

    /// Freezes the schedule.
    pub fn build(self) -> TransitSchedule {
        self.schedule
    }
}
