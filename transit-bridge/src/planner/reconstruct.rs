//! Itinerary reconstruction from search paths.
//!
//! Turns the state sequence of a [`GraphPath`] into legs the simulation can
//! execute: runs of street edges become street legs, board and alight pairs
//! become transit legs on the route of the schedule that carries the trip,
//! and teleports join legs that don't meet at the same link.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::calendar::ServiceDay;
use crate::domain::{
    Itinerary, Leg, LineId, LinkId, ScheduleTime, StopAccess, StopId, StreetLeg, StreetMode,
    TeleportKind, TeleportLeg, TransitLeg, TripId,
};
use crate::schedule::TransitSchedule;

use super::path::{GraphPath, PathEdge, PathState};
use super::split_stops::{resolve_split_stops, stop_link};

/// A transit ride with no matching departure in the schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScheduleGap {
    pub trip: TripId,
    pub line: LineId,
    /// When the rider left the vehicle.
    pub alight_time: ScheduleTime,
}

/// What went wrong while matching rides to the schedule.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconstructionReport {
    /// Rides past the schedule horizon, replaced by a teleport.
    pub substituted: Vec<ScheduleGap>,
    /// Rides inside the horizon the schedule doesn't know. No leg was emitted
    /// for them, so the itinerary has a gap.
    pub violations: Vec<ScheduleGap>,
}

impl ReconstructionReport {
    pub fn is_clean(&self) -> bool {
        self.substituted.is_empty() && self.violations.is_empty()
    }
}

/// An itinerary with its report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reconstruction {
    pub itinerary: Itinerary,
    pub report: ReconstructionReport,
}

/// Rebuilds itineraries against a frozen schedule.
#[derive(Debug, Clone)]
pub struct ItineraryReconstructor {
    schedule: Arc<TransitSchedule>,
    day: ServiceDay,
    pseudo_network: bool,
}

impl ItineraryReconstructor {
    pub fn new(schedule: Arc<TransitSchedule>, day: ServiceDay, pseudo_network: bool) -> Self {
        Self {
            schedule,
            day,
            pseudo_network,
        }
    }

    pub fn schedule(&self) -> &TransitSchedule {
        &self.schedule
    }

    pub fn service_day(&self) -> &ServiceDay {
        &self.day
    }

    /// Builds the itinerary for a path from `origin` to `destination`.
    ///
    /// Without a path, or with one that yields no legs, the itinerary is a
    /// single begin-or-end teleport (or nothing if the links coincide).
    pub fn reconstruct(
        &self,
        path: Option<&GraphPath>,
        origin: &LinkId,
        destination: &LinkId,
    ) -> Reconstruction {
        let mut report = ReconstructionReport::default();
        let mut legs = match path {
            Some(path) => LegAssembler::new(self, &mut report).assemble(&path.states),
            None => Vec::new(),
        };

        if legs.is_empty() {
            let legs = teleport(TeleportKind::BeginOrEnd, origin, destination)
                .into_iter()
                .collect();
            return Reconstruction {
                itinerary: Itinerary::from_legs(legs),
                report,
            };
        }

        if self.pseudo_network {
            legs = resolve_split_stops(&self.schedule, &legs);
        }

        let mut padded = Vec::with_capacity(legs.len() + 2);
        if let Some(first) = legs.first() {
            padded.extend(teleport(TeleportKind::BeginOrEnd, origin, first.start_link()));
        }
        let egress = legs
            .last()
            .and_then(|last| teleport(TeleportKind::BeginOrEnd, last.end_link(), destination));
        padded.extend(legs);
        padded.extend(egress);

        let itinerary = Itinerary::from_legs(padded);
        debug!(
            legs = itinerary.len(),
            transfers = itinerary.transfer_count(),
            substituted = report.substituted.len(),
            violations = report.violations.len(),
            "itinerary reconstructed"
        );
        Reconstruction { itinerary, report }
    }
}

fn teleport(kind: TeleportKind, start: &LinkId, end: &LinkId) -> Option<Leg> {
    TeleportLeg::between(kind, start.clone(), end.clone()).map(Leg::from)
}

/// Street edges in one mode, not yet turned into a leg.
struct StreetRun {
    mode: StreetMode,
    links: Vec<LinkId>,
    distance: f64,
    start_elapsed: i64,
    start_clock: i64,
}

/// Where and when the rider boarded.
struct Boarding {
    stop: StopId,
    elapsed: i64,
    clock: i64,
    distance: f64,
}

/// Single pass over the states of one path.
struct LegAssembler<'a> {
    schedule: &'a TransitSchedule,
    day: &'a ServiceDay,
    report: &'a mut ReconstructionReport,
    legs: Vec<Leg>,
    /// Link the itinerary currently ends on.
    cursor: Option<LinkId>,
    /// Elapsed seconds and clock of the last flush, boarding or alighting.
    reset_elapsed: i64,
    reset_clock: i64,
    run: Option<StreetRun>,
    boarding: Option<Boarding>,
}

impl<'a> LegAssembler<'a> {
    fn new(reconstructor: &'a ItineraryReconstructor, report: &'a mut ReconstructionReport) -> Self {
        Self {
            schedule: &reconstructor.schedule,
            day: &reconstructor.day,
            report,
            legs: Vec::new(),
            cursor: None,
            reset_elapsed: 0,
            reset_clock: 0,
            run: None,
            boarding: None,
        }
    }

    fn assemble(mut self, states: &[PathState]) -> Vec<Leg> {
        if let Some(first) = states.first() {
            self.reset_at(first);
        }
        for pair in states.windows(2) {
            let (previous, state) = (&pair[0], &pair[1]);
            match &state.back_edge {
                Some(PathEdge::Street { link, length }) => {
                    self.street_edge(previous, state, link, *length);
                }
                Some(PathEdge::BoardAlight {
                    boarding: true,
                    stop,
                }) => self.board(state, stop),
                Some(PathEdge::BoardAlight {
                    boarding: false,
                    stop,
                }) => self.alight(previous, state, stop),
                Some(PathEdge::OnBoard { distance }) => {
                    if let Some(boarding) = self.boarding.as_mut() {
                        boarding.distance += distance;
                    }
                }
                Some(PathEdge::Other) | None => {}
            }
        }

        if let Some(last) = states.last() {
            self.flush_run(last);
        }
        self.legs
    }

    fn push(&mut self, leg: Leg) {
        self.cursor = Some(leg.end_link().clone());
        self.legs.push(leg);
    }

    fn reset_at(&mut self, state: &PathState) {
        self.reset_elapsed = state.elapsed_secs;
        self.reset_clock = state.clock_millis;
    }

    fn stitch_to(&mut self, link: &LinkId) {
        let Some(cursor) = self.cursor.clone() else {
            return;
        };
        if let Some(leg) = teleport(TeleportKind::TransitStopArea, &cursor, link) {
            self.push(leg);
        }
    }

    fn street_edge(&mut self, previous: &PathState, state: &PathState, link: &LinkId, length: f64) {
        let mode = state.non_transit_mode;
        if self.run.as_ref().is_some_and(|run| run.mode != mode) {
            self.flush_run(previous);
        }

        if self.run.is_none() {
            // mode switch: the new run starts where the last one ended
            let switched_from = match self.legs.last() {
                Some(Leg::Street(last)) if self.cursor.as_ref() == Some(last.end_link()) => {
                    Some(last.end_link().clone())
                }
                _ => None,
            };
            let mut links = Vec::new();
            match switched_from {
                Some(end) => links.push(end),
                None => self.stitch_to(link),
            }
            self.run = Some(StreetRun {
                mode,
                links,
                distance: 0.0,
                start_elapsed: self.reset_elapsed,
                start_clock: self.reset_clock,
            });
        }

        if let Some(run) = self.run.as_mut() {
            if run.links.last() != Some(link) {
                run.links.push(link.clone());
            }
            run.distance += length;
        }
    }

    /// Ends the pending street run at `end`, which becomes the new reset
    /// point.
    fn flush_run(&mut self, end: &PathState) {
        self.reset_at(end);
        let Some(run) = self.run.take() else {
            return;
        };
        let departure = self.day.time_at(run.start_clock);
        match StreetLeg::new(
            run.mode,
            run.links,
            end.elapsed_secs - run.start_elapsed,
            run.distance,
            departure,
        ) {
            Ok(leg) => self.push(leg.into()),
            Err(e) => warn!(error = %e, "dropping street leg"),
        }
    }

    fn board(&mut self, state: &PathState, stop: &StopId) {
        self.flush_run(state);
        let link = stop_link(self.schedule, stop);
        self.stitch_to(&link);
        if self.cursor.is_none() {
            self.cursor = Some(link);
        }
        self.boarding = Some(Boarding {
            stop: stop.clone(),
            elapsed: state.elapsed_secs,
            clock: state.clock_millis,
            distance: 0.0,
        });
    }

    fn alight(&mut self, previous: &PathState, state: &PathState, stop: &StopId) {
        self.reset_at(state);
        let Some(boarding) = self.boarding.take() else {
            warn!(stop = %stop, "alighting without boarding");
            return;
        };
        let Some(trip) = state.back_trip.as_ref().or(previous.back_trip.as_ref()) else {
            warn!(stop = %stop, "alighting without a trip");
            self.cursor = Some(stop_link(self.schedule, stop));
            return;
        };

        let access = StopAccess::new(
            boarding.stop.clone(),
            stop_link(self.schedule, &boarding.stop),
        );
        let egress = StopAccess::new(stop.clone(), stop_link(self.schedule, stop));

        let route = self
            .schedule
            .line(&trip.line)
            .and_then(|line| line.route_serving_trip(&trip.trip));
        if let Some(route) = route {
            let leg = TransitLeg::new(
                trip.line.clone(),
                route.id.clone(),
                access,
                egress.clone(),
                state.elapsed_secs - boarding.elapsed,
                boarding.distance,
                self.day.time_at(boarding.clock),
            );
            match leg {
                Ok(leg) => self.push(leg.into()),
                Err(e) => {
                    warn!(trip = %trip.trip, error = %e, "dropping transit leg");
                    self.cursor = Some(egress.link);
                }
            }
            return;
        }

        let gap = ScheduleGap {
            trip: trip.trip.clone(),
            line: trip.line.clone(),
            alight_time: self.day.time_at(state.clock_millis),
        };
        if self.day.is_beyond_horizon(state.clock_millis) {
            info!(
                trip = %gap.trip,
                line = %gap.line,
                alight_time = %gap.alight_time,
                "departure after schedule horizon, teleporting"
            );
            self.report.substituted.push(gap);
            match teleport(TeleportKind::MissingDeparture, &access.link, &egress.link) {
                Some(leg) => self.push(leg),
                None => self.cursor = Some(egress.link),
            }
        } else {
            warn!(
                trip = %gap.trip,
                line = %gap.line,
                alight_time = %gap.alight_time,
                "no route in schedule for trip"
            );
            self.report.violations.push(gap);
            self.cursor = Some(egress.link);
        }
    }
}
