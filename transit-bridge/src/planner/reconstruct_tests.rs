//! Scenario tests for itinerary reconstruction and routing.

use std::sync::{Arc, Mutex};

use geo_types::Coord;
use proptest::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;

use super::*;
use crate::calendar::{CalendarFilter, ServiceDay};
use crate::domain::{
    DayOffset, LineId, LinkId, RouteId, StopId, StreetMode, TeleportKind, TransitMode, TripId,
};
use crate::graph::{GraphBuilder, Identity, PatternSpec};
use crate::schedule::{ScheduleExtractor, TransitSchedule};

const T1_DEPARTURE: i64 = 8 * 3600;
const U1_DEPARTURE: i64 = 8 * 3600 + 1200;
const D1_DEPARTURE: i64 = 9 * 3600;
/// Half past midnight on the day after the simulated day.
const W1_DEPARTURE: i64 = 1800;
/// Ten past midnight, counted from the start of the day before.
const N1_DEPARTURE: i64 = 86_400 + 600;

fn day() -> ServiceDay {
    ServiceDay::parse("2024-05-02", "UTC").unwrap()
}

/// Clock of a time on the simulated day, in milliseconds.
fn clock(secs: i64) -> i64 {
    day().day_start_millis() + secs * 1000
}

fn link(id: &str) -> LinkId {
    LinkId::new(id)
}

/// Bus L1 runs A to B (trip T1, 900 s), tram L2 runs B to C (trip U1),
/// bus L3 runs C to B (trip V1) and bus L5 runs A-B-C (trip D1).
///
/// L1 also has an early trip W1 of the following day and a late trip N1 of
/// the previous day, with T1's offsets.
fn schedule(pseudo: bool) -> Arc<TransitSchedule> {
    let mut b = GraphBuilder::new();
    b.transit_stop("A", 0.0, 0.0).unwrap();
    b.transit_stop("B", 1000.0, 0.0).unwrap();
    b.transit_stop("C", 2000.0, 0.0).unwrap();
    b.pattern(PatternSpec::new("P1", "L1", TransitMode::Bus, &["A", "B"]))
        .unwrap();
    b.pattern(PatternSpec::new("P2", "L2", TransitMode::Tram, &["B", "C"]))
        .unwrap();
    b.pattern(PatternSpec::new("P3", "L3", TransitMode::Bus, &["C", "B"]))
        .unwrap();
    b.pattern(PatternSpec::new("P5", "L5", TransitMode::Bus, &["A", "B", "C"]))
        .unwrap();
    let t1 = [T1_DEPARTURE, T1_DEPARTURE + 900];
    let u1 = [U1_DEPARTURE, U1_DEPARTURE + 600];
    let v1 = [T1_DEPARTURE, T1_DEPARTURE + 600];
    b.trip("P1", "T1", "wk", &t1, &t1).unwrap();
    b.trip("P2", "U1", "wk", &u1, &u1).unwrap();
    b.trip("P3", "V1", "wk", &v1, &v1).unwrap();
    let d1 = [D1_DEPARTURE, D1_DEPARTURE + 300, D1_DEPARTURE + 900];
    b.trip("P5", "D1", "wk", &d1, &d1).unwrap();
    let w1 = [W1_DEPARTURE, W1_DEPARTURE + 900];
    let n1 = [N1_DEPARTURE, N1_DEPARTURE + 900];
    b.trip("P1", "W1", "fri", &w1, &w1).unwrap();
    b.trip("P1", "N1", "thu", &n1, &n1).unwrap();
    b.service_on("2024-05-01".parse().unwrap(), "thu");
    b.service_on("2024-05-02".parse().unwrap(), "wk");
    b.service_on("2024-05-03".parse().unwrap(), "fri");
    let graph = b.build().unwrap();

    let active = CalendarFilter::new(day(), 4 * 3600).active_services(&graph);
    let extraction = ScheduleExtractor::new(&graph, Identity, active, pseudo)
        .run()
        .unwrap();
    Arc::new(extraction.schedule)
}

fn reconstructor(pseudo: bool) -> ItineraryReconstructor {
    ItineraryReconstructor::new(schedule(pseudo), day(), pseudo)
}

/// Rides T1 from A to B, starting at A at its departure time.
fn direct_path() -> GraphPath {
    PathBuilder::new(clock(T1_DEPARTURE), StreetMode::Walk)
        .board("A", "T1", "L1", 0)
        .ride(1000.0, 900)
        .alight("B", 0)
        .build()
}

#[test]
fn direct_ride_is_padded_with_teleports() {
    let (o, d) = (link("o"), link("d"));
    let result = reconstructor(false).reconstruct(Some(&direct_path()), &o, &d);
    let itinerary = &result.itinerary;

    assert_eq!(
        itinerary.mode_tags(),
        vec!["teleport_begin_or_end", "pt", "teleport_begin_or_end"]
    );
    itinerary.check_spans(&o, &d).unwrap();
    assert!(result.report.is_clean());

    let ride = itinerary.legs()[1].as_transit().unwrap();
    assert_eq!(ride.line(), &LineId::new("L1"));
    assert_eq!(ride.route(), &RouteId::new("T1"));
    assert_eq!(ride.access().stop, StopId::new("A"));
    assert_eq!(ride.access().link, link("A"));
    assert_eq!(ride.egress().link, link("B"));
    assert_eq!(ride.departure_time().seconds(), T1_DEPARTURE);
    assert_eq!(ride.travel_time().num_seconds(), 900);
    assert_eq!(ride.distance(), 1000.0);
}

#[test]
fn walks_are_stitched_to_stops() {
    let path = PathBuilder::new(clock(T1_DEPARTURE - 120), StreetMode::Walk)
        .walk("s1", 100.0, 60)
        .walk("s2", 100.0, 60)
        .other(0)
        .board("A", "T1", "L1", 0)
        .ride(1000.0, 900)
        .alight("B", 0)
        .other(0)
        .walk("s3", 50.0, 40)
        .build();
    let (o, d) = (link("s1"), link("s3"));
    let itinerary = reconstructor(false)
        .reconstruct(Some(&path), &o, &d)
        .itinerary;

    assert_eq!(
        itinerary.mode_tags(),
        vec![
            "walk",
            "teleport_transit_stop_area",
            "pt",
            "teleport_transit_stop_area",
            "walk"
        ]
    );
    itinerary.check_spans(&o, &d).unwrap();

    let access = itinerary.legs()[0].as_street().unwrap();
    assert_eq!(access.links(), &[link("s1"), link("s2")]);
    assert_eq!(access.travel_time().num_seconds(), 120);
    assert_eq!(access.distance(), 200.0);
    assert_eq!(access.departure_time().seconds(), T1_DEPARTURE - 120);

    let egress = itinerary.legs()[4].as_street().unwrap();
    assert_eq!(egress.departure_time().seconds(), T1_DEPARTURE + 900);
    assert_eq!(egress.travel_time().num_seconds(), 40);
}

#[test]
fn time_on_other_edges_counts_towards_the_next_walk() {
    let path = PathBuilder::new(clock(T1_DEPARTURE - 70), StreetMode::Walk)
        .other(30)
        .walk("s1", 50.0, 40)
        .board("A", "T1", "L1", 0)
        .ride(1000.0, 900)
        .alight("B", 0)
        .other(30)
        .walk("s3", 50.0, 40)
        .build();
    let (o, d) = (link("s1"), link("s3"));
    let itinerary = reconstructor(false)
        .reconstruct(Some(&path), &o, &d)
        .itinerary;
    itinerary.check_spans(&o, &d).unwrap();

    let access = itinerary.legs()[0].as_street().unwrap();
    assert_eq!(access.travel_time().num_seconds(), 70);
    assert_eq!(access.departure_time().seconds(), T1_DEPARTURE - 70);

    let egress = itinerary.legs()[4].as_street().unwrap();
    assert_eq!(egress.travel_time().num_seconds(), 70);
    assert_eq!(egress.departure_time().seconds(), T1_DEPARTURE + 900);

    assert_eq!(itinerary.travel_time().num_seconds(), path.duration_secs());
}

#[test]
fn direct_ride_over_three_stops() {
    let path = PathBuilder::new(clock(D1_DEPARTURE), StreetMode::Walk)
        .board("A", "D1", "L5", 0)
        .ride(1000.0, 300)
        .ride(1000.0, 600)
        .alight("C", 0)
        .build();
    let (o, d) = (link("o"), link("d"));
    let result = reconstructor(false).reconstruct(Some(&path), &o, &d);
    assert!(result.report.is_clean());
    result.itinerary.check_spans(&o, &d).unwrap();

    let rides: Vec<_> = result.itinerary.transit_legs().collect();
    assert_eq!(rides.len(), 1);
    assert_eq!(rides[0].route(), &RouteId::new("D1"));
    assert_eq!(rides[0].access().link, link("A"));
    assert_eq!(rides[0].egress().link, link("C"));
    assert_eq!(rides[0].travel_time().num_seconds(), 900);
    assert_eq!(rides[0].distance(), 2000.0);
    assert_eq!(rides[0].departure_time().seconds(), D1_DEPARTURE);

    let route = result.itinerary.legs()[1].as_transit().unwrap();
    let offsets: Vec<_> = reconstructor(false)
        .schedule()
        .route(route.line(), route.route())
        .unwrap()
        .stops
        .iter()
        .map(|s| s.departure_offset)
        .collect();
    assert_eq!(offsets, vec![0, 300, 900]);
}

#[test]
fn transfer_between_stops_is_teleported() {
    let path = PathBuilder::new(clock(T1_DEPARTURE), StreetMode::Walk)
        .board("A", "T1", "L1", 0)
        .ride(1000.0, 900)
        .alight("B", 0)
        .other(120)
        .board("C", "V1", "L3", 60)
        .ride(1000.0, 600)
        .alight("B", 0)
        .build();
    let (o, d) = (link("o"), link("d"));
    let result = reconstructor(false).reconstruct(Some(&path), &o, &d);
    let itinerary = &result.itinerary;

    assert_eq!(
        itinerary.mode_tags(),
        vec![
            "teleport_begin_or_end",
            "pt",
            "teleport_transit_stop_area",
            "pt",
            "teleport_begin_or_end"
        ]
    );
    assert_eq!(itinerary.transfer_count(), 1);
    itinerary.check_spans(&o, &d).unwrap();

    let transfer = itinerary.legs()[2].as_teleport().unwrap();
    assert_eq!(transfer.start_link(), &link("B"));
    assert_eq!(transfer.end_link(), &link("C"));
    let second = itinerary.legs()[3].as_transit().unwrap();
    assert_eq!(second.departure_time().seconds(), T1_DEPARTURE + 1080);
}

#[test]
fn following_day_departure_resolves() {
    let path = PathBuilder::new(clock(86_400 + W1_DEPARTURE), StreetMode::Walk)
        .board("A", "W1", "L1", 0)
        .ride(1000.0, 900)
        .alight("B", 0)
        .build();
    let reconstructor = reconstructor(false);
    let result = reconstructor.reconstruct(Some(&path), &link("o"), &link("d"));

    assert!(result.report.is_clean());
    let ride = result.itinerary.legs()[1].as_transit().unwrap();
    assert_eq!(ride.route(), &RouteId::new("T1"));
    assert_eq!(ride.departure_time().seconds(), 86_400 + W1_DEPARTURE);

    let departure = TripId::new("W1").departure_id(DayOffset::Following);
    assert_eq!(departure.as_str(), "W1_1");
    assert!(reconstructor.schedule().route_by_departure_id(&departure).is_some());
}

#[test]
fn previous_day_departure_resolves() {
    let path = PathBuilder::new(clock(N1_DEPARTURE - 86_400), StreetMode::Walk)
        .board("A", "N1", "L1", 0)
        .ride(1000.0, 900)
        .alight("B", 0)
        .build();
    let result = reconstructor(false).reconstruct(Some(&path), &link("o"), &link("d"));

    assert!(result.report.is_clean());
    let ride = result.itinerary.legs()[1].as_transit().unwrap();
    assert_eq!(ride.route(), &RouteId::new("T1"));
    assert_eq!(ride.departure_time().seconds(), 600);
}

#[test]
fn transfer_at_the_same_stop_needs_no_teleport() {
    let path = PathBuilder::new(clock(T1_DEPARTURE), StreetMode::Walk)
        .board("A", "T1", "L1", 0)
        .ride(1000.0, 900)
        .alight("B", 0)
        .board("B", "U1", "L2", 300)
        .ride(1000.0, 600)
        .alight("C", 0)
        .build();
    let (o, d) = (link("o"), link("d"));
    let itinerary = reconstructor(false)
        .reconstruct(Some(&path), &o, &d)
        .itinerary;

    assert_eq!(
        itinerary.mode_tags(),
        vec!["teleport_begin_or_end", "pt", "pt", "teleport_begin_or_end"]
    );
    assert_eq!(itinerary.transfer_count(), 1);
    itinerary.check_spans(&o, &d).unwrap();

    let second = itinerary.legs()[2].as_transit().unwrap();
    assert_eq!(second.route(), &RouteId::new("U1"));
    assert_eq!(second.departure_time().seconds(), U1_DEPARTURE);
}

#[test]
fn ride_past_the_horizon_becomes_a_teleport() {
    let path = PathBuilder::new(clock(86_000), StreetMode::Walk)
        .board("A", "X9", "L1", 0)
        .ride(1000.0, 1000)
        .alight("B", 0)
        .build();
    let (o, d) = (link("o"), link("d"));
    let result = reconstructor(false).reconstruct(Some(&path), &o, &d);

    assert_eq!(
        result.itinerary.mode_tags(),
        vec![
            "teleport_begin_or_end",
            "teleport_missing_departure",
            "teleport_begin_or_end"
        ]
    );
    result.itinerary.check_spans(&o, &d).unwrap();

    let substitute = result.itinerary.legs()[1].as_teleport().unwrap();
    assert_eq!(substitute.kind(), TeleportKind::MissingDeparture);
    assert_eq!(substitute.start_link(), &link("A"));
    assert_eq!(substitute.end_link(), &link("B"));

    assert!(result.report.violations.is_empty());
    assert_eq!(result.report.substituted.len(), 1);
    assert_eq!(result.report.substituted[0].trip.as_str(), "X9");
    assert_eq!(result.report.substituted[0].alight_time.seconds(), 87_000);
}

#[test]
fn unknown_ride_inside_the_horizon_leaves_a_gap() {
    let path = PathBuilder::new(clock(T1_DEPARTURE - 60), StreetMode::Walk)
        .walk("s1", 80.0, 60)
        .board("A", "X9", "L1", 0)
        .ride(1000.0, 900)
        .alight("B", 0)
        .walk("s3", 50.0, 40)
        .build();
    let (o, d) = (link("s1"), link("s3"));
    let result = reconstructor(false).reconstruct(Some(&path), &o, &d);

    assert_eq!(
        result.itinerary.mode_tags(),
        vec![
            "walk",
            "teleport_transit_stop_area",
            "teleport_transit_stop_area",
            "walk"
        ]
    );
    let gaps = result.itinerary.continuity_gaps();
    assert_eq!(gaps.len(), 1);
    assert_eq!(gaps[0].end, link("A"));
    assert_eq!(gaps[0].start, link("B"));

    assert_eq!(result.report.violations.len(), 1);
    assert_eq!(result.report.violations[0].line, LineId::new("L1"));
    assert!(result.report.substituted.is_empty());
}

#[test]
fn ride_on_unknown_line_is_a_violation() {
    let path = PathBuilder::new(clock(T1_DEPARTURE), StreetMode::Walk)
        .board("A", "T1", "L9", 0)
        .ride(1000.0, 900)
        .alight("B", 0)
        .build();
    let result = reconstructor(false).reconstruct(Some(&path), &link("o"), &link("d"));
    assert_eq!(result.report.violations.len(), 1);
}

#[test]
fn no_path_gives_a_direct_teleport() {
    let reconstructor = reconstructor(false);
    let (o, d) = (link("o"), link("d"));

    let result = reconstructor.reconstruct(None, &o, &d);
    assert_eq!(result.itinerary.mode_tags(), vec!["teleport_begin_or_end"]);
    result.itinerary.check_spans(&o, &d).unwrap();

    let empty = GraphPath::default();
    let result = reconstructor.reconstruct(Some(&empty), &o, &d);
    assert_eq!(result.itinerary.len(), 1);

    let result = reconstructor.reconstruct(None, &o, &o);
    assert!(result.itinerary.is_empty());
}

#[test]
fn path_of_only_a_dropped_ride_falls_back_to_teleport() {
    let path = PathBuilder::new(clock(T1_DEPARTURE), StreetMode::Walk)
        .board("A", "X9", "L1", 0)
        .ride(1000.0, 900)
        .alight("B", 0)
        .build();
    let result = reconstructor(false).reconstruct(Some(&path), &link("o"), &link("d"));

    assert_eq!(result.itinerary.mode_tags(), vec!["teleport_begin_or_end"]);
    assert_eq!(result.report.violations.len(), 1);
}

#[test]
fn mode_switch_shares_the_switch_link() {
    let path = PathBuilder::new(clock(3600), StreetMode::Walk)
        .walk("s1", 50.0, 60)
        .bike("s2", 400.0, 90)
        .bike("s3", 400.0, 90)
        .build();
    let (o, d) = (link("s1"), link("s3"));
    let itinerary = reconstructor(false)
        .reconstruct(Some(&path), &o, &d)
        .itinerary;

    assert_eq!(itinerary.mode_tags(), vec!["walk", "bike"]);
    itinerary.check_spans(&o, &d).unwrap();

    let walk = itinerary.legs()[0].as_street().unwrap();
    assert_eq!(walk.travel_time().num_seconds(), 60);

    let bike = itinerary.legs()[1].as_street().unwrap();
    assert_eq!(bike.links(), &[link("s1"), link("s2"), link("s3")]);
    assert_eq!(bike.travel_time().num_seconds(), 180);
    assert_eq!(bike.distance(), 800.0);
    assert_eq!(bike.departure_time().seconds(), 3660);
}

#[test]
fn pseudo_network_moves_legs_to_split_stops() {
    // L1 binds B to the A-B link and L2 starts at B.1, so L3 arriving
    // from C serves B.2
    let path = PathBuilder::new(clock(T1_DEPARTURE), StreetMode::Walk)
        .board("C", "V1", "L3", 0)
        .ride(1000.0, 600)
        .alight("B", 0)
        .walk("s3", 30.0, 20)
        .build();
    let reconstructor = reconstructor(true);
    let (o, d) = (link("o"), link("s3"));
    let itinerary = reconstructor.reconstruct(Some(&path), &o, &d).itinerary;

    assert_eq!(
        itinerary.mode_tags(),
        vec![
            "teleport_begin_or_end",
            "pt",
            "teleport_transit_stop_area",
            "walk"
        ]
    );
    itinerary.check_spans(&o, &d).unwrap();

    let ride = itinerary.legs()[1].as_transit().unwrap();
    assert_eq!(ride.access().stop, StopId::new("C.1"));
    assert_eq!(ride.egress().stop, StopId::new("B.2"));
    let split_link = reconstructor
        .schedule()
        .facility(&StopId::new("B.2"))
        .and_then(|f| f.link.clone())
        .unwrap();
    assert_eq!(ride.egress().link, split_link);
    assert_eq!(itinerary.legs()[2].start_link(), &split_link);
}

#[test]
fn pseudo_pass_keeps_unsplit_legs() {
    let (o, d) = (link("o"), link("d"));
    let plain = reconstructor(true).reconstruct(Some(&direct_path()), &o, &d);

    let ride = plain.itinerary.legs()[1].as_transit().unwrap();
    assert_eq!(ride.access().stop, StopId::new("A"));
    assert_eq!(ride.egress().stop, StopId::new("B"));
    plain.itinerary.check_spans(&o, &d).unwrap();
}

#[derive(Debug, Clone)]
enum Step {
    Walk(usize),
    Bike(usize),
    Other,
    RideT1,
    RideU1,
}

fn step() -> impl Strategy<Value = Step> {
    prop_oneof![
        (0usize..5).prop_map(Step::Walk),
        (0usize..5).prop_map(Step::Bike),
        Just(Step::Other),
        Just(Step::RideT1),
        Just(Step::RideU1),
    ]
}

proptest! {
    /// Any mix of street runs and known rides reconstructs to an itinerary
    /// that joins up from origin to destination.
    #[test]
    fn itineraries_are_continuous(
        steps in prop::collection::vec(step(), 0..12),
        origin in 0usize..5,
        destination in 0usize..5,
    ) {
        let mut builder = PathBuilder::new(clock(6 * 3600), StreetMode::Walk);
        for s in &steps {
            builder = match s {
                Step::Walk(n) => builder.walk(&format!("s{n}"), 10.0, 10),
                Step::Bike(n) => builder.bike(&format!("s{n}"), 10.0, 5),
                Step::Other => builder.other(1),
                Step::RideT1 => builder.board("A", "T1", "L1", 30).ride(1000.0, 900).alight("B", 0),
                Step::RideU1 => builder.board("B", "U1", "L2", 30).ride(1000.0, 600).alight("C", 0),
            };
        }
        let path = builder.build();
        let (o, d) = (link(&format!("s{origin}")), link(&format!("s{destination}")));

        for pseudo in [false, true] {
            let result = reconstructor(pseudo).reconstruct(Some(&path), &o, &d);
            prop_assert!(result.report.is_clean());
            prop_assert!(
                result.itinerary.check_spans(&o, &d).is_ok(),
                "{:?}",
                result.itinerary.mode_tags()
            );
        }
    }
}

/// First-stop departure of a two-stop trip exported for `day`, counted in
/// the trip's own service day and satisfying the export rule for that day.
fn first_departure(day: DayOffset, offset: i64) -> i64 {
    match day {
        DayOffset::Current => 6 * 3600 + offset,
        DayOffset::Following => offset,
        DayOffset::Previous => 86_400 + 1 + offset,
    }
}

proptest! {
    /// A trip exported for any of the three days is found again by its
    /// suffixed departure id when its ride is reconstructed.
    #[test]
    fn departures_resolve_for_every_exported_day(
        export_day in prop::sample::select(DayOffset::MATCH_ORDER.to_vec()),
        offset in 0i64..4 * 3600,
        trip in "[A-Za-z0-9]{1,8}",
    ) {
        let service_date = match export_day {
            DayOffset::Previous => "2024-05-01",
            DayOffset::Current => "2024-05-02",
            DayOffset::Following => "2024-05-03",
        };
        let first = first_departure(export_day, offset);
        let times = [first, first + 600];

        let mut b = GraphBuilder::new();
        b.transit_stop("A", 0.0, 0.0).unwrap();
        b.transit_stop("B", 1000.0, 0.0).unwrap();
        b.pattern(PatternSpec::new("P1", "L1", TransitMode::Bus, &["A", "B"]))
            .unwrap();
        b.trip("P1", &trip, "svc", &times, &times).unwrap();
        b.service_on(service_date.parse().unwrap(), "svc");
        let graph = b.build().unwrap();
        let active = CalendarFilter::new(day(), 4 * 3600).active_services(&graph);
        let extraction = ScheduleExtractor::new(&graph, Identity, active, false)
            .run()
            .unwrap();
        let schedule = Arc::new(extraction.schedule);

        let departure = TripId::new(trip.as_str()).departure_id(export_day);
        prop_assert!(schedule.route_by_departure_id(&departure).is_some());

        let start = first + export_day.shift_seconds();
        let path = PathBuilder::new(clock(start), StreetMode::Walk)
            .board("A", &trip, "L1", 0)
            .ride(1000.0, 600)
            .alight("B", 0)
            .build();
        let result = ItineraryReconstructor::new(schedule, day(), false)
            .reconstruct(Some(&path), &link("o"), &link("d"));

        prop_assert!(result.report.is_clean());
        let rides: Vec<_> = result.itinerary.transit_legs().collect();
        prop_assert_eq!(rides.len(), 1);
        prop_assert_eq!(rides[0].route(), &RouteId::new(trip.as_str()));
        prop_assert_eq!(rides[0].departure_time().seconds(), start);
    }
}

/// Search returning canned paths and recording what it was asked.
struct MockSearch {
    result: Result<Vec<GraphPath>, SearchError>,
    calls: Arc<Mutex<Vec<SearchParameters>>>,
}

impl PathSearch for MockSearch {
    fn search(&self, params: &SearchParameters) -> Result<Vec<GraphPath>, SearchError> {
        self.calls.lock().unwrap().push(params.clone());
        self.result.clone()
    }
}

type Calls = Arc<Mutex<Vec<SearchParameters>>>;

fn router(
    result: Result<Vec<GraphPath>, SearchError>,
    options: RouterOptions,
) -> (Router<MockSearch, Identity>, Calls) {
    let calls = Calls::default();
    let search = MockSearch {
        result,
        calls: Arc::clone(&calls),
    };
    let router = Router::new(search, Identity, reconstructor(options.pseudo_network), options);
    (router, calls)
}

fn request() -> RouteRequest {
    RouteRequest {
        from: Coord { x: 0.0, y: 0.0 },
        to: Coord { x: 1000.0, y: 0.0 },
        origin_link: link("o"),
        destination_link: link("d"),
        departure_secs: T1_DEPARTURE - 300,
    }
}

#[test]
fn search_parameters_follow_the_request() {
    let (router, calls) = router(Ok(vec![direct_path()]), RouterOptions::default());
    let result = router.route(&request());
    assert_eq!(result.itinerary.transit_legs().count(), 1);

    let calls = calls.lock().unwrap();
    let params = &calls[0];
    assert_eq!(params.modes, ModeSet::for_profile(None));
    assert_eq!(params.walk_board_cost_secs, 180);
    assert_eq!(params.bike_board_cost_secs, 360);
    assert_eq!(params.optimize, OptimizeType::Quick);
    assert_eq!(params.max_walk_distance, f64::MAX);
    assert_eq!(params.num_itineraries, 1);
    assert_eq!(
        params.departure.timestamp_millis(),
        clock(T1_DEPARTURE - 300)
    );
    assert_eq!(params.to, Coord { x: 1000.0, y: 0.0 });
}

#[test]
fn search_coordinates_are_transformed() {
    let calls = Calls::default();
    let search = MockSearch {
        result: Ok(vec![]),
        calls: Arc::clone(&calls),
    };
    let to_search = |c: Coord<f64>| Coord { x: c.x / 1000.0, y: c.y / 1000.0 };
    let router = Router::new(search, to_search, reconstructor(false), RouterOptions::default());
    router.route(&request());

    assert_eq!(calls.lock().unwrap()[0].to, Coord { x: 1.0, y: 0.0 });
}

#[test]
fn failed_search_degrades_to_teleport() {
    let (router, _) = router(
        Err(SearchError::Failed("graph not ready".to_string())),
        RouterOptions::default(),
    );
    let result = router.route(&request());

    assert_eq!(result.itinerary.mode_tags(), vec!["teleport_begin_or_end"]);
    let stats = router.stats();
    assert_eq!(stats.requests, 1);
    assert_eq!(stats.search_errors, 1);
    assert_eq!(stats.no_path, 1);
}

#[test]
fn empty_search_degrades_to_teleport() {
    let (router, _) = router(Ok(vec![]), RouterOptions::default());
    let result = router.route(&request());

    assert_eq!(result.itinerary.len(), 1);
    assert_eq!(router.stats().no_path, 1);
    assert_eq!(router.stats().search_errors, 0);
}

#[test]
fn random_alternative_is_clamped_to_paths_found() {
    let walk_only = PathBuilder::new(clock(T1_DEPARTURE), StreetMode::Walk)
        .walk("o", 10.0, 10)
        .walk("d", 10.0, 10)
        .build();
    let options = RouterOptions {
        alternatives: 4,
        ..RouterOptions::default()
    };
    let (router, calls) = router(Ok(vec![direct_path(), walk_only]), options);
    let mut rng = StdRng::seed_from_u64(7);

    for _ in 0..20 {
        let result = router.route_with_rng(&request(), &mut rng);
        let asked = calls.lock().unwrap().last().unwrap().num_itineraries;
        assert!((1..=4).contains(&asked));

        let expected = if asked == 1 {
            vec!["teleport_begin_or_end", "pt", "teleport_begin_or_end"]
        } else {
            vec!["walk"]
        };
        assert_eq!(result.itinerary.mode_tags(), expected);
    }
}

#[test]
fn random_profile_allows_one_street_mode() {
    let options = RouterOptions {
        random_profile: true,
        ..RouterOptions::default()
    };
    let (router, calls) = router(Ok(vec![]), options);
    let mut rng = StdRng::seed_from_u64(42);

    for _ in 0..20 {
        router.route_with_rng(&request(), &mut rng);
    }
    let calls = calls.lock().unwrap();
    assert!(calls.iter().all(|p| p.modes.transit));
    assert!(calls.iter().all(|p| p.modes.walk != p.modes.bicycle));
    assert!(calls.iter().all(|p| p.num_itineraries == 1));
}

#[test]
fn schedule_gaps_are_counted() {
    let late = PathBuilder::new(clock(86_000), StreetMode::Walk)
        .board("A", "X9", "L1", 0)
        .ride(1000.0, 1000)
        .alight("B", 0)
        .build();
    let (router, _) = router(Ok(vec![late]), RouterOptions::default());
    let result = router.route(&request());

    assert_eq!(result.report.substituted.len(), 1);
    assert_eq!(router.stats().substituted_gaps, 1);
    assert_eq!(router.stats().integrity_violations, 0);
}

#[test]
fn itinerary_serializes_with_mode_tags() {
    let result = reconstructor(false).reconstruct(Some(&direct_path()), &link("o"), &link("d"));
    let json = serde_json::to_value(&result.itinerary).unwrap();
    assert_eq!(json["legs"][1]["type"], "transit");
    assert_eq!(json["legs"][1]["line"], "L1");
}
