//! Request orchestration.
//!
//! A [`Router`] turns one routing request into search parameters, asks the
//! path search for candidate paths, picks one and reconstructs its
//! itinerary. It never fails: search errors and empty results fall back to
//! a direct teleport.

use chrono::DateTime;
use chrono_tz::Tz;
use geo_types::Coord;
use rand::Rng;
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::domain::LinkId;
use crate::graph::CoordinateTransform;

use super::path::GraphPath;
use super::profile::ParameterProfile;
use super::reconstruct::{ItineraryReconstructor, Reconstruction};
use super::stats::{RoutingStats, RoutingStatsSnapshot};

/// Extra cost of boarding when arriving on foot, in seconds.
pub const WALK_BOARD_COST_SECS: i64 = 180;

/// Extra cost of boarding when arriving by bike, in seconds.
pub const BIKE_BOARD_COST_SECS: i64 = 360;

/// Error from the external path search.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SearchError {
    /// The search could not place the origin or destination on the graph
    #[error("location not found: {0}")]
    LocationNotFound(String),

    /// The search gave up
    #[error("path search failed: {0}")]
    Failed(String),
}

/// Modes the search may use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ModeSet {
    pub transit: bool,
    pub walk: bool,
    pub bicycle: bool,
}

impl ModeSet {
    /// Transit plus the street modes of a profile, or both street modes
    /// without one.
    pub fn for_profile(profile: Option<ParameterProfile>) -> Self {
        match profile {
            Some(p) => Self {
                transit: true,
                walk: p.walk_allowed(),
                bicycle: p.bike_allowed(),
            },
            None => Self {
                transit: true,
                walk: true,
                bicycle: true,
            },
        }
    }
}

/// What the search optimizes for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum OptimizeType {
    /// Shortest travel time.
    Quick,
}

/// Parameters of one path search.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchParameters {
    pub modes: ModeSet,
    pub walk_board_cost_secs: i64,
    pub bike_board_cost_secs: i64,
    pub optimize: OptimizeType,
    /// Metres; unlimited by default.
    pub max_walk_distance: f64,
    pub departure: DateTime<Tz>,
    /// Origin in the search's coordinate system.
    pub from: Coord<f64>,
    /// Destination in the search's coordinate system.
    pub to: Coord<f64>,
    pub num_itineraries: usize,
}

/// The shortest-path search the router delegates to.
pub trait PathSearch {
    /// Returns up to `params.num_itineraries` paths, best first.
    fn search(&self, params: &SearchParameters) -> Result<Vec<GraphPath>, SearchError>;
}

/// Options that change how requests are routed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RouterOptions {
    /// Pick a random parameter profile per request.
    pub random_profile: bool,
    /// Pick one of this many best paths at random.
    pub alternatives: usize,
    /// Itineraries run on a pseudo network with split stops.
    pub pseudo_network: bool,
}

impl Default for RouterOptions {
    fn default() -> Self {
        Self {
            random_profile: false,
            alternatives: 1,
            pseudo_network: false,
        }
    }
}

/// One routing request, in network coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteRequest {
    pub from: Coord<f64>,
    pub to: Coord<f64>,
    pub origin_link: LinkId,
    pub destination_link: LinkId,
    /// Seconds after midnight of the simulated day.
    pub departure_secs: i64,
}

/// Routes requests through a [`PathSearch`] and rebuilds itineraries.
///
/// Takes `&self` everywhere, so one router can serve concurrent requests.
pub struct Router<S, T> {
    search: S,
    transform: T,
    reconstructor: ItineraryReconstructor,
    options: RouterOptions,
    stats: RoutingStats,
}

impl<S, T> Router<S, T>
where
    S: PathSearch,
    T: CoordinateTransform,
{
    /// `transform` maps network coordinates into the search's system.
    pub fn new(
        search: S,
        transform: T,
        reconstructor: ItineraryReconstructor,
        options: RouterOptions,
    ) -> Self {
        Self {
            search,
            transform,
            reconstructor,
            options,
            stats: RoutingStats::new(),
        }
    }

    pub fn options(&self) -> &RouterOptions {
        &self.options
    }

    pub fn reconstructor(&self) -> &ItineraryReconstructor {
        &self.reconstructor
    }

    pub fn stats(&self) -> RoutingStatsSnapshot {
        self.stats.snapshot()
    }

    /// Routes a request with the thread-local random generator.
    pub fn route(&self, request: &RouteRequest) -> Reconstruction {
        self.route_with_rng(request, &mut rand::rng())
    }

    /// Routes a request, drawing profile and alternative from `rng`.
    pub fn route_with_rng<R: Rng>(&self, request: &RouteRequest, rng: &mut R) -> Reconstruction {
        self.stats.record_request();

        let profile = if self.options.random_profile {
            ParameterProfile::ALL.choose(&mut *rng).copied()
        } else {
            None
        };
        let alternative = if self.options.alternatives > 1 {
            rng.random_range(0..self.options.alternatives)
        } else {
            0
        };

        let params = self.search_parameters(request, profile, alternative);
        debug!(
            profile = ?profile,
            alternative,
            departure = %params.departure,
            "searching paths"
        );

        let path = match self.search.search(&params) {
            Ok(mut paths) if !paths.is_empty() => {
                let index = alternative.min(paths.len() - 1);
                Some(paths.swap_remove(index))
            }
            Ok(_) => {
                info!(
                    origin = %request.origin_link,
                    destination = %request.destination_link,
                    "no path found"
                );
                self.stats.record_no_path();
                None
            }
            Err(e) => {
                info!(
                    origin = %request.origin_link,
                    destination = %request.destination_link,
                    error = %e,
                    "path search failed"
                );
                self.stats.record_search_error();
                self.stats.record_no_path();
                None
            }
        };

        let reconstruction = self.reconstructor.reconstruct(
            path.as_ref(),
            &request.origin_link,
            &request.destination_link,
        );
        self.stats.record_gaps(
            reconstruction.report.substituted.len(),
            reconstruction.report.violations.len(),
        );
        reconstruction
    }

    /// Search parameters for a request with the chosen profile and
    /// alternative index.
    pub fn search_parameters(
        &self,
        request: &RouteRequest,
        profile: Option<ParameterProfile>,
        alternative: usize,
    ) -> SearchParameters {
        SearchParameters {
            modes: ModeSet::for_profile(profile),
            walk_board_cost_secs: WALK_BOARD_COST_SECS,
            bike_board_cost_secs: BIKE_BOARD_COST_SECS,
            optimize: OptimizeType::Quick,
            max_walk_distance: f64::MAX,
            departure: self
                .reconstructor
                .service_day()
                .date_time_at(request.departure_secs),
            from: self.transform.transform(request.from),
            to: self.transform.transform(request.to),
            num_itineraries: alternative + 1,
        }
    }
}
