//! Pseudo network for transit routes.
//!
//! Instead of using the graph's hops, every route gets straight links from
//! stop to stop. A stop served from different directions needs a different
//! link for each, and a facility sits on a single link, so such stops are
//! split into copies `<id>.1`, `<id>.2`, ... one per extra link.

use std::collections::HashMap;

use tracing::debug;

use crate::domain::{LineId, LinkId, NodeId, RouteId, StopId, TransitMode};

use super::ScheduleError;
use super::network::{Link, Network, Node};
use super::store::{NetworkRoute, RouteStop, ScheduleBuilder, StopFacility};

/// Prefix of pseudo network node and link ids.
pub const PSEUDO_ID_PREFIX: &str = "pt_";

/// Length of the loop link at a route's first stop, in metres.
pub const LOOP_LINK_LENGTH: f64 = 50.0;

/// Free speed of pseudo links: 30 km/h.
pub const PSEUDO_LINK_FREESPEED: f64 = 30.0 / 3.6;

pub const PSEUDO_LINK_CAPACITY: f64 = 100_000.0;

/// Builds pseudo links for every route and splits facilities as needed.
///
/// Rewrites each route's stops to the facility actually served and its
/// network route to the served links. Returns the number of split
/// facilities created.
pub fn create_pseudo_network(
    network: &mut Network,
    schedule: &mut ScheduleBuilder,
) -> Result<usize, ScheduleError> {
    let mut builder = PseudoNetworkBuilder {
        network,
        schedule,
        nodes: HashMap::new(),
        links: HashMap::new(),
        splits: HashMap::new(),
        split_counts: HashMap::new(),
        next_link: 0,
    };

    let routes: Vec<(LineId, RouteId)> = builder
        .schedule
        .schedule()
        .lines()
        .flat_map(|line| {
            line.routes()
                .iter()
                .map(move |route| (line.id.clone(), route.id.clone()))
        })
        .collect();

    for (line, route) in &routes {
        builder.rebuild_route(line, route)?;
    }

    let split_count = builder.split_counts.values().map(|&n| n as usize).sum();
    debug!(
        routes = routes.len(),
        links = builder.links.len(),
        split_facilities = split_count,
        "pseudo network created"
    );
    Ok(split_count)
}

struct PseudoNetworkBuilder<'a> {
    network: &'a mut Network,
    schedule: &'a mut ScheduleBuilder,
    /// Node of each source facility.
    nodes: HashMap<StopId, NodeId>,
    /// Link between each pair of nodes.
    links: HashMap<(NodeId, NodeId), LinkId>,
    /// Split copy of a facility bound to a link.
    splits: HashMap<(StopId, LinkId), StopId>,
    split_counts: HashMap<StopId, u32>,
    next_link: u64,
}

impl PseudoNetworkBuilder<'_> {
    fn rebuild_route(&mut self, line: &LineId, route: &RouteId) -> Result<(), ScheduleError> {
        let (stops, mode) = match self.schedule.schedule().route(line, route) {
            Some(r) => (r.stops.clone(), r.mode),
            None => {
                return Err(ScheduleError::UnknownRoute {
                    line: line.clone(),
                    route: route.clone(),
                });
            }
        };

        let mut previous: Option<NodeId> = None;
        let mut served_links = Vec::with_capacity(stops.len());
        let mut served_stops = Vec::with_capacity(stops.len());

        for route_stop in stops {
            let node = self.node_for(&route_stop.stop)?;
            let from = previous.take().unwrap_or_else(|| node.clone());
            let link = self.link_between(from, node.clone(), mode)?;
            let stop = self.bind_facility(&route_stop.stop, &link)?;

            served_stops.push(RouteStop {
                stop,
                ..route_stop
            });
            served_links.push(link);
            previous = Some(node);
        }

        if let Some(transit_route) = self.schedule.route_mut(line, route) {
            transit_route.stops = served_stops;
            if let Some(network_route) = NetworkRoute::from_links(served_links) {
                transit_route.network_route = network_route;
            }
        }
        Ok(())
    }

    fn node_for(&mut self, stop: &StopId) -> Result<NodeId, ScheduleError> {
        if let Some(node) = self.nodes.get(stop) {
            return Ok(node.clone());
        }
        let coord = self
            .schedule
            .schedule()
            .facility(stop)
            .ok_or_else(|| ScheduleError::UnknownFacility(stop.clone()))?
            .coord;
        let id = NodeId::new(format!("{PSEUDO_ID_PREFIX}{stop}"));
        self.network.add_node(Node {
            id: id.clone(),
            coord,
        })?;
        self.nodes.insert(stop.clone(), id.clone());
        Ok(id)
    }

    fn link_between(
        &mut self,
        from: NodeId,
        to: NodeId,
        mode: TransitMode,
    ) -> Result<LinkId, ScheduleError> {
        let key = (from, to);
        if let Some(id) = self.links.get(&key) {
            if let Some(link) = self.network.link_mut(id) {
                link.modes.insert(mode.as_str().to_string());
            }
            return Ok(id.clone());
        }

        let (from, to) = &key;
        let length = if from == to {
            LOOP_LINK_LENGTH
        } else {
            match (self.network.node(from), self.network.node(to)) {
                (Some(a), Some(b)) => {
                    let d = a.coord - b.coord;
                    d.x.hypot(d.y)
                }
                _ => LOOP_LINK_LENGTH,
            }
        };

        self.next_link += 1;
        let id = LinkId::new(format!("{PSEUDO_ID_PREFIX}{}", self.next_link));
        self.network.add_link(
            Link::new(id.clone(), from.clone(), to.clone())
                .with_length(length)
                .with_freespeed(PSEUDO_LINK_FREESPEED)
                .with_capacity(PSEUDO_LINK_CAPACITY)
                .with_modes([mode.as_str()]),
        )?;
        self.links.insert(key, id.clone());
        Ok(id)
    }

    /// Returns the facility serving `stop` on `link`, splitting if the
    /// facility is already bound to another link.
    fn bind_facility(&mut self, stop: &StopId, link: &LinkId) -> Result<StopId, ScheduleError> {
        let facility = self
            .schedule
            .facility_mut(stop)
            .ok_or_else(|| ScheduleError::UnknownFacility(stop.clone()))?;

        match &facility.link {
            None => {
                facility.link = Some(link.clone());
                return Ok(stop.clone());
            }
            Some(bound) if bound == link => return Ok(stop.clone()),
            Some(_) => {}
        }
        let coord = facility.coord;

        let key = (stop.clone(), link.clone());
        if let Some(split) = self.splits.get(&key) {
            return Ok(split.clone());
        }

        let count = self.split_counts.entry(stop.clone()).or_insert(0);
        *count += 1;
        let split = stop.split(*count);
        self.schedule.add_facility(StopFacility {
            id: split.clone(),
            coord,
            link: Some(link.clone()),
        })?;
        self.splits.insert(key, split.clone());
        Ok(split)
    }
}
