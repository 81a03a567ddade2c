//! Split-stop resolution for itineraries on a pseudo network.
//!
//! The path search only knows the original stop ids. On a pseudo network a
//! route may serve a split copy `<id>.<n>` instead, so transit legs are moved
//! onto the facility their route really uses.

use tracing::warn;

use crate::domain::{Leg, LinkId, StopAccess, StopId, TeleportKind, TeleportLeg};
use crate::schedule::{TransitRoute, TransitSchedule};

/// The link a rider reaches a stop on.
///
/// Falls back to the link named after the stop if the facility has none.
pub fn stop_link(schedule: &TransitSchedule, stop: &StopId) -> LinkId {
    schedule
        .facility(stop)
        .and_then(|f| f.link.clone())
        .unwrap_or_else(|| LinkId::from(stop))
}

/// Moves every transit leg onto the split stops its route serves.
///
/// Stop-area teleports next to a moved leg are retargeted to the new links,
/// even if that leaves them zero-length. Where two legs joined before and no
/// longer do, a stop-area teleport is inserted. Gaps that were already there
/// are left alone.
pub fn resolve_split_stops(schedule: &TransitSchedule, legs: &[Leg]) -> Vec<Leg> {
    let connected: Vec<bool> = legs
        .windows(2)
        .map(|pair| pair[0].end_link() == pair[1].start_link())
        .collect();
    let mut resolved = legs.to_vec();

    for i in 0..resolved.len() {
        let Some(transit) = resolved[i].as_transit() else {
            continue;
        };
        let Some(route) = schedule.route(transit.line(), transit.route()) else {
            warn!(line = %transit.line(), route = %transit.route(), "transit leg on unknown route");
            continue;
        };
        let access = served_stop(schedule, route, transit.access());
        let egress = served_stop(schedule, route, transit.egress());
        if &access == transit.access() && &egress == transit.egress() {
            continue;
        }

        let moved = transit.with_stops(access.clone(), egress.clone());
        resolved[i] = moved.into();
        if i > 0 {
            retarget(&mut resolved[i - 1], None, Some(&access.link));
        }
        if let Some(next) = resolved.get_mut(i + 1) {
            retarget(next, Some(&egress.link), None);
        }
    }

    let mut stitched: Vec<Leg> = Vec::with_capacity(resolved.len());
    for (i, leg) in resolved.into_iter().enumerate() {
        if i > 0 && connected[i - 1] {
            if let Some(previous) = stitched.last() {
                let teleport = TeleportLeg::between(
                    TeleportKind::TransitStopArea,
                    previous.end_link().clone(),
                    leg.start_link().clone(),
                );
                if let Some(teleport) = teleport {
                    stitched.push(teleport.into());
                }
            }
        }
        stitched.push(leg);
    }
    stitched
}

/// The stop a route serves for a stop id: the id itself or the first of its
/// split copies `.1`, `.2`, ... the route uses.
fn served_stop(schedule: &TransitSchedule, route: &TransitRoute, access: &StopAccess) -> StopAccess {
    let base = &access.stop;
    let candidates = std::iter::once(base.clone()).chain(
        (1..)
            .map(|n| base.split(n))
            .take_while(|id| schedule.facility(id).is_some()),
    );

    for candidate in candidates {
        if route.serves_stop(&candidate) {
            let link = stop_link(schedule, &candidate);
            return StopAccess::new(candidate, link);
        }
    }

    warn!(stop = %base, route = %route.id, "route serves no copy of stop");
    access.clone()
}

fn retarget(leg: &mut Leg, start: Option<&LinkId>, end: Option<&LinkId>) {
    let Leg::Teleport(teleport) = leg else {
        return;
    };
    if teleport.kind() != TeleportKind::TransitStopArea {
        return;
    }
    if let Some(start) = start {
        *teleport = teleport.with_start_link(start.clone());
    }
    if let Some(end) = end {
        *teleport = teleport.with_end_link(end.clone());
    }
}
