//! Schedule and network building errors.

use crate::domain::{DepartureId, LineId, LinkId, NodeId, RouteId, StopId, VehicleTypeId};

/// Error adding an entity to the network or schedule.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ScheduleError {
    #[error("duplicate node: {0}")]
    DuplicateNode(NodeId),

    #[error("duplicate link: {0}")]
    DuplicateLink(LinkId),

    /// A link refers to a node that isn't in the network
    #[error("link {link} refers to unknown node {node}")]
    UnknownNode { link: LinkId, node: NodeId },

    #[error("duplicate stop facility: {0}")]
    DuplicateFacility(StopId),

    #[error("unknown stop facility: {0}")]
    UnknownFacility(StopId),

    #[error("duplicate line: {0}")]
    DuplicateLine(LineId),

    #[error("unknown line: {0}")]
    UnknownLine(LineId),

    #[error("duplicate route {route} on line {line}")]
    DuplicateRoute { line: LineId, route: RouteId },

    #[error("unknown route {route} on line {line}")]
    UnknownRoute { line: LineId, route: RouteId },

    #[error("duplicate departure: {0}")]
    DuplicateDeparture(DepartureId),

    #[error("unknown vehicle type: {0}")]
    UnknownVehicleType(VehicleTypeId),
}
