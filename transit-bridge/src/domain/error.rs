//! Domain error types.
//!
//! These errors represent validation failures in the domain layer. They are
//! distinct from configuration and schedule-building errors.

use super::LinkId;

/// Domain-level errors for validation and data consistency.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DomainError {
    /// A street leg has no links to traverse
    #[error("street leg must traverse at least one link")]
    EmptyStreetLeg,

    /// A leg would take negative time
    #[error("negative travel time: {0}s")]
    NegativeTravelTime(i64),

    /// Consecutive legs don't meet at the same link
    #[error("leg {index} ends at link {end} but the next leg starts at link {start}")]
    LegsNotConnected {
        index: usize,
        end: LinkId,
        start: LinkId,
    },

    /// The itinerary doesn't start at the requested origin
    #[error("itinerary starts at link {actual}, expected origin {expected}")]
    WrongOrigin { expected: LinkId, actual: LinkId },

    /// The itinerary doesn't end at the requested destination
    #[error("itinerary ends at link {actual}, expected destination {expected}")]
    WrongDestination { expected: LinkId, actual: LinkId },

    /// No legs, but origin and destination differ
    #[error("empty itinerary cannot connect {0} to {1}")]
    EmptyItinerary(LinkId, LinkId),
}
