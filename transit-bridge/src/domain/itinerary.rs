//! Itinerary type.
//!
//! An `Itinerary` is the leg sequence handed to the simulation for one
//! routing request.

use chrono::Duration;
use serde::Serialize;

use super::{DomainError, Leg, LinkId, TransitLeg};

/// A place where consecutive legs fail to meet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContinuityGap {
    /// Index of the leg before the gap.
    pub index: usize,
    /// Where that leg ends.
    pub end: LinkId,
    /// Where the following leg starts.
    pub start: LinkId,
}

/// An ordered sequence of legs from an origin link to a destination link.
///
/// # Invariants (for itineraries returned by the router)
///
/// - Consecutive legs connect (end link of one = start link of the next)
/// - The first leg starts at the origin link, the last ends at the
///   destination link
/// - No legs at all only when origin and destination coincide
///
/// A leg dropped because of a schedule integrity violation leaves a gap that
/// breaks the first invariant; [`Itinerary::continuity_gaps`] reports it.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Itinerary {
    legs: Vec<Leg>,
}

impl Itinerary {
    /// An itinerary without legs.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Wraps legs without checking continuity.
    pub fn from_legs(legs: Vec<Leg>) -> Self {
        Self { legs }
    }

    /// Constructs an itinerary, checking it spans `origin` to `destination`
    /// without gaps.
    ///
    /// # Errors
    ///
    /// Returns `Err` on the first continuity or endpoint violation.
    ///
    /// # Examples
    ///
    /// ```
    /// use transit_bridge::domain::{Itinerary, Leg, LinkId, TeleportKind, TeleportLeg};
    ///
    /// let o = LinkId::new("o");
    /// let d = LinkId::new("d");
    /// let leg = TeleportLeg::between(TeleportKind::BeginOrEnd, o.clone(), d.clone()).unwrap();
    ///
    /// let itinerary = Itinerary::new(vec![Leg::from(leg)], &o, &d).unwrap();
    /// assert_eq!(itinerary.len(), 1);
    /// assert!(Itinerary::new(vec![], &o, &d).is_err());
    /// ```
    pub fn new(legs: Vec<Leg>, origin: &LinkId, destination: &LinkId) -> Result<Self, DomainError> {
        let itinerary = Self { legs };
        itinerary.check_spans(origin, destination)?;
        Ok(itinerary)
    }

    /// Checks continuity and endpoints.
    pub fn check_spans(&self, origin: &LinkId, destination: &LinkId) -> Result<(), DomainError> {
        let (Some(first), Some(last)) = (self.legs.first(), self.legs.last()) else {
            if origin == destination {
                return Ok(());
            }
            return Err(DomainError::EmptyItinerary(
                origin.clone(),
                destination.clone(),
            ));
        };

        if first.start_link() != origin {
            return Err(DomainError::WrongOrigin {
                expected: origin.clone(),
                actual: first.start_link().clone(),
            });
        }

        if let Some(gap) = self.continuity_gaps().into_iter().next() {
            return Err(DomainError::LegsNotConnected {
                index: gap.index,
                end: gap.end,
                start: gap.start,
            });
        }

        if last.end_link() != destination {
            return Err(DomainError::WrongDestination {
                expected: destination.clone(),
                actual: last.end_link().clone(),
            });
        }

        Ok(())
    }

    /// Returns every place where consecutive legs don't connect.
    pub fn continuity_gaps(&self) -> Vec<ContinuityGap> {
        self.legs
            .windows(2)
            .enumerate()
            .filter(|(_, pair)| pair[0].end_link() != pair[1].start_link())
            .map(|(index, pair)| ContinuityGap {
                index,
                end: pair[0].end_link().clone(),
                start: pair[1].start_link().clone(),
            })
            .collect()
    }

    /// Returns true if consecutive legs all connect.
    pub fn is_continuous(&self) -> bool {
        self.continuity_gaps().is_empty()
    }

    /// Returns the legs.
    pub fn legs(&self) -> &[Leg] {
        &self.legs
    }

    /// Consumes the itinerary, returning its legs.
    pub fn into_legs(self) -> Vec<Leg> {
        self.legs
    }

    /// Returns the number of legs.
    pub fn len(&self) -> usize {
        self.legs.len()
    }

    /// Returns true if there are no legs.
    pub fn is_empty(&self) -> bool {
        self.legs.is_empty()
    }

    /// Returns the link of the first leg's start.
    pub fn start_link(&self) -> Option<&LinkId> {
        self.legs.first().map(Leg::start_link)
    }

    /// Returns the link of the last leg's end.
    pub fn end_link(&self) -> Option<&LinkId> {
        self.legs.last().map(Leg::end_link)
    }

    /// Iterates over the transit legs.
    pub fn transit_legs(&self) -> impl Iterator<Item = &TransitLeg> {
        self.legs.iter().filter_map(Leg::as_transit)
    }

    /// Number of vehicle changes (transit legs minus one).
    pub fn transfer_count(&self) -> usize {
        self.transit_legs().count().saturating_sub(1)
    }

    /// Sum of the legs' travel times.
    pub fn travel_time(&self) -> Duration {
        self.legs
            .iter()
            .fold(Duration::zero(), |acc, leg| acc + leg.travel_time())
    }

    /// Mode tags of all legs, in order.
    pub fn mode_tags(&self) -> Vec<&'static str> {
        self.legs.iter().map(Leg::mode_tag).collect()
    }
}
