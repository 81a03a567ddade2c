//! Transport modes and leg mode tags.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Mode of a scheduled transit service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransitMode {
    Bus,
    Tram,
    Subway,
    Rail,
    Ferry,
    CableCar,
    Gondola,
    Funicular,
}

impl TransitMode {
    /// Every transit mode.
    pub const ALL: [TransitMode; 8] = [
        TransitMode::Bus,
        TransitMode::Tram,
        TransitMode::Subway,
        TransitMode::Rail,
        TransitMode::Ferry,
        TransitMode::CableCar,
        TransitMode::Gondola,
        TransitMode::Funicular,
    ];

    /// Upper-case mode name, as used for link modes and vehicle types.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransitMode::Bus => "BUS",
            TransitMode::Tram => "TRAM",
            TransitMode::Subway => "SUBWAY",
            TransitMode::Rail => "RAIL",
            TransitMode::Ferry => "FERRY",
            TransitMode::CableCar => "CABLE_CAR",
            TransitMode::Gondola => "GONDOLA",
            TransitMode::Funicular => "FUNICULAR",
        }
    }
}

impl fmt::Display for TransitMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Non-transit mode used on the street network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StreetMode {
    Walk,
    Bicycle,
}

impl StreetMode {
    /// Leg mode tag understood by the simulation.
    pub fn tag(&self) -> &'static str {
        match self {
            StreetMode::Walk => "walk",
            StreetMode::Bicycle => "bike",
        }
    }
}

/// Why a teleport leg was inserted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TeleportKind {
    /// Access to, or egress from, the computed path; also the whole trip when
    /// no path was found.
    BeginOrEnd,
    /// Movement inside a stop area: street network to stop, stop to street
    /// network, or between two stops of a transfer.
    TransitStopArea,
    /// A transit ride whose departure is not in the exported schedule.
    MissingDeparture,
}

impl TeleportKind {
    /// Leg mode tag understood by the simulation.
    pub fn tag(&self) -> &'static str {
        match self {
            TeleportKind::BeginOrEnd => "teleport_begin_or_end",
            TeleportKind::TransitStopArea => "teleport_transit_stop_area",
            TeleportKind::MissingDeparture => "teleport_missing_departure",
        }
    }
}

/// Mode tag of scheduled transit legs.
pub const TRANSIT_MODE_TAG: &str = "pt";
