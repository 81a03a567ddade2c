//! Routing parameter profiles.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A set of non-transit modes a request may be routed with.
///
/// Transit is always allowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParameterProfile {
    PtAndWalk,
    PtAndBike,
    /// Cycling, with transit still allowed; routes like `PtAndBike`.
    BikeOnly,
}

impl ParameterProfile {
    pub const ALL: [ParameterProfile; 3] = [
        ParameterProfile::PtAndWalk,
        ParameterProfile::PtAndBike,
        ParameterProfile::BikeOnly,
    ];

    pub fn walk_allowed(self) -> bool {
        matches!(self, ParameterProfile::PtAndWalk)
    }

    pub fn bike_allowed(self) -> bool {
        matches!(self, ParameterProfile::PtAndBike | ParameterProfile::BikeOnly)
    }
}

impl fmt::Display for ParameterProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ParameterProfile::PtAndWalk => "PtAndWalk",
            ParameterProfile::PtAndBike => "PtAndBike",
            ParameterProfile::BikeOnly => "BikeOnly",
        };
        f.write_str(name)
    }
}
