use std::fmt;

use serde::Serialize;

/// A bus from the depot's fleet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Vehicle {
    pub fleet_number: &'static str,
    pub model: &'static str,
}

pub static FLEET: [Vehicle; 9] = [
    Vehicle { fleet_number: "102", model: "Man Lion's Intercity" },
    Vehicle { fleet_number: "110", model: "Man Lion's City" },
    Vehicle { fleet_number: "210", model: "Mercedes Intouro" },
    Vehicle { fleet_number: "300", model: "Iveco Crossway LE" },
    Vehicle { fleet_number: "301", model: "Iveco Crossway Line" },
    Vehicle { fleet_number: "406", model: "Irizar i6" },
    Vehicle { fleet_number: "896", model: "Irizar i8 Premium" },
    Vehicle { fleet_number: "915", model: "Setra S 515 LE" },
    Vehicle { fleet_number: "500", model: "Solaris Urbino" },
];

impl Vehicle {
    pub fn find(fleet_number: &str) -> Option<Vehicle> {
        FLEET.iter().copied().find(|v| v.fleet_number == fleet_number)
    }

    /// First vehicle of the fleet, preselected for new sessions.
    pub fn default_vehicle() -> Vehicle {
        FLEET[0]
    }
}

impl fmt::Display for Vehicle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.fleet_number, self.model)
    }
}
