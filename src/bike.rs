use crate::station::StationId;
use crate::vehicle_type::VehicleTypeId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fmt::Formatter;
use std::sync::Arc;
use tabled::Tabled;

pub type BikeId = Arc<str>;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum BikeAvailability {
    Available,
    InUse,
    Disabled,
}

impl fmt::Display for BikeAvailability {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let label = match self {
            BikeAvailability::Available => "available",
            BikeAvailability::InUse => "in use",
            BikeAvailability::Disabled => "disabled",
        };
        write!(f, "{}", label)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum BikeState {
    Usable,
    Broken,
    InRepair,
    Missing,
}

impl fmt::Display for BikeState {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let label = match self {
            BikeState::Usable => "usable",
            BikeState::Broken => "broken",
            BikeState::InRepair => "in repair",
            BikeState::Missing => "missing",
        };
        write!(f, "{}", label)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Tabled)]
pub struct Bike {
    pub bike_number: BikeId,
    pub vehicle_type_id: VehicleTypeId,
    pub availability: BikeAvailability,
    pub state: BikeState,
    #[tabled(display = "display_station")]
    pub current_station_id: Option<StationId>,
}

impl Bike {
    /// Broken, in-repair and missing bikes never count towards capacity.
    pub fn is_usable(&self) -> bool {
        self.state == BikeState::Usable
    }
}

fn display_station(station: &Option<StationId>) -> String {
    station
        .as_ref()
        .map(|s| s.to_string())
        .unwrap_or_else(|| "-".to_string())
}
