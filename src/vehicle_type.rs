use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fmt::Formatter;
use std::sync::Arc;
use tabled::Tabled;

pub type VehicleTypeId = Arc<str>;

/// Form factors as defined by GBFS v2.1.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum FormFactor {
    Bike,
    EScooter,
    Car,
    Moped,
    Other,
}

impl fmt::Display for FormFactor {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let label = match self {
            FormFactor::Bike => "bike",
            FormFactor::EScooter => "e-scooter",
            FormFactor::Car => "car",
            FormFactor::Moped => "moped",
            FormFactor::Other => "other",
        };
        write!(f, "{}", label)
    }
}

/// Propulsion types as defined by GBFS v2.1.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum PropulsionType {
    Human,
    ElectricAssist,
    Electric,
    Combustion,
}

impl fmt::Display for PropulsionType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let label = match self {
            PropulsionType::Human => "human",
            PropulsionType::ElectricAssist => "electric assist",
            PropulsionType::Electric => "electric",
            PropulsionType::Combustion => "combustion",
        };
        write!(f, "{}", label)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Tabled)]
pub struct VehicleType {
    pub id: VehicleTypeId,
    pub name: Arc<str>,
    pub form_factor: FormFactor,
    pub propulsion: PropulsionType,
    pub allow_reservation: bool,
    pub allow_spontaneous_rent: bool,
    /// Vehicles held back for walk-up rentals, never consumed by bookings.
    pub min_spontaneous_rent_vehicles: u32,
    pub min_reservation_vehicles: u32,
    /// Buffer before a reservation starts during which its vehicle must
    /// already be free.
    pub reservation_lead_time_minutes: i64,
    pub max_reservation_days: u32,
}

impl VehicleType {
    pub fn lead_time(&self) -> Duration {
        Duration::minutes(self.reservation_lead_time_minutes)
    }
}

impl fmt::Display for VehicleType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id)
    }
}
