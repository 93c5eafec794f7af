use crate::bike::BikeId;
use crate::station::StationId;
use crate::vehicle_type::VehicleTypeId;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fmt::Formatter;
use std::sync::Arc;
use tabled::Tabled;
use thiserror::Error;

pub type ReservationId = Arc<str>;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum ReservationStatus {
    /// Booked, waiting for a bike to be put aside.
    Pending,
    /// A bike is locked to the reservation.
    Underway,
    Completed,
    Cancelled,
}

impl fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let label = match self {
            ReservationStatus::Pending => "pending",
            ReservationStatus::Underway => "underway",
            ReservationStatus::Completed => "completed",
            ReservationStatus::Cancelled => "cancelled",
        };
        write!(f, "{}", label)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Tabled)]
pub struct Reservation {
    pub id: ReservationId,
    pub vehicle_type_id: VehicleTypeId,
    pub start_station_id: StationId,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    #[tabled(display = "display_bike")]
    pub bike_id: Option<BikeId>,
    pub status: ReservationStatus,
}

impl Reservation {
    /// Active reservations occupy a vehicle and feed the availability
    /// calculator; completed and cancelled ones do not.
    pub fn is_active(&self) -> bool {
        matches!(
            self.status,
            ReservationStatus::Pending | ReservationStatus::Underway
        )
    }
}

fn display_bike(bike: &Option<BikeId>) -> String {
    bike.as_ref()
        .map(|b| b.to_string())
        .unwrap_or_else(|| "-".to_string())
}

#[derive(Clone, Debug, Error, PartialEq)]
pub enum ReservationError {
    #[error("unknown vehicle type {0}")]
    UnknownVehicleType(VehicleTypeId),
    #[error("vehicle type {0} does not take reservations")]
    ReservationsNotAllowed(VehicleTypeId),
    #[error("unknown station {0}")]
    UnknownStation(StationId),
    #[error("station {0} is disabled")]
    StationDisabled(StationId),
    #[error("reservation must end after it starts")]
    EmptyWindow,
    #[error("no reservation may start on {0}")]
    DayNotAllowed(NaiveDate),
    #[error("start {0} falls into a forbidden time range")]
    StartForbidden(NaiveDateTime),
    #[error("end {end} is past the latest allowed end {max}")]
    PastMaximum {
        end: NaiveDateTime,
        max: NaiveDateTime,
    },
    #[error("unknown reservation {0}")]
    UnknownReservation(ReservationId),
    #[error("reservation {0} is no longer active")]
    NotActive(ReservationId),
}
