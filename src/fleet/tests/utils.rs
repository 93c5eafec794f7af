use crate::bike::{Bike, BikeAvailability, BikeState};
use crate::reservation::{Reservation, ReservationStatus};
use crate::station::{Station, StationId, StationStatus};
use crate::time::{parse_date, parse_datetime};
use crate::vehicle_type::{FormFactor, PropulsionType, VehicleType, VehicleTypeId};
use chrono::{NaiveDate, NaiveDateTime};
use std::collections::HashMap;
use std::sync::Arc;

pub fn id(s: &str) -> Arc<str> {
    Arc::from(s)
}

pub fn dt(s: &str) -> NaiveDateTime {
    parse_datetime(s).unwrap()
}

pub fn date(s: &str) -> NaiveDate {
    parse_date(s).unwrap()
}

pub fn add_vehicle_type(
    vehicle_types: &mut HashMap<VehicleTypeId, VehicleType>,
    type_id: &str,
    allow_reservation: bool,
    min_spontaneous: u32,
    lead_minutes: i64,
    max_days: u32,
) {
    vehicle_types.insert(
        id(type_id),
        VehicleType {
            id: id(type_id),
            name: id(type_id),
            form_factor: FormFactor::Bike,
            propulsion: PropulsionType::Human,
            allow_reservation,
            allow_spontaneous_rent: true,
            min_spontaneous_rent_vehicles: min_spontaneous,
            min_reservation_vehicles: 0,
            reservation_lead_time_minutes: lead_minutes,
            max_reservation_days: max_days,
        },
    );
}

pub fn add_station(
    stations: &mut HashMap<StationId, Station>,
    station_id: &str,
    status: StationStatus,
) {
    stations.insert(
        id(station_id),
        Station {
            id: id(station_id),
            name: id(station_id),
            status,
            max_bikes: 10,
        },
    );
}

pub fn add_bike(
    bikes: &mut Vec<Bike>,
    bike_number: &str,
    type_id: &str,
    state: BikeState,
    station_id: Option<&str>,
) {
    bikes.push(Bike {
        bike_number: id(bike_number),
        vehicle_type_id: id(type_id),
        availability: BikeAvailability::Available,
        state,
        current_station_id: station_id.map(id),
    });
}

pub fn add_reservation(
    reservations: &mut Vec<Reservation>,
    reservation_id: &str,
    type_id: &str,
    station_id: &str,
    start: &str,
    end: &str,
    status: ReservationStatus,
) {
    reservations.push(Reservation {
        id: id(reservation_id),
        vehicle_type_id: id(type_id),
        start_station_id: id(station_id),
        start: dt(start),
        end: dt(end),
        bike_id: None,
        status,
    });
}
