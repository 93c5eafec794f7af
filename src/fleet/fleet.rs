use crate::availability::{
    EventWindow, ForbiddenRange, forbidden_time_ranges, is_allowed_reservation_day,
    maximum_reservation_date,
};
use crate::bike::{Bike, BikeAvailability, BikeId};
use crate::reservation::{Reservation, ReservationError, ReservationId, ReservationStatus};
use crate::station::{Station, StationId, StationStatus};
use crate::time::month_days;
use crate::vehicle_type::{VehicleType, VehicleTypeId};
use chrono::{NaiveDate, NaiveDateTime};
use serde::Deserialize;
use std::collections::HashMap;
use std::io;
use std::sync::Arc;

pub struct Fleet {
    pub vehicle_types: HashMap<VehicleTypeId, VehicleType>,
    pub stations: HashMap<StationId, Station>,
    pub bikes: Vec<Bike>,
    pub reservations: Vec<Reservation>,
    reservations_index: HashMap<ReservationId, usize>,
    next_reservation: u64,
}

impl Fleet {
    pub fn new(
        vehicle_types: HashMap<VehicleTypeId, VehicleType>,
        stations: HashMap<StationId, Station>,
        bikes: Vec<Bike>,
        mut reservations: Vec<Reservation>,
    ) -> Fleet {
        reservations.sort_by_key(|r| r.start);
        let reservations_index = reservations
            .iter()
            .enumerate()
            .map(|(i, r)| (r.id.clone(), i))
            .collect::<HashMap<ReservationId, usize>>();
        let next_reservation = reservations.len() as u64 + 1;
        Fleet {
            vehicle_types,
            stations,
            bikes,
            reservations,
            reservations_index,
            next_reservation,
        }
    }

    pub fn load_from_file(path: &str) -> io::Result<Self> {
        let data = std::fs::read_to_string(path)?;
        #[derive(Deserialize)]
        struct RawData {
            vehicle_types: Vec<VehicleType>,
            stations: Vec<Station>,
            bikes: Vec<Bike>,
            #[serde(default)]
            reservations: Vec<Reservation>,
        }
        let raw: RawData = serde_json::from_str(&data)?;

        let vt_map = raw
            .vehicle_types
            .into_iter()
            .map(|v| (v.id.clone(), v))
            .collect();

        let station_map = raw
            .stations
            .into_iter()
            .map(|s| (s.id.clone(), s))
            .collect();

        Ok(Fleet::new(vt_map, station_map, raw.bikes, raw.reservations))
    }

    /// Bikes of the type in a usable state, the capacity the calculator
    /// works against.
    pub fn usable_bike_count(&self, vehicle_type_id: &VehicleTypeId) -> u32 {
        self.bikes
            .iter()
            .filter(|b| b.vehicle_type_id == *vehicle_type_id && b.is_usable())
            .count() as u32
    }

    // active reservations projected into the calculator's interval form
    fn active_windows(&self, vehicle_type_id: &VehicleTypeId) -> Vec<EventWindow> {
        self.reservations
            .iter()
            .filter(|r| r.vehicle_type_id == *vehicle_type_id && r.is_active())
            .map(|r| EventWindow {
                id: r.id.clone(),
                start: r.start,
                end: r.end,
            })
            .collect()
    }

    fn vehicle_type(&self, id: &VehicleTypeId) -> Result<&VehicleType, ReservationError> {
        self.vehicle_types
            .get(id)
            .ok_or_else(|| ReservationError::UnknownVehicleType(id.clone()))
    }

    pub fn forbidden_ranges(
        &self,
        vehicle_type_id: &VehicleTypeId,
        day: NaiveDate,
    ) -> Result<Vec<ForbiddenRange>, ReservationError> {
        let vt = self.vehicle_type(vehicle_type_id)?;
        Ok(forbidden_time_ranges(
            day,
            vt,
            &self.active_windows(vehicle_type_id),
            self.usable_bike_count(vehicle_type_id),
        ))
    }

    /// Dates of the month containing `month_day` on which a new reservation
    /// may still be started.
    pub fn allowed_days(
        &self,
        vehicle_type_id: &VehicleTypeId,
        month_day: NaiveDate,
    ) -> Result<Vec<NaiveDate>, ReservationError> {
        let vt = self.vehicle_type(vehicle_type_id)?;
        let windows = self.active_windows(vehicle_type_id);
        let usable = self.usable_bike_count(vehicle_type_id);
        Ok(month_days(month_day)
            .into_iter()
            .filter(|day| is_allowed_reservation_day(*day, vt, &windows, usable))
            .collect())
    }

    pub fn maximum_end(
        &self,
        vehicle_type_id: &VehicleTypeId,
        start: NaiveDateTime,
    ) -> Result<NaiveDateTime, ReservationError> {
        let vt = self.vehicle_type(vehicle_type_id)?;
        Ok(maximum_reservation_date(
            start,
            vt,
            &self.active_windows(vehicle_type_id),
            self.usable_bike_count(vehicle_type_id),
        ))
    }

    /// Books a vehicle of the type for `[start, end)`. Availability is
    /// re-derived from the current reservation set in the same exclusive
    /// borrow that commits the booking, so two bookings cannot interleave
    /// between check and commit.
    pub fn reserve(
        &mut self,
        vehicle_type_id: VehicleTypeId,
        station_id: StationId,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<ReservationId, ReservationError> {
        let vt = self.vehicle_type(&vehicle_type_id)?;
        if !vt.allow_reservation {
            return Err(ReservationError::ReservationsNotAllowed(vehicle_type_id));
        }
        let station = self
            .stations
            .get(&station_id)
            .ok_or_else(|| ReservationError::UnknownStation(station_id.clone()))?;
        if station.status != StationStatus::Active {
            return Err(ReservationError::StationDisabled(station_id));
        }
        if start >= end {
            return Err(ReservationError::EmptyWindow);
        }

        let windows = self.active_windows(&vehicle_type_id);
        let usable = self.usable_bike_count(&vehicle_type_id);
        let blocked = forbidden_time_ranges(start.date(), vt, &windows, usable)
            .iter()
            .any(|range| range.start <= start.time() && start.time() <= range.end);
        if blocked {
            return Err(ReservationError::StartForbidden(start));
        }
        if !is_allowed_reservation_day(start.date(), vt, &windows, usable) {
            return Err(ReservationError::DayNotAllowed(start.date()));
        }
        let maximum = maximum_reservation_date(start, vt, &windows, usable);
        if end > maximum {
            return Err(ReservationError::PastMaximum { end, max: maximum });
        }

        let id = self.next_reservation_id();
        self.reservations.push(Reservation {
            id: id.clone(),
            vehicle_type_id,
            start_station_id: station_id,
            start,
            end,
            bike_id: None,
            status: ReservationStatus::Pending,
        });
        self.reindex();
        self.assert_invariants();
        Ok(id)
    }

    pub fn cancel(&mut self, id: &ReservationId) -> Result<(), ReservationError> {
        let idx = self.active_index(id)?;
        let bike_id = self.reservations[idx].bike_id.take();
        self.reservations[idx].status = ReservationStatus::Cancelled;
        if let Some(bike_id) = bike_id {
            self.release_bike(&bike_id);
        }
        self.assert_invariants();
        Ok(())
    }

    /// Hands out available bikes to pending reservations whose lead-time
    /// window has opened at `now`, so the vehicle is waiting at the station
    /// when the reservation begins.
    pub fn dispatch(&mut self, now: NaiveDateTime) -> Vec<(ReservationId, BikeId)> {
        let mut assignments = Vec::new();
        for idx in 0..self.reservations.len() {
            let reservation = &self.reservations[idx];
            if reservation.status != ReservationStatus::Pending {
                continue;
            }
            let Some(vt) = self.vehicle_types.get(&reservation.vehicle_type_id) else {
                continue;
            };
            if !vt.allow_reservation {
                continue;
            }
            if reservation.start >= now + vt.lead_time() || reservation.end <= now {
                continue;
            }
            let vehicle_type_id = reservation.vehicle_type_id.clone();
            let station_id = reservation.start_station_id.clone();
            let bike = self.bikes.iter_mut().find(|b| {
                b.availability == BikeAvailability::Available
                    && b.is_usable()
                    && b.vehicle_type_id == vehicle_type_id
                    && b.current_station_id.as_ref() == Some(&station_id)
            });
            if let Some(bike) = bike {
                bike.availability = BikeAvailability::InUse;
                let bike_id = bike.bike_number.clone();
                self.reservations[idx].bike_id = Some(bike_id.clone());
                self.reservations[idx].status = ReservationStatus::Underway;
                assignments.push((self.reservations[idx].id.clone(), bike_id));
            }
        }
        self.assert_invariants();
        assignments
    }

    /// Ends a reservation at `now`, truncating its window and freeing the
    /// assigned bike.
    pub fn finish(&mut self, id: &ReservationId, now: NaiveDateTime) -> Result<(), ReservationError> {
        let idx = self.active_index(id)?;
        let bike_id = self.reservations[idx].bike_id.take();
        if now < self.reservations[idx].end {
            self.reservations[idx].end = now;
        }
        self.reservations[idx].status = ReservationStatus::Completed;
        if let Some(bike_id) = bike_id {
            self.release_bike(&bike_id);
        }
        self.assert_invariants();
        Ok(())
    }

    fn active_index(&self, id: &ReservationId) -> Result<usize, ReservationError> {
        let idx = *self
            .reservations_index
            .get(id)
            .ok_or_else(|| ReservationError::UnknownReservation(id.clone()))?;
        if !self.reservations[idx].is_active() {
            return Err(ReservationError::NotActive(id.clone()));
        }
        Ok(idx)
    }

    fn release_bike(&mut self, bike_id: &BikeId) {
        if let Some(bike) = self.bikes.iter_mut().find(|b| b.bike_number == *bike_id) {
            bike.availability = BikeAvailability::Available;
        }
    }

    fn next_reservation_id(&mut self) -> ReservationId {
        loop {
            let id: ReservationId = Arc::from(format!("R{}", self.next_reservation));
            self.next_reservation += 1;
            if !self.reservations_index.contains_key(&id) {
                return id;
            }
        }
    }

    fn reindex(&mut self) {
        self.reservations.sort_by_key(|r| r.start);
        self.reservations_index = self
            .reservations
            .iter()
            .enumerate()
            .map(|(i, r)| (r.id.clone(), i))
            .collect();
    }

    fn assert_invariants(&self) {
        debug_assert!(
            self.reservations.iter().all(|r| match r.status {
                ReservationStatus::Underway => r.bike_id.is_some(),
                _ => r.bike_id.is_none(),
            }),
            "Status <-> bike assignment invariant violated"
        );

        debug_assert!(
            self.reservations
                .iter()
                .filter(|r| r.is_active())
                .all(|r| r.start < r.end),
            "Active reservation window ordering violated"
        );

        debug_assert!(
            self.reservations.iter().all(|r| {
                self.vehicle_types.contains_key(&r.vehicle_type_id)
                    && self.stations.contains_key(&r.start_station_id)
            }),
            "Reservation references an unknown vehicle type or station"
        );

        debug_assert!(
            self.reservations
                .windows(2)
                .all(|rs| rs[0].start <= rs[1].start),
            "Reservations sorted by start violated"
        );

        debug_assert!(
            self.reservations
                .iter()
                .enumerate()
                .all(|(i, r)| self.reservations_index.get(&r.id) == Some(&i)),
            "Reservation index out of sync"
        );

        debug_assert!(
            {
                let mut seen = std::collections::HashSet::new();
                self.reservations
                    .iter()
                    .filter(|r| r.is_active())
                    .filter_map(|r| r.bike_id.as_ref())
                    .all(|b| seen.insert(b.clone()))
            },
            "Bike backs two active reservations at once"
        );
    }
}
