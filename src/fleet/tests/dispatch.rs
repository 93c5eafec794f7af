use crate::bike::BikeAvailability::{Available, InUse};
use crate::bike::BikeState;
use crate::bike::BikeState::{Broken, Usable};
use crate::fleet::fleet::Fleet;
use crate::fleet::tests::utils::{
    add_bike, add_reservation, add_station, add_vehicle_type, dt, id,
};
use crate::reservation::ReservationStatus::{Completed, Pending, Underway};
use crate::station::StationStatus::Active;
use std::collections::HashMap;

fn fleet_with_pending(bike_station: Option<&str>, bike_state: BikeState) -> Fleet {
    let mut vehicle_types = HashMap::new();
    let mut stations = HashMap::new();
    let mut bikes = Vec::new();
    let mut reservations = Vec::new();

    add_vehicle_type(&mut vehicle_types, "city", true, 0, 120, 7);
    add_station(&mut stations, "harbor", Active);
    add_station(&mut stations, "campus", Active);
    add_bike(&mut bikes, "B1", "city", bike_state, bike_station);
    add_reservation(
        &mut reservations,
        "R1",
        "city",
        "harbor",
        "2026-08-05T10:00",
        "2026-08-05T12:00",
        Pending,
    );

    Fleet::new(vehicle_types, stations, bikes, reservations)
}

#[test]
fn test_dispatch_assigns_bike_inside_lead_window() {
    let mut fleet = fleet_with_pending(Some("harbor"), Usable);

    let assignments = fleet.dispatch(dt("2026-08-05T08:30"));

    assert_eq!(assignments, vec![(id("R1"), id("B1"))]);
    assert_eq!(fleet.reservations[0].status, Underway);
    assert_eq!(fleet.reservations[0].bike_id, Some(id("B1")));
    assert_eq!(fleet.bikes[0].availability, InUse);
}

#[test]
fn test_dispatch_waits_for_lead_window() {
    let mut fleet = fleet_with_pending(Some("harbor"), Usable);

    let assignments = fleet.dispatch(dt("2026-08-05T07:30"));

    assert!(assignments.is_empty());
    assert_eq!(fleet.reservations[0].status, Pending);
    assert_eq!(fleet.bikes[0].availability, Available);
}

#[test]
fn test_dispatch_needs_bike_at_start_station() {
    let mut fleet = fleet_with_pending(Some("campus"), Usable);

    let assignments = fleet.dispatch(dt("2026-08-05T08:30"));

    assert!(assignments.is_empty());
}

#[test]
fn test_dispatch_skips_unusable_bikes() {
    let mut fleet = fleet_with_pending(Some("harbor"), Broken);

    let assignments = fleet.dispatch(dt("2026-08-05T08:30"));

    assert!(assignments.is_empty());
    assert_eq!(fleet.reservations[0].status, Pending);
}

#[test]
fn test_dispatch_ignores_reservations_already_over() {
    let mut fleet = fleet_with_pending(Some("harbor"), Usable);

    let assignments = fleet.dispatch(dt("2026-08-05T12:30"));

    assert!(assignments.is_empty());
}

#[test]
fn test_dispatch_gives_one_bike_to_the_earlier_reservation() {
    let mut vehicle_types = HashMap::new();
    let mut stations = HashMap::new();
    let mut bikes = Vec::new();
    let mut reservations = Vec::new();

    add_vehicle_type(&mut vehicle_types, "city", true, 0, 120, 7);
    add_station(&mut stations, "harbor", Active);
    add_bike(&mut bikes, "B1", "city", Usable, Some("harbor"));
    add_reservation(
        &mut reservations,
        "R1",
        "city",
        "harbor",
        "2026-08-05T10:30",
        "2026-08-05T12:00",
        Pending,
    );
    add_reservation(
        &mut reservations,
        "R2",
        "city",
        "harbor",
        "2026-08-05T10:00",
        "2026-08-05T11:00",
        Pending,
    );
    let mut fleet = Fleet::new(vehicle_types, stations, bikes, reservations);

    let assignments = fleet.dispatch(dt("2026-08-05T09:30"));

    // reservations are walked in start order
    assert_eq!(assignments, vec![(id("R2"), id("B1"))]);
    assert_eq!(fleet.reservations[1].status, Pending);
}

#[test]
fn test_finish_truncates_and_frees_the_bike() {
    let mut fleet = fleet_with_pending(Some("harbor"), Usable);
    fleet.dispatch(dt("2026-08-05T08:30"));

    fleet.finish(&id("R1"), dt("2026-08-05T11:00")).unwrap();

    assert_eq!(fleet.reservations[0].status, Completed);
    assert_eq!(fleet.reservations[0].bike_id, None);
    assert_eq!(fleet.reservations[0].end, dt("2026-08-05T11:00"));
    assert_eq!(fleet.bikes[0].availability, Available);
}

#[test]
fn test_finish_after_window_keeps_original_end() {
    let mut fleet = fleet_with_pending(Some("harbor"), Usable);
    fleet.dispatch(dt("2026-08-05T08:30"));

    fleet.finish(&id("R1"), dt("2026-08-05T13:00")).unwrap();

    assert_eq!(fleet.reservations[0].end, dt("2026-08-05T12:00"));
}

#[test]
fn test_cancel_underway_releases_the_bike() {
    let mut fleet = fleet_with_pending(Some("harbor"), Usable);
    fleet.dispatch(dt("2026-08-05T08:30"));

    fleet.cancel(&id("R1")).unwrap();

    assert_eq!(fleet.reservations[0].bike_id, None);
    assert_eq!(fleet.bikes[0].availability, Available);
}
