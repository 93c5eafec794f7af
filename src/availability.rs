use crate::time::{day_bounds, day_end};
use crate::vehicle_type::VehicleType;
use chrono::{Days, NaiveDate, NaiveDateTime, NaiveTime};
use std::fmt;
use std::fmt::Formatter;
use std::sync::Arc;
use tabled::Tabled;

use OccurrenceClass::{EndsWithinDay, EntirelyWithinDay, SpansEntireDay, StartsWithinDay};

/// One existing reservation as the calculator sees it: an identity plus a
/// half-open `[start, end)` interval in calendar time.
#[derive(Clone, Debug, PartialEq)]
pub struct EventWindow {
    pub id: Arc<str>,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

/// Position of an occurrence relative to the boundaries of the examined day.
/// Boundary ties resolve to "within the day", the day being closed-open.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum OccurrenceClass {
    EntirelyWithinDay,
    StartsWithinDay,
    SpansEntireDay,
    EndsWithinDay,
}

/// The portion of an event overlapping one day. The full event interval is
/// kept; the classification alone records how it sits against the day.
#[derive(Clone, Debug, PartialEq)]
pub struct DayOccurrence {
    pub id: Arc<str>,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub class: OccurrenceClass,
}

/// Times of one day during which no new reservation may begin.
#[derive(Clone, Copy, Debug, PartialEq, Tabled)]
pub struct ForbiddenRange {
    #[tabled(display = "hhmm_column")]
    pub start: NaiveTime,
    #[tabled(display = "hhmm_column")]
    pub end: NaiveTime,
}

fn hhmm_column(time: &NaiveTime) -> String {
    crate::time::hhmm(*time)
}

impl fmt::Display for ForbiddenRange {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{}",
            crate::time::hhmm(self.start),
            crate::time::hhmm(self.end)
        )
    }
}

/// Classifies every event overlapping `day`, sorted by event start.
pub fn classify_day_occurrences(day: NaiveDate, events: &[EventWindow]) -> Vec<DayOccurrence> {
    let (day_start, day_until) = day_bounds(day);
    let mut occurrences = events
        .iter()
        .filter(|event| event.start < day_until && event.end > day_start)
        .map(|event| {
            let class = match (event.start >= day_start, event.end <= day_until) {
                (true, true) => EntirelyWithinDay,
                (true, false) => StartsWithinDay,
                (false, false) => SpansEntireDay,
                (false, true) => EndsWithinDay,
            };
            DayOccurrence {
                id: event.id.clone(),
                start: event.start,
                end: event.end,
                class,
            }
        })
        .collect::<Vec<DayOccurrence>>();
    occurrences.sort_by_key(|occurrence| occurrence.start);
    occurrences
}

/// Time-of-day ranges of `day` in which starting a new reservation would
/// leave fewer than `min_spontaneous_rent_vehicles` free for walk-up rental.
/// Ranges are emitted per triggering occurrence and are not merged.
pub fn forbidden_time_ranges(
    day: NaiveDate,
    vehicle_type: &VehicleType,
    events: &[EventWindow],
    usable_vehicles: u32,
) -> Vec<ForbiddenRange> {
    let occurrences = classify_day_occurrences(day, events);
    let lead = vehicle_type.lead_time();
    let threshold = usable_vehicles as i64 - vehicle_type.min_spontaneous_rent_vehicles as i64;
    let mut ranges = Vec::new();

    // nothing starts or ends inside the day: only the day-level overflow
    // check can block it
    if !occurrences.is_empty() && occurrences.iter().all(|o| o.class == SpansEntireDay) {
        if occurrences.len() as i64 >= threshold {
            ranges.push(ForbiddenRange {
                start: NaiveTime::MIN,
                end: day_end(),
            });
        }
        return ranges;
    }

    for candidate in &occurrences {
        if candidate.class == SpansEntireDay {
            continue;
        }
        // the candidate occupies one vehicle itself
        let mut concurrent: i64 = 1;
        let mut range_end = candidate.end;
        if matches!(candidate.class, EntirelyWithinDay | StartsWithinDay) {
            for other in occurrences.iter().filter(|o| o.id != candidate.id) {
                if other.class == SpansEntireDay {
                    concurrent += 1;
                } else if candidate.start >= other.start && candidate.start - lead < other.end {
                    concurrent += 1;
                    // a reservation ending mid-overlap frees its vehicle and
                    // caps how far the range has to reach
                    if matches!(other.class, StartsWithinDay | EndsWithinDay)
                        && other.end < range_end
                    {
                        range_end = other.end;
                    }
                }
            }
        }
        if concurrent >= threshold {
            ranges.push(ForbiddenRange {
                start: range_start_time(day, candidate, lead),
                end: range_end_time(day, range_end, lead),
            });
        }
    }

    ranges
}

fn range_start_time(day: NaiveDate, candidate: &DayOccurrence, lead: chrono::Duration) -> NaiveTime {
    // already running when the day begins
    if candidate.class == EndsWithinDay {
        return NaiveTime::MIN;
    }
    let padded = candidate.start - lead;
    if padded.date() < day {
        NaiveTime::MIN
    } else {
        padded.time()
    }
}

fn range_end_time(day: NaiveDate, range_end: NaiveDateTime, lead: chrono::Duration) -> NaiveTime {
    let padded = range_end + lead;
    if padded.date() > day {
        day_end()
    } else {
        padded.time()
    }
}

/// Whether any new reservation can still be started on `day`.
pub fn is_allowed_reservation_day(
    day: NaiveDate,
    vehicle_type: &VehicleType,
    events: &[EventWindow],
    usable_vehicles: u32,
) -> bool {
    let occurrences = classify_day_occurrences(day, events);
    let lead = vehicle_type.lead_time();
    let mut blocking = occurrences.len() as i64;
    for occurrence in &occurrences {
        // an occurrence only blocks if its lead-padded window still touches
        // the queried date; compared at date granularity
        let padded_from = (occurrence.start - lead).date();
        let padded_to = (occurrence.end + lead).date();
        if padded_from > day || padded_to < day {
            blocking -= 1;
        }
    }
    usable_vehicles as i64 - blocking - vehicle_type.min_spontaneous_rent_vehicles as i64 > 0
}

/// Latest instant a reservation starting at `start` may run to, bounded by
/// `max_reservation_days`. Greedy forward scan, stopping at the first day
/// whose forbidden ranges would block the extension.
pub fn maximum_reservation_date(
    start: NaiveDateTime,
    vehicle_type: &VehicleType,
    events: &[EventWindow],
    usable_vehicles: u32,
) -> NaiveDateTime {
    let mut last_passed_start: Option<NaiveTime> = None;
    for day_delta in 0..=vehicle_type.max_reservation_days as u64 {
        let day = start.date() + Days::new(day_delta);
        let mut ranges = forbidden_time_ranges(day, vehicle_type, events, usable_vehicles);
        if day_delta == 0 {
            // ranges already over at the requested start time are no obstacle
            ranges.retain(|range| {
                if range.end < start.time() {
                    last_passed_start = Some(range.start);
                    false
                } else {
                    true
                }
            });
        }
        if let Some(first) = ranges.iter().min_by_key(|range| range.start) {
            return day.and_time(first.start);
        }
    }
    let cap = start.date() + Days::new(vehicle_type.max_reservation_days as u64);
    cap.and_time(last_passed_start.unwrap_or_else(day_end))
}
