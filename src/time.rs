use chrono::{Datelike, Days, NaiveDate, NaiveDateTime, NaiveTime};

/// Latest time-of-day a forbidden range may report; ranges that would spill
/// past midnight are clipped here.
pub fn day_end() -> NaiveTime {
    NaiveTime::from_hms_opt(23, 59, 0).unwrap()
}

/// Half-open `[midnight, next midnight)` bounds of a calendar day.
pub fn day_bounds(day: NaiveDate) -> (NaiveDateTime, NaiveDateTime) {
    let start = day.and_time(NaiveTime::MIN);
    (start, start + Days::new(1))
}

pub fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

pub fn parse_datetime(s: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M").ok()
}

/// "YYYY-MM" to the first day of that month.
pub fn parse_month(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(&format!("{}-01", s), "%Y-%m-%d").ok()
}

/// Every date of the month containing `day`, in order.
pub fn month_days(day: NaiveDate) -> Vec<NaiveDate> {
    let mut days = Vec::new();
    let mut current = day.with_day(1).unwrap_or(day);
    let month = current.month();
    while current.month() == month {
        days.push(current);
        current = current + Days::new(1);
    }
    days
}

pub fn hhmm(time: NaiveTime) -> String {
    time.format("%H:%M").to_string()
}
