//! Device-local calendar days.
//!
//! Day comparisons are done on formatted strings in the device's local
//! timezone (`Mon Oct 19 2026`). No timezone normalization is applied, so two
//! devices in different zones can disagree about what "today" is.

use chrono::{DateTime, Local, NaiveDate, TimeZone, Utc};

/// Format used for every calendar-day key.
pub const DAY_FORMAT: &str = "%a %b %d %Y";

/// Calendar-day string for a local date.
pub fn day_key(date: NaiveDate) -> String {
    date.format(DAY_FORMAT).to_string()
}

/// Calendar-day string of an instant, seen from the local timezone.
pub fn local_day<Tz: TimeZone>(at: &DateTime<Tz>) -> String {
    day_key(at.with_timezone(&Local).date_naive())
}

/// Calendar-day string of an optional UTC instant; `None` stays `None`.
pub fn local_day_of(at: Option<DateTime<Utc>>) -> Option<String> {
    at.map(|ts| local_day(&ts))
}

/// The `n` calendar days ending at `today`, most recent first.
pub fn trailing_days(today: NaiveDate, n: u32) -> Vec<NaiveDate> {
    (0..n)
        .filter_map(|back| today.checked_sub_days(chrono::Days::new(back as u64)))
        .collect()
}
