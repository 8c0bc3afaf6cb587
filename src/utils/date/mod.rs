// Date utility functions
// Parsing/formatting for store field formats and local-time resolution

use chrono::{
    DateTime, Datelike, Duration, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Timelike,
};

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const TIME_FORMAT: &str = "%H:%M";

/// Parse a `YYYY-MM-DD` store date
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).ok()
}

/// Parse an `HH:MM` (24-hour) store time; seconds are tolerated
pub fn parse_time(value: &str) -> Option<NaiveTime> {
    let value = value.trim();
    NaiveTime::parse_from_str(value, TIME_FORMAT)
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M:%S"))
        .ok()
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub fn format_time(time: NaiveTime) -> String {
    time.format(TIME_FORMAT).to_string()
}

/// Longest stretch of wall-clock time a DST gap is searched across
const MAX_GAP_MINUTES: i64 = 24 * 60;

/// Resolve a wall-clock datetime to a local instant.
///
/// A time repeated when the clock falls back resolves to its first
/// occurrence. A time skipped when the clock springs forward resolves to the
/// first instant after the gap. `None` only if the zone has no valid time in
/// the following day.
pub fn to_local(naive: NaiveDateTime) -> Option<DateTime<Local>> {
    if let Some(resolved) = Local.from_local_datetime(&naive).earliest() {
        return Some(resolved);
    }

    let base = naive.with_second(0)?.with_nanosecond(0)?;
    (1..=MAX_GAP_MINUTES).find_map(|minutes| {
        let candidate = base.checked_add_signed(Duration::minutes(minutes))?;
        Local.from_local_datetime(&candidate).earliest()
    })
}

/// First instant of `date` in local time. On days where midnight is skipped
/// this is the end of the gap.
pub fn start_of_day(date: NaiveDate) -> Option<DateTime<Local>> {
    to_local(date.and_hms_opt(0, 0, 0)?)
}

pub fn is_same_day(date1: DateTime<Local>, date2: DateTime<Local>) -> bool {
    date1.date_naive() == date2.date_naive()
}

/// Calculate the start of the week containing the given date.
///
/// # Arguments
/// * `date` - The date to find the week start for
/// * `first_day_of_week` - 0 = Sunday, 1 = Monday, etc.
pub fn get_week_start(date: NaiveDate, first_day_of_week: u8) -> NaiveDate {
    let weekday = date.weekday().num_days_from_sunday() as i64;
    let offset = (weekday - first_day_of_week as i64 + 7) % 7;
    date - Duration::days(offset)
}
