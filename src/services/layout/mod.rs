//! Ordering and placement helpers used when rendering a view.
//!
//! These are applied per render on top of the merged list; the merge
//! engine itself never reorders.

use std::cmp::Ordering;

use chrono::{Datelike, Duration, NaiveDate};

use super::geometry::{GridGeometry, PixelSpan};
use crate::models::event::CalendarEvent;
use crate::utils::date::get_week_start;

/// A positioned timed event inside one day column.
#[derive(Clone, Debug, PartialEq)]
pub struct EventBlock {
    pub event_id: String,
    pub span: PixelSpan,
}

/// Display order: all-day first, then by start, then by title.
pub fn display_order(a: &CalendarEvent, b: &CalendarEvent) -> Ordering {
    b.all_day
        .cmp(&a.all_day)
        .then_with(|| a.start.cmp(&b.start))
        .then_with(|| a.title.cmp(&b.title))
}

pub fn sort_for_display(events: &mut [CalendarEvent]) {
    events.sort_by(display_order);
}

/// Whether an event covers any part of `date`.
///
/// All-day ranges are end-exclusive; timed events use their padded display
/// end so point events still land on their day.
pub fn occurs_on(event: &CalendarEvent, date: NaiveDate, min_visual: Duration) -> bool {
    let Some(day_start) = date.and_hms_opt(0, 0, 0) else {
        return false;
    };
    let day_end = day_start + Duration::days(1);
    let start = event.start.naive_local();
    let end = event.display_end(min_visual).naive_local();

    if event.all_day && end <= start {
        return start >= day_start && start < day_end;
    }
    start < day_end && end > day_start
}

/// Events touching `date`, in display order.
pub fn events_on_date(
    events: &[CalendarEvent],
    date: NaiveDate,
    min_visual: Duration,
) -> Vec<CalendarEvent> {
    let mut on_date: Vec<CalendarEvent> = events
        .iter()
        .filter(|event| occurs_on(event, date, min_visual))
        .cloned()
        .collect();
    sort_for_display(&mut on_date);
    on_date
}

/// The seven dates of the week containing `date`
pub fn week_dates(date: NaiveDate, first_day_of_week: u8) -> Vec<NaiveDate> {
    let start = get_week_start(date, first_day_of_week);
    (0..7).map(|offset| start + Duration::days(offset)).collect()
}

/// Six rows of seven dates covering the month of `date`
pub fn month_grid(date: NaiveDate, first_day_of_week: u8) -> Vec<NaiveDate> {
    let first = date.with_day(1).unwrap_or(date);
    let start = get_week_start(first, first_day_of_week);
    (0..42).map(|offset| start + Duration::days(offset)).collect()
}

/// Pixel blocks for the timed events of one day column, in display order.
pub fn day_layout(
    events: &[CalendarEvent],
    date: NaiveDate,
    geometry: &GridGeometry,
) -> Vec<EventBlock> {
    events_on_date(events, date, geometry.min_visual)
        .iter()
        .filter_map(|event| {
            geometry.span_for(event, date).map(|span| EventBlock {
                event_id: event.id.clone(),
                span,
            })
        })
        .collect()
}
