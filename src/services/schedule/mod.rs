//! Schedule recalculation for dropped and resized events.
//!
//! Computes new start/end instants from a [`DragItem`] and a [`DropResult`],
//! then translates them into the task store's field format.

use chrono::{DateTime, Duration, Local, NaiveDate, Utc};

use crate::models::drag::{CalendarView, DragItem, DropResult, TimeOfDay};
use crate::models::event::CalendarEvent;
use crate::models::settings::{FieldFormat, Settings};
use crate::models::task::{Task, TaskStatus, TaskUpdate};
use crate::utils::date::{format_date, format_time, start_of_day, to_local};

#[derive(Clone, Debug, PartialEq)]
pub struct ScheduleOptions {
    /// Length given to an all-day event dropped into a timed slot
    pub default_duration: Duration,
    /// Shortest duration a resize may produce
    pub min_duration: Duration,
    pub field_format: FieldFormat,
}

impl ScheduleOptions {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            default_duration: settings.default_event_duration(),
            min_duration: settings.min_gesture_duration(),
            field_format: settings.field_format,
        }
    }
}

impl Default for ScheduleOptions {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

/// Edge of a timed event being dragged
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResizeHandle {
    /// Adjusts start time
    Top,
    /// Adjusts end time
    Bottom,
}

/// New placement of an event after a drop or resize.
#[derive(Clone, Debug, PartialEq)]
pub struct Rescheduled {
    pub start: DateTime<Local>,
    pub end: DateTime<Local>,
    pub all_day: bool,
}

impl Rescheduled {
    pub fn date(&self) -> NaiveDate {
        self.start.date_naive()
    }
}

/// Decide whether the dropped event is all-day.
///
/// Month cells make no all-day distinction, so the event keeps its own flag
/// there. Day and week views have a dedicated all-day row, so the zone wins.
pub fn resolve_all_day(view: CalendarView, event_all_day: bool, zone_all_day: bool) -> bool {
    match view {
        CalendarView::Month => event_all_day,
        CalendarView::Day | CalendarView::Week => zone_all_day,
    }
}

/// Number of calendar days an all-day event spans (at least one)
fn all_day_span(event: &CalendarEvent) -> i64 {
    (event.end.date_naive() - event.start.date_naive())
        .num_days()
        .max(1)
}

/// Compute where a dropped event lands.
///
/// Wall-clock times repeated or skipped by a DST change resolve through
/// [`to_local`]. `None` means the date arithmetic overflowed and the drop
/// must be ignored.
pub fn recalculate(
    item: &DragItem,
    drop: &DropResult,
    options: &ScheduleOptions,
) -> Option<Rescheduled> {
    let event = &item.event;
    let all_day = resolve_all_day(drop.view, event.all_day, drop.is_all_day);

    if all_day {
        let span = if event.all_day { all_day_span(event) } else { 1 };
        let start = start_of_day(drop.target_date)?;
        let end_date = drop.target_date.checked_add_signed(Duration::days(span))?;
        let end = start_of_day(end_date)?;
        return Some(Rescheduled {
            start,
            end,
            all_day: true,
        });
    }

    let time = drop
        .time
        .unwrap_or_else(|| TimeOfDay::from_time(event.start.time()));
    let start = to_local(time.on(drop.target_date)?)?;
    let duration = if event.all_day {
        options.default_duration
    } else {
        event.duration()
    };
    let end = start.checked_add_signed(duration)?;

    Some(Rescheduled {
        start,
        end,
        all_day: false,
    })
}

/// Whether a drop would produce a consistent schedule.
///
/// Business rules such as "no past dates" are left to the caller.
pub fn is_valid_drop(item: &DragItem, drop: &DropResult, options: &ScheduleOptions) -> bool {
    item.event.is_draggable && recalculate(item, drop, options).is_some()
}

/// Move one edge of a timed event to `time` on `date`.
pub fn resize(
    event: &CalendarEvent,
    handle: ResizeHandle,
    date: NaiveDate,
    time: TimeOfDay,
    options: &ScheduleOptions,
) -> Option<Rescheduled> {
    if event.all_day {
        return None;
    }

    let edge = to_local(time.on(date)?)?;
    let (start, end) = match handle {
        ResizeHandle::Top => (edge, event.end),
        ResizeHandle::Bottom => (event.start, edge),
    };

    if end - start < options.min_duration {
        return None;
    }

    Some(Rescheduled {
        start,
        end,
        all_day: false,
    })
}

/// Copy of a freeform event moved to its new schedule
pub fn apply_to_event(event: &CalendarEvent, rescheduled: &Rescheduled) -> CalendarEvent {
    event.with_schedule(rescheduled.start, rescheduled.end, rescheduled.all_day)
}

/// Translate a new schedule into the task store's update format.
///
/// Moving a `todo` task onto today starts it (`pomodoro`); the reverse
/// transition never happens on drag.
pub fn task_update(
    task: &Task,
    rescheduled: &Rescheduled,
    today: NaiveDate,
    format: FieldFormat,
) -> TaskUpdate {
    let date = rescheduled.date();
    let mut update = TaskUpdate {
        scheduled_date: Some(format_date(date)),
        ..Default::default()
    };

    if rescheduled.all_day {
        update.scheduled_start_time = Some(None);
        update.scheduled_end_time = Some(None);
        update.include_time = Some(false);
    } else {
        let end_time = if rescheduled.end.date_naive() > date {
            TimeOfDay::END_OF_DAY.to_hhmm()
        } else {
            format_time(rescheduled.end.time())
        };
        update.scheduled_start_time = Some(Some(format_time(rescheduled.start.time())));
        update.scheduled_end_time = Some(Some(end_time));
        update.include_time = Some(true);
    }

    match format {
        FieldFormat::Utc if !rescheduled.all_day => {
            update.scheduled_start_utc = Some(Some(rescheduled.start.with_timezone(&Utc)));
            update.scheduled_end_utc = Some(Some(rescheduled.end.with_timezone(&Utc)));
        }
        _ => {
            // Stale UTC instants would otherwise shadow the legacy fields
            if task.scheduled_start_utc.is_some() || task.scheduled_end_utc.is_some() {
                update.scheduled_start_utc = Some(None);
                update.scheduled_end_utc = Some(None);
            }
        }
    }

    if task.status == TaskStatus::Todo && date == today {
        update.status = Some(TaskStatus::Pomodoro);
    }

    update
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, day).unwrap()
    }

    fn local(day: u32, hour: u32, minute: u32) -> DateTime<Local> {
        to_local(date(day).and_hms_opt(hour, minute, 0).unwrap()).unwrap()
    }

    fn timed_item(view: CalendarView) -> DragItem {
        let event = CalendarEvent::new("e1", "Review", local(12, 9, 0), local(12, 10, 30)).unwrap();
        DragItem::new(event, view)
    }

    fn all_day_item(days: i64, view: CalendarView) -> DragItem {
        let start = start_of_day(date(12)).unwrap();
        let end = start_of_day(date(12) + Duration::days(days)).unwrap();
        let event = CalendarEvent::builder()
            .id("e2")
            .title("Conference")
            .start(start)
            .end(end)
            .all_day(true)
            .build()
            .unwrap();
        DragItem::new(event, view)
    }

    #[test_case(CalendarView::Month, true, false, true; "month keeps all-day event")]
    #[test_case(CalendarView::Month, false, true, false; "month keeps timed event")]
    #[test_case(CalendarView::Week, false, true, true; "week all-day row wins")]
    #[test_case(CalendarView::Day, true, false, false; "day timed slot wins")]
    fn test_resolve_all_day(view: CalendarView, event: bool, zone: bool, expected: bool) {
        assert_eq!(resolve_all_day(view, event, zone), expected);
    }

    #[test]
    fn test_timed_drop_preserves_duration() {
        let item = timed_item(CalendarView::Week);
        let drop = DropResult::timed(date(14), TimeOfDay::new(14, 15), CalendarView::Week);

        let result = recalculate(&item, &drop, &ScheduleOptions::default()).unwrap();
        assert_eq!(result.start, local(14, 14, 15));
        assert_eq!(result.end, local(14, 15, 45));
        assert!(!result.all_day);
    }

    #[test]
    fn test_month_drop_keeps_time_of_day() {
        let item = timed_item(CalendarView::Month);
        let drop = DropResult::month_cell(date(20));

        let result = recalculate(&item, &drop, &ScheduleOptions::default()).unwrap();
        assert_eq!(result.start, local(20, 9, 0));
        assert_eq!(result.end, local(20, 10, 30));
    }

    #[test]
    fn test_month_drop_keeps_all_day_span() {
        let item = all_day_item(3, CalendarView::Month);
        let drop = DropResult::month_cell(date(20));

        let result = recalculate(&item, &drop, &ScheduleOptions::default()).unwrap();
        assert!(result.all_day);
        assert_eq!(result.start, start_of_day(date(20)).unwrap());
        assert_eq!(result.end, start_of_day(date(23)).unwrap());
    }

    #[test]
    fn test_timed_event_into_all_day_row() {
        let item = timed_item(CalendarView::Week);
        let drop = DropResult::all_day(date(13), CalendarView::Week);

        let result = recalculate(&item, &drop, &ScheduleOptions::default()).unwrap();
        assert!(result.all_day);
        assert_eq!(result.start, start_of_day(date(13)).unwrap());
        assert_eq!(result.end, start_of_day(date(14)).unwrap());
    }

    #[test]
    fn test_all_day_event_into_timed_slot_gets_default_duration() {
        let item = all_day_item(1, CalendarView::Day);
        let drop = DropResult::timed(date(12), TimeOfDay::new(11, 0), CalendarView::Day);

        let result = recalculate(&item, &drop, &ScheduleOptions::default()).unwrap();
        assert!(!result.all_day);
        assert_eq!(result.start, local(12, 11, 0));
        assert_eq!(result.end, local(12, 12, 0));
    }

    #[test]
    fn test_non_draggable_event_is_invalid_drop() {
        let mut item = timed_item(CalendarView::Week);
        item.event.is_draggable = false;
        let drop = DropResult::timed(date(14), TimeOfDay::new(9, 0), CalendarView::Week);

        assert!(!is_valid_drop(&item, &drop, &ScheduleOptions::default()));
    }

    #[test]
    fn test_valid_drop() {
        let item = timed_item(CalendarView::Week);
        let drop = DropResult::timed(date(14), TimeOfDay::new(9, 0), CalendarView::Week);

        assert!(is_valid_drop(&item, &drop, &ScheduleOptions::default()));
    }

    #[test]
    fn test_resize_bottom_edge() {
        let item = timed_item(CalendarView::Day);
        let result = resize(
            &item.event,
            ResizeHandle::Bottom,
            date(12),
            TimeOfDay::new(12, 0),
            &ScheduleOptions::default(),
        )
        .unwrap();

        assert_eq!(result.start, local(12, 9, 0));
        assert_eq!(result.end, local(12, 12, 0));
    }

    #[test]
    fn test_resize_below_minimum_is_rejected() {
        let item = timed_item(CalendarView::Day);
        let options = ScheduleOptions::default();

        let top = |time| resize(&item.event, ResizeHandle::Top, date(12), time, &options);
        let bottom = |time| resize(&item.event, ResizeHandle::Bottom, date(12), time, &options);

        assert!(top(TimeOfDay::new(10, 30)).is_none());
        assert!(top(TimeOfDay::new(10, 15)).is_some());
        assert!(bottom(TimeOfDay::new(8, 0)).is_none());
    }

    #[test]
    fn test_apply_to_event_keeps_identity() {
        let item = timed_item(CalendarView::Week);
        let rescheduled = Rescheduled {
            start: local(13, 8, 0),
            end: local(13, 9, 30),
            all_day: false,
        };

        let moved = apply_to_event(&item.event, &rescheduled);
        assert_eq!(moved.id, item.event.id);
        assert_eq!(moved.start, local(13, 8, 0));
        assert_eq!(item.event.start, local(12, 9, 0));
    }

    fn todo_task() -> Task {
        let mut task = Task::new("t1", "Write");
        task.scheduled_date = Some("2025-03-10".to_string());
        task
    }

    #[test]
    fn test_task_update_timed() {
        let rescheduled = Rescheduled {
            start: local(14, 9, 30),
            end: local(14, 10, 0),
            all_day: false,
        };

        let update = task_update(&todo_task(), &rescheduled, date(12), FieldFormat::Legacy);
        assert_eq!(
            update,
            TaskUpdate {
                scheduled_date: Some("2025-03-14".to_string()),
                scheduled_start_time: Some(Some("09:30".to_string())),
                scheduled_end_time: Some(Some("10:00".to_string())),
                include_time: Some(true),
                ..Default::default()
            }
        );
    }

    #[test]
    fn test_task_update_all_day_clears_times() {
        let rescheduled = Rescheduled {
            start: start_of_day(date(14)).unwrap(),
            end: start_of_day(date(15)).unwrap(),
            all_day: true,
        };

        let update = task_update(&todo_task(), &rescheduled, date(12), FieldFormat::Legacy);
        assert_eq!(update.scheduled_start_time, Some(None));
        assert_eq!(update.scheduled_end_time, Some(None));
        assert_eq!(update.include_time, Some(false));
        assert!(update.status.is_none());
    }

    #[test]
    fn test_task_update_todo_to_pomodoro_today() {
        let rescheduled = Rescheduled {
            start: local(12, 9, 0),
            end: local(12, 10, 0),
            all_day: false,
        };

        let update = task_update(&todo_task(), &rescheduled, date(12), FieldFormat::Legacy);
        assert_eq!(update.status, Some(TaskStatus::Pomodoro));
    }

    #[test]
    fn test_task_update_never_reverts_status() {
        let mut task = todo_task();
        task.status = TaskStatus::Pomodoro;
        let rescheduled = Rescheduled {
            start: local(20, 9, 0),
            end: local(20, 10, 0),
            all_day: false,
        };

        let update = task_update(&task, &rescheduled, date(12), FieldFormat::Legacy);
        assert!(update.status.is_none());
    }

    #[test]
    fn test_task_update_overnight_end_is_capped() {
        let rescheduled = Rescheduled {
            start: local(14, 23, 0),
            end: local(15, 1, 0),
            all_day: false,
        };

        let update = task_update(&todo_task(), &rescheduled, date(12), FieldFormat::Legacy);
        assert_eq!(update.scheduled_end_time, Some(Some("23:59".to_string())));
    }

    #[test]
    fn test_task_update_utc_format() {
        let rescheduled = Rescheduled {
            start: local(14, 9, 0),
            end: local(14, 10, 0),
            all_day: false,
        };

        let update = task_update(&todo_task(), &rescheduled, date(12), FieldFormat::Utc);
        assert_eq!(
            update.scheduled_start_utc,
            Some(Some(rescheduled.start.with_timezone(&Utc)))
        );
        assert_eq!(update.scheduled_start_time, Some(Some("09:00".to_string())));
    }

    #[test]
    fn test_legacy_format_clears_stale_utc() {
        let mut task = todo_task();
        task.scheduled_start_utc = Some(Utc.with_ymd_and_hms(2025, 3, 10, 9, 0, 0).unwrap());
        task.scheduled_end_utc = Some(Utc.with_ymd_and_hms(2025, 3, 10, 10, 0, 0).unwrap());
        let rescheduled = Rescheduled {
            start: local(14, 9, 0),
            end: local(14, 10, 0),
            all_day: false,
        };

        let update = task_update(&task, &rescheduled, date(12), FieldFormat::Legacy);
        assert_eq!(update.scheduled_start_utc, Some(None));
        assert_eq!(update.scheduled_end_utc, Some(None));
    }
}
