//! Completed gestures and the callback surface they are delivered to.

use chrono::{DateTime, Local, NaiveDate};

use crate::models::drag::{DragItem, DropResult, TimeOfDay};
use crate::models::event::CalendarEvent;
use crate::services::schedule::{Rescheduled, ResizeHandle};

/// The single outcome of a finished gesture.
#[derive(Clone, Debug, PartialEq)]
pub enum GestureCommit {
    /// Drag across empty time created a new block
    Create {
        date: NaiveDate,
        start: DateTime<Local>,
        end: DateTime<Local>,
    },
    /// Click (or too-short drag) on an empty timed cell
    TimeSlotClick { date: NaiveDate, time: TimeOfDay },
    /// Click in the all-day row
    AllDayClick { date: NaiveDate },
    /// Click on an existing event without moving it
    EventClick(CalendarEvent),
    /// Existing event dropped somewhere
    Drop { item: DragItem, drop: DropResult },
    /// Existing event had an edge dragged
    Resize {
        item: DragItem,
        handle: ResizeHandle,
        rescheduled: Rescheduled,
    },
}

impl GestureCommit {
    /// Deliver this commit to exactly one callback.
    pub fn dispatch<C: CalendarCallbacks + ?Sized>(&self, callbacks: &mut C) {
        match self {
            GestureCommit::Create { start, end, .. } => callbacks.on_drag_create(*start, *end),
            GestureCommit::TimeSlotClick { date, time } => callbacks.on_time_slot_click(*date, *time),
            GestureCommit::AllDayClick { date } => callbacks.on_all_day_click(*date),
            GestureCommit::EventClick(event) => callbacks.on_event_click(event),
            GestureCommit::Drop { item, drop } => callbacks.on_event_drop(item, drop),
            GestureCommit::Resize {
                item, rescheduled, ..
            } => callbacks.on_event_resize(item, rescheduled),
        }
    }
}

/// Notifications fired once per completed gesture.
#[cfg_attr(test, mockall::automock)]
pub trait CalendarCallbacks {
    fn on_drag_create(&mut self, start: DateTime<Local>, end: DateTime<Local>);

    fn on_event_drop(&mut self, item: &DragItem, drop: &DropResult);

    fn on_time_slot_click(&mut self, date: NaiveDate, time: TimeOfDay);

    fn on_all_day_click(&mut self, date: NaiveDate);

    fn on_event_click(&mut self, _event: &CalendarEvent) {}

    fn on_event_resize(&mut self, _item: &DragItem, _rescheduled: &Rescheduled) {}
}
