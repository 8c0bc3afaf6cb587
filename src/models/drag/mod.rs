// Drag module
// Ephemeral records handed between the gesture machine and the scheduler

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike};

use crate::models::event::CalendarEvent;

pub const MINUTES_PER_DAY: u32 = 24 * 60;

/// Which calendar grid a gesture happened in
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CalendarView {
    Day,
    Week,
    Month,
}

impl CalendarView {
    /// Day and week grids have a dedicated all-day row
    pub fn has_all_day_row(&self) -> bool {
        matches!(self, CalendarView::Day | CalendarView::Week)
    }
}

/// Region of a column that received the pointer
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum DropZone {
    #[default]
    Timed,
    AllDay,
}

/// Quantized time-of-day. `24:00` is allowed and means end of day.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeOfDay {
    pub hour: u32,
    pub minute: u32,
}

impl TimeOfDay {
    pub const MIDNIGHT: TimeOfDay = TimeOfDay { hour: 0, minute: 0 };
    pub const END_OF_DAY: TimeOfDay = TimeOfDay { hour: 24, minute: 0 };

    pub fn new(hour: u32, minute: u32) -> Self {
        Self::from_minutes(hour * 60 + minute)
    }

    /// Build from minutes since midnight, clamped to `[00:00, 24:00]`
    pub fn from_minutes(minutes: u32) -> Self {
        let minutes = minutes.min(MINUTES_PER_DAY);
        Self {
            hour: minutes / 60,
            minute: minutes % 60,
        }
    }

    pub fn from_time(time: NaiveTime) -> Self {
        Self {
            hour: time.hour(),
            minute: time.minute(),
        }
    }

    pub fn total_minutes(&self) -> u32 {
        self.hour * 60 + self.minute
    }

    /// Local wall-clock datetime on `date`; `24:00` rolls into the next day
    pub fn on(&self, date: NaiveDate) -> Option<NaiveDateTime> {
        date.and_hms_opt(0, 0, 0)?
            .checked_add_signed(Duration::minutes(self.total_minutes() as i64))
    }

    /// `HH:MM` string; `24:00` is rendered as `23:59` since stores only
    /// accept same-day times
    pub fn to_hhmm(&self) -> String {
        if self.hour >= 24 {
            "23:59".to_string()
        } else {
            format!("{:02}:{:02}", self.hour, self.minute)
        }
    }
}

/// The item being dragged and where it came from.
#[derive(Clone, Debug, PartialEq)]
pub struct DragItem {
    pub event: CalendarEvent,
    pub source_view: CalendarView,
}

impl DragItem {
    pub fn new(event: CalendarEvent, source_view: CalendarView) -> Self {
        Self { event, source_view }
    }
}

/// Destination of a drop. `is_all_day` describes the zone, not the item.
#[derive(Clone, Debug, PartialEq)]
pub struct DropResult {
    pub target_date: NaiveDate,
    pub time: Option<TimeOfDay>,
    pub is_all_day: bool,
    pub view: CalendarView,
}

impl DropResult {
    pub fn timed(target_date: NaiveDate, time: TimeOfDay, view: CalendarView) -> Self {
        Self {
            target_date,
            time: Some(time),
            is_all_day: false,
            view,
        }
    }

    pub fn all_day(target_date: NaiveDate, view: CalendarView) -> Self {
        Self {
            target_date,
            time: None,
            is_all_day: true,
            view,
        }
    }

    /// Month cells carry no time and no all-day distinction
    pub fn month_cell(target_date: NaiveDate) -> Self {
        Self {
            target_date,
            time: None,
            is_all_day: false,
            view: CalendarView::Month,
        }
    }
}
