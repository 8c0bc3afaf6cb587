//! Time-grid geometry.
//!
//! Maps vertical pixel offsets inside hour cells to quantized times of day
//! and back. Every function here is total: out-of-range input is clamped or
//! defaulted, never rejected.

use chrono::{Duration, NaiveDate, NaiveTime, Timelike};

use crate::models::drag::{TimeOfDay, MINUTES_PER_DAY};
use crate::models::event::CalendarEvent;
use crate::models::settings::Settings;

/// Vertical placement of an event block within a day column.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PixelSpan {
    pub top: f32,
    pub height: f32,
}

impl PixelSpan {
    pub fn bottom(&self) -> f32 {
        self.top + self.height
    }
}

/// Read the hour attribute of a grid cell. Missing or malformed values map
/// to hour 0.
pub fn parse_hour_label(label: Option<&str>) -> u32 {
    label
        .and_then(|value| value.trim().parse::<u32>().ok())
        .map(|hour| hour.min(23))
        .unwrap_or(0)
}

/// Round minutes to the nearest multiple of `snap`.
pub fn snap_minutes(minutes: i64, snap: u32) -> i64 {
    if snap <= 1 {
        return minutes;
    }
    let snap = snap as i64;
    (minutes + snap / 2).div_euclid(snap) * snap
}

/// Convert a pointer offset inside an hour cell to a time of day.
///
/// Offsets above or below the cell carry into the neighbouring hours, and
/// the result is clamped to `[00:00, 24:00]`.
pub fn pixel_to_time(column_height: f32, hour_label: u32, offset_px: f32, snap: u32) -> TimeOfDay {
    let hour = hour_label.min(23) as i64;
    if !(column_height > 0.0) || !offset_px.is_finite() {
        return TimeOfDay::new(hour as u32, 0);
    }

    let minute = ((offset_px / column_height) * 60.0).round() as i64;
    let total = snap_minutes(hour * 60 + minute, snap);
    TimeOfDay::from_minutes(total.clamp(0, MINUTES_PER_DAY as i64) as u32)
}

/// Inverse transform for rendering: block position and height for an item
/// starting at `start` and lasting `duration`.
pub fn time_to_pixel(
    start: NaiveTime,
    duration: Duration,
    hour_height: f32,
    min_visual_height: f32,
) -> PixelSpan {
    let hours = start.hour() as f32
        + start.minute() as f32 / 60.0
        + start.second() as f32 / 3600.0;
    let duration_hours = duration.num_seconds() as f32 / 3600.0;

    PixelSpan {
        top: hours * hour_height,
        height: (duration_hours * hour_height).max(min_visual_height),
    }
}

/// Geometry of one rendered time grid.
#[derive(Clone, Debug, PartialEq)]
pub struct GridGeometry {
    pub hour_height: f32,
    pub snap: u32,
    pub min_visual: Duration,
}

impl GridGeometry {
    pub fn new(hour_height: f32, snap: u32, min_visual: Duration) -> Self {
        Self {
            hour_height,
            snap,
            min_visual,
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(
            settings.hour_height_px,
            settings.snap_minutes,
            settings.min_visual_duration(),
        )
    }

    pub fn day_height(&self) -> f32 {
        self.hour_height * 24.0
    }

    fn min_visual_height(&self) -> f32 {
        self.min_visual.num_minutes() as f32 / 60.0 * self.hour_height
    }

    /// Time at `offset` pixels into the cell labelled `hour`
    pub fn time_at(&self, hour: u32, offset: f32) -> TimeOfDay {
        pixel_to_time(self.hour_height, hour, offset, self.snap)
    }

    /// Start of the last snapped slot of the day
    pub fn last_slot(&self) -> TimeOfDay {
        TimeOfDay::from_minutes(MINUTES_PER_DAY - self.snap.clamp(1, 60))
    }

    /// Slot under the pointer, for targets that must start on this day.
    /// Unlike [`time_at`](Self::time_at) this never yields `24:00`.
    pub fn slot_at(&self, hour: u32, offset: f32) -> TimeOfDay {
        self.time_at(hour, offset).min(self.last_slot())
    }

    /// Split a y coordinate measured from the top of the day into the hour
    /// cell it falls in and the offset within that cell.
    pub fn locate(&self, y: f32) -> (u32, f32) {
        if !(self.hour_height > 0.0) || !y.is_finite() {
            return (0, 0.0);
        }
        let hour = (y / self.hour_height).floor().clamp(0.0, 23.0) as u32;
        (hour, y - hour as f32 * self.hour_height)
    }

    pub fn time_at_y(&self, y: f32) -> TimeOfDay {
        let (hour, offset) = self.locate(y);
        self.time_at(hour, offset)
    }

    pub fn span(&self, start: NaiveTime, duration: Duration) -> PixelSpan {
        time_to_pixel(start, duration, self.hour_height, self.min_visual_height())
    }

    /// Block for the part of a timed event that falls on `date`.
    ///
    /// All-day events and events not touching `date` yield `None`.
    pub fn span_for(&self, event: &CalendarEvent, date: NaiveDate) -> Option<PixelSpan> {
        if event.all_day {
            return None;
        }

        let day_start = date.and_hms_opt(0, 0, 0)?;
        let day_end = day_start + Duration::days(1);
        let start = event.start.naive_local();
        let end = event.display_end(self.min_visual).naive_local();

        if start >= day_end || end <= day_start {
            return None;
        }

        let clipped_start = start.max(day_start);
        let clipped_end = end.min(day_end);
        let mut span = self.span(clipped_start.time(), clipped_end - clipped_start);
        span.height = span.height.min(self.day_height() - span.top);
        Some(span)
    }
}
