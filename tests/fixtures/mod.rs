// Test fixtures - reusable test data
// Provides consistent tasks, events and dates across integration tests

#![allow(dead_code)]

use chrono::{DateTime, Local, NaiveDate};
use focus_calendar::models::event::CalendarEvent;
use focus_calendar::models::task::{Project, Task, TaskStatus};
use focus_calendar::utils::date::{start_of_day, to_local};

/// Sample dates for testing
pub mod dates {
    use super::*;

    /// Monday, March 10 2025
    pub fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 10).unwrap()
    }

    /// Wednesday, March 12 2025 (used as "today")
    pub fn wednesday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 12).unwrap()
    }

    /// Local instant on a March 2025 day
    pub fn local(day: u32, hour: u32, minute: u32) -> DateTime<Local> {
        let naive = NaiveDate::from_ymd_opt(2025, 3, day)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap();
        to_local(naive).unwrap()
    }

    pub fn midnight(day: u32) -> DateTime<Local> {
        start_of_day(NaiveDate::from_ymd_opt(2025, 3, day).unwrap()).unwrap()
    }
}

/// Sample tasks and projects
pub mod tasks {
    use super::*;

    /// Todo task on Monday 09:00-10:30, in the "work" project
    pub fn timed_todo() -> Task {
        let mut task = Task::new("t-report", "Write quarterly report");
        task.project_id = Some("work".to_string());
        task.scheduled_date = Some("2025-03-10".to_string());
        task.scheduled_start_time = Some("09:00".to_string());
        task.scheduled_end_time = Some("10:30".to_string());
        task.include_time = true;
        task
    }

    /// Whole-day task on Tuesday
    pub fn all_day_todo() -> Task {
        let mut task = Task::new("t-inbox", "Inbox zero");
        task.scheduled_date = Some("2025-03-11".to_string());
        task
    }

    pub fn completed() -> Task {
        let mut task = Task::new("t-done", "Submit expenses");
        task.status = TaskStatus::Completed;
        task.scheduled_date = Some("2025-03-10".to_string());
        task
    }

    pub fn unscheduled() -> Task {
        Task::new("t-someday", "Learn the cello")
    }

    pub fn work_project() -> Project {
        Project::new("work", "Work").with_color("#EF4444")
    }
}

/// Sample freeform events
pub mod events {
    use super::*;

    /// Monday 14:00-15:00
    pub fn planning() -> CalendarEvent {
        CalendarEvent::builder()
            .id("ev-planning")
            .title("Sprint planning")
            .start(dates::local(10, 14, 0))
            .end(dates::local(10, 15, 0))
            .color("#10B981")
            .build()
            .unwrap()
    }

    /// Two-day all-day event starting Thursday
    pub fn offsite() -> CalendarEvent {
        CalendarEvent::builder()
            .id("ev-offsite")
            .title("Team offsite")
            .start(dates::midnight(13))
            .end(dates::midnight(15))
            .all_day(true)
            .build()
            .unwrap()
    }
}
