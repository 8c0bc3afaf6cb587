//! Event/task merge engine.
//!
//! Turns scheduled tasks into [`CalendarEvent`]s and concatenates them with
//! the freeform events. Output order follows input order; display sorting
//! belongs to [`crate::services::layout`].

use std::collections::HashMap;

use chrono::{DateTime, Duration, Local, NaiveDate};

use crate::models::event::{is_hex_color, CalendarEvent};
use crate::models::settings::Settings;
use crate::models::task::{Project, Task, TaskStatus};
use crate::utils::date::{parse_date, parse_time, start_of_day, to_local};

/// Prefix applied to ids of task-backed events
pub const TASK_EVENT_PREFIX: &str = "task-";

#[derive(Clone, Debug, PartialEq)]
pub struct MergeOptions {
    pub default_color: String,
    /// Duration for timed tasks that have a start but no end
    pub default_duration: Duration,
}

impl MergeOptions {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            default_color: settings.default_color.clone(),
            default_duration: settings.default_event_duration(),
        }
    }
}

impl Default for MergeOptions {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

/// Event id used for the calendar entry of `task_id`
pub fn task_event_id(task_id: &str) -> String {
    format!("{TASK_EVENT_PREFIX}{task_id}")
}

/// Merge scheduled tasks and freeform events into one list.
pub fn merge_events(
    events: &[CalendarEvent],
    tasks: &[Task],
    projects: &[Project],
    options: &MergeOptions,
) -> Vec<CalendarEvent> {
    let colors: HashMap<&str, &str> = projects
        .iter()
        .filter_map(|project| {
            project
                .color
                .as_deref()
                .filter(|color| is_hex_color(color))
                .map(|color| (project.id.as_str(), color))
        })
        .collect();

    let mut merged = Vec::with_capacity(tasks.len() + events.len());
    merged.extend(
        tasks
            .iter()
            .filter_map(|task| task_to_event(task, &colors, options)),
    );
    merged.extend(events.iter().cloned());
    merged
}

/// Start/end/all-day derived from a task's schedule fields.
///
/// UTC instants win when both are present; otherwise the legacy date and
/// `HH:MM` fields are used, falling back to a whole-day entry.
pub fn task_schedule(
    task: &Task,
    default_duration: Duration,
) -> Option<(DateTime<Local>, DateTime<Local>, bool)> {
    if !task.is_scheduled() {
        return None;
    }

    if let (Some(start), Some(end)) = (task.scheduled_start_utc, task.scheduled_end_utc) {
        let start = start.with_timezone(&Local);
        let end = end.with_timezone(&Local).max(start);
        return Some((start, end, false));
    }

    let date = task.scheduled_date.as_deref().and_then(parse_date)?;

    if task.include_time {
        if let Some(timed) = timed_schedule(task, date, default_duration) {
            return Some(timed);
        }
        log::debug!(
            "Task {} has include_time but no usable start time, showing as all-day",
            task.id
        );
    }

    let start = start_of_day(date)?;
    let end = start_of_day(date.succ_opt()?)?;
    Some((start, end, true))
}

fn timed_schedule(
    task: &Task,
    date: NaiveDate,
    default_duration: Duration,
) -> Option<(DateTime<Local>, DateTime<Local>, bool)> {
    let start_time = task.scheduled_start_time.as_deref().and_then(parse_time)?;
    let start = to_local(date.and_time(start_time))?;

    let end = task
        .scheduled_end_time
        .as_deref()
        .and_then(parse_time)
        .and_then(|end_time| to_local(date.and_time(end_time)))
        .filter(|end| *end >= start)
        .unwrap_or(start + default_duration);

    Some((start, end, false))
}

fn task_to_event(
    task: &Task,
    colors: &HashMap<&str, &str>,
    options: &MergeOptions,
) -> Option<CalendarEvent> {
    let Some((start, end, all_day)) = task_schedule(task, options.default_duration) else {
        if task.is_scheduled() {
            log::debug!(
                "Skipping task {} with unusable schedule {:?}",
                task.id,
                task.scheduled_date
            );
        }
        return None;
    };

    let color = task
        .project_id
        .as_deref()
        .and_then(|project_id| colors.get(project_id).copied())
        .unwrap_or(options.default_color.as_str());

    Some(CalendarEvent {
        id: task_event_id(&task.id),
        title: task.title.clone(),
        description: task.description.clone(),
        start,
        end,
        all_day,
        is_task: true,
        task_id: Some(task.id.clone()),
        color: color.to_string(),
        is_draggable: true,
        is_completed: task.status == TaskStatus::Completed,
    })
}
