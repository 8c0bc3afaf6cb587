// Event module
// Renderable calendar item, either freeform or backed by a task

use chrono::{DateTime, Duration, Local};
use serde::{Deserialize, Serialize};

/// Fallback color used when neither the event nor its project provides one.
pub const DEFAULT_EVENT_COLOR: &str = "#3B82F6";

/// A schedulable item shown on the calendar grid.
///
/// Instances are rebuilt on every merge pass and never mutated in place by
/// the scheduling core; a drop or resize produces a new value through
/// [`CalendarEvent::with_schedule`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEvent {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub start: DateTime<Local>,
    pub end: DateTime<Local>,
    /// When true, `start`/`end` are day boundaries rather than a duration.
    pub all_day: bool,
    pub is_task: bool,
    pub task_id: Option<String>,
    pub color: String,
    pub is_draggable: bool,
    pub is_completed: bool,
}

impl CalendarEvent {
    /// Create a freeform event with required fields
    ///
    /// # Examples
    /// ```
    /// use focus_calendar::models::event::CalendarEvent;
    /// use chrono::Local;
    ///
    /// let start = Local::now();
    /// let end = start + chrono::Duration::hours(1);
    /// let event = CalendarEvent::new("evt-1", "Team Meeting", start, end).unwrap();
    /// assert!(event.is_draggable);
    /// ```
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        start: DateTime<Local>,
        end: DateTime<Local>,
    ) -> Result<Self, String> {
        let event = Self {
            id: id.into(),
            title: title.into(),
            description: None,
            start,
            end,
            all_day: false,
            is_task: false,
            task_id: None,
            color: DEFAULT_EVENT_COLOR.to_string(),
            is_draggable: true,
            is_completed: false,
        };
        event.validate()?;
        Ok(event)
    }

    pub fn builder() -> CalendarEventBuilder {
        CalendarEventBuilder::new()
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.id.trim().is_empty() {
            return Err("Event id cannot be empty".to_string());
        }

        if self.title.trim().is_empty() {
            return Err("Event title cannot be empty".to_string());
        }

        // Point events (end == start) are allowed
        if self.end < self.start {
            return Err("Event end time must not be before start time".to_string());
        }

        if !is_hex_color(&self.color) {
            return Err("Color must be in hex format (#RRGGBB or #RGB)".to_string());
        }

        Ok(())
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// End instant used for display, padded so that short or zero-length
    /// events stay visible. The stored `end` is left untouched.
    pub fn display_end(&self, min_visual: Duration) -> DateTime<Local> {
        if self.all_day {
            return self.end;
        }
        self.end.max(self.start + min_visual)
    }

    /// Returns a copy of this event moved to a new schedule.
    pub fn with_schedule(
        &self,
        start: DateTime<Local>,
        end: DateTime<Local>,
        all_day: bool,
    ) -> Self {
        Self {
            start,
            end,
            all_day,
            ..self.clone()
        }
    }
}

/// Check `#RGB` / `#RRGGBB` hex notation.
pub fn is_hex_color(color: &str) -> bool {
    let Some(hex) = color.strip_prefix('#') else {
        return false;
    };
    (hex.len() == 3 || hex.len() == 6) && hex.chars().all(|c| c.is_ascii_hexdigit())
}

/// Builder for creating events with optional fields
pub struct CalendarEventBuilder {
    id: Option<String>,
    title: Option<String>,
    description: Option<String>,
    start: Option<DateTime<Local>>,
    end: Option<DateTime<Local>>,
    all_day: bool,
    task_id: Option<String>,
    color: Option<String>,
    is_draggable: bool,
    is_completed: bool,
}

impl CalendarEventBuilder {
    pub fn new() -> Self {
        Self {
            id: None,
            title: None,
            description: None,
            start: None,
            end: None,
            all_day: false,
            task_id: None,
            color: None,
            is_draggable: true,
            is_completed: false,
        }
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn start(mut self, start: DateTime<Local>) -> Self {
        self.start = Some(start);
        self
    }

    pub fn end(mut self, end: DateTime<Local>) -> Self {
        self.end = Some(end);
        self
    }

    pub fn all_day(mut self, all_day: bool) -> Self {
        self.all_day = all_day;
        self
    }

    /// Mark the event as backed by a task in the external store
    pub fn task(mut self, task_id: impl Into<String>) -> Self {
        self.task_id = Some(task_id.into());
        self
    }

    pub fn color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    pub fn draggable(mut self, is_draggable: bool) -> Self {
        self.is_draggable = is_draggable;
        self
    }

    pub fn completed(mut self, is_completed: bool) -> Self {
        self.is_completed = is_completed;
        self
    }

    pub fn build(self) -> Result<CalendarEvent, String> {
        let id = self.id.ok_or("Event id is required")?;
        let title = self.title.ok_or("Event title is required")?;
        let start = self.start.ok_or("Event start time is required")?;
        let end = self.end.ok_or("Event end time is required")?;

        let event = CalendarEvent {
            id,
            title,
            description: self.description,
            start,
            end,
            all_day: self.all_day,
            is_task: self.task_id.is_some(),
            task_id: self.task_id,
            color: self.color.unwrap_or_else(|| DEFAULT_EVENT_COLOR.to_string()),
            is_draggable: self.is_draggable,
            is_completed: self.is_completed,
        };

        event.validate()?;
        Ok(event)
    }
}

impl Default for CalendarEventBuilder {
    fn default() -> Self {
        Self::new()
    }
}
