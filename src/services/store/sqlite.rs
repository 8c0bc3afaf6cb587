//! SQLite-backed stores.

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, FixedOffset, Local, Utc};
use rusqlite::types::Type;
use rusqlite::{self, params, OptionalExtension, Row};

use super::{EventStore, TaskStore};
use crate::error::{StoreError, StoreResult};
use crate::models::event::CalendarEvent;
use crate::models::task::{Project, Task, TaskStatus, TaskUpdate};
use crate::services::database::Database;

const TASK_COLUMNS: &str = "id, title, description, project_id, status, scheduled_date,
     scheduled_start_time, scheduled_end_time, include_time,
     scheduled_start_utc, scheduled_end_utc";

const EVENT_COLUMNS: &str = "id, title, description, start_datetime, end_datetime,
     is_all_day, color, is_draggable, is_completed";

fn parse_rfc3339(idx: usize, value: &str) -> rusqlite::Result<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(value)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn to_local_datetime(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Local>> {
    let value: String = row.get(idx)?;
    Ok(parse_rfc3339(idx, &value)?.with_timezone(&Local))
}

fn to_utc_datetime(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<DateTime<Utc>>> {
    row.get::<_, Option<String>>(idx)?
        .map(|value| Ok(parse_rfc3339(idx, &value)?.with_timezone(&Utc)))
        .transpose()
}

fn task_from_row(row: &Row<'_>) -> rusqlite::Result<Task> {
    Ok(Task {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        project_id: row.get(3)?,
        status: TaskStatus::from_str_or_todo(&row.get::<_, String>(4)?),
        scheduled_date: row.get(5)?,
        scheduled_start_time: row.get(6)?,
        scheduled_end_time: row.get(7)?,
        include_time: row.get::<_, i32>(8)? != 0,
        scheduled_start_utc: to_utc_datetime(row, 9)?,
        scheduled_end_utc: to_utc_datetime(row, 10)?,
    })
}

fn event_from_row(row: &Row<'_>) -> rusqlite::Result<CalendarEvent> {
    Ok(CalendarEvent {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        start: to_local_datetime(row, 3)?,
        end: to_local_datetime(row, 4)?,
        all_day: row.get::<_, i32>(5)? != 0,
        is_task: false,
        task_id: None,
        color: row.get(6)?,
        is_draggable: row.get::<_, i32>(7)? != 0,
        is_completed: row.get::<_, i32>(8)? != 0,
    })
}

/// Tasks and projects stored in the `tasks` / `projects` tables.
pub struct SqliteTaskStore<'a> {
    db: &'a Database,
}

impl<'a> SqliteTaskStore<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    pub fn insert_task(&self, task: &Task) -> Result<()> {
        self.db
            .connection()
            .execute(
                &format!(
                    "INSERT INTO tasks ({}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
                    TASK_COLUMNS
                ),
                params![
                    task.id,
                    task.title,
                    task.description,
                    task.project_id,
                    task.status.as_str(),
                    task.scheduled_date,
                    task.scheduled_start_time,
                    task.scheduled_end_time,
                    task.include_time as i32,
                    task.scheduled_start_utc.map(|dt| dt.to_rfc3339()),
                    task.scheduled_end_utc.map(|dt| dt.to_rfc3339()),
                ],
            )
            .context(format!("Failed to insert task {}", task.id))?;
        Ok(())
    }

    pub fn insert_project(&self, project: &Project) -> Result<()> {
        self.db
            .connection()
            .execute(
                "INSERT INTO projects (id, name, color) VALUES (?, ?, ?)",
                params![project.id, project.name, project.color],
            )
            .context(format!("Failed to insert project {}", project.id))?;
        Ok(())
    }

    pub fn delete_task(&self, id: &str) -> Result<bool> {
        let rows = self
            .db
            .connection()
            .execute("DELETE FROM tasks WHERE id = ?", [id])
            .context("Failed to delete task")?;
        Ok(rows > 0)
    }

    fn load_tasks(&self) -> Result<Vec<Task>> {
        let conn = self.db.connection();
        let mut stmt = conn
            .prepare(&format!("SELECT {} FROM tasks ORDER BY rowid", TASK_COLUMNS))
            .context("Failed to prepare task query")?;
        let tasks = stmt
            .query_map([], task_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .context("Failed to load tasks")?;
        Ok(tasks)
    }

    fn load_projects(&self) -> Result<Vec<Project>> {
        let conn = self.db.connection();
        let mut stmt = conn
            .prepare("SELECT id, name, color FROM projects ORDER BY rowid")
            .context("Failed to prepare project query")?;
        let projects = stmt
            .query_map([], |row| {
                Ok(Project {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    color: row.get(2)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()
            .context("Failed to load projects")?;
        Ok(projects)
    }

    fn load_task(&self, id: &str) -> Result<Option<Task>> {
        let task = self
            .db
            .connection()
            .query_row(
                &format!("SELECT {} FROM tasks WHERE id = ?", TASK_COLUMNS),
                [id],
                task_from_row,
            )
            .optional()
            .context(format!("Failed to load task {}", id))?;
        Ok(task)
    }

    fn write_task(&self, task: &Task) -> Result<usize> {
        let rows = self
            .db
            .connection()
            .execute(
                "UPDATE tasks SET
                    status = ?, scheduled_date = ?, scheduled_start_time = ?,
                    scheduled_end_time = ?, include_time = ?,
                    scheduled_start_utc = ?, scheduled_end_utc = ?, updated_at = ?
                 WHERE id = ?",
                params![
                    task.status.as_str(),
                    task.scheduled_date,
                    task.scheduled_start_time,
                    task.scheduled_end_time,
                    task.include_time as i32,
                    task.scheduled_start_utc.map(|dt| dt.to_rfc3339()),
                    task.scheduled_end_utc.map(|dt| dt.to_rfc3339()),
                    Local::now().to_rfc3339(),
                    task.id,
                ],
            )
            .context(format!("Failed to update task {}", task.id))?;
        Ok(rows)
    }
}

impl TaskStore for SqliteTaskStore<'_> {
    fn tasks(&self) -> StoreResult<Vec<Task>> {
        Ok(self.load_tasks()?)
    }

    fn projects(&self) -> StoreResult<Vec<Project>> {
        Ok(self.load_projects()?)
    }

    fn task(&self, id: &str) -> StoreResult<Option<Task>> {
        Ok(self.load_task(id)?)
    }

    fn update_task(&mut self, id: &str, update: &TaskUpdate) -> StoreResult<()> {
        let mut task = self
            .load_task(id)?
            .ok_or_else(|| StoreError::TaskNotFound(id.to_string()))?;
        task.apply_update(update);

        if self.write_task(&task)? == 0 {
            return Err(StoreError::TaskNotFound(id.to_string()));
        }
        log::debug!("Updated task {}", id);
        Ok(())
    }
}

/// Freeform events stored in the `events` table.
pub struct SqliteEventStore<'a> {
    db: &'a Database,
}

impl<'a> SqliteEventStore<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    pub fn insert_event(&self, event: &CalendarEvent) -> Result<()> {
        event.validate().map_err(|e| anyhow!(e))?;

        self.db
            .connection()
            .execute(
                &format!(
                    "INSERT INTO events ({}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
                    EVENT_COLUMNS
                ),
                params![
                    event.id,
                    event.title,
                    event.description,
                    event.start.to_rfc3339(),
                    event.end.to_rfc3339(),
                    event.all_day as i32,
                    event.color,
                    event.is_draggable as i32,
                    event.is_completed as i32,
                ],
            )
            .context(format!("Failed to insert event {}", event.id))?;
        Ok(())
    }

    pub fn delete_event(&self, id: &str) -> Result<bool> {
        let rows = self
            .db
            .connection()
            .execute("DELETE FROM events WHERE id = ?", [id])
            .context("Failed to delete event")?;
        Ok(rows > 0)
    }

    fn load_events(&self) -> Result<Vec<CalendarEvent>> {
        let conn = self.db.connection();
        let mut stmt = conn
            .prepare(&format!(
                "SELECT {} FROM events ORDER BY start_datetime, id",
                EVENT_COLUMNS
            ))
            .context("Failed to prepare event query")?;
        let events = stmt
            .query_map([], event_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .context("Failed to load events")?;
        Ok(events)
    }

    fn load_event(&self, id: &str) -> Result<Option<CalendarEvent>> {
        let event = self
            .db
            .connection()
            .query_row(
                &format!("SELECT {} FROM events WHERE id = ?", EVENT_COLUMNS),
                [id],
                event_from_row,
            )
            .optional()
            .context(format!("Failed to load event {}", id))?;
        Ok(event)
    }

    fn write_event(&self, event: &CalendarEvent) -> Result<usize> {
        event.validate().map_err(|e| anyhow!(e))?;

        let rows = self
            .db
            .connection()
            .execute(
                "UPDATE events SET
                    title = ?, description = ?, start_datetime = ?, end_datetime = ?,
                    is_all_day = ?, color = ?, is_draggable = ?, is_completed = ?,
                    updated_at = ?
                 WHERE id = ?",
                params![
                    event.title,
                    event.description,
                    event.start.to_rfc3339(),
                    event.end.to_rfc3339(),
                    event.all_day as i32,
                    event.color,
                    event.is_draggable as i32,
                    event.is_completed as i32,
                    Local::now().to_rfc3339(),
                    event.id,
                ],
            )
            .context(format!("Failed to update event {}", event.id))?;
        Ok(rows)
    }
}

impl EventStore for SqliteEventStore<'_> {
    fn events(&self) -> StoreResult<Vec<CalendarEvent>> {
        Ok(self.load_events()?)
    }

    fn event(&self, id: &str) -> StoreResult<Option<CalendarEvent>> {
        Ok(self.load_event(id)?)
    }

    fn replace_event(&mut self, event: CalendarEvent) -> StoreResult<()> {
        if self.write_event(&event)? == 0 {
            return Err(StoreError::EventNotFound(event.id));
        }
        log::debug!("Replaced event {}", event.id);
        Ok(())
    }
}
