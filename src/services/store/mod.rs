//! Store interfaces the scheduling core depends on.
//!
//! Stores are passed in explicitly so the controller can run against the
//! SQLite backend, the in-memory fakes, or mocks.

pub mod memory;
pub mod sqlite;

use chrono::{Local, NaiveDate};

use crate::error::StoreResult;
use crate::models::event::CalendarEvent;
use crate::models::task::{Project, Task, TaskUpdate};

pub use memory::{MemoryEventStore, MemoryTaskStore};
pub use sqlite::{SqliteEventStore, SqliteTaskStore};

/// Read/write access to tasks and projects.
#[cfg_attr(test, mockall::automock)]
pub trait TaskStore {
    fn tasks(&self) -> StoreResult<Vec<Task>>;

    fn projects(&self) -> StoreResult<Vec<Project>>;

    fn task(&self, id: &str) -> StoreResult<Option<Task>>;

    /// Apply a partial update. Fails with `TaskNotFound` if the task is gone.
    fn update_task(&mut self, id: &str, update: &TaskUpdate) -> StoreResult<()>;
}

/// Freeform calendar events, replaced by id.
#[cfg_attr(test, mockall::automock)]
pub trait EventStore {
    fn events(&self) -> StoreResult<Vec<CalendarEvent>>;

    fn event(&self, id: &str) -> StoreResult<Option<CalendarEvent>>;

    /// Replace the stored event with the same id. Fails with
    /// `EventNotFound` if it no longer exists.
    fn replace_event(&mut self, event: CalendarEvent) -> StoreResult<()>;
}

/// Source of "today" for date-dependent rules.
pub trait Clock {
    fn today(&self) -> NaiveDate;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}
