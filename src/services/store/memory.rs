//! In-memory stores, used by tests and as a scratch backend.

use super::{EventStore, TaskStore};
use crate::error::{StoreError, StoreResult};
use crate::models::event::CalendarEvent;
use crate::models::task::{Project, Task, TaskUpdate};

#[derive(Debug, Clone, Default)]
pub struct MemoryTaskStore {
    tasks: Vec<Task>,
    projects: Vec<Project>,
    fail_next: Option<StoreError>,
    updates: Vec<(String, TaskUpdate)>,
}

impl MemoryTaskStore {
    pub fn new(tasks: Vec<Task>, projects: Vec<Project>) -> Self {
        Self {
            tasks,
            projects,
            ..Default::default()
        }
    }

    /// Make the next `update_task` call fail with `error`
    pub fn fail_next_update(&mut self, error: StoreError) {
        self.fail_next = Some(error);
    }

    pub fn remove_task(&mut self, id: &str) -> Option<Task> {
        let index = self.tasks.iter().position(|task| task.id == id)?;
        Some(self.tasks.remove(index))
    }

    pub fn remove_project(&mut self, id: &str) -> Option<Project> {
        let index = self.projects.iter().position(|project| project.id == id)?;
        Some(self.projects.remove(index))
    }

    /// Updates accepted so far, in call order
    pub fn updates(&self) -> &[(String, TaskUpdate)] {
        &self.updates
    }
}

impl TaskStore for MemoryTaskStore {
    fn tasks(&self) -> StoreResult<Vec<Task>> {
        Ok(self.tasks.clone())
    }

    fn projects(&self) -> StoreResult<Vec<Project>> {
        Ok(self.projects.clone())
    }

    fn task(&self, id: &str) -> StoreResult<Option<Task>> {
        Ok(self.tasks.iter().find(|task| task.id == id).cloned())
    }

    fn update_task(&mut self, id: &str, update: &TaskUpdate) -> StoreResult<()> {
        if let Some(error) = self.fail_next.take() {
            return Err(error);
        }

        let task = self
            .tasks
            .iter_mut()
            .find(|task| task.id == id)
            .ok_or_else(|| StoreError::TaskNotFound(id.to_string()))?;
        task.apply_update(update);
        self.updates.push((id.to_string(), update.clone()));
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryEventStore {
    events: Vec<CalendarEvent>,
    fail_next: Option<StoreError>,
}

impl MemoryEventStore {
    pub fn new(events: Vec<CalendarEvent>) -> Self {
        Self {
            events,
            fail_next: None,
        }
    }

    pub fn fail_next_replace(&mut self, error: StoreError) {
        self.fail_next = Some(error);
    }

    pub fn remove_event(&mut self, id: &str) -> Option<CalendarEvent> {
        let index = self.events.iter().position(|event| event.id == id)?;
        Some(self.events.remove(index))
    }
}

impl EventStore for MemoryEventStore {
    fn events(&self) -> StoreResult<Vec<CalendarEvent>> {
        Ok(self.events.clone())
    }

    fn event(&self, id: &str) -> StoreResult<Option<CalendarEvent>> {
        Ok(self.events.iter().find(|event| event.id == id).cloned())
    }

    fn replace_event(&mut self, event: CalendarEvent) -> StoreResult<()> {
        if let Some(error) = self.fail_next.take() {
            return Err(error);
        }

        let slot = self
            .events
            .iter_mut()
            .find(|existing| existing.id == event.id)
            .ok_or_else(|| StoreError::EventNotFound(event.id.clone()))?;
        *slot = event;
        Ok(())
    }
}
